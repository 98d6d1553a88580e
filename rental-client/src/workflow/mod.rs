//! Subscription purchase workflow.
//!
//! Plan purchase creates a subscription and then its payment, two requests
//! with no server-side transaction between them. [`SubscriptionWorkflow`]
//! sequences them, detects subscriptions left without a payment, and offers an
//! explicit payment retry instead of a second purchase.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rental_client::{
//!     api::RentalApi,
//!     config::ClientConfig,
//!     session::Session,
//!     workflow::{CardDetails, SubscriptionWorkflow},
//! };
//!
//! # async fn example(session: Session) -> rental_client::error::Result<()> {
//! let api = RentalApi::from_config(&ClientConfig::default())?;
//! let mut workflow = SubscriptionWorkflow::new(api, session);
//! workflow.load().await?;
//!
//! let plan = workflow.plans().plans()[0].clone();
//! let card = CardDetails::new("Ana López", "4111 1111 1111 1111", "12/27", "123");
//! workflow.subscribe(&plan, &card).await?;
//!
//! if let Some(banner) = workflow.active_banner() {
//!     println!("{}: {:?}", banner.title, banner.plan_name);
//! }
//! # Ok(())
//! # }
//! ```

mod card;
mod period;
mod saga;

pub use card::CardDetails;
pub use period::{BillingWindow, Clock, FixedClock, SystemClock};
pub use saga::{
    ACTIVE_BANNER_TITLE, ActiveBanner, CurrentSubscription, DEACTIVATED_MESSAGE,
    PAYMENT_UNVERIFIED_MESSAGE, PlansState, RESERVATION_DATES_MESSAGE, RESERVED_MESSAGE,
    SUBSCRIBED_MESSAGE, SubscriptionState, SubscriptionWorkflow,
};

#[cfg(test)]
mod tests {
    mod proptest_workflow;
    mod scenarios;
}
