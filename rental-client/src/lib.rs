//! Rental Client: typed access to a vehicle-rental subscription platform
//!
//! A Rust library for the client side of a vehicle-rental service: browse
//! plans, buy a monthly subscription, pay for it, book vehicles under it, and
//! run the administrator's catalogue and dashboard.
//!
//! # What does it solve?
//!
//! The rental API records a subscription and its payment with two separate
//! requests. Nothing server-side ties them together, so a failure between the
//! two leaves a subscription that exists but was never paid. This crate:
//!
//! - **Sequences the purchase**: subscription first, payment second, with the
//!   saga state kept in [`workflow::SubscriptionWorkflow`]
//! - **Detects orphans**: active subscriptions without a payment are flagged
//!   and repaired with an explicit payment retry, never a second purchase
//! - **Validates early**: card and admin forms are checked before any request
//! - **Keeps secrets out of logs**: tokens, passwords and card numbers are
//!   redacted in `Debug` output and zeroized on drop
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │  rental-cli / front end  │
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────────────────────────────┐
//! │                rental-client                     │
//! │  ┌──────────┐  ┌───────┐  ┌───────┐  ┌────────┐  │
//! │  │ workflow │  │ admin │  │ auth  │  │session │  │
//! │  └────┬─────┘  └───┬───┘  └───┬───┘  └────────┘  │
//! │       └────────────┼──────────┘                  │
//! │              ┌─────▼──────┐                      │
//! │              │ api        │ envelope, endpoints  │
//! │              └─────┬──────┘                      │
//! │              ┌─────▼──────┐                      │
//! │              │ transport  │ reqwest              │
//! │              └─────┬──────┘                      │
//! └────────────────────┼─────────────────────────────┘
//!                      │ HTTP + Bearer token
//!              ┌───────▼────────┐
//!              │  Rental API    │  /planes, /suscripciones, /pagos, ...
//!              └────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rental_client::{
//!     api::RentalApi,
//!     auth,
//!     config::ClientConfig,
//!     workflow::{CardDetails, SubscriptionWorkflow},
//! };
//!
//! # async fn example() -> rental_client::error::Result<()> {
//! let api = RentalApi::from_config(&ClientConfig::default())?;
//! let session = auth::login(&api, "ana@example.com", "secreto").await?;
//!
//! let mut workflow = SubscriptionWorkflow::new(api, session);
//! workflow.load().await?;
//!
//! let plan = workflow.plans().plans()[0].clone();
//! let card = CardDetails::new("Ana López", "4111 1111 1111 1111", "12/27", "123");
//! match workflow.subscribe(&plan, &card).await {
//!     Ok(_) => println!("{:?}", workflow.message()),
//!     Err(e) => eprintln!("{}", e.user_message()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`workflow`]: purchase saga, card form, billing window
//! - [`admin`]: catalogue forms, reservation approval, dashboard statistics
//! - [`auth`]: login and registration
//! - [`session`]: explicit session value and its stores
//! - [`api`]: one method per REST call, envelope decoding, endpoint paths
//! - [`transport`]: HTTP transport behind a sealed trait
//! - [`config`]: TOML configuration
//! - [`audit`]: structured audit events
//! - [`models`]: records as the API sends them
//! - [`error`]: [`RentalError`] and [`Result`]
//!
//! # Error Handling
//!
//! Every operation returns [`Result<T>`]. [`RentalError::user_message`] gives
//! the text to show the user; nothing is retried automatically.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and tracing-subscriber"
)]

pub mod admin;
pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;
pub mod workflow;

pub use api::RentalApi;
pub use config::ClientConfig;
pub use error::{RentalError, Result};
pub use session::Session;
pub use workflow::SubscriptionWorkflow;
