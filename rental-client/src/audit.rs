//! Audit logging for money-moving and account events.
//!
//! Events go to the `audit` tracing target so they can be routed apart from
//! diagnostic logs. Every workflow run carries one correlation id across its
//! subscription and payment steps.
//!
//! # Examples
//!
//! ```
//! use rental_client::{
//!     audit::{AuditEvent, AuditEventType, audit_log},
//!     models::{PlanId, UserId},
//! };
//! use uuid::Uuid;
//!
//! let event = AuditEvent::new(AuditEventType::SubscriptionRequested, Uuid::new_v4())
//!     .with_user(UserId::new(4))
//!     .with_plan(PlanId::new(1));
//! audit_log(&event);
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{PlanId, ReservationId, SubscriptionId, UserId, VehicleId};

/// Types of auditable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A purchase was submitted.
    SubscriptionRequested,
    /// The server created the subscription record.
    SubscriptionCreated,
    /// The payment for a subscription was recorded.
    PaymentRecorded,
    /// Recording a payment failed.
    PaymentFailed,
    /// An active subscription without a payment was found.
    OrphanDetected,
    /// A subscription was set inactive.
    SubscriptionDeactivated,
    /// A reservation was booked.
    ReservationCreated,
    /// Login accepted.
    LoginSucceeded,
    /// Login rejected.
    LoginFailed,
}

/// Contextual details of an audit entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDetails {
    /// Acting user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Email, partially redacted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Plan involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<PlanId>,
    /// Subscription involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<SubscriptionId>,
    /// Reservation involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<ReservationId>,
    /// Vehicle involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<VehicleId>,
    /// Amount moved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Error text, with card data redacted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub event_type: AuditEventType,
    /// Correlation id shared by the steps of one operation.
    pub request_id: Uuid,
    /// Context.
    pub details: AuditDetails,
}

impl AuditEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: AuditEventType, request_id: Uuid) -> Self {
        Self { timestamp: Utc::now(), event_type, request_id, details: AuditDetails::default() }
    }

    /// Sets the acting user.
    #[must_use]
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.details.user_id = Some(user_id);
        self
    }

    /// Sets the email; it is redacted before being stored.
    #[must_use]
    pub fn with_email(mut self, email: &str) -> Self {
        self.details.email = Some(redact_email(email));
        self
    }

    /// Sets the plan.
    #[must_use]
    pub fn with_plan(mut self, plan_id: PlanId) -> Self {
        self.details.plan_id = Some(plan_id);
        self
    }

    /// Sets the subscription.
    #[must_use]
    pub fn with_subscription(mut self, subscription_id: SubscriptionId) -> Self {
        self.details.subscription_id = Some(subscription_id);
        self
    }

    /// Sets the reservation.
    #[must_use]
    pub fn with_reservation(mut self, reservation_id: ReservationId) -> Self {
        self.details.reservation_id = Some(reservation_id);
        self
    }

    /// Sets the vehicle.
    #[must_use]
    pub fn with_vehicle(mut self, vehicle_id: VehicleId) -> Self {
        self.details.vehicle_id = Some(vehicle_id);
        self
    }

    /// Sets the amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.details.amount = Some(amount);
        self
    }

    /// Sets the error text, redacting card data.
    ///
    /// # Examples
    ///
    /// ```
    /// use rental_client::audit::{AuditEvent, AuditEventType};
    /// use uuid::Uuid;
    ///
    /// let event = AuditEvent::new(AuditEventType::PaymentFailed, Uuid::new_v4())
    ///     .with_error("declined 4111 1111 1111 1111");
    /// assert!(!event.details.error.unwrap().contains("4111"));
    /// ```
    #[must_use]
    pub fn with_error(mut self, error: impl AsRef<str>) -> Self {
        self.details.error = Some(redact_sensitive(error.as_ref()));
        self
    }
}

/// Emits an event on the `audit` target.
pub fn audit_log(event: &AuditEvent) {
    tracing::info!(
        target: "audit",
        timestamp = %event.timestamp.to_rfc3339(),
        event_type = ?event.event_type,
        request_id = %event.request_id,
        details = ?event.details,
        "AUDIT"
    );
}

const CVV_KEYWORDS: [&str; 4] = ["cvv", "cvc", "cvv2", "cid"];

/// Redacts card numbers, CVVs and DUI numbers from free text.
///
/// - runs of 13 to 19 digits, optionally separated by spaces or dashes,
///   become `XXXX-XXXX-XXXX-XXXX`
/// - 3 or 4 digits after a CVV keyword become `XXX`
/// - `DDDDDDDD-D` identity numbers become `XXXXXXXX-X`
///
/// # Examples
///
/// ```
/// use rental_client::audit::redact_sensitive;
///
/// assert_eq!(redact_sensitive("card 4111-1111-1111-1111"), "card XXXX-XXXX-XXXX-XXXX");
/// assert_eq!(redact_sensitive("CVV: 123"), "CVV: XXX");
/// ```
#[must_use]
pub fn redact_sensitive(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_ascii_digit() && (i == 0 || !chars[i - 1].is_ascii_digit()) {
            if let Some(end) = dui_end(&chars, i) {
                out.push_str("XXXXXXXX-X");
                i = end;
                continue;
            }
            if let Some(end) = card_end(&chars, i) {
                out.push_str("XXXX-XXXX-XXXX-XXXX");
                i = end;
                continue;
            }
        }

        if let Some((keep, end)) = cvv_span(&chars, i) {
            out.extend(&chars[i..keep]);
            out.push_str("XXX");
            i = end;
            continue;
        }

        out.push(chars[i]);
        i += 1;
    }

    out
}

/// End of a card number starting at `start`, if one is there.
fn card_end(chars: &[char], start: usize) -> Option<usize> {
    let mut digits = 0;
    let mut end = start;
    let mut i = start;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            digits += 1;
            i += 1;
            end = i;
        } else if (chars[i] == ' ' || chars[i] == '-')
            && chars.get(i + 1).is_some_and(char::is_ascii_digit)
        {
            i += 1;
        } else {
            break;
        }
    }
    (13..=19).contains(&digits).then_some(end)
}

fn dui_end(chars: &[char], start: usize) -> Option<usize> {
    let digits = |from: usize, len: usize| {
        chars.get(from..from + len).is_some_and(|s| s.iter().all(char::is_ascii_digit))
    };
    let end = start + 10;
    let isolated = chars.get(end).is_none_or(|c| !c.is_ascii_digit());
    (digits(start, 8) && chars.get(start + 8) == Some(&'-') && digits(start + 9, 1) && isolated)
        .then_some(end)
}

/// For a CVV keyword at `start`, returns where the digits begin and end.
fn cvv_span(chars: &[char], start: usize) -> Option<(usize, usize)> {
    if start > 0 && chars[start - 1].is_alphanumeric() {
        return None;
    }
    let keyword = CVV_KEYWORDS.iter().rev().find(|kw| {
        kw.chars()
            .enumerate()
            .all(|(k, c)| chars.get(start + k).is_some_and(|x| x.to_ascii_lowercase() == c))
    })?;

    let mut i = start + keyword.len();
    while chars.get(i).is_some_and(|c| *c == ':' || *c == '=' || c.is_whitespace()) {
        i += 1;
    }
    let digits_start = i;
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }
    (digits_start > start + keyword.len() && (3..=4).contains(&(i - digits_start)))
        .then_some((digits_start, i))
}

/// Keeps the first character of the local part and the domain.
///
/// # Examples
///
/// ```
/// use rental_client::audit::redact_email;
///
/// assert_eq!(redact_email("ana@example.com"), "a***@example.com");
/// assert_eq!(redact_email("nope"), "***");
/// ```
#[must_use]
pub fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_owned(),
    }
}
