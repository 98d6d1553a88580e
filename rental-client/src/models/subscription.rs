//! Subscriptions and payments.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PaymentId, PlanId, SubscriptionId, UserId, dates};

/// Subscription status code (`id_estado`).
///
/// Codes other than 1 and 2 are kept as [`Unknown`](Self::Unknown) so an
/// unexpected server value never fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum SubscriptionStatus {
    /// Code 1.
    Active,
    /// Code 2.
    Inactive,
    /// Any other code.
    Unknown(u8),
}

impl SubscriptionStatus {
    /// Wire code for this status.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Active => 1,
            Self::Inactive => 2,
            Self::Unknown(code) => code,
        }
    }

    /// Label for logs and the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl From<u8> for SubscriptionStatus {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::Active,
            2 => Self::Inactive,
            other => Self::Unknown(other),
        }
    }
}

impl From<SubscriptionStatus> for u8 {
    fn from(status: SubscriptionStatus) -> Self {
        status.code()
    }
}

/// A time-bounded grant of plan benefits to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription identifier.
    pub id_suscripcion: SubscriptionId,
    /// First day of the billing window.
    #[serde(with = "dates::date")]
    pub fecha_inicio: NaiveDate,
    /// Last day of the billing window.
    #[serde(with = "dates::date")]
    pub fecha_fin: NaiveDate,
    /// Day the payment was taken.
    #[serde(default, with = "dates::option_date")]
    pub fecha_pago: Option<NaiveDate>,
    /// Subscriber.
    #[serde(default)]
    pub id_usuario: Option<UserId>,
    /// Subscribed plan.
    pub id_plan: PlanId,
    /// Status code.
    pub id_estado: SubscriptionStatus,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Returns true when the status code is 1.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.id_estado == SubscriptionStatus::Active
    }
}

/// A monetary record tied to a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment identifier.
    #[serde(default)]
    pub id_pago: Option<PaymentId>,
    /// Paid subscription.
    pub id_suscripcion: SubscriptionId,
    /// Registration date.
    #[serde(with = "dates::date")]
    pub fecha_registro: NaiveDate,
    /// Amount, as decimal text on the wire.
    pub monto: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        assert_eq!(SubscriptionStatus::from(1), SubscriptionStatus::Active);
        assert_eq!(SubscriptionStatus::from(2), SubscriptionStatus::Inactive);
        assert_eq!(SubscriptionStatus::from(7), SubscriptionStatus::Unknown(7));
        assert_eq!(u8::from(SubscriptionStatus::Unknown(7)), 7);
        assert_eq!(serde_json::to_string(&SubscriptionStatus::Inactive).unwrap(), "2");
    }

    #[test]
    fn test_subscription_with_unexpected_status_still_parses() {
        let json = r#"{
            "id_suscripcion": 9,
            "fecha_inicio": "2025-01-31",
            "fecha_fin": "2025-02-28",
            "fecha_pago": "2025-01-31",
            "id_usuario": 4,
            "id_plan": 1,
            "id_estado": 5,
            "created_at": null,
            "updated_at": "2025-01-31T12:00:00.000000Z"
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.id_estado, SubscriptionStatus::Unknown(5));
        assert!(!sub.is_active());
        assert!(sub.created_at.is_none());
        assert!(sub.updated_at.is_some());
    }

    #[test]
    fn test_payment_serializes_amount_as_text() {
        let payment = Payment {
            id_pago: None,
            id_suscripcion: SubscriptionId::new(3),
            fecha_registro: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            monto: "29.99".parse().unwrap(),
        };
        let value = serde_json::to_value(&payment).unwrap();
        assert_eq!(value["monto"], "29.99");
        assert_eq!(value["fecha_registro"], "2025-03-01");
    }
}
