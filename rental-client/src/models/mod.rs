//! Data models mirrored from the rental API.
//!
//! Records are flat and keep the API's field names on the wire. The only
//! client-owned rules are shape checks: identifiers are typed, money is a
//! [`rust_decimal::Decimal`], dates are [`chrono::NaiveDate`], and status codes
//! outside the known set are preserved instead of rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod dates;
pub mod reservation;
pub mod subscription;
pub mod user;

pub use catalog::{Category, Plan, PlanCategory, Vehicle};
pub use reservation::{Reservation, ReservationStatus};
pub use subscription::{Payment, Subscription, SubscriptionStatus};
pub use user::{Role, User};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a pricing plan (`id_plan`).
    PlanId
);
numeric_id!(
    /// Identifier of a subscription (`id_suscripcion`).
    SubscriptionId
);
numeric_id!(
    /// Identifier of a payment (`id_pago`).
    PaymentId
);
numeric_id!(
    /// Identifier of a reservation (`id_reservacion`).
    ReservationId
);
numeric_id!(
    /// Identifier of a vehicle (`id_vehiculo`).
    VehicleId
);
numeric_id!(
    /// Identifier of a vehicle category (`id_categoria`).
    CategoryId
);
numeric_id!(
    /// Identifier of a user (`id_usuario`).
    UserId
);
numeric_id!(
    /// Identifier of a user role (`id_rol`).
    RoleId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&PlanId::new(7)).unwrap();
        assert_eq!(json, "7");

        let id: SubscriptionId = serde_json::from_str("42").unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }
}
