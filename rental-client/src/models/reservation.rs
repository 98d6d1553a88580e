//! Vehicle reservations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ReservationId, Subscription, SubscriptionId, Vehicle, VehicleId, dates};

/// Reservation approval status (`id_estado`) as used by the admin screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ReservationStatus {
    /// Code 1, accepted by an administrator.
    Accepted,
    /// Any other code, awaiting acceptance.
    Pending(u8),
}

impl From<u8> for ReservationStatus {
    fn from(code: u8) -> Self {
        if code == 1 { Self::Accepted } else { Self::Pending(code) }
    }
}

impl From<ReservationStatus> for u8 {
    fn from(status: ReservationStatus) -> Self {
        match status {
            ReservationStatus::Accepted => 1,
            ReservationStatus::Pending(code) => code,
        }
    }
}

/// A booked usage window for a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation identifier.
    pub id_reservacion: ReservationId,
    /// First day of the booking.
    #[serde(with = "dates::date")]
    pub fecha_desde: NaiveDate,
    /// Last day of the booking.
    #[serde(with = "dates::date")]
    pub fecha_hasta: NaiveDate,
    /// Registration date.
    #[serde(default, with = "dates::option_date")]
    pub fecha_registro: Option<NaiveDate>,
    /// Subscription the booking is charged to.
    pub id_suscripcion: SubscriptionId,
    /// Booked vehicle.
    #[serde(default)]
    pub id_vehiculo: Option<VehicleId>,
    /// Embedded subscription, when expanded by the admin listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suscripcion: Option<Subscription>,
    /// Embedded vehicle, when expanded by the admin listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehiculo: Option<Vehicle>,
}

impl Reservation {
    /// Number of calendar days covered, counting both ends.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.fecha_hasta - self.fecha_desde).num_days() + 1
    }
}
