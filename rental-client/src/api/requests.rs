//! Request and response bodies that are not stored records.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::models::{
    CategoryId, PlanId, RoleId, SubscriptionId, SubscriptionStatus, User, UserId, VehicleId, dates,
};

/// `POST /suscripciones` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubscription {
    /// First day of the window.
    #[serde(with = "dates::date")]
    pub fecha_inicio: NaiveDate,
    /// Last day of the window.
    #[serde(with = "dates::date")]
    pub fecha_fin: NaiveDate,
    /// Payment date.
    #[serde(with = "dates::date")]
    pub fecha_pago: NaiveDate,
    /// Subscriber.
    pub id_usuario: UserId,
    /// Purchased plan.
    pub id_plan: PlanId,
    /// Initial status, always active.
    pub id_estado: SubscriptionStatus,
}

/// `POST /pagos` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPayment {
    /// Paid subscription.
    pub id_suscripcion: SubscriptionId,
    /// Payment date.
    #[serde(with = "dates::date")]
    pub fecha_registro: NaiveDate,
    /// Amount, sent as decimal text.
    pub monto: Decimal,
}

/// `{id_estado}` partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    /// New status code.
    pub id_estado: u8,
}

/// `POST /reservaciones` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReservation {
    /// First day.
    #[serde(with = "dates::date")]
    pub fecha_desde: NaiveDate,
    /// Last day.
    #[serde(with = "dates::date")]
    pub fecha_hasta: NaiveDate,
    /// Subscription the booking is charged to.
    pub id_suscripcion: SubscriptionId,
    /// Booked vehicle.
    pub id_vehiculo: VehicleId,
}

/// `POST /vehiculos` and `PUT /vehiculos/{id}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehiclePayload {
    /// Make.
    pub marca: String,
    /// Model.
    pub modelo: String,
    /// Model year, as entered.
    pub anio: String,
    /// Licence plate.
    pub placa: String,
    /// Category.
    pub id_categoria: CategoryId,
    /// Status code; new vehicles are sent as available (1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_estado: Option<u8>,
}

/// `POST /categorias` and `PUT /categorias/{id}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPayload {
    /// Name.
    pub nombre_categoria: String,
    /// Description.
    pub descripcion: String,
}

/// `POST /planes` and `PUT /planes/{id}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanPayload {
    /// Name.
    pub nombre_plan: String,
    /// Description.
    pub descripcion: String,
    /// Monthly fee.
    pub precio_mensual: Decimal,
    /// Distance allowance in km.
    pub limite_km: u32,
    /// Vehicle category covered.
    pub id_categoria: CategoryId,
}

/// `POST /login` body.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Drop for LoginRequest {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// `POST /login` response.
///
/// The user id comes from the embedded `user` object or a top-level
/// `id_usuario`, whichever the server sends.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Signed-in user.
    #[serde(default, alias = "usuario")]
    pub user: Option<User>,
    /// Signed-in user id.
    #[serde(default)]
    pub id_usuario: Option<UserId>,
}

impl LoginResponse {
    /// User id from whichever field carries it.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id_usuario).or(self.id_usuario)
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .field("id_usuario", &self.id_usuario)
            .finish()
    }
}

impl Drop for LoginResponse {
    fn drop(&mut self) {
        self.token.zeroize();
    }
}

/// `POST /register` body.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    /// Full name.
    pub nombres: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub telefono: String,
    /// National identity document number.
    pub dui: String,
    /// Requested role.
    pub id_rol: RoleId,
    /// Password.
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("nombres", &self.nombres)
            .field("email", &self.email)
            .field("id_rol", &self.id_rol)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Drop for RegisterRequest {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}
