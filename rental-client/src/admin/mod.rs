//! Administration screens: catalogue upkeep, reservation approval and the
//! dashboard.
//!
//! Forms in [`forms`] validate before anything is sent; [`AdminConsole`]
//! sends them with the administrator's session.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rental_client::{
//!     admin::{AdminConsole, CategoryForm},
//!     api::RentalApi,
//!     config::ClientConfig,
//!     session::Session,
//! };
//!
//! # async fn example(session: Session) -> rental_client::error::Result<()> {
//! let console = AdminConsole::new(RentalApi::from_config(&ClientConfig::default())?, session);
//! console.add_category(&CategoryForm::new("SUV", "Camionetas familiares")).await?;
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::{
    api::RentalApi,
    error::Result,
    models::{
        Category, CategoryId, Plan, PlanId, Reservation, ReservationId, ReservationStatus,
        Subscription, User, Vehicle, VehicleId,
    },
    session::Session,
    transport::{HttpTransport, Transport},
};

pub mod forms;
pub mod stats;

pub use forms::{CategoryForm, PlanForm, VehicleForm};
pub use stats::{DailyPoint, DashboardData, DashboardStats};

/// Admin operations bound to one session.
#[derive(Debug)]
pub struct AdminConsole<T: Transport = HttpTransport> {
    api: RentalApi<T>,
    session: Session,
}

impl<T: Transport> AdminConsole<T> {
    /// Console over `api` acting as `session`.
    #[must_use]
    pub const fn new(api: RentalApi<T>, session: Session) -> Self {
        Self { api, session }
    }

    /// API client.
    #[must_use]
    pub const fn api(&self) -> &RentalApi<T> {
        &self.api
    }

    /// All vehicles.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    pub async fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.api.list_vehicles().await
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.api.list_categories().await
    }

    /// All plans.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    pub async fn plans(&self) -> Result<Vec<Plan>> {
        self.api.list_plans().await
    }

    /// All reservations.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    pub async fn reservations(&self) -> Result<Vec<Reservation>> {
        self.api.list_reservations(&self.session).await
    }

    /// All users.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    pub async fn users(&self) -> Result<Vec<User>> {
        self.api.list_users(&self.session).await
    }

    /// All subscriptions.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    pub async fn subscriptions(&self) -> Result<Vec<Subscription>> {
        self.api.list_subscriptions(&self.session).await
    }

    /// Creates a vehicle from a validated form.
    ///
    /// # Errors
    ///
    /// Returns the form's validation error without sending, or any request
    /// error.
    #[instrument(skip(self, form), fields(plate = %form.placa))]
    pub async fn add_vehicle(&self, form: &VehicleForm) -> Result<()> {
        let body = form.create_payload()?;
        self.api.create_vehicle(&self.session, &body).await?;
        info!("vehicle added");
        Ok(())
    }

    /// Updates a vehicle from a validated form.
    ///
    /// # Errors
    ///
    /// Returns the form's validation error without sending, or any request
    /// error.
    #[instrument(skip(self, form))]
    pub async fn edit_vehicle(&self, id: VehicleId, form: &VehicleForm) -> Result<()> {
        let body = form.update_payload()?;
        self.api.update_vehicle(&self.session, id, &body).await
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns the form's validation error without sending, or any request
    /// error.
    #[instrument(skip(self, form), fields(name = %form.nombre_categoria))]
    pub async fn add_category(&self, form: &CategoryForm) -> Result<()> {
        let body = form.payload()?;
        self.api.create_category(&self.session, &body).await?;
        info!("category added");
        Ok(())
    }

    /// Updates a category.
    ///
    /// # Errors
    ///
    /// Returns the form's validation error without sending, or any request
    /// error.
    #[instrument(skip(self, form))]
    pub async fn edit_category(&self, id: CategoryId, form: &CategoryForm) -> Result<()> {
        let body = form.payload()?;
        self.api.update_category(&self.session, id, &body).await
    }

    /// Creates a plan.
    ///
    /// # Errors
    ///
    /// Returns the form's validation error without sending, or any request
    /// error.
    #[instrument(skip(self, form), fields(name = %form.nombre_plan))]
    pub async fn add_plan(&self, form: &PlanForm) -> Result<()> {
        let body = form.payload()?;
        self.api.create_plan(&self.session, &body).await?;
        info!("plan added");
        Ok(())
    }

    /// Updates a plan.
    ///
    /// # Errors
    ///
    /// Returns the form's validation error without sending, or any request
    /// error.
    #[instrument(skip(self, form))]
    pub async fn edit_plan(&self, id: PlanId, form: &PlanForm) -> Result<()> {
        let body = form.payload()?;
        self.api.update_plan(&self.session, id, &body).await
    }

    /// Marks a pending reservation as accepted.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    #[instrument(skip(self))]
    pub async fn accept_reservation(&self, id: ReservationId) -> Result<()> {
        self.api
            .update_reservation_status(&self.session, id, ReservationStatus::Accepted.into())
            .await?;
        info!("reservation accepted");
        Ok(())
    }

    /// Loads every listing and computes the dashboard for `days` days ending
    /// `today`.
    ///
    /// # Errors
    ///
    /// Returns the first request error.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, today: NaiveDate, days: u32) -> Result<DashboardStats> {
        let vehicles = self.vehicles().await?;
        let plans = self.plans().await?;
        let reservations = self.reservations().await?;
        let users = self.users().await?;
        let subscriptions = self.subscriptions().await?;

        Ok(DashboardStats::compute(
            DashboardData {
                vehicles: &vehicles,
                plans: &plans,
                reservations: &reservations,
                users: &users,
                subscriptions: &subscriptions,
            },
            today,
            days,
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        error::RentalError,
        models::UserId,
        session::{AuthToken, Credentials},
        transport::{HttpMethod, mock::MockTransport},
    };

    fn console() -> (AdminConsole<MockTransport>, MockTransport) {
        let mock = MockTransport::new();
        let session =
            Session::Authenticated(Credentials::new(AuthToken::new("admin-tok"), UserId::new(1)));
        let api = RentalApi::new(mock.clone(), "http://localhost:8000/api");
        (AdminConsole::new(api, session), mock)
    }

    #[tokio::test]
    async fn test_accept_reservation_puts_status_one() {
        let (console, mock) = console();
        mock.respond(200, json!({"message": "ok"}));

        console.accept_reservation(ReservationId::new(8)).await.unwrap();

        let calls = mock.calls_to(HttpMethod::Put, "/reservaciones/8");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, Some(json!({"id_estado": 1})));
        assert_eq!(calls[0].bearer_token.as_deref(), Some("admin-tok"));
    }

    #[tokio::test]
    async fn test_invalid_vehicle_not_sent() {
        let (console, mock) = console();
        let err = console
            .add_vehicle(&VehicleForm::new("Kia", "Rio", "1850", "P123456"))
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::Validation(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_add_vehicle_body() {
        let (console, mock) = console();
        mock.respond(201, json!({"success": true, "data": null}));

        console.add_vehicle(&VehicleForm::new("Kia", "Rio", "2020", "P123456")).await.unwrap();

        let calls = mock.calls_to(HttpMethod::Post, "/vehiculos");
        assert_eq!(
            calls[0].body,
            Some(json!({
                "marca": "Kia",
                "modelo": "Rio",
                "anio": "2020",
                "placa": "P123456",
                "id_categoria": 1,
                "id_estado": 1
            }))
        );
    }

    #[tokio::test]
    async fn test_edit_plan_puts_to_plan_path() {
        let (console, mock) = console();
        mock.respond(200, json!({}));

        let form = PlanForm::new("Básico", "Entrada", "19.99", "800", "1");
        console.edit_plan(PlanId::new(3), &form).await.unwrap();

        let calls = mock.calls_to(HttpMethod::Put, "/planes/3");
        assert_eq!(calls[0].body.as_ref().unwrap()["limite_km"], 800);
        assert_eq!(calls[0].body.as_ref().unwrap()["precio_mensual"], "19.99");
    }

    #[tokio::test]
    async fn test_add_category_server_rejection() {
        let (console, mock) = console();
        mock.respond(422, json!({"message": "La categoría ya existe"}));

        let err = console.add_category(&CategoryForm::new("SUV", "x")).await.unwrap_err();
        assert_eq!(err.user_message(), "La categoría ya existe");
    }

    #[tokio::test]
    async fn test_dashboard_loads_all_listings() {
        let (console, mock) = console();
        mock.respond(200, json!([]))
            .respond(200, json!([{"id_plan": 1, "nombre_plan": "Básico", "precio_mensual": "29.99"}]))
            .respond(200, json!({"data": []}))
            .respond(200, json!([]))
            .respond(
                200,
                json!([{
                    "id_suscripcion": 1, "fecha_inicio": "2025-03-10", "fecha_fin": "2025-04-10",
                    "fecha_pago": "2025-03-10", "id_plan": 1, "id_estado": 1
                }]),
            );

        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let stats = console.dashboard(today, 7).await.unwrap();

        assert_eq!(mock.call_count(), 5);
        assert_eq!(stats.subscriptions, 1);
        assert_eq!(stats.total_revenue.to_string(), "29.99");
    }
}
