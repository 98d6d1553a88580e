//! Typed calls against the rental REST API.
//!
//! [`RentalApi`] pairs a [`Transport`] with an endpoint resolver and the API
//! base URL. Each method maps to one HTTP request; responses go through the
//! envelope adapter in [`envelope`], so bare and wrapped payloads decode alike.
//!
//! Calls that take a [`Session`] fail with [`RentalError::Unauthenticated`]
//! before any request when no one is signed in.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rental_client::{api::RentalApi, config::ClientConfig};
//!
//! # async fn example() -> rental_client::error::Result<()> {
//! let api = RentalApi::from_config(&ClientConfig::default())?;
//! for plan in api.list_plans().await? {
//!     println!("{} {}", plan.nombre_plan, plan.precio_mensual);
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    config::ClientConfig,
    error::{RentalError, Result},
    models::{
        Category, CategoryId, Payment, Plan, PlanId, Reservation, ReservationId, Role,
        Subscription, SubscriptionId, SubscriptionStatus, User, UserId, Vehicle, VehicleId,
    },
    session::Session,
    transport::{HttpMethod, HttpTransport, RequestContext, Transport, TransportResponse},
};

pub mod endpoints;
pub mod envelope;
pub mod requests;

pub use endpoints::{
    ConfigurableEndpointResolver, DefaultEndpointResolver, Endpoint, EndpointResolver,
};
pub use envelope::{ApiEnvelope, OneOrMany};
pub use requests::{
    CategoryPayload, LoginRequest, LoginResponse, NewPayment, NewReservation, NewSubscription,
    PlanPayload, RegisterRequest, StatusUpdate, VehiclePayload,
};

/// Methods that carry a JSON body.
#[derive(Debug, Clone, Copy)]
enum Write {
    Post,
    Put,
    Patch,
}

impl Write {
    const fn http(self) -> HttpMethod {
        match self {
            Self::Post => HttpMethod::Post,
            Self::Put => HttpMethod::Put,
            Self::Patch => HttpMethod::Patch,
        }
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>> {
    serde_json::to_vec(body)
        .map_err(|e| RentalError::Transport(format!("request body serialization failed: {e}")))
}

/// Client for the rental API.
pub struct RentalApi<T: Transport = HttpTransport> {
    transport: T,
    api_base: String,
    endpoints: Box<dyn EndpointResolver>,
}

impl<T: Transport> fmt::Debug for RentalApi<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RentalApi")
            .field("protocol", &self.transport.protocol_name())
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl RentalApi<HttpTransport> {
    /// Builds an HTTP client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport =
            HttpTransport::with_config(&config.http)?.allow_insecure(config.allow_insecure);
        Ok(Self::new(transport, config.api_base())
            .with_endpoint_resolver(ConfigurableEndpointResolver::new(&config.endpoints)))
    }
}

impl<T: Transport> RentalApi<T> {
    /// Client over `transport` using the default endpoint paths.
    ///
    /// `api_base` is the base URL including the API prefix.
    #[must_use]
    pub fn new(transport: T, api_base: impl Into<String>) -> Self {
        Self {
            transport,
            api_base: api_base.into(),
            endpoints: Box::new(DefaultEndpointResolver),
        }
    }

    /// Replaces the endpoint resolver.
    #[must_use]
    pub fn with_endpoint_resolver(mut self, resolver: impl EndpointResolver + 'static) -> Self {
        self.endpoints = Box::new(resolver);
        self
    }

    /// Base URL including the API prefix.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn path(&self, endpoint: Endpoint) -> String {
        self.endpoints.resolve(endpoint)
    }

    fn context<'a>(&'a self, path: &'a str, token: Option<&'a str>) -> RequestContext<'a> {
        RequestContext { base_url: &self.api_base, path, bearer_token: token }
    }

    async fn get(&self, endpoint: Endpoint, token: Option<&str>) -> Result<TransportResponse> {
        let path = self.path(endpoint);
        debug!(path = %path, "GET");
        self.transport.get(self.context(&path, token)).await
    }

    async fn send<B: Serialize>(
        &self,
        method: Write,
        endpoint: Endpoint,
        token: Option<&str>,
        body: &B,
    ) -> Result<TransportResponse> {
        let path = self.path(endpoint);
        let bytes = encode(body)?;
        debug!(method = method.http().as_str(), path = %path, "sending");
        let ctx = self.context(&path, token);
        match method {
            Write::Post => self.transport.post(ctx, &bytes).await,
            Write::Put => self.transport.put(ctx, &bytes).await,
            Write::Patch => self.transport.patch(ctx, &bytes).await,
        }
    }

    async fn get_list<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        token: Option<&str>,
    ) -> Result<Vec<R>> {
        let response = self.get(endpoint, token).await?;
        envelope::decode_list(&response)
    }

    /// `GET /planes`
    ///
    /// # Errors
    ///
    /// Returns error on network failure, non-2xx status or unreadable body.
    #[instrument(skip(self))]
    pub async fn list_plans(&self) -> Result<Vec<Plan>> {
        self.get_list(Endpoint::Plans, None).await
    }

    /// `GET /vehiculos`
    ///
    /// # Errors
    ///
    /// Returns error on network failure, non-2xx status or unreadable body.
    #[instrument(skip(self))]
    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.get_list(Endpoint::Vehicles, None).await
    }

    /// `GET /categorias`
    ///
    /// # Errors
    ///
    /// Returns error on network failure, non-2xx status or unreadable body.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.get_list(Endpoint::Categories, None).await
    }

    /// `GET /rols`
    ///
    /// # Errors
    ///
    /// Returns error on network failure, non-2xx status or unreadable body.
    #[instrument(skip(self))]
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.get_list(Endpoint::Roles, None).await
    }

    /// `POST /login`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Api`] for rejected credentials.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let response = self.send(Write::Post, Endpoint::Login, None, request).await?;
        envelope::decode(&response)
    }

    /// `POST /register`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Api`] when the server rejects the registration.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        let response =
            self.send(Write::Post, Endpoint::Register, None, request).await?;
        envelope::decode_optional::<serde_json::Value>(&response).map(|_| ())
    }

    /// `GET /usuarios/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session))]
    pub async fn get_user(&self, session: &Session, id: UserId) -> Result<User> {
        let creds = session.require()?;
        let response = self.get(Endpoint::User(id.get()), Some(creds.token())).await?;
        envelope::decode(&response)
    }

    /// `GET /usuarios`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session))]
    pub async fn list_users(&self, session: &Session) -> Result<Vec<User>> {
        let creds = session.require()?;
        self.get_list(Endpoint::Users, Some(creds.token())).await
    }

    /// `GET /suscripciones/cliente/{user_id}`
    ///
    /// A 404 is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// other request error.
    #[instrument(skip(self, session))]
    pub async fn client_subscriptions(&self, session: &Session) -> Result<Vec<Subscription>> {
        let creds = session.require()?;
        let endpoint = Endpoint::ClientSubscriptions(creds.user_id().get());
        match self.get_list(endpoint, Some(creds.token())).await {
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    /// `GET /suscripciones`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session))]
    pub async fn list_subscriptions(&self, session: &Session) -> Result<Vec<Subscription>> {
        let creds = session.require()?;
        self.get_list(Endpoint::Subscriptions, Some(creds.token())).await
    }

    /// `POST /suscripciones`
    ///
    /// Returns the created record, including its id.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session, body), fields(plan = %body.id_plan))]
    pub async fn create_subscription(
        &self,
        session: &Session,
        body: &NewSubscription,
    ) -> Result<Subscription> {
        let creds = session.require()?;
        let response = self
            .send(Write::Post, Endpoint::Subscriptions, Some(creds.token()), body)
            .await?;
        envelope::decode(&response)
    }

    /// `PATCH /suscripciones/{id}` with `{id_estado}`.
    ///
    /// Returns the updated record as the server reports it.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session))]
    pub async fn update_subscription_status(
        &self,
        session: &Session,
        id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> Result<Subscription> {
        let creds = session.require()?;
        let body = StatusUpdate { id_estado: status.code() };
        let response = self
            .send(
                Write::Patch,
                Endpoint::Subscription(id.get()),
                Some(creds.token()),
                &body,
            )
            .await?;
        envelope::decode(&response)
    }

    /// `GET /pagos`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session))]
    pub async fn list_payments(&self, session: &Session) -> Result<Vec<Payment>> {
        let creds = session.require()?;
        self.get_list(Endpoint::Payments, Some(creds.token())).await
    }

    /// `POST /pagos`
    ///
    /// Returns the stored payment when the server echoes it.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session, body), fields(subscription = %body.id_suscripcion, amount = %body.monto))]
    pub async fn create_payment(
        &self,
        session: &Session,
        body: &NewPayment,
    ) -> Result<Option<Payment>> {
        let creds = session.require()?;
        let response = self
            .send(Write::Post, Endpoint::Payments, Some(creds.token()), body)
            .await?;
        envelope::decode_optional(&response)
    }

    /// `GET /reservaciones`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session))]
    pub async fn list_reservations(&self, session: &Session) -> Result<Vec<Reservation>> {
        let creds = session.require()?;
        self.get_list(Endpoint::Reservations, Some(creds.token())).await
    }

    /// `POST /reservaciones`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session, body), fields(vehicle = %body.id_vehiculo))]
    pub async fn create_reservation(
        &self,
        session: &Session,
        body: &NewReservation,
    ) -> Result<Option<Reservation>> {
        let creds = session.require()?;
        let response = self
            .send(Write::Post, Endpoint::Reservations, Some(creds.token()), body)
            .await?;
        envelope::decode_optional(&response)
    }

    /// `PUT /reservaciones/{id}` with `{id_estado}`.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session))]
    pub async fn update_reservation_status(
        &self,
        session: &Session,
        id: ReservationId,
        id_estado: u8,
    ) -> Result<()> {
        let creds = session.require()?;
        self.send(
            Write::Put,
            Endpoint::Reservation(id.get()),
            Some(creds.token()),
            &StatusUpdate { id_estado },
        )
        .await
        .map(|_| ())
    }

    /// `POST /vehiculos`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session, body), fields(plate = %body.placa))]
    pub async fn create_vehicle(&self, session: &Session, body: &VehiclePayload) -> Result<()> {
        let creds = session.require()?;
        self.send(Write::Post, Endpoint::Vehicles, Some(creds.token()), body)
            .await
            .map(|_| ())
    }

    /// `PUT /vehiculos/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session, body))]
    pub async fn update_vehicle(
        &self,
        session: &Session,
        id: VehicleId,
        body: &VehiclePayload,
    ) -> Result<()> {
        let creds = session.require()?;
        self.send(
            Write::Put,
            Endpoint::Vehicle(id.get()),
            Some(creds.token()),
            body,
        )
        .await
        .map(|_| ())
    }

    /// `POST /categorias`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session, body), fields(name = %body.nombre_categoria))]
    pub async fn create_category(&self, session: &Session, body: &CategoryPayload) -> Result<()> {
        let creds = session.require()?;
        self.send(Write::Post, Endpoint::Categories, Some(creds.token()), body)
            .await
            .map(|_| ())
    }

    /// `PUT /categorias/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session, body))]
    pub async fn update_category(
        &self,
        session: &Session,
        id: CategoryId,
        body: &CategoryPayload,
    ) -> Result<()> {
        let creds = session.require()?;
        self.send(
            Write::Put,
            Endpoint::Category(id.get()),
            Some(creds.token()),
            body,
        )
        .await
        .map(|_| ())
    }

    /// `POST /planes`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session, body), fields(name = %body.nombre_plan))]
    pub async fn create_plan(&self, session: &Session, body: &PlanPayload) -> Result<()> {
        let creds = session.require()?;
        self.send(Write::Post, Endpoint::Plans, Some(creds.token()), body)
            .await
            .map(|_| ())
    }

    /// `PUT /planes/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] without a session, or any
    /// request error.
    #[instrument(skip(self, session, body))]
    pub async fn update_plan(&self, session: &Session, id: PlanId, body: &PlanPayload) -> Result<()> {
        let creds = session.require()?;
        self.send(Write::Put, Endpoint::Plan(id.get()), Some(creds.token()), body)
            .await
            .map(|_| ())
    }
}
