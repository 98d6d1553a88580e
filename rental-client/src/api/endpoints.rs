//! Endpoint path resolution.

use crate::config::EndpointConfig;

/// An API resource, with its identifier where the path needs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/planes`
    Plans,
    /// `/planes/{id}`
    Plan(u64),
    /// `/suscripciones`
    Subscriptions,
    /// `/suscripciones/cliente/{id}`
    ClientSubscriptions(u64),
    /// `/suscripciones/{id}`
    Subscription(u64),
    /// `/pagos`
    Payments,
    /// `/reservaciones`
    Reservations,
    /// `/reservaciones/{id}`
    Reservation(u64),
    /// `/vehiculos`
    Vehicles,
    /// `/vehiculos/{id}`
    Vehicle(u64),
    /// `/categorias`
    Categories,
    /// `/categorias/{id}`
    Category(u64),
    /// `/usuarios`
    Users,
    /// `/usuarios/{id}`
    User(u64),
    /// `/rols`
    Roles,
    /// `/login`
    Login,
    /// `/register`
    Register,
}

impl Endpoint {
    /// Default path template.
    #[must_use]
    pub const fn default_template(self) -> &'static str {
        match self {
            Self::Plans => "/planes",
            Self::Plan(_) => "/planes/{id}",
            Self::Subscriptions => "/suscripciones",
            Self::ClientSubscriptions(_) => "/suscripciones/cliente/{id}",
            Self::Subscription(_) => "/suscripciones/{id}",
            Self::Payments => "/pagos",
            Self::Reservations => "/reservaciones",
            Self::Reservation(_) => "/reservaciones/{id}",
            Self::Vehicles => "/vehiculos",
            Self::Vehicle(_) => "/vehiculos/{id}",
            Self::Categories => "/categorias",
            Self::Category(_) => "/categorias/{id}",
            Self::Users => "/usuarios",
            Self::User(_) => "/usuarios/{id}",
            Self::Roles => "/rols",
            Self::Login => "/login",
            Self::Register => "/register",
        }
    }

    const fn id(self) -> Option<u64> {
        match self {
            Self::Plan(id)
            | Self::ClientSubscriptions(id)
            | Self::Subscription(id)
            | Self::Reservation(id)
            | Self::Vehicle(id)
            | Self::Category(id)
            | Self::User(id) => Some(id),
            _ => None,
        }
    }

    fn configured(self, config: &EndpointConfig) -> Option<&str> {
        let field = match self {
            Self::Plans => &config.plans,
            Self::Plan(_) => &config.plan,
            Self::Subscriptions => &config.subscriptions,
            Self::ClientSubscriptions(_) => &config.client_subscriptions,
            Self::Subscription(_) => &config.subscription,
            Self::Payments => &config.payments,
            Self::Reservations => &config.reservations,
            Self::Reservation(_) => &config.reservation,
            Self::Vehicles => &config.vehicles,
            Self::Vehicle(_) => &config.vehicle,
            Self::Categories => &config.categories,
            Self::Category(_) => &config.category,
            Self::Users => &config.users,
            Self::User(_) => &config.user,
            Self::Roles => &config.roles,
            Self::Login => &config.login,
            Self::Register => &config.register,
        };
        field.as_deref()
    }
}

/// Maps an [`Endpoint`] to a request path.
pub trait EndpointResolver: Send + Sync {
    /// Resolves the request path, with any `{id}` placeholder filled in.
    fn resolve(&self, endpoint: Endpoint) -> String;
}

fn fill(template: &str, endpoint: Endpoint) -> String {
    match endpoint.id() {
        Some(id) => template.replace("{id}", &id.to_string()),
        None => template.to_owned(),
    }
}

/// Resolver using the API's standard paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEndpointResolver;

impl EndpointResolver for DefaultEndpointResolver {
    fn resolve(&self, endpoint: Endpoint) -> String {
        fill(endpoint.default_template(), endpoint)
    }
}

/// Resolver that honours configured overrides and falls back to the defaults.
#[derive(Debug, Clone)]
pub struct ConfigurableEndpointResolver {
    config: EndpointConfig,
}

impl ConfigurableEndpointResolver {
    /// Creates a resolver from endpoint overrides.
    #[must_use]
    pub fn new(config: &EndpointConfig) -> Self {
        Self { config: config.clone() }
    }
}

impl EndpointResolver for ConfigurableEndpointResolver {
    fn resolve(&self, endpoint: Endpoint) -> String {
        let template = endpoint.configured(&self.config).unwrap_or(endpoint.default_template());
        fill(template, endpoint)
    }
}
