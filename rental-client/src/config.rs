//! Client configuration.
//!
//! Configuration is TOML, deserialized with serde. Every field has a default,
//! so an empty table plus `allow_insecure = true` reaches the local development
//! API at `http://localhost:8000/api`.
//!
//! ```toml
//! base_url = "https://rental.example.com"
//! api_prefix = "/api"
//!
//! [endpoints]
//! plans = "/v2/planes"
//! subscription = "/v2/suscripciones/{id}"
//!
//! [http]
//! timeout_secs = 30
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::{
    error::{RentalError, Result},
    transport::{HttpConfig, http::validate_url},
};

/// Base URL of the development API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path prefix all endpoints live under.
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Root client configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and port of the API server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix prepended to every endpoint path (e.g. "/api").
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Permit `http://` and loopback base URLs.
    #[serde(default)]
    pub allow_insecure: bool,

    /// Endpoint path overrides.
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ClientConfig {
    /// Development defaults: the local API over plain HTTP.
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            allow_insecure: true,
            endpoints: EndpointConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Config`] if parsing fails, or any error from
    /// [`validate`](Self::validate).
    ///
    /// # Examples
    ///
    /// ```
    /// use rental_client::config::ClientConfig;
    ///
    /// let config = ClientConfig::from_toml(r#"base_url = "https://rental.example.com""#)?;
    /// assert_eq!(config.api_base(), "https://rental.example.com/api");
    /// # Ok::<(), rental_client::error::RentalError>(())
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| RentalError::Config(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Config`] if the file cannot be read, plus any
    /// error from [`from_toml`](Self::from_toml).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            RentalError::Config(format!("cannot read config file {}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml(&content)
    }

    /// Validates URLs, endpoint templates and HTTP settings.
    ///
    /// Checks that:
    /// - `base_url` parses, and is HTTPS and non-loopback unless `allow_insecure`
    /// - `api_prefix` is empty or starts with `/`, without traversal sequences
    /// - endpoint templates start with `/` and contain no `..` or `//`
    /// - HTTP timeouts are within range
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Config`] describing the first failed check.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            RentalError::Config(format!("invalid base_url '{}': {e}", self.base_url))
        })?;
        validate_url(&url, self.allow_insecure)
            .map_err(|e| RentalError::Config(format!("base_url rejected: {e}")))?;

        if !self.api_prefix.is_empty() {
            validate_endpoint_path("api_prefix", &self.api_prefix)?;
        }

        self.endpoints.validate()?;
        self.http.validate()
    }

    /// Base URL joined with the API prefix.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.api_prefix.trim_end_matches('/'))
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_owned()
}

/// Endpoint path overrides.
///
/// Unset entries fall back to the API's default paths. Templates use `{id}`
/// as the identifier placeholder.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Plan list and creation (default: "/planes").
    pub plans: Option<String>,
    /// Single plan (default: "/planes/{id}").
    pub plan: Option<String>,
    /// Subscription list and creation (default: "/suscripciones").
    pub subscriptions: Option<String>,
    /// Subscriptions of one user (default: "/suscripciones/cliente/{id}").
    pub client_subscriptions: Option<String>,
    /// Single subscription (default: "/suscripciones/{id}").
    pub subscription: Option<String>,
    /// Payment list and creation (default: "/pagos").
    pub payments: Option<String>,
    /// Reservation list and creation (default: "/reservaciones").
    pub reservations: Option<String>,
    /// Single reservation (default: "/reservaciones/{id}").
    pub reservation: Option<String>,
    /// Vehicle list and creation (default: "/vehiculos").
    pub vehicles: Option<String>,
    /// Single vehicle (default: "/vehiculos/{id}").
    pub vehicle: Option<String>,
    /// Category list and creation (default: "/categorias").
    pub categories: Option<String>,
    /// Single category (default: "/categorias/{id}").
    pub category: Option<String>,
    /// User list (default: "/usuarios").
    pub users: Option<String>,
    /// Single user (default: "/usuarios/{id}").
    pub user: Option<String>,
    /// Role list (default: "/rols").
    pub roles: Option<String>,
    /// Login (default: "/login").
    pub login: Option<String>,
    /// Registration (default: "/register").
    pub register: Option<String>,
}

impl EndpointConfig {
    /// Configured overrides paired with their key names.
    pub(crate) fn entries(&self) -> [(&'static str, Option<&str>); 17] {
        [
            ("plans", self.plans.as_deref()),
            ("plan", self.plan.as_deref()),
            ("subscriptions", self.subscriptions.as_deref()),
            ("client_subscriptions", self.client_subscriptions.as_deref()),
            ("subscription", self.subscription.as_deref()),
            ("payments", self.payments.as_deref()),
            ("reservations", self.reservations.as_deref()),
            ("reservation", self.reservation.as_deref()),
            ("vehicles", self.vehicles.as_deref()),
            ("vehicle", self.vehicle.as_deref()),
            ("categories", self.categories.as_deref()),
            ("category", self.category.as_deref()),
            ("users", self.users.as_deref()),
            ("user", self.user.as_deref()),
            ("roles", self.roles.as_deref()),
            ("login", self.login.as_deref()),
            ("register", self.register.as_deref()),
        ]
    }

    /// Validates every configured template.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Config`] if any template is unsafe.
    pub fn validate(&self) -> Result<()> {
        for (name, path) in self.entries() {
            if let Some(path) = path {
                validate_endpoint_path(name, path)?;
            }
        }
        Ok(())
    }
}

/// Validates one endpoint path template.
pub(crate) fn validate_endpoint_path(name: &str, path: &str) -> Result<()> {
    if path.contains("..") {
        return Err(RentalError::Config(format!(
            "endpoint '{name}' contains path traversal sequence '..': {path}"
        )));
    }
    if path.contains("//") {
        return Err(RentalError::Config(format!(
            "endpoint '{name}' contains double slash '//': {path}"
        )));
    }
    if !path.starts_with('/') {
        return Err(RentalError::Config(format!("endpoint '{name}' must start with '/': {path}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_local_api() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base(), "http://localhost:8000/api");
        assert!(config.allow_insecure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_minimal_https() {
        let config = ClientConfig::from_toml(r#"base_url = "https://rental.example.com/""#).unwrap();
        assert_eq!(config.api_base(), "https://rental.example.com/api");
        assert!(!config.allow_insecure);
        assert_eq!(config.http, HttpConfig::default());
    }

    #[test]
    fn test_from_toml_localhost_requires_allow_insecure() {
        let result = ClientConfig::from_toml("");
        assert!(matches!(result, Err(RentalError::Config(_))));

        let config = ClientConfig::from_toml("allow_insecure = true").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_toml_invalid_syntax() {
        let result = ClientConfig::from_toml("base_url = [");
        assert!(matches!(result, Err(RentalError::Config(msg)) if msg.contains("invalid TOML")));
    }

    #[test]
    fn test_endpoint_overrides_parsed() {
        let toml = r#"
            base_url = "https://rental.example.com"
            api_prefix = ""

            [endpoints]
            plans = "/v2/planes"
            subscription = "/v2/suscripciones/{id}"
        "#;
        let config = ClientConfig::from_toml(toml).unwrap();
        assert_eq!(config.endpoints.plans.as_deref(), Some("/v2/planes"));
        assert_eq!(config.api_base(), "https://rental.example.com");
    }

    #[test]
    fn test_endpoint_traversal_rejected() {
        let toml = r#"
            base_url = "https://rental.example.com"
            [endpoints]
            payments = "/../admin"
        "#;
        let result = ClientConfig::from_toml(toml);
        assert!(matches!(result, Err(RentalError::Config(msg)) if msg.contains("payments")));
    }

    #[test]
    fn test_endpoint_double_slash_and_relative_rejected() {
        assert!(validate_endpoint_path("plans", "/api//planes").is_err());
        assert!(validate_endpoint_path("plans", "planes").is_err());
        assert!(validate_endpoint_path("plans", "/planes").is_ok());
    }

    #[test]
    fn test_bad_prefix_and_scheme_rejected() {
        let prefix = ClientConfig { api_prefix: "api".into(), ..ClientConfig::default() };
        assert!(prefix.validate().is_err());

        let scheme = ClientConfig { base_url: "ftp://rental.example.com".into(), ..ClientConfig::default() };
        assert!(matches!(scheme.validate(), Err(RentalError::Config(_))));

        let garbage = ClientConfig { base_url: "not a url".into(), ..ClientConfig::default() };
        assert!(garbage.validate().is_err());
    }

    #[test]
    fn test_http_section_validated() {
        let toml = r#"
            base_url = "https://rental.example.com"
            [http]
            timeout_secs = 0
        "#;
        assert!(ClientConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_from_file_not_found() {
        let result = ClientConfig::from_file("/nonexistent/rental.toml");
        assert!(matches!(result, Err(RentalError::Config(msg)) if msg.contains("cannot read")));
    }
}
