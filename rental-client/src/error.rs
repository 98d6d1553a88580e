//! Error types for the rental client.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. Errors derive
//! [`std::error::Error`] through [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Validation** ([`RentalError::Validation`]): form input rejected before any
//!   network call
//! - **Network** ([`RentalError::Http`]): connection failures and timeouts
//! - **API** ([`RentalError::Api`], [`RentalError::InvalidResponse`]): the remote
//!   API refused the request or answered with something unreadable
//! - **Workflow** ([`RentalError::InvalidState`],
//!   [`RentalError::OrphanedSubscription`], [`RentalError::SubscriptionCheckFailed`]):
//!   the subscription saga cannot proceed
//! - **Setup** ([`RentalError::Config`], [`RentalError::InvalidBaseUrl`],
//!   [`RentalError::Transport`], [`RentalError::SessionStore`])
//!
//! # Examples
//!
//! ```
//! use rental_client::error::{RentalError, Result};
//!
//! fn require_plate(plate: &str) -> Result<&str> {
//!     if plate.trim().len() < 6 {
//!         return Err(RentalError::Validation("La placa debe tener al menos 6 dígitos.".into()));
//!     }
//!     Ok(plate)
//! }
//!
//! assert!(require_plate("P12").is_err());
//! ```

use thiserror::Error;

use crate::models::SubscriptionId;

/// Result type alias for rental client operations.
pub type Result<T> = std::result::Result<T, RentalError>;

/// Message shown when any card field is left blank.
pub const CARD_INCOMPLETE_MESSAGE: &str = "Por favor, completa todos los datos de la tarjeta.";

/// Message shown when the server cannot be reached.
pub const CONNECTION_FAILED_MESSAGE: &str =
    "No se pudo conectar al servidor. Verifica tu conexión o la información enviada.";

/// Errors that can occur while talking to the rental API.
///
/// # Error Recovery
///
/// - **Validation errors**: fix the form and submit again
/// - **Network errors** ([`Http`](Self::Http)): the user may re-attempt manually; the
///   client never retries on its own
/// - **Orphaned subscriptions** ([`OrphanedSubscription`](Self::OrphanedSubscription)):
///   use the workflow's payment retry instead of subscribing again
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum RentalError {
    /// Form input failed validation.
    ///
    /// Raised before any request is sent. The payload is the user-facing message.
    #[error("validation failed: {0}")]
    Validation(String),

    /// HTTP request failed.
    ///
    /// Wraps [`reqwest::Error`]. Common causes are connection refused, DNS
    /// failures and the configured timeout elapsing.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status or a `success: false` envelope.
    ///
    /// `message` carries the server's `message`/`error` field when one was present.
    #[error("API returned status {status}{}", api_message_suffix(.message.as_deref()))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, if any.
        message: Option<String>,
    },

    /// The response body could not be interpreted.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// The operation needs a signed-in session.
    #[error("not authenticated")]
    Unauthenticated,

    /// The configured base URL is unusable.
    ///
    /// # Examples
    ///
    /// ```
    /// use rental_client::error::RentalError;
    ///
    /// let err = RentalError::InvalidBaseUrl("ftp://rental.example.com".to_owned());
    /// assert!(err.to_string().contains("invalid base URL"));
    /// ```
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Configuration could not be parsed or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level rule violated (path traversal, header injection, bad method).
    #[error("transport error: {0}")]
    Transport(String),

    /// The workflow is in a state that does not allow the requested action.
    #[error("cannot {action} while subscription is {state}")]
    InvalidState {
        /// Current workflow state.
        state: &'static str,
        /// Action that was attempted.
        action: &'static str,
    },

    /// A subscription was created but its payment could not be recorded.
    ///
    /// # Recovery
    ///
    /// The subscription exists server-side. Retry the payment for this id rather
    /// than subscribing again, which would create a duplicate record.
    #[error("subscription {subscription_id} was created but its payment failed: {reason}")]
    OrphanedSubscription {
        /// Identifier of the unpaid subscription.
        subscription_id: SubscriptionId,
        /// Why the payment step failed.
        reason: String,
    },

    /// Purchasing is blocked because the current subscription could not be verified.
    #[error("current subscription could not be verified: {0}")]
    SubscriptionCheckFailed(String),

    /// The credential store could not be read or written.
    #[error("session store error: {0}")]
    SessionStore(String),
}

fn api_message_suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl RentalError {
    /// Returns the message to show the user for this error.
    ///
    /// Validation messages pass through unchanged. Server messages are shown
    /// when the API supplied one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rental_client::error::{CARD_INCOMPLETE_MESSAGE, RentalError};
    ///
    /// let err = RentalError::Validation(CARD_INCOMPLETE_MESSAGE.to_owned());
    /// assert_eq!(err.user_message(), CARD_INCOMPLETE_MESSAGE);
    /// ```
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Http(_) => CONNECTION_FAILED_MESSAGE.to_owned(),
            Self::Api { message: Some(msg), .. } => msg.clone(),
            Self::Api { status, message: None } => {
                format!("El servidor respondió con un error ({status}).")
            }
            Self::InvalidResponse(_) => "Respuesta inesperada del servidor.".to_owned(),
            Self::Unauthenticated => "Debes iniciar sesión para continuar.".to_owned(),
            Self::OrphanedSubscription { subscription_id, .. } => format!(
                "Tu suscripción #{subscription_id} fue creada, pero el pago falló. Reintenta el \
                 pago sin volver a suscribirte."
            ),
            Self::SubscriptionCheckFailed(_) => {
                "No pudimos verificar tu suscripción actual. Intenta nuevamente.".to_owned()
            }
            Self::InvalidState { .. } => {
                "Esta acción no está disponible en el estado actual de tu suscripción.".to_owned()
            }
            Self::InvalidBaseUrl(_) | Self::Config(_) | Self::Transport(_) | Self::SessionStore(_) => {
                self.to_string()
            }
        }
    }

    /// Returns true when the API reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}
