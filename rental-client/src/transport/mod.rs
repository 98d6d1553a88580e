//! Transport abstraction for the rental API.
//!
//! The sealed [`Transport`] trait separates protocol mechanics from the typed
//! endpoint layer in [`crate::api`]:
//! - **Transport**: URL checks, bearer header, status handling
//! - **`RentalApi`**: endpoint paths, JSON bodies, envelope normalisation
//!
//! # Examples
//!
//! ```rust,no_run
//! use rental_client::transport::{HttpTransport, RequestContext, Transport};
//!
//! # async fn example() -> rental_client::error::Result<()> {
//! let transport = HttpTransport::new()?;
//!
//! let ctx = RequestContext {
//!     base_url: "https://rental.example.com/api",
//!     path: "/planes",
//!     bearer_token: None,
//! };
//!
//! let response = transport.get(ctx).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::error::Result;

pub mod config;
pub mod http;
#[cfg(test)]
pub(crate) mod mock;
mod sealed;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// HTTP methods used by the rental API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// PATCH.
    Patch,
}

impl HttpMethod {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

/// Request parameters for one transport call.
#[derive(Clone)]
pub struct RequestContext<'a> {
    /// API base URL including prefix (e.g. `http://localhost:8000/api`).
    pub base_url: &'a str,
    /// Request path (e.g. `/planes`).
    pub path: &'a str,
    /// Bearer token for authenticated calls.
    pub bearer_token: Option<&'a str>,
}

impl std::fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("bearer_token", &self.bearer_token.map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Successful response from a transport call.
#[derive(Debug)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

/// Transport protocol abstraction.
///
/// Implementations return `Ok` only for 2xx responses. Any other status is
/// mapped to [`RentalError::Api`](crate::error::RentalError::Api) carrying the
/// server's message, if the body had one.
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Executes a GET request.
    ///
    /// # Errors
    ///
    /// Returns error on validation failure, network failure or non-2xx status.
    fn get<'a>(
        &'a self,
        ctx: RequestContext<'a>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Executes a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns error on validation failure, network failure or non-2xx status.
    fn post<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Executes a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns error on validation failure, network failure or non-2xx status.
    fn put<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Executes a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns error on validation failure, network failure or non-2xx status.
    fn patch<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_names() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
    }

    #[test]
    fn test_request_context_debug_redacts_token() {
        let ctx = RequestContext {
            base_url: "https://rental.example.com/api",
            path: "/pagos",
            bearer_token: Some("secret-token"),
        };
        let debug = format!("{ctx:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
