//! HTTP transport over reqwest.

use std::{sync::LazyLock, time::Duration};

use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};
use url::Url;

use super::config::{HttpConfig, HttpVersion};
use crate::{
    api::envelope::extract_error_message,
    error::{RentalError, Result},
    transport::{HttpMethod, RequestContext, Transport, TransportResponse, sealed},
};

/// Shared client so default transports reuse one connection pool.
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .pool_max_idle_per_host(10)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create default HTTP client")
});

fn is_loopback_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "localhost"
        || host == "::1"
        || host == "[::1]"
        || host == "0.0.0.0"
        || host.starts_with("127.")
}

/// Validates the base URL scheme and host.
///
/// Plain HTTP and loopback hosts are accepted only when `allow_insecure` is set,
/// which is how the local development API is reached.
pub(crate) fn validate_url(url: &Url, allow_insecure: bool) -> Result<()> {
    match url.scheme() {
        "https" => {}
        "http" if allow_insecure => {}
        "http" => {
            return Err(RentalError::Transport(
                "plain HTTP requires allow_insecure = true".to_owned(),
            ));
        }
        other => {
            return Err(RentalError::InvalidBaseUrl(format!("unsupported scheme: {other}")));
        }
    }

    match url.host_str() {
        None => Err(RentalError::InvalidBaseUrl(format!("URL missing host: {url}"))),
        Some(host) if !allow_insecure && is_loopback_host(host) => Err(RentalError::Transport(
            "loopback hosts require allow_insecure = true".to_owned(),
        )),
        Some(_) => Ok(()),
    }
}

/// Rejects paths with traversal sequences or without a leading slash.
pub(crate) fn sanitize_path(path: &str) -> Result<&str> {
    if path.contains("..") || path.contains("//") {
        return Err(RentalError::Transport(
            "Invalid path: traversal sequences not allowed".to_owned(),
        ));
    }
    if !path.is_empty() && !path.starts_with('/') {
        return Err(RentalError::Transport("Path must start with '/'".to_owned()));
    }
    Ok(path)
}

/// Rejects header names and values containing CR, LF or NUL.
fn validate_header(name: &str, value: &str) -> Result<()> {
    let bad = |s: &str| s.contains('\r') || s.contains('\n') || s.contains('\0');
    if bad(name) {
        return Err(RentalError::Transport(
            "Invalid header name: control characters not allowed".to_owned(),
        ));
    }
    if bad(value) {
        return Err(RentalError::Transport(
            "Invalid header value: control characters not allowed".to_owned(),
        ));
    }
    Ok(())
}

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// Sends JSON, attaches `Authorization: Bearer <token>` when the context carries
/// a token, and maps non-2xx responses to [`RentalError::Api`].
///
/// # Examples
///
/// ```
/// use rental_client::transport::{HttpConfig, HttpTransport, Transport};
///
/// let transport = HttpTransport::with_config(&HttpConfig::default())?.allow_insecure(true);
/// assert_eq!(transport.protocol_name(), "http");
/// # Ok::<(), rental_client::error::RentalError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
    allow_insecure: bool,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates a transport with default settings.
    ///
    /// Uses a shared client: 30 s total timeout, 10 s connect timeout, HTTPS only.
    ///
    /// # Errors
    ///
    /// Infallible; returns `Result` for API consistency with
    /// [`with_config`](Self::with_config).
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: DEFAULT_HTTP_CLIENT.clone(),
            http_version: HttpVersion::Auto,
            allow_insecure: false,
        })
    }

    /// Creates a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the reqwest client cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder.build().map_err(RentalError::Http)?;

        Ok(Self { client, http_version: config.http_version, allow_insecure: false })
    }

    /// Permits `http://` and loopback base URLs.
    #[must_use]
    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    fn request(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Patch => self.client.patch(url),
        }
    }

    #[instrument(
        skip(self, ctx, body),
        fields(method = method.as_str(), base_url = ctx.base_url, path = ctx.path)
    )]
    async fn execute_request(
        &self,
        ctx: RequestContext<'_>,
        method: HttpMethod,
        body: Option<&[u8]>,
    ) -> Result<TransportResponse> {
        let url = Url::parse(ctx.base_url)
            .map_err(|e| RentalError::InvalidBaseUrl(format!("invalid base_url: {e}")))?;

        validate_url(&url, self.allow_insecure)?;
        let path = sanitize_path(ctx.path)?;

        let full_url = format!("{}{path}", ctx.base_url.trim_end_matches('/'));
        let mut request = self
            .request(method, &full_url)
            .header("Accept", "application/json");

        if let Some(token) = ctx.bearer_token {
            validate_header("Authorization", token)?;
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.header("Content-Type", "application/json").body(body.to_vec());
        }

        let response = request.send().await?;
        let status = response.status();
        let response_body = response.bytes().await.map_err(RentalError::Http)?.to_vec();

        debug!(status = status.as_u16(), bytes = response_body.len(), "response received");

        if !status.is_success() {
            return Err(RentalError::Api {
                status: status.as_u16(),
                message: extract_error_message(&response_body),
            });
        }

        Ok(TransportResponse { status: status.as_u16(), body: response_body })
    }
}

impl Transport for HttpTransport {
    async fn get<'a>(&'a self, ctx: RequestContext<'a>) -> Result<TransportResponse> {
        self.execute_request(ctx, HttpMethod::Get, None).await
    }

    async fn post<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> Result<TransportResponse> {
        self.execute_request(ctx, HttpMethod::Post, Some(body)).await
    }

    async fn put<'a>(&'a self, ctx: RequestContext<'a>, body: &'a [u8]) -> Result<TransportResponse> {
        self.execute_request(ctx, HttpMethod::Put, Some(body)).await
    }

    async fn patch<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> Result<TransportResponse> {
        self.execute_request(ctx, HttpMethod::Patch, Some(body)).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
