//! HTTP transport configuration.
//!
//! Every [`FetchRequest`](super::FetchRequest) runs its exchange on an
//! [`HttpClient`]. The client owns the policy the request inherits: how
//! redirects are handled, which credentials travel with the exchange, and
//! how long the transport may take.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;

use crate::error::{NetworkError, Result};

const TARGET: &str = "wicket_net::http::client";

/// How the transport treats 3xx responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectMode {
    /// Follow up to `limit` hops; the caller only sees the final response.
    Follow {
        /// Hops allowed before the exchange fails with
        /// [`NetworkError::TooManyRedirects`].
        limit: usize,
    },
    /// Hand the redirect response back as-is.
    Manual,
}

impl RedirectMode {
    /// Whether redirects are followed transparently.
    pub fn follows(self) -> bool {
        matches!(self, Self::Follow { .. })
    }

    fn policy(self) -> Policy {
        match self {
            Self::Follow { limit } => Policy::limited(limit),
            Self::Manual => Policy::none(),
        }
    }
}

impl Default for RedirectMode {
    fn default() -> Self {
        Self::Follow { limit: 10 }
    }
}

/// Which credentials accompany an exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Credentials {
    /// Cookies set by a server are replayed to that server only.
    #[default]
    SameOrigin,
    /// No cookie store; every exchange is anonymous.
    Omit,
}

/// Transport settings shared by every request on a client.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Upper bound for a whole exchange, body included.
    pub timeout: Option<Duration>,
    /// Upper bound for establishing the connection.
    pub connect_timeout: Option<Duration>,
    pub redirect: RedirectMode,
    pub credentials: Credentials,
    pub user_agent: String,
    /// Headers added to every request before the request's own headers.
    pub default_headers: HeaderMap,
    /// Route all traffic through this proxy URL.
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            redirect: RedirectMode::default(),
            credentials: Credentials::default(),
            user_agent: format!("wicket/{} (Rust)", env!("CARGO_PKG_VERSION")),
            default_headers: HeaderMap::new(),
            proxy: None,
        }
    }
}

/// Builder for an [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Let exchanges run until they complete or are cancelled.
    pub fn without_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    pub fn redirect(mut self, mode: RedirectMode) -> Self {
        self.config.redirect = mode;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy_url.into());
        self
    }

    /// Send `name: value` with every request on this client.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::try_from(name)?;
        let value = HeaderValue::try_from(value)?;
        self.config.default_headers.insert(name, value);
        Ok(self)
    }

    pub fn build(self) -> Result<HttpClient> {
        let config = self.config;
        let mut builder = reqwest::Client::builder()
            .redirect(config.redirect.policy())
            .cookie_store(config.credentials == Credentials::SameOrigin)
            .user_agent(config.user_agent.as_str())
            .default_headers(config.default_headers.clone());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url.as_str())
                .map_err(|e| NetworkError::Proxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let transport = builder.build()?;
        tracing::debug!(target: TARGET, ?config, "built HTTP client");

        Ok(HttpClient {
            inner: Arc::new(ClientInner { transport, config }),
        })
    }
}

struct ClientInner {
    transport: reqwest::Client,
    config: HttpClientConfig,
}

/// A shared HTTP transport.
///
/// Clones share one connection pool, cookie store and configuration.
///
/// ```ignore
/// use std::time::Duration;
/// use wicket_net::http::{Credentials, HttpClient};
///
/// let client = HttpClient::builder()
///     .timeout(Duration::from_secs(5))
///     .credentials(Credentials::Omit)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Create a client with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    pub fn new() -> Self {
        HttpClientBuilder::new()
            .build()
            .expect("Failed to create HTTP client with default configuration")
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// The process-wide client used by requests that were not given one.
    pub fn shared() -> Self {
        static SHARED: OnceLock<HttpClient> = OnceLock::new();
        SHARED.get_or_init(HttpClient::new).clone()
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    pub(crate) fn transport(&self) -> &reqwest::Client {
        &self.inner.transport
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HttpClient").field(&self.inner.config).finish()
    }
}
