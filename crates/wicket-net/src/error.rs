//! Error types for fetch requests.

use http::header::{InvalidHeaderName, InvalidHeaderValue};

/// Why an exchange produced no response.
///
/// Only failures that prevent a response from being obtained are errors.
/// A response with an error status is still a response: it reaches the
/// delegate through `request_failed_with_response` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The transport failed for a reason not covered below.
    #[error("fetch failed: {0}")]
    Request(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("fetch timed out")]
    Timeout,
    /// The server could not be reached.
    #[error("could not connect: {0}")]
    Connection(String),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// The payload could not be serialized as JSON.
    #[error("could not encode JSON body: {0}")]
    Json(String),
    /// The request's abort signal fired before a response arrived.
    #[error("fetch was cancelled")]
    Cancelled,
    /// A body could not be built or read.
    #[error("invalid body: {0}")]
    InvalidBody(String),
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("invalid proxy: {0}")]
    Proxy(String),
    /// The method selector is not one of get, post, put, patch, delete.
    #[error("unsupported fetch method: {0}")]
    UnsupportedMethod(String),
    /// `perform` was called on a request that already started.
    #[error("fetch request was already performed")]
    AlreadyPerformed,
}

impl NetworkError {
    /// Whether this error came from aborting the request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::InvalidBody(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<InvalidHeaderName> for NetworkError {
    fn from(err: InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<InvalidHeaderValue> for NetworkError {
    fn from(err: InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// Result alias for fetch operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
