//! The response envelope handed to delegates and event listeners.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use url::Url;

use crate::error::{NetworkError, Result};

/// A wrapped HTTP response.
///
/// Status, headers and the final URL are captured when the envelope is
/// built. The body is read from the wire at most once, on the first call to
/// [`response_text`](Self::response_text), and cached for later calls.
///
/// The envelope is cheaply cloneable; clones share the same body.
#[derive(Clone)]
pub struct FetchResponse {
    inner: Arc<FetchResponseInner>,
}

struct FetchResponseInner {
    status: http::StatusCode,
    headers: http::HeaderMap,
    url: Url,
    redirected: bool,
    body: Mutex<Option<reqwest::Response>>,
    text: OnceCell<String>,
}

impl FetchResponse {
    /// Wrap a raw response.
    ///
    /// `requested` is the URL the request was sent to; a final URL that
    /// differs from it (fragments aside) marks the response as redirected.
    pub fn new(response: reqwest::Response, requested: Option<&Url>) -> Self {
        let url = response.url().clone();
        let redirected = requested.is_some_and(|requested| !same_resource(requested, &url));
        Self {
            inner: Arc::new(FetchResponseInner {
                status: response.status(),
                headers: response.headers().clone(),
                url,
                redirected,
                body: Mutex::new(Some(response)),
                text: OnceCell::new(),
            }),
        }
    }

    /// Whether the status is 2xx.
    pub fn succeeded(&self) -> bool {
        self.inner.status.is_success()
    }

    /// Whether the status is anything but 2xx.
    pub fn failed(&self) -> bool {
        !self.succeeded()
    }

    /// Whether the status is 4xx.
    pub fn client_error(&self) -> bool {
        self.inner.status.is_client_error()
    }

    /// Whether the status is 5xx.
    pub fn server_error(&self) -> bool {
        self.inner.status.is_server_error()
    }

    /// Whether the exchange followed at least one redirect.
    pub fn redirected(&self) -> bool {
        self.inner.redirected
    }

    /// The final URL, after redirects.
    pub fn location(&self) -> &Url {
        &self.inner.url
    }

    /// The HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.inner.status.as_u16()
    }

    /// The response headers.
    pub fn headers(&self) -> &http::HeaderMap {
        &self.inner.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.inner
            .headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the Content-Type header value.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the body is an HTML document.
    pub fn is_html(&self) -> bool {
        self.content_type().is_some_and(|content_type| {
            let mime = content_type
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            mime == "text/html" || mime == "application/xhtml+xml"
        })
    }

    /// The body as text.
    pub async fn response_text(&self) -> Result<String> {
        let text = self
            .inner
            .text
            .get_or_try_init(|| async {
                let response = self.inner.body.lock().take().ok_or_else(|| {
                    NetworkError::InvalidBody("response body already consumed".to_string())
                })?;
                Ok::<_, NetworkError>(response.text().await?)
            })
            .await?;
        Ok(text.clone())
    }

    /// The body as text, if the response is HTML.
    pub async fn response_html(&self) -> Result<Option<String>> {
        if self.is_html() {
            self.response_text().await.map(Some)
        } else {
            Ok(None)
        }
    }
}

fn same_resource(a: &Url, b: &Url) -> bool {
    let mut a = a.clone();
    let mut b = b.clone();
    a.set_fragment(None);
    b.set_fragment(None);
    a == b
}

impl std::fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.status_code())
            .field("url", &self.location().as_str())
            .field("redirected", &self.redirected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::ResponseBuilderExt;

    fn response(status: u16, content_type: &str, body: &'static str) -> FetchResponse {
        let url = Url::parse("http://localhost/items").unwrap();
        let raw = http::Response::builder()
            .status(status)
            .header("content-type", content_type)
            .url(url)
            .body(body)
            .unwrap();
        let requested = Url::parse("http://localhost/items#top").unwrap();
        FetchResponse::new(reqwest::Response::from(raw), Some(&requested))
    }

    #[test]
    fn test_classification() {
        let ok = response(200, "text/html", "");
        assert!(ok.succeeded());
        assert!(!ok.failed());

        let missing = response(404, "text/html", "");
        assert!(missing.failed());
        assert!(missing.client_error());
        assert!(!missing.server_error());

        let broken = response(503, "text/html", "");
        assert!(broken.server_error());
    }

    #[test]
    fn test_is_html_ignores_parameters() {
        assert!(response(200, "text/html; charset=utf-8", "").is_html());
        assert!(response(200, "Application/XHTML+XML", "").is_html());
        assert!(!response(200, "application/json", "").is_html());
    }

    #[test]
    fn test_not_redirected_when_urls_match() {
        let response = response(200, "text/html", "");
        assert!(!response.redirected());
        assert_eq!(response.location().as_str(), "http://localhost/items");
    }

    #[test]
    fn test_redirected_when_final_url_differs() {
        let raw = http::Response::builder()
            .status(200)
            .url(Url::parse("http://localhost/elsewhere").unwrap())
            .body("")
            .unwrap();
        let requested = Url::parse("http://localhost/items").unwrap();
        let response = FetchResponse::new(reqwest::Response::from(raw), Some(&requested));
        assert!(response.redirected());
    }

    #[tokio::test]
    async fn test_body_is_cached_across_clones() {
        let response = response(200, "text/html", "<p>hi</p>");
        let clone = response.clone();
        assert_eq!(response.response_text().await.unwrap(), "<p>hi</p>");
        assert_eq!(clone.response_text().await.unwrap(), "<p>hi</p>");
        assert_eq!(clone.response_html().await.unwrap().as_deref(), Some("<p>hi</p>"));
    }

    #[tokio::test]
    async fn test_non_html_has_no_html_body() {
        let response = response(200, "application/json", "{}");
        assert_eq!(response.response_html().await.unwrap(), None);
    }
}
