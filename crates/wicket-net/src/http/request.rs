//! Fetch requests: one cancellable HTTP exchange with a delegate-driven
//! lifecycle.
//!
//! A [`FetchRequest`] describes a single exchange (method, location,
//! encoding, payload) and drives it through
//!
//! ```text
//! started → { prevented | succeeded | failed | errored } → finished
//! ```
//!
//! reporting each step to its [`FetchRequestDelegate`]. Around the exchange
//! it publishes `before-fetch-request` and `before-fetch-response` on its
//! [`FetchEvents`] bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use http::header::{ACCEPT, CONTENT_TYPE};
use parking_lot::Mutex;
use url::Url;

use super::abort::{AbortController, AbortSignal};
use super::body::{FetchRequestBody, FormDataValue};
use super::client::{Credentials, HttpClient, RedirectMode};
use super::delegate::FetchRequestDelegate;
use super::encoding::{self, EncodingType, FetchMethod, WireBody};
use super::events::FetchEvents;
use super::response::FetchResponse;
use super::runtime;
use crate::error::{NetworkError, Result};
use crate::location::Location;

const TARGET: &str = "wicket_net::http::request";

/// The `Accept` header sent with every request.
pub const ACCEPT_HEADER: &str = "text/html, application/xhtml+xml";

/// Header mapping used for request headers.
pub type FetchRequestHeaders = http::HeaderMap;

/// Unique identifier for a fetch request, used in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Where a request is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    /// Constructed, `perform` not called yet.
    Ready,
    /// `perform` is running.
    InFlight,
    /// The finished notification has fired.
    Settled,
}

/// The fully resolved parameters of an exchange.
///
/// This is the detail of the `before-fetch-request` event. Listeners see it
/// read-only; the exchange is dispatched with the request's own copy.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// The request method.
    pub method: FetchMethod,
    /// The resolved URL, query included.
    pub url: String,
    /// Default headers merged with the delegate's additional headers.
    pub headers: FetchRequestHeaders,
    /// The payload to transmit. Always `None` for GET.
    pub body: Option<FetchRequestBody>,
    /// Inherited from the client; followed by default.
    pub redirect: RedirectMode,
    /// Inherited from the client; same-origin by default.
    pub credentials: Credentials,
    /// Fires when the request is cancelled.
    pub signal: AbortSignal,
}

/// A single cancellable HTTP exchange.
///
/// ```ignore
/// use std::sync::Arc;
/// use wicket_net::Location;
/// use wicket_net::http::{EncodingType, FetchMethod, FetchRequest, FormData};
///
/// let location = Location::parse("https://example.com/items")?;
/// let request = FetchRequest::builder(delegate, FetchMethod::Post, location)
///     .encoding(EncodingType::ApplicationJson)
///     .body(FormData::new().text("name", "x"))
///     .build();
///
/// let response = request.perform().await?;
/// ```
pub struct FetchRequest {
    id: RequestId,
    delegate: Arc<dyn FetchRequestDelegate>,
    method: FetchMethod,
    location: Location,
    encoding: EncodingType,
    body: Option<FetchRequestBody>,
    abort_controller: AbortController,
    client: HttpClient,
    events: Arc<FetchEvents>,
    state: Mutex<RequestState>,
}

impl FetchRequest {
    /// Create a request on the shared client and the global event bus.
    ///
    /// A missing `encoding` means multipart form data.
    pub fn new(
        delegate: Arc<dyn FetchRequestDelegate>,
        method: FetchMethod,
        location: Location,
        encoding: Option<EncodingType>,
        body: Option<FetchRequestBody>,
    ) -> Self {
        let mut builder = Self::builder(delegate, method, location);
        if let Some(encoding) = encoding {
            builder = builder.encoding(encoding);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        builder.build()
    }

    /// Start building a request.
    pub fn builder(
        delegate: Arc<dyn FetchRequestDelegate>,
        method: FetchMethod,
        location: Location,
    ) -> FetchRequestBuilder {
        FetchRequestBuilder {
            delegate,
            method,
            location,
            encoding: EncodingType::default(),
            body: None,
            client: None,
            events: None,
        }
    }

    /// The request's identifier.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The request method.
    pub fn method(&self) -> FetchMethod {
        self.method
    }

    /// The target location, before any query is appended.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The payload encoding.
    pub fn encoding(&self) -> EncodingType {
        self.encoding
    }

    /// The payload as supplied, whatever the method.
    pub fn body(&self) -> Option<&FetchRequestBody> {
        self.body.as_ref()
    }

    /// The lifecycle state.
    pub fn state(&self) -> RequestState {
        *self.state.lock()
    }

    /// The signal that fires when this request is cancelled.
    pub fn abort_signal(&self) -> &AbortSignal {
        self.abort_controller.signal()
    }

    /// Whether the payload travels in the query string.
    pub fn is_idempotent(&self) -> bool {
        self.method.is_idempotent()
    }

    /// Structured payload fields in insertion order.
    pub fn entries(&self) -> &[(String, FormDataValue)] {
        match &self.body {
            Some(body) => body.entries(),
            None => &[],
        }
    }

    /// The payload fields encoded as a query string.
    pub fn params(&self) -> String {
        encoding::query_string(self.entries())
    }

    /// The URL the exchange is sent to.
    ///
    /// For GET the payload is appended to the query; otherwise this is the
    /// location unchanged.
    pub fn url(&self) -> String {
        let url = self.location.absolute_url();
        if self.is_idempotent() {
            encoding::append_query(url, &self.params())
        } else {
            url.to_string()
        }
    }

    /// The body to transmit. Always `None` for GET.
    pub fn body_content(&self) -> Option<&FetchRequestBody> {
        if self.is_idempotent() {
            None
        } else {
            self.body.as_ref()
        }
    }

    /// Default headers overridden by the delegate's additional headers.
    pub fn headers(&self) -> FetchRequestHeaders {
        let mut headers = FetchRequestHeaders::new();
        headers.insert(ACCEPT, http::HeaderValue::from_static(ACCEPT_HEADER));
        headers.insert(
            CONTENT_TYPE,
            http::HeaderValue::from_static(self.encoding.content_type()),
        );

        if let Some(additional) = self.delegate.additional_headers_for_request(self) {
            // `None` names continue the previous header's values.
            let mut current = None;
            for (name, value) in additional {
                match name {
                    Some(name) => {
                        headers.insert(name.clone(), value);
                        current = Some(name);
                    }
                    None => {
                        if let Some(name) = &current {
                            headers.append(name.clone(), value);
                        }
                    }
                }
            }
        }
        headers
    }

    /// The resolved exchange parameters.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            method: self.method,
            url: self.url(),
            headers: self.headers(),
            body: self.body_content().cloned(),
            redirect: self.client.config().redirect,
            credentials: self.client.config().credentials,
            signal: self.abort_signal().clone(),
        }
    }

    /// Cancel the request.
    ///
    /// An in-flight exchange aborts and surfaces as
    /// [`NetworkError::Cancelled`]; a request that has not started yet will
    /// fail the same way once performed. Returns `false`, and does nothing,
    /// once the request has settled or was already cancelled.
    pub fn cancel(&self) -> bool {
        if self.state() == RequestState::Settled {
            tracing::trace!(target: TARGET, id = self.id.0, "cancel after settlement ignored");
            return false;
        }
        let aborted = self.abort_controller.abort();
        if aborted {
            tracing::debug!(target: TARGET, id = self.id.0, "request cancelled");
        }
        aborted
    }

    /// Perform the exchange.
    ///
    /// Returns the response envelope whenever a response was obtained,
    /// whatever its status or whether handling was prevented. Transport
    /// failures and cancellation are reported to the delegate and returned
    /// as errors. `request_finished` fires last on every path.
    ///
    /// A request performs at most once; later calls fail with
    /// [`NetworkError::AlreadyPerformed`] without notifying the delegate.
    #[tracing::instrument(
        skip_all,
        target = "wicket_net::http::request",
        fields(id = self.id.0, method = %self.method, location = %self.location)
    )]
    pub async fn perform(&self) -> Result<FetchResponse> {
        self.begin()?;

        let options = self.fetch_options();
        self.events
            .before_fetch_request
            .dispatch(options.clone(), false);

        let _finished = FinishGuard { request: self };
        self.delegate.request_started(self);

        match self.dispatch(&options).await {
            Ok(response) => Ok(self.receive(response)),
            Err(error) => {
                tracing::debug!(target: TARGET, %error, "request errored");
                self.delegate.request_errored(self, &error);
                Err(error)
            }
        }
    }

    /// Classify a raw response and notify the delegate.
    ///
    /// Dispatches the cancelable `before-fetch-response` event first. If a
    /// listener prevents its default, only
    /// `request_prevented_handling_response` fires.
    pub fn receive(&self, response: reqwest::Response) -> FetchResponse {
        let requested = Url::parse(&self.url()).ok();
        let fetch_response = FetchResponse::new(response, requested.as_ref());

        let event = self
            .events
            .before_fetch_response
            .dispatch(fetch_response.clone(), true);

        if event.default_prevented() {
            tracing::debug!(target: TARGET, id = self.id.0, "response handling prevented");
            self.delegate
                .request_prevented_handling_response(self, &fetch_response);
        } else if fetch_response.succeeded() {
            tracing::debug!(
                target: TARGET,
                id = self.id.0,
                status = fetch_response.status_code(),
                "request succeeded"
            );
            self.delegate
                .request_succeeded_with_response(self, &fetch_response);
        } else {
            tracing::debug!(
                target: TARGET,
                id = self.id.0,
                status = fetch_response.status_code(),
                "request failed"
            );
            self.delegate
                .request_failed_with_response(self, &fetch_response);
        }

        fetch_response
    }

    /// Perform the request on the shared runtime.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<Result<FetchResponse>> {
        runtime::spawn(async move { self.perform().await })
    }

    fn begin(&self) -> Result<()> {
        let mut state = self.state.lock();
        if *state != RequestState::Ready {
            tracing::warn!(target: TARGET, id = self.id.0, state = ?*state, "perform called twice");
            return Err(NetworkError::AlreadyPerformed);
        }
        *state = RequestState::InFlight;
        Ok(())
    }

    async fn dispatch(&self, options: &FetchOptions) -> Result<reqwest::Response> {
        let url = Url::parse(&options.url)?;
        let mut headers = options.headers.clone();
        let mut builder = self
            .client
            .transport()
            .request(options.method.to_reqwest(), url);

        if let Some(body) = &options.body {
            builder = match encoding::encode_body(self.encoding, body)? {
                WireBody::Bytes(bytes) => builder.body(bytes),
                WireBody::Multipart(form) => {
                    // The transport sets the content type with its boundary
                    // unless the delegate supplied its own.
                    let default = self.encoding.content_type();
                    let current = headers.get(CONTENT_TYPE);
                    if current.is_some_and(|value| value == default) {
                        headers.remove(CONTENT_TYPE);
                    }
                    builder.multipart(form)
                }
            };
        }
        let builder = builder.headers(headers);

        let signal = options.signal.clone();
        tokio::select! {
            biased;
            _ = signal.aborted() => Err(NetworkError::Cancelled),
            result = builder.send() => Ok(result?),
        }
    }
}

impl std::fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRequest")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("location", &self.location.absolute_url())
            .field("encoding", &self.encoding)
            .field("state", &self.state())
            .finish()
    }
}

/// Settles the request and fires `request_finished` when dropped.
struct FinishGuard<'a> {
    request: &'a FetchRequest,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        *self.request.state.lock() = RequestState::Settled;
        tracing::trace!(target: TARGET, id = self.request.id.0, "request finished");
        self.request.delegate.request_finished(self.request);
    }
}

/// Builder for [`FetchRequest`].
pub struct FetchRequestBuilder {
    delegate: Arc<dyn FetchRequestDelegate>,
    method: FetchMethod,
    location: Location,
    encoding: EncodingType,
    body: Option<FetchRequestBody>,
    client: Option<HttpClient>,
    events: Option<Arc<FetchEvents>>,
}

impl FetchRequestBuilder {
    /// Set the payload encoding. Unknown selectors mean multipart form data.
    pub fn encoding(mut self, encoding: impl Into<EncodingType>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set the payload.
    pub fn body(mut self, body: impl Into<FetchRequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Use a specific client instead of [`HttpClient::shared`].
    pub fn client(mut self, client: HttpClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Publish on a specific bus instead of [`FetchEvents::global`].
    pub fn events(mut self, events: Arc<FetchEvents>) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the request.
    pub fn build(self) -> FetchRequest {
        FetchRequest {
            id: RequestId::new(),
            delegate: self.delegate,
            method: self.method,
            location: self.location,
            encoding: self.encoding,
            body: self.body,
            abort_controller: AbortController::new(),
            client: self.client.unwrap_or_else(HttpClient::shared),
            events: self.events.unwrap_or_else(FetchEvents::global),
            state: Mutex::new(RequestState::Ready),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FormData;
    use reqwest::ResponseBuilderExt;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
        extra_headers: Option<FetchRequestHeaders>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    impl FetchRequestDelegate for Recorder {
        fn additional_headers_for_request(
            &self,
            _request: &FetchRequest,
        ) -> Option<FetchRequestHeaders> {
            self.extra_headers.clone()
        }
        fn request_started(&self, _: &FetchRequest) {
            self.calls.lock().push("started");
        }
        fn request_prevented_handling_response(&self, _: &FetchRequest, _: &FetchResponse) {
            self.calls.lock().push("prevented");
        }
        fn request_succeeded_with_response(&self, _: &FetchRequest, _: &FetchResponse) {
            self.calls.lock().push("succeeded");
        }
        fn request_failed_with_response(&self, _: &FetchRequest, _: &FetchResponse) {
            self.calls.lock().push("failed");
        }
        fn request_errored(&self, _: &FetchRequest, _: &NetworkError) {
            self.calls.lock().push("errored");
        }
        fn request_finished(&self, _: &FetchRequest) {
            self.calls.lock().push("finished");
        }
    }

    fn request(
        delegate: Arc<Recorder>,
        method: FetchMethod,
        url: &str,
        body: Option<FetchRequestBody>,
    ) -> FetchRequest {
        let mut builder = FetchRequest::builder(delegate, method, Location::parse(url).unwrap())
            .events(FetchEvents::new());
        if let Some(body) = body {
            builder = builder.body(body);
        }
        builder.build()
    }

    fn raw_response(status: u16) -> reqwest::Response {
        let raw = http::Response::builder()
            .status(status)
            .url(Url::parse("http://localhost/items").unwrap())
            .body("")
            .unwrap();
        reqwest::Response::from(raw)
    }

    #[test]
    fn test_get_flattens_payload_into_query() {
        let body = FormData::new().text("page", "2").into();
        let request = request(
            Arc::new(Recorder::default()),
            FetchMethod::Get,
            "http://localhost/items?sort=asc",
            Some(body),
        );

        assert_eq!(request.url(), "http://localhost/items?sort=asc&page=2");
        assert!(request.body_content().is_none());
        assert!(request.fetch_options().body.is_none());
    }

    #[test]
    fn test_get_without_payload_keeps_url() {
        let delegate = Arc::new(Recorder::default());
        let request = request(delegate, FetchMethod::Get, "http://localhost/items", None);
        assert_eq!(request.url(), "http://localhost/items");
    }

    #[test]
    fn test_non_get_keeps_url_and_sends_body() {
        for method in [
            FetchMethod::Post,
            FetchMethod::Put,
            FetchMethod::Patch,
            FetchMethod::Delete,
        ] {
            let body: FetchRequestBody = FormData::new().text("name", "x").into();
            let request = request(
                Arc::new(Recorder::default()),
                method,
                "http://localhost/items",
                Some(body.clone()),
            );
            assert_eq!(request.url(), "http://localhost/items");
            assert_eq!(request.body_content(), Some(&body));
        }
    }

    #[test]
    fn test_default_headers() {
        let request = FetchRequest::new(
            Arc::new(Recorder::default()),
            FetchMethod::Post,
            Location::parse("http://localhost/items").unwrap(),
            Some(EncodingType::ApplicationJson),
            None,
        );
        let headers = request.headers();
        assert_eq!(headers[ACCEPT], ACCEPT_HEADER);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_missing_encoding_defaults_to_multipart() {
        let request = FetchRequest::new(
            Arc::new(Recorder::default()),
            FetchMethod::Post,
            Location::parse("http://localhost/items").unwrap(),
            None,
            None,
        );
        assert_eq!(request.encoding(), EncodingType::MultipartFormData);
        assert_eq!(request.headers()[CONTENT_TYPE], "multipart/form-data");
    }

    #[test]
    fn test_delegate_headers_take_precedence() {
        let mut extra = FetchRequestHeaders::new();
        extra.insert(ACCEPT, http::HeaderValue::from_static("text/vnd.stream.html"));
        extra.append("x-csrf-token", http::HeaderValue::from_static("a"));
        extra.append("x-csrf-token", http::HeaderValue::from_static("b"));
        let delegate = Arc::new(Recorder {
            extra_headers: Some(extra),
            ..Default::default()
        });

        let request = request(delegate, FetchMethod::Post, "http://localhost/items", None);
        let headers = request.headers();
        assert_eq!(headers[ACCEPT], "text/vnd.stream.html");
        assert_eq!(headers.get_all("x-csrf-token").iter().count(), 2);
        assert_eq!(headers[CONTENT_TYPE], "multipart/form-data");
    }

    #[test]
    fn test_receive_classifies_success_and_failure() {
        let delegate = Arc::new(Recorder::default());
        let request = request(delegate.clone(), FetchMethod::Get, "http://localhost/items", None);

        assert!(request.receive(raw_response(200)).succeeded());
        assert!(request.receive(raw_response(422)).failed());
        assert_eq!(delegate.calls(), vec!["succeeded", "failed"]);
    }

    #[test]
    fn test_receive_prevented_by_listener() {
        let delegate = Arc::new(Recorder::default());
        let events = FetchEvents::new();
        events.before_fetch_response.listen(|event| event.prevent_default());
        let request = FetchRequest::builder(
            delegate.clone(),
            FetchMethod::Get,
            Location::parse("http://localhost/items").unwrap(),
        )
        .events(events)
        .build();

        let response = request.receive(raw_response(200));
        assert_eq!(response.status_code(), 200);
        assert_eq!(delegate.calls(), vec!["prevented"]);
    }

    #[tokio::test]
    async fn test_cancel_before_perform_errors() {
        let delegate = Arc::new(Recorder::default());
        let request = request(delegate.clone(), FetchMethod::Get, "http://localhost:9/items", None);

        assert!(request.cancel());
        let err = request.perform().await.unwrap_err();
        assert_eq!(err, NetworkError::Cancelled);
        assert_eq!(delegate.calls(), vec!["started", "errored", "finished"]);
        assert_eq!(request.state(), RequestState::Settled);
    }

    #[tokio::test]
    async fn test_second_perform_fails_fast() {
        let delegate = Arc::new(Recorder::default());
        let request = request(delegate.clone(), FetchMethod::Get, "http://localhost:9/items", None);
        request.cancel();
        let _ = request.perform().await;

        let err = request.perform().await.unwrap_err();
        assert_eq!(err, NetworkError::AlreadyPerformed);
        assert_eq!(delegate.calls(), vec!["started", "errored", "finished"]);
    }

    #[tokio::test]
    async fn test_cancel_after_settlement_is_noop() {
        let delegate = Arc::new(Recorder::default());
        let request = request(delegate.clone(), FetchMethod::Get, "http://localhost:9/items", None);
        request.cancel();
        let _ = request.perform().await;

        assert!(!request.cancel());
        assert_eq!(delegate.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_before_fetch_request_sees_options() {
        let delegate = Arc::new(Recorder::default());
        let events = FetchEvents::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        events.before_fetch_request.listen(move |event| {
            assert!(!event.is_cancelable());
            *seen_clone.lock() = Some(event.detail().clone());
        });

        let request = FetchRequest::builder(
            delegate,
            FetchMethod::Get,
            Location::parse("http://localhost:9/items").unwrap(),
        )
        .body(FormData::new().text("page", "2"))
        .events(events)
        .build();
        request.cancel();
        let _ = request.perform().await;

        let options = seen.lock().take().expect("before-fetch-request not dispatched");
        assert_eq!(options.method, FetchMethod::Get);
        assert_eq!(options.url, "http://localhost:9/items?page=2");
        assert_eq!(options.headers[ACCEPT], ACCEPT_HEADER);
        assert!(options.body.is_none());
        assert!(options.redirect.follows());
        assert_eq!(options.credentials, Credentials::SameOrigin);
        assert!(options.signal.is_aborted());
    }
}
