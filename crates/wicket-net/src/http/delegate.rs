//! The delegate protocol through which a request reports its lifecycle.

use super::request::{FetchRequest, FetchRequestHeaders};
use super::response::FetchResponse;
use crate::error::NetworkError;

/// Receives the lifecycle notifications of the requests it owns.
///
/// For a single request the calls arrive strictly in this order:
///
/// 1. [`request_started`](Self::request_started)
/// 2. exactly one of [`request_prevented_handling_response`],
///    [`request_succeeded_with_response`], [`request_failed_with_response`]
///    or [`request_errored`]
/// 3. [`request_finished`](Self::request_finished)
///
/// [`additional_headers_for_request`](Self::additional_headers_for_request)
/// is the one optional capability. The default returns `None`, which adds no
/// headers.
///
/// [`request_prevented_handling_response`]: Self::request_prevented_handling_response
/// [`request_succeeded_with_response`]: Self::request_succeeded_with_response
/// [`request_failed_with_response`]: Self::request_failed_with_response
/// [`request_errored`]: Self::request_errored
pub trait FetchRequestDelegate: Send + Sync {
    /// Extra headers for `request`. They override the defaults on collision.
    fn additional_headers_for_request(
        &self,
        _request: &FetchRequest,
    ) -> Option<FetchRequestHeaders> {
        None
    }

    /// The request is about to be dispatched.
    fn request_started(&self, request: &FetchRequest);

    /// A `before-fetch-response` listener cancelled default handling.
    fn request_prevented_handling_response(
        &self,
        request: &FetchRequest,
        response: &FetchResponse,
    );

    /// The response was classified as a success.
    fn request_succeeded_with_response(&self, request: &FetchRequest, response: &FetchResponse);

    /// The response was classified as a failure.
    fn request_failed_with_response(&self, request: &FetchRequest, response: &FetchResponse);

    /// No response was obtained, because of a transport failure or an abort.
    fn request_errored(&self, request: &FetchRequest, error: &NetworkError);

    /// Always the last notification for a request.
    fn request_finished(&self, request: &FetchRequest);
}
