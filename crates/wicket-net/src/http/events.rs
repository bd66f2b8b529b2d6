//! Event-bus signals published around every fetch.
//!
//! Two events are dispatched per request:
//!
//! - `wicket:before-fetch-request`, carrying the resolved [`FetchOptions`].
//!   Listeners can inspect the request but cannot block or alter it.
//! - `wicket:before-fetch-response`, carrying the [`FetchResponse`]. This one
//!   is cancelable: calling `prevent_default()` suppresses the delegate's
//!   success/failure handling in favour of
//!   `request_prevented_handling_response`.
//!
//! Requests publish on the process-wide bus returned by
//! [`FetchEvents::global`] unless they were built with their own.
//!
//! ```
//! use wicket_net::http::FetchEvents;
//!
//! let events = FetchEvents::new();
//! events.before_fetch_response.listen(|event| {
//!     if event.detail().status_code() == 204 {
//!         event.prevent_default();
//!     }
//! });
//! ```

use std::sync::{Arc, OnceLock};

use wicket_core::EventChannel;

use super::request::FetchOptions;
use super::response::FetchResponse;

macro_rules! event_namespace {
    () => {
        "wicket"
    };
}

/// Prefix of every event name published by this crate.
pub const EVENT_NAMESPACE: &str = event_namespace!();

/// Name of the pre-request event.
pub const BEFORE_FETCH_REQUEST: &str = concat!(event_namespace!(), ":before-fetch-request");

/// Name of the pre-response event.
pub const BEFORE_FETCH_RESPONSE: &str = concat!(event_namespace!(), ":before-fetch-response");

/// The pair of channels fetch requests publish on.
#[derive(Debug)]
pub struct FetchEvents {
    /// Dispatched before the exchange; not cancelable.
    pub before_fetch_request: EventChannel<FetchOptions>,
    /// Dispatched once a response arrives; cancelable.
    pub before_fetch_response: EventChannel<FetchResponse>,
}

impl Default for FetchEvents {
    fn default() -> Self {
        Self {
            before_fetch_request: EventChannel::new(BEFORE_FETCH_REQUEST),
            before_fetch_response: EventChannel::new(BEFORE_FETCH_RESPONSE),
        }
    }
}

impl FetchEvents {
    /// Create a private bus, independent of the global one.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The process-wide bus.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<FetchEvents>> = OnceLock::new();
        GLOBAL.get_or_init(FetchEvents::new).clone()
    }
}
