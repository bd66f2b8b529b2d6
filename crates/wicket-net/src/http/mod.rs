//! Cancellable fetch requests for wicket.
//!
//! This module provides [`FetchRequest`], a single HTTP exchange that reports
//! its lifecycle to a [`FetchRequestDelegate`] and publishes
//! `before-fetch-request` / `before-fetch-response` events on a
//! [`FetchEvents`] bus.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wicket_net::Location;
//! use wicket_net::http::{FetchMethod, FetchRequest, FormData};
//!
//! let location = Location::parse("https://example.com/items")?;
//! let request = Arc::new(
//!     FetchRequest::builder(delegate, FetchMethod::Get, location)
//!         .body(FormData::new().text("page", "2"))
//!         .build(),
//! );
//!
//! // GET payloads travel in the query string.
//! assert_eq!(request.url(), "https://example.com/items?page=2");
//!
//! let pending = request.clone().spawn();
//! // Aborts the exchange; the delegate sees `request_errored`.
//! request.cancel();
//! ```
//!
//! # Overriding response handling
//!
//! ```ignore
//! use wicket_net::http::FetchEvents;
//!
//! FetchEvents::global().before_fetch_response.listen(|event| {
//!     if event.detail().redirected() {
//!         event.prevent_default();
//!     }
//! });
//! ```

mod abort;
mod body;
mod client;
mod delegate;
mod encoding;
mod events;
mod request;
mod response;
pub mod runtime;

pub use abort::{AbortController, AbortSignal};
pub use body::{FetchRequestBody, FormData, FormDataValue, FormFile};
pub use client::{Credentials, HttpClient, HttpClientBuilder, HttpClientConfig, RedirectMode};
pub use delegate::FetchRequestDelegate;
pub use encoding::{EncodingType, FetchMethod, append_query, query_string};
pub use events::{BEFORE_FETCH_REQUEST, BEFORE_FETCH_RESPONSE, EVENT_NAMESPACE, FetchEvents};
pub use request::{
    ACCEPT_HEADER, FetchOptions, FetchRequest, FetchRequestBuilder, FetchRequestHeaders,
    RequestId, RequestState,
};
pub use response::FetchResponse;
