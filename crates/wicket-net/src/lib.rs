//! Networking module for wicket.
//!
//! This crate wraps a single outbound HTTP exchange in a [`FetchRequest`]
//! with a strict lifecycle:
//!
//! - **Encoding**: GET payloads are flattened into the query string, every
//!   other method sends its payload as a JSON, URL-encoded or multipart body
//! - **Cancellation**: [`FetchRequest::cancel`] aborts the exchange at any
//!   point before it settles
//! - **Classification hook**: listeners on `wicket:before-fetch-response`
//!   can prevent the default success/failure handling
//! - **Delegate protocol**: [`FetchRequestDelegate`] receives `started`,
//!   exactly one terminal notification, then `finished`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wicket_net::{FetchMethod, FetchRequest, Location};
//! use wicket_net::http::{EncodingType, FormData};
//!
//! let request = FetchRequest::builder(
//!     Arc::new(MyDelegate::default()),
//!     FetchMethod::Post,
//!     Location::join("https://example.com", "/items")?,
//! )
//! .encoding(EncodingType::ApplicationJson)
//! .body(FormData::new().text("name", "x"))
//! .build();
//!
//! match request.perform().await {
//!     Ok(response) => println!("{} {}", response.status_code(), response.location()),
//!     Err(error) => eprintln!("no response: {error}"),
//! }
//! ```
//!
//! # Logging
//!
//! All events are emitted through `tracing` under `wicket_net::http::*`
//! targets. No subscriber is installed by this crate.

mod error;
pub mod http;
mod location;

pub use error::{NetworkError, Result};
pub use location::Location;

// Re-export commonly used types at the crate root
pub use http::{
    EncodingType, FetchEvents, FetchMethod, FetchOptions, FetchRequest, FetchRequestBody,
    FetchRequestDelegate, FetchResponse, FormData, HttpClient,
};
