//! Core systems for wicket.
//!
//! This crate provides the building blocks the networking crate publishes
//! through:
//!
//! - **Signal/Slot System**: Type-safe observer channels ([`Signal`])
//! - **Events**: Named, optionally cancelable events ([`Event`], [`EventChannel`])
//! - **Cancellation**: Cooperative one-shot cancellation ([`CancellationToken`])
//! - **Logging**: `tracing` target names ([`logging::targets`])
//!
//! # Signal/Slot Example
//!
//! ```
//! use wicket_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Event Example
//!
//! ```
//! use wicket_core::EventChannel;
//!
//! let before_close = EventChannel::<String>::new("app:before-close");
//! before_close.listen(|event| {
//!     if event.detail() == "unsaved" {
//!         event.prevent_default();
//!     }
//! });
//!
//! let event = before_close.dispatch("unsaved".to_string(), true);
//! assert!(event.default_prevented());
//! ```

pub mod cancellation;
pub mod event;
pub mod logging;
pub mod signal;

pub use cancellation::CancellationToken;
pub use event::{Event, EventChannel};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
