//! Logging facilities for wicket.
//!
//! wicket uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("wicket_net=debug,wicket_core=trace")
//!         .init();
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`] below, so a filter
//! directive can select a single subsystem.

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "wicket_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "wicket_core::signal";
    /// Event dispatch target.
    pub const EVENT: &str = "wicket_core::event";
    /// Cancellation token target.
    pub const CANCELLATION: &str = "wicket_core::cancellation";
}
