//! Named, optionally cancelable events broadcast over a [`Signal`].
//!
//! An [`EventChannel<D>`] is a broadcast point for events of one kind. Each
//! [`dispatch`](EventChannel::dispatch) builds a fresh [`Event<D>`], hands it
//! to every listener and returns it, so the dispatcher can inspect whether a
//! listener called [`Event::prevent_default`].
//!
//! ```
//! use wicket_core::EventChannel;
//!
//! let channel = EventChannel::<u32>::new("app:before-save");
//! channel.listen(|event| {
//!     if *event.detail() > 10 {
//!         event.prevent_default();
//!     }
//! });
//!
//! assert!(!channel.dispatch(3, true).default_prevented());
//! assert!(channel.dispatch(11, true).default_prevented());
//! assert!(!channel.dispatch(11, false).default_prevented());
//! ```

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::logging::targets;
use crate::signal::{ConnectionGuard, ConnectionId, Signal};

/// A single dispatched event.
#[derive(Debug)]
pub struct Event<D> {
    name: Cow<'static, str>,
    detail: D,
    cancelable: bool,
    default_prevented: AtomicBool,
}

impl<D> Event<D> {
    /// Create an event that has not been dispatched yet.
    pub fn new(name: impl Into<Cow<'static, str>>, detail: D, cancelable: bool) -> Self {
        Self {
            name: name.into(),
            detail,
            cancelable,
            default_prevented: AtomicBool::new(false),
        }
    }

    /// The event name, e.g. `wicket:before-fetch-request`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The payload carried by the event.
    pub fn detail(&self) -> &D {
        &self.detail
    }

    /// Whether listeners may cancel the default handling of this event.
    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    /// Cancel the default handling of this event.
    ///
    /// Ignored on events that are not cancelable.
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.store(true, Ordering::SeqCst);
        } else {
            tracing::debug!(
                target: targets::EVENT,
                name = %self.name,
                "prevent_default on non-cancelable event ignored"
            );
        }
    }

    /// Whether a listener cancelled the default handling.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }
}

/// A named broadcast point for events carrying a `D` detail.
pub struct EventChannel<D> {
    name: Cow<'static, str>,
    signal: Signal<Arc<Event<D>>>,
}

impl<D: Send + Sync + 'static> EventChannel<D> {
    /// Create a channel for events called `name`.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            signal: Signal::new(),
        }
    }

    /// The name given to every event dispatched on this channel.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a listener. Listeners run in registration order.
    pub fn listen<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&Event<D>) + Send + Sync + 'static,
    {
        self.signal.connect(move |event: &Arc<Event<D>>| listener(event))
    }

    /// Register a listener that is removed when the guard is dropped.
    pub fn listen_scoped<F>(&self, listener: F) -> ConnectionGuard<Arc<Event<D>>>
    where
        F: Fn(&Event<D>) + Send + Sync + 'static,
    {
        self.signal
            .connect_scoped(move |event: &Arc<Event<D>>| listener(event))
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unlisten(&self, id: ConnectionId) -> bool {
        self.signal.disconnect(id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.signal.connection_count()
    }

    /// Dispatch a new event to every listener and return it.
    pub fn dispatch(&self, detail: D, cancelable: bool) -> Arc<Event<D>> {
        let event = Arc::new(Event::new(self.name.clone(), detail, cancelable));
        tracing::trace!(target: targets::EVENT, name = %self.name, cancelable, "dispatching event");
        self.signal.emit(event.clone());
        event
    }
}

impl<D> std::fmt::Debug for EventChannel<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("signal", &self.signal)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_event_carries_channel_name() {
        let channel = EventChannel::<()>::new("ns:ping");
        let seen = Arc::new(Mutex::new(String::new()));

        let seen_clone = seen.clone();
        channel.listen(move |event| *seen_clone.lock() = event.name().to_string());

        let event = channel.dispatch((), false);
        assert_eq!(event.name(), "ns:ping");
        assert_eq!(*seen.lock(), "ns:ping");
    }

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let event = Event::new("ns:x", 1, false);
        event.prevent_default();
        assert!(!event.default_prevented());

        let event = Event::new("ns:x", 1, true);
        event.prevent_default();
        assert!(event.default_prevented());
    }

    #[test]
    fn test_dispatch_without_listeners() {
        let channel = EventChannel::<i32>::new("ns:empty");
        let event = channel.dispatch(7, true);
        assert_eq!(*event.detail(), 7);
        assert!(!event.default_prevented());
    }

    #[test]
    fn test_every_listener_sees_prevented_event() {
        let channel = EventChannel::<i32>::new("ns:chain");
        let later_saw_prevented = Arc::new(AtomicBool::new(false));

        channel.listen(|event| event.prevent_default());
        let flag = later_saw_prevented.clone();
        channel.listen(move |event| flag.store(event.default_prevented(), Ordering::SeqCst));

        assert!(channel.dispatch(0, true).default_prevented());
        assert!(later_saw_prevented.load(Ordering::SeqCst));
    }

    #[test]
    fn test_listen_scoped_and_unlisten() {
        let channel = EventChannel::<i32>::new("ns:scoped");
        let id = channel.listen(|_| {});
        {
            let _guard = channel.listen_scoped(|_| {});
            assert_eq!(channel.listener_count(), 2);
        }
        assert_eq!(channel.listener_count(), 1);
        assert!(channel.unlisten(id));
        assert_eq!(channel.listener_count(), 0);
    }
}
