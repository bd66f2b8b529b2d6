//! Typed observer lists.
//!
//! A [`Signal<Args>`] keeps an ordered table of slots and calls every one of
//! them, on the emitting thread, each time the signal is emitted.
//!
//! The table lock is never held while slots run, so a slot may connect or
//! disconnect slots (itself included) during an emission. Such changes apply
//! from the next emission onwards.
//!
//! ```
//! use wicket_core::Signal;
//!
//! let finished = Signal::<u16>::new();
//! let id = finished.connect(|status| println!("finished with {status}"));
//!
//! finished.emit(200);
//! assert!(finished.disconnect(id));
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle for one connected slot, accepted by [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
type SlotTable<Args> = Mutex<SlotMap<ConnectionId, Slot<Args>>>;

/// An ordered list of slots called with `&Args`.
///
/// `Signal` is `Send + Sync`; share it behind an `Arc` to emit from several
/// threads.
pub struct Signal<Args> {
    slots: Arc<SlotTable<Args>>,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Append a slot. It runs after every slot connected before it.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().insert(Arc::new(slot))
    }

    /// Append a slot that stays connected while the returned guard lives.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicI32, Ordering};
    /// use wicket_core::Signal;
    ///
    /// let signal = Signal::<i32>::new();
    /// let total = Arc::new(AtomicI32::new(0));
    /// {
    ///     let total = total.clone();
    ///     let _guard = signal.connect_scoped(move |&n| {
    ///         total.fetch_add(n, Ordering::SeqCst);
    ///     });
    ///     signal.emit(1);
    /// }
    /// signal.emit(10);
    /// assert_eq!(total.load(Ordering::SeqCst), 1);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            id: self.connect(slot),
            slots: Arc::downgrade(&self.slots),
        }
    }

    /// Remove a slot. Returns `false` if `id` is not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Call every connected slot with `args`, in connection order.
    #[tracing::instrument(skip_all, target = "wicket_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let snapshot: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slots = snapshot.len(), "emit");

        for slot in &snapshot {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.slots.lock().len())
            .finish()
    }
}

/// Disconnects its slot when dropped.
///
/// Returned by [`Signal::connect_scoped`]. The guard does not keep the
/// signal alive; dropping it after the signal is gone does nothing.
pub struct ConnectionGuard<Args> {
    id: ConnectionId,
    slots: Weak<SlotTable<Args>>,
}

impl<Args> ConnectionGuard<Args> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            slots.lock().remove(self.id);
        }
    }
}
