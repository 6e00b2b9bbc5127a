//! Subscription plumbing shared by the store and the resize source.
//!
//! Callback registration is modelled as explicit handles: subscribing
//! returns a [`Subscription`] whose `Drop` removes the callback, so a chart
//! that goes away can never leave a listener behind.

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type SubscriberList<T> = Arc<RwLock<Vec<(u64, Callback<T>)>>>;

/// A list of callbacks behind a read-write lock.
///
/// Emission snapshots the list before invoking anything, so a callback may
/// drop its own (or any other) subscription without deadlocking.
pub(crate) struct Hub<T> {
    subscribers: SubscriberList<T>,
    next_id: AtomicU64,
}

impl<T: 'static> Hub<T> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.write().push((id, Arc::new(callback)));

        let subscribers = Arc::clone(&self.subscribers);
        Subscription {
            id,
            unsubscribe: Some(Box::new(move || {
                subscribers.write().retain(|(sid, _)| *sid != id);
            })),
        }
    }

    pub(crate) fn emit(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(value);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl<T: 'static> Default for Hub<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle for a registered callback.
///
/// Dropping the handle unsubscribes. Call [`Subscription::detach`] to keep
/// the callback registered for the lifetime of its event source instead.
pub struct Subscription {
    id: u64,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// The registration id, unique per event source.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Consumes the handle without unsubscribing.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Stand-in for the host's window-resize event source.
///
/// Whatever owns the real windowing hook calls [`ResizeEvents::notify`];
/// every bound chart re-lays-out its surface in response.
#[derive(Default)]
pub struct ResizeEvents {
    hub: Hub<()>,
}

impl ResizeEvents {
    /// Creates an event source with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resize listener.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.hub.subscribe(move |_: &()| callback())
    }

    /// Fans a resize event out to all listeners, synchronously.
    pub fn notify(&self) {
        self.hub.emit(&());
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.hub.len()
    }
}

impl core::fmt::Debug for ResizeEvents {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResizeEvents")
            .field("listeners", &self.hub.len())
            .finish()
    }
}
