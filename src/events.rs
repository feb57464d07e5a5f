//! Change notification for hosts embedding a [`World`](crate::world::World).
//!
//! Listeners are plain closures registered on the world. They run
//! synchronously after a mutation has been committed and receive no world
//! reference, so they can only schedule follow-up work (refresh a tile list,
//! request a redraw), never mutate the world re-entrantly.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle returned on subscription, used to unsubscribe.
///
/// IDs are unique across every observer list in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

type Callback = Box<dyn FnMut()>;

/// An ordered list of listeners for one kind of change.
#[derive(Default)]
pub struct Observers {
    listeners: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId::fresh();
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed here.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Call every listener in subscription order.
    pub fn notify(&mut self) {
        for (_, callback) in &mut self.listeners {
            callback();
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
