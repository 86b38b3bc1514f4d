use crate::world::WorldSnapshot;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Identifies an attached observer (UUIDv7, time-ordered)
pub type ObserverId = Uuid;

/// An external consumer of live world snapshots.
pub trait Observer: Send + Sync {
    /// Deliver one snapshot. `false` means the observer is gone and must be
    /// detached; no further snapshots will be offered to it.
    fn deliver<'a>(&'a self, snapshot: &'a Arc<WorldSnapshot>) -> BoxFuture<'a, bool>;
}

/// Observer backed by a bounded channel, for in-process consumers.
///
/// Delivery waits for a free slot, so a slow reader slows distribution
/// instead of queueing snapshots. Dropping the receiver fails delivery.
pub struct ChannelObserver {
    tx: mpsc::Sender<Arc<WorldSnapshot>>,
}

impl ChannelObserver {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<WorldSnapshot>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl Observer for ChannelObserver {
    fn deliver<'a>(&'a self, snapshot: &'a Arc<WorldSnapshot>) -> BoxFuture<'a, bool> {
        Box::pin(async move { self.tx.send(Arc::clone(snapshot)).await.is_ok() })
    }
}

/// Set of attached observers.
///
/// Synchronized on its own, independently of the world lock, so connections
/// can come and go while a snapshot is being relayed.
pub struct ObserverRegistry {
    observers: DashMap<ObserverId, Arc<dyn Observer>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            observers: DashMap::new(),
        }
    }

    /// Attach an observer. The first attachment moves the simulation to Running.
    pub fn attach(&self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = Uuid::now_v7();
        self.observers.insert(id, observer);

        let count = self.observers.len();
        info!(observer_id = %id, observers = count, "Observer attached");
        if count == 1 {
            info!("Simulation running");
        }
        id
    }

    /// Detach an observer. Returns false if it was already gone.
    pub fn detach(&self, id: &ObserverId) -> bool {
        if self.observers.remove(id).is_none() {
            return false;
        }

        let count = self.observers.len();
        info!(observer_id = %id, observers = count, "Observer detached");
        if count == 0 {
            info!("No observers left, simulation idle");
        }
        true
    }

    pub fn contains(&self, id: &ObserverId) -> bool {
        self.observers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Point-in-time copy of the observer set. No shard lock is held afterwards,
    /// so delivery can await freely.
    pub fn current(&self) -> Vec<(ObserverId, Arc<dyn Observer>)> {
        self.observers
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
