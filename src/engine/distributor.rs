use crate::engine::observer::ObserverRegistry;
use crate::world::WorldSnapshot;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Relay snapshots, one at a time and in production order, to every observer.
///
/// Runs until the ticker side of the handoff is dropped.
pub async fn run_distributor(
    observers: Arc<ObserverRegistry>,
    mut rx: mpsc::Receiver<Arc<WorldSnapshot>>,
) {
    info!("Starting snapshot distributor");

    while let Some(snapshot) = rx.recv().await {
        relay(&observers, &snapshot).await;
    }

    info!("Snapshot handoff closed, distributor exiting");
}

/// Deliver one snapshot to all currently attached observers.
///
/// Observers whose delivery fails are detached. Returns the number of
/// successful deliveries.
pub async fn relay(observers: &ObserverRegistry, snapshot: &Arc<WorldSnapshot>) -> usize {
    let targets = observers.current();
    if targets.is_empty() {
        return 0;
    }

    let results = join_all(targets.iter().map(|(id, observer)| async move {
        (*id, observer.deliver(snapshot).await)
    }))
    .await;

    let mut delivered = 0;
    for (id, ok) in results {
        if ok {
            delivered += 1;
        } else {
            warn!(observer_id = %id, tick = snapshot.tick, "Snapshot delivery failed, detaching observer");
            observers.detach(&id);
        }
    }
    delivered
}
