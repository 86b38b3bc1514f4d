use crate::engine::SimEngine;
use crate::world::WorldSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Slots between ticker and distributor. One, so snapshots never pile up:
/// a ticker that gets ahead waits for the distributor.
pub const HANDOFF_CAPACITY: usize = 1;

/// Single-slot handoff from ticker to distributor
pub fn handoff() -> (
    mpsc::Sender<Arc<WorldSnapshot>>,
    mpsc::Receiver<Arc<WorldSnapshot>>,
) {
    mpsc::channel(HANDOFF_CAPACITY)
}

/// Drive the simulation on a fixed period.
///
/// Each wake measures wall-clock time since the previous wake. While any
/// observer is attached it runs one tick and hands the snapshot over,
/// blocking while the slot is full. Exits when the distributor is gone.
pub async fn run_ticker(
    engine: Arc<SimEngine>,
    tx: mpsc::Sender<Arc<WorldSnapshot>>,
    period: Duration,
) {
    info!(period_ms = period.as_millis() as u64, "Starting ticker");

    let mut timer = interval(period);
    // Late wakes are absorbed by the measured elapsed time
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut previous = Instant::now();

    loop {
        timer.tick().await;

        let now = Instant::now();
        let elapsed = now.duration_since(previous).as_secs_f64();
        previous = now;

        let Some(snapshot) = engine.tick(elapsed).await else {
            continue;
        };

        if tx.send(snapshot).await.is_err() {
            warn!("Snapshot distributor closed, ticker exiting");
            break;
        }
    }
}
