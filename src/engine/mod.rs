// Tick orchestration and snapshot distribution

pub mod distributor;
pub mod observer;
mod orchestrator;
pub mod ticker;

pub use distributor::{relay, run_distributor};
pub use observer::{ChannelObserver, Observer, ObserverId, ObserverRegistry};
pub use orchestrator::{EnginePhase, SimEngine};
pub use ticker::{handoff, run_ticker, HANDOFF_CAPACITY};

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[cfg(test)]
mod tests;

/// Background tasks that keep the simulation live
pub struct SimulationTasks {
    pub ticker: JoinHandle<()>,
    pub distributor: JoinHandle<()>,
}

impl SimulationTasks {
    pub fn abort(&self) {
        self.ticker.abort();
        self.distributor.abort();
    }
}

/// Spawn the ticker and distributor, joined by the single-slot handoff.
pub fn spawn_simulation(engine: Arc<SimEngine>, period: Duration) -> SimulationTasks {
    let (tx, rx) = handoff();
    let distributor = tokio::spawn(run_distributor(Arc::clone(engine.observers()), rx));
    let ticker = tokio::spawn(run_ticker(engine, tx, period));
    SimulationTasks {
        ticker,
        distributor,
    }
}
