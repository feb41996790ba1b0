//! Pointer sampling.
//!
//! Pointer events only overwrite the latest position. A ticker emits that
//! position at a fixed period, so protocol traffic does not depend on how
//! fast the input device reports.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use floormap_protocol::{RelPos, WorkerCommand};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct PointerState {
    latest: RelPos,
    moved: bool,
}

/// Latest pointer position, shared between input handlers and the ticker.
#[derive(Debug, Clone, Default)]
pub struct PointerSampler {
    state: Arc<Mutex<PointerState>>,
}

impl PointerSampler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PointerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_move(&self, pos: RelPos) {
        let mut state = self.lock();
        state.latest = pos;
        state.moved = true;
    }

    /// A press updates the position without marking it as moved.
    pub fn record_press(&self, pos: RelPos) {
        self.lock().latest = pos;
    }

    pub fn latest(&self) -> RelPos {
        self.lock().latest
    }

    /// Latest position and whether it moved since the last take.
    pub fn take(&self) -> (RelPos, bool) {
        let mut state = self.lock();
        let moved = std::mem::take(&mut state.moved);
        (state.latest, moved)
    }

    /// Send `renderForRelPos` with the latest position every `period`,
    /// starting one period from now. Stops when the worker is gone.
    pub fn spawn_ticker<S: Send + 'static>(
        &self,
        commands: mpsc::UnboundedSender<WorkerCommand<S>>,
        period: Duration,
    ) -> JoinHandle<()> {
        let sampler = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let (pos, moved) = sampler.take();
                trace!(?pos, moved, "sampling pointer");
                if commands.send(WorkerCommand::RenderForRelPos(pos)).is_err() {
                    debug!("worker gone, sampler stopping");
                    break;
                }
            }
        })
    }
}
