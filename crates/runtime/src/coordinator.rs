//! Main-context coordinator.
//!
//! Performs the startup sequence against a render worker: wait for `ready`,
//! hand over the surface, push configuration, then drive pointer sampling
//! and clicks. Click results are passed to a [`Notifier`].

use std::time::Duration;

use floormap_protocol::{
    FillStyleEntry, RelPos, ShapeId, ShapeStateEntry, WireCommand, WorkerCommand, WorkerReply,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{MapConfig, Timing};
use crate::sampler::PointerSampler;
use crate::worker::WorkerHandle;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("render worker exited before it was ready")]
    WorkerExited,
    #[error("render worker not ready after {0:?}")]
    ReadyTimeout(Duration),
    #[error("render worker is no longer accepting commands")]
    Disconnected,
}

/// Receives the shapes the worker reports for clicks.
pub trait Notifier: Send + 'static {
    fn notify(&mut self, shape_id: &ShapeId);
}

impl<F> Notifier for F
where
    F: FnMut(&ShapeId) + Send + 'static,
{
    fn notify(&mut self, shape_id: &ShapeId) {
        self(shape_id);
    }
}

/// Dropping the coordinator stops the sampler and the reply listener, which
/// closes the worker's inbox. [`MainCoordinator::shutdown`] also waits for
/// the worker to finish.
pub struct MainCoordinator<S> {
    /// `None` once shut down.
    commands: Option<mpsc::UnboundedSender<WorkerCommand<S>>>,
    sampler: PointerSampler,
    ticker: JoinHandle<()>,
    listener: JoinHandle<()>,
    worker_task: Option<JoinHandle<()>>,
}

impl<S: Send + 'static> MainCoordinator<S> {
    /// Run the startup sequence. Returns once the initial render has been
    /// queued.
    ///
    /// Without a `ready_timeout` this waits for the handshake forever,
    /// unless the worker task ends first.
    pub async fn start(
        worker: WorkerHandle<S>,
        surface: S,
        config: &MapConfig,
        timing: &Timing,
        notifier: impl Notifier,
    ) -> Result<Self, CoordinatorError> {
        let (commands, mut replies, worker_task) = worker.into_parts();

        match timing.ready_timeout {
            Some(limit) => tokio::time::timeout(limit, wait_ready(&mut replies))
                .await
                .map_err(|_| CoordinatorError::ReadyTimeout(limit))??,
            None => wait_ready(&mut replies).await?,
        }
        info!("render worker ready");

        let send = |command: WorkerCommand<S>| {
            commands
                .send(command)
                .map_err(|_| CoordinatorError::Disconnected)
        };
        send(WorkerCommand::SetCanvas(surface))?;
        send(WorkerCommand::SetStateFillStyles(config.fill_styles.clone()))?;
        send(WorkerCommand::SetShapeStates(config.shape_states.clone()))?;

        let listener = tokio::spawn(listen(replies, notifier));

        let sampler = PointerSampler::new();
        let ticker = sampler.spawn_ticker(commands.clone(), timing.sample_interval);

        send(WorkerCommand::RenderForRelPos(RelPos::ORIGIN))?;
        debug!(
            fill_styles = config.fill_styles.len(),
            shape_states = config.shape_states.len(),
            sample_interval_ms = timing.sample_interval.as_millis() as u64,
            "coordinator started"
        );

        Ok(Self {
            commands: Some(commands),
            sampler,
            ticker,
            listener,
            worker_task,
        })
    }

    /// Record the pointer position. Nothing is sent until the next tick.
    pub fn pointer_moved(&self, pos: RelPos) {
        self.sampler.record_move(pos);
    }

    /// Hit test a click immediately, bypassing the sampler.
    pub fn pointer_pressed(&self, pos: RelPos) -> Result<(), CoordinatorError> {
        self.sampler.record_press(pos);
        self.dispatch(WorkerCommand::EvaluateClick(pos))
    }

    pub fn update_fill_styles(&self, entries: Vec<FillStyleEntry>) -> Result<(), CoordinatorError> {
        self.dispatch(WorkerCommand::SetStateFillStyles(entries))
    }

    pub fn update_shape_states(
        &self,
        entries: Vec<ShapeStateEntry>,
    ) -> Result<(), CoordinatorError> {
        self.dispatch(WorkerCommand::SetShapeStates(entries))
    }

    /// Forward a decoded wire command.
    pub fn send(&self, command: WireCommand) -> Result<(), CoordinatorError> {
        self.dispatch(command.into())
    }

    pub fn latest_position(&self) -> RelPos {
        self.sampler.latest()
    }

    fn dispatch(&self, command: WorkerCommand<S>) -> Result<(), CoordinatorError> {
        let commands = self.commands.as_ref().ok_or(CoordinatorError::Disconnected)?;
        commands
            .send(command)
            .map_err(|_| CoordinatorError::Disconnected)
    }

    /// Stop sampling, close the command channel, and wait for the worker
    /// and the reply listener to finish.
    pub async fn shutdown(mut self) {
        self.ticker.abort();
        let _ = (&mut self.ticker).await;
        self.commands = None;
        if let Some(task) = self.worker_task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "render worker task failed");
        }
        let _ = (&mut self.listener).await;
        debug!("coordinator shut down");
    }
}

impl<S> Drop for MainCoordinator<S> {
    fn drop(&mut self) {
        self.ticker.abort();
        self.listener.abort();
    }
}

async fn wait_ready(replies: &mut mpsc::UnboundedReceiver<WorkerReply>) -> Result<(), CoordinatorError> {
    loop {
        match replies.recv().await {
            Some(WorkerReply::Ready) => return Ok(()),
            Some(other) => debug!(?other, "reply before ready, dropped"),
            None => return Err(CoordinatorError::WorkerExited),
        }
    }
}

async fn listen(mut replies: mpsc::UnboundedReceiver<WorkerReply>, mut notifier: impl Notifier) {
    while let Some(reply) = replies.recv().await {
        match reply {
            WorkerReply::HoveredShape { shape_id } => {
                info!(shape = %shape_id, "shape clicked");
                notifier.notify(&shape_id);
            }
            WorkerReply::Ready => debug!("duplicate ready, ignored"),
        }
    }
    debug!("reply channel closed");
}
