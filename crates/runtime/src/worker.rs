//! Worker-side render coordinator.
//!
//! The worker owns the engine, the drawing surface once it is transferred,
//! the hover state, and the running fades. It processes commands one at a
//! time in arrival order; fade paints run between commands.

use floormap_core::{RenderingEngine, Surface};
use floormap_protocol::{FillStyleEntry, RelPos, ShapeStateEntry, WorkerCommand, WorkerReply};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::animation::{FadeEvent, FadeScheduler, Hover};
use crate::config::Timing;

pub struct RenderWorker<E, S> {
    engine: E,
    surface: Option<S>,
    hover: Hover,
    fades: FadeScheduler,
}

impl<E: RenderingEngine, S: Surface> RenderWorker<E, S> {
    /// `engine` must already have its map loaded.
    pub fn new(engine: E, timing: &Timing) -> Self {
        Self {
            engine,
            surface: None,
            hover: Hover::Unset,
            fades: FadeScheduler::new(timing),
        }
    }

    pub fn hover(&self) -> &Hover {
        &self.hover
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_animating(&self) -> bool {
        !self.fades.is_idle()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.fades.next_due()
    }

    /// Process one command. Returns the reply to post, if any.
    pub fn handle(&mut self, command: WorkerCommand<S>, now: Instant) -> Option<WorkerReply> {
        match command {
            WorkerCommand::SetCanvas(surface) => {
                self.bind_surface(surface);
                None
            }
            WorkerCommand::SetStateFillStyles(entries) => {
                self.apply_fill_styles(&entries);
                None
            }
            WorkerCommand::SetShapeStates(entries) => {
                self.apply_shape_states(entries);
                None
            }
            WorkerCommand::RenderForRelPos(pos) => {
                self.render_for_position(pos, now);
                None
            }
            WorkerCommand::EvaluateClick(pos) => self.evaluate_click(pos),
        }
    }

    /// Bind the surface. Only the first call has an effect.
    pub fn bind_surface(&mut self, surface: S) -> bool {
        if self.surface.is_some() {
            debug!("surface already bound, ignoring setCanvas");
            return false;
        }
        self.surface = Some(surface);
        info!("surface bound");
        true
    }

    pub fn apply_fill_styles(&mut self, entries: &[FillStyleEntry]) {
        for entry in entries {
            if let Err(e) = self.engine.set_fill_style(entry.state, &entry.style) {
                warn!(state = entry.state, error = %e, "fill style rejected");
            }
        }
        debug!(count = entries.len(), "fill styles applied");
    }

    pub fn apply_shape_states(&mut self, entries: Vec<ShapeStateEntry>) {
        let count = entries.len();
        for entry in entries {
            self.engine.set_shape_state(entry.shape_id, entry.state);
        }
        debug!(count, "shape states applied");
    }

    /// Hit test `pos` and start a fade if the hovered shape changed.
    ///
    /// The first paint happens before this returns; the rest are driven by
    /// [`RenderWorker::run_due`].
    pub fn render_for_position(&mut self, pos: RelPos, now: Instant) {
        if self.surface.is_none() {
            debug!("renderForRelPos before setCanvas, dropped");
            return;
        }
        if !pos.is_finite() {
            debug!(?pos, "non-finite position, dropped");
            return;
        }

        let candidate = Hover::from(self.engine.shape_at(pos));
        let changed = candidate != self.hover;
        if changed {
            debug!(from = ?self.hover, to = ?candidate, "hover changed, fading");
            self.fades.start(pos, candidate.clone(), now);
            self.run_due(now);
        }
        if !(changed && self.fades.commits_on_finish()) {
            self.hover = candidate;
        }
    }

    /// Hit test a click. No reply when nothing is there.
    pub fn evaluate_click(&self, pos: RelPos) -> Option<WorkerReply> {
        if self.surface.is_none() {
            debug!("evaluateClick before setCanvas, dropped");
            return None;
        }
        if !pos.is_finite() {
            debug!(?pos, "non-finite position, dropped");
            return None;
        }
        let shape_id = self.engine.shape_at(pos)?;
        debug!(shape = %shape_id, "click hit");
        Some(WorkerReply::HoveredShape { shape_id })
    }

    /// Run every fade step whose deadline has passed.
    pub fn run_due(&mut self, now: Instant) {
        for event in self.fades.due(now) {
            match event {
                FadeEvent::Paint(pos) => {
                    if let Some(surface) = self.surface.as_mut() {
                        self.engine.paint_frame(surface, pos);
                    }
                }
                FadeEvent::Commit(target) => self.hover = target,
            }
        }
    }

    /// Serve commands until every sender is dropped.
    pub async fn run(
        mut self,
        mut inbox: mpsc::UnboundedReceiver<WorkerCommand<S>>,
        outbox: mpsc::UnboundedSender<WorkerReply>,
    ) {
        loop {
            let due = self.fades.next_due();
            tokio::select! {
                biased;
                () = sleep_until(due), if due.is_some() => self.run_due(Instant::now()),
                command = inbox.recv() => {
                    let Some(command) = command else { break };
                    let name = command.name();
                    if let Some(reply) = self.handle(command, Instant::now())
                        && outbox.send(reply).is_err()
                    {
                        debug!(command = name, "reply dropped, main context is gone");
                    }
                }
            }
        }
        debug!("command channel closed, render worker stopping");
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// The main context's end of a worker: command sender, reply receiver, and
/// the task running the worker.
pub struct WorkerHandle<S> {
    commands: mpsc::UnboundedSender<WorkerCommand<S>>,
    replies: mpsc::UnboundedReceiver<WorkerReply>,
    task: Option<JoinHandle<()>>,
}

impl<S> WorkerHandle<S> {
    /// Wrap channels served by something other than [`spawn_worker`].
    pub fn from_channels(
        commands: mpsc::UnboundedSender<WorkerCommand<S>>,
        replies: mpsc::UnboundedReceiver<WorkerReply>,
    ) -> Self {
        Self {
            commands,
            replies,
            task: None,
        }
    }

    pub fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedSender<WorkerCommand<S>>,
        mpsc::UnboundedReceiver<WorkerReply>,
        Option<JoinHandle<()>>,
    ) {
        (self.commands, self.replies, self.task)
    }
}

/// Spawn the render worker.
///
/// The task loads `map_description` first. On failure it logs and exits
/// without ever sending `Ready`; the reply channel then closes.
pub fn spawn_worker<E, S>(mut engine: E, map_description: String, timing: &Timing) -> WorkerHandle<S>
where
    E: RenderingEngine + 'static,
    S: Surface + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let timing = *timing;

    let task = tokio::spawn(async move {
        if let Err(e) = engine.load_map(&map_description) {
            error!(error = %e, "map failed to load, render worker will never be ready");
            return;
        }
        info!(
            fade_frames = timing.fade_frames,
            fade_delay_ms = timing.fade_delay.as_millis() as u64,
            policy = ?timing.animation_policy,
            "map loaded, render worker ready"
        );
        let worker = RenderWorker::new(engine, &timing);
        if reply_tx.send(WorkerReply::Ready).is_err() {
            return;
        }
        worker.run(command_rx, reply_tx).await;
    });

    WorkerHandle {
        commands: command_tx,
        replies: reply_rx,
        task: Some(task),
    }
}
