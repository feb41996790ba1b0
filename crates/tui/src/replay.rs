//! Headless replay of a JSON-lines command script.
//!
//! `renderForRelPos` lines are fed to the pointer sampler, one per sample
//! period and half a period out of phase with its ticks, so each scripted
//! position is sent exactly once. Every other command is forwarded as is.
//! Clicked shapes are printed as `hoveredShape` JSON lines on stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use floormap_core::{Frame, Surface, SvgSurface};
use floormap_protocol::{RelPos, ShapeId, WireCommand, WorkerReply, decode_command, encode_reply};
use floormap_runtime::{MainCoordinator, Timing, spawn_worker};
use tracing::{debug, info, warn};

use crate::Setup;

/// Keeps the latest frame as SVG and mirrors it to a file when asked to.
pub struct SvgFileSurface {
    svg: SvgSurface,
    out: Option<PathBuf>,
}

impl SvgFileSurface {
    pub fn new(out: Option<PathBuf>) -> Self {
        Self {
            svg: SvgSurface::new(),
            out,
        }
    }
}

impl Surface for SvgFileSurface {
    fn present(&mut self, frame: &Frame<'_>) {
        self.svg.present(frame);
        if let Some(path) = &self.out
            && let Err(e) = std::fs::write(path, self.svg.document())
        {
            warn!(path = %path.display(), error = %e, "writing frame failed");
        }
    }
}

/// Parse a script, skipping blank lines, `#` comments, and lines that do not
/// decode.
fn parse_script(text: &str) -> Vec<WireCommand> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .filter_map(|(index, line)| match decode_command(line) {
            Ok(command) => Some(command),
            Err(e) => {
                debug!(line = index + 1, error = %e, "undecodable command, dropped");
                None
            }
        })
        .collect()
}

fn print_reply(shape_id: &ShapeId) {
    let reply = WorkerReply::HoveredShape {
        shape_id: shape_id.clone(),
    };
    let line = match encode_reply(&reply) {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "encoding reply failed");
            return;
        }
    };
    let mut out = std::io::stdout().lock();
    if let Err(e) = writeln!(out, "{line}") {
        warn!(error = %e, "writing reply failed");
    }
}

/// Time for the last sampled position to be sent and its fade to finish.
fn settle_time(timing: &Timing) -> Duration {
    timing.sample_interval + timing.fade_delay * (timing.fade_frames + 1)
}

/// Feed commands to a freshly started coordinator. Its sampler ticks every
/// `period` from the moment it started.
async fn drive<S: Send + 'static>(
    coordinator: &MainCoordinator<S>,
    commands: Vec<WireCommand>,
    period: Duration,
) -> Result<()> {
    tokio::time::sleep(period / 2).await;
    for command in commands {
        match command {
            WireCommand::RenderForRelPos { rel_x, rel_y } => {
                coordinator.pointer_moved(RelPos::new(rel_x, rel_y));
                tokio::time::sleep(period).await;
            }
            other => coordinator.send(other)?,
        }
    }
    Ok(())
}

pub async fn run(setup: Setup, script: &Path, out: Option<PathBuf>) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("reading script {}", script.display()))?;
    let commands = parse_script(&text);
    info!(commands = commands.len(), script = %script.display(), "replaying");

    let Setup {
        map,
        config,
        engine,
        timing,
    } = setup;
    let worker = spawn_worker(engine, map, &timing);
    let coordinator =
        MainCoordinator::start(worker, SvgFileSurface::new(out), &config, &timing, print_reply)
            .await?;

    drive(&coordinator, commands, timing.sample_interval).await?;
    tokio::time::sleep(settle_time(&timing)).await;
    coordinator.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use floormap_core::{MapEngine, RenderingEngine};
    use floormap_protocol::WorkerCommand;
    use floormap_runtime::{MapConfig, WorkerHandle};
    use tokio::sync::mpsc;

    const OFFICE: &str = include_str!("../../../assets/office.svg");

    #[test]
    fn script_skips_comments_and_bad_lines() {
        let text = r##"
# hover the separate desk, then click it
{"command":"renderForRelPos","relX":0.125,"relY":0.15}
{"command":"wave"}

{"command":"evaluateClick","relX":0.125,"relY":0.15}
"##;
        let commands = parse_script(text);
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[1], WireCommand::EvaluateClick { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn each_scripted_position_is_sent_once() {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        reply_tx.send(WorkerReply::Ready).unwrap();
        drop(reply_tx);
        let timing = Timing::default();
        let coordinator = MainCoordinator::start(
            WorkerHandle::from_channels(command_tx, reply_rx),
            "surface",
            &MapConfig::office(),
            &timing,
            |_: &ShapeId| {},
        )
        .await
        .unwrap();

        let positions: Vec<RelPos> = (1..=8)
            .map(|i| RelPos::new(f64::from(i) / 10.0, 0.5))
            .collect();
        let script = positions
            .iter()
            .map(|pos| WireCommand::RenderForRelPos {
                rel_x: pos.x,
                rel_y: pos.y,
            })
            .collect();
        drive(&coordinator, script, timing.sample_interval).await.unwrap();
        coordinator.shutdown().await;

        let mut renders = Vec::new();
        while let Ok(command) = command_rx.try_recv() {
            if let WorkerCommand::RenderForRelPos(pos) = command {
                renders.push(pos);
            }
        }
        let mut expected = vec![RelPos::ORIGIN];
        expected.extend(positions);
        assert_eq!(renders, expected);
    }

    #[test]
    fn settle_covers_a_full_fade() {
        let timing = Timing::default();
        assert_eq!(settle_time(&timing), Duration::from_millis(250 + 550));
    }

    #[test]
    fn file_surface_writes_latest_frame() {
        let path = std::env::temp_dir().join(format!("floormap-replay-{}.svg", std::process::id()));
        let mut engine = MapEngine::new();
        engine.load_map(OFFICE).unwrap();
        let mut surface = SvgFileSurface::new(Some(path.clone()));
        engine.paint_frame(&mut surface, RelPos::new(0.125, 0.15));

        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(written, surface.svg.document());
        assert!(written.contains("data-shape=\"dynamic_separate_desk\""));
    }
}
