//! Drives a spawned render worker over its raw channels with the real map
//! engine and the bundled office map.

mod support;

use std::time::Duration;

use floormap_core::MapEngine;
use floormap_protocol::{
    FillStyleEntry, RelPos, ShapeId, ShapeStateEntry, WorkerCommand, WorkerReply, decode_command,
};
use floormap_runtime::{AnimationPolicy, MapConfig, Timing, spawn_worker};
use support::{FLOOR, MIDDLE_DESK_1, OFFICE, RIGHT_DESK_2, RecordingSurface, settle};
use tokio::sync::mpsc;

type Commands = mpsc::UnboundedSender<WorkerCommand<RecordingSurface>>;
type Replies = mpsc::UnboundedReceiver<WorkerReply>;

fn pos((x, y): (f64, f64)) -> RelPos {
    RelPos::new(x, y)
}

/// Spawn a worker on the office map and wait for `ready`.
async fn ready_worker(timing: &Timing) -> (Commands, Replies) {
    let handle = spawn_worker(MapEngine::new(), OFFICE.to_owned(), timing);
    let (commands, mut replies, _task) = handle.into_parts();
    assert_eq!(replies.recv().await, Some(WorkerReply::Ready));
    (commands, replies)
}

#[tokio::test(start_paused = true)]
async fn end_to_end_office_scenario() {
    let (commands, _replies) = ready_worker(&Timing::default()).await;
    let surface = RecordingSurface::default();
    let config = MapConfig::office();
    assert_eq!(config.fill_styles.len(), 6);
    assert_eq!(config.shape_states.len(), 13);

    commands.send(WorkerCommand::SetCanvas(surface.clone())).unwrap();
    commands
        .send(WorkerCommand::SetStateFillStyles(config.fill_styles))
        .unwrap();
    commands
        .send(WorkerCommand::SetShapeStates(config.shape_states))
        .unwrap();
    commands
        .send(WorkerCommand::RenderForRelPos(RelPos::ORIGIN))
        .unwrap();

    // First-ever render: the fade starts with one paint right away.
    settle().await;
    assert_eq!(surface.frames(), 1);
    assert_eq!(surface.last_document().matches("data-shape=").count(), 13);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(surface.frames(), 10);
}

#[tokio::test(start_paused = true)]
async fn fade_paints_ten_frames_spaced_by_delay() {
    let (commands, _replies) = ready_worker(&Timing::default()).await;
    let surface = RecordingSurface::default();
    commands.send(WorkerCommand::SetCanvas(surface.clone())).unwrap();
    commands
        .send(WorkerCommand::RenderForRelPos(pos(RIGHT_DESK_2)))
        .unwrap();

    settle().await;
    assert_eq!(surface.frames(), 1);
    for expected in 2..=10 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(surface.frames(), expected);
    }
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(surface.frames(), 10);
}

#[tokio::test(start_paused = true)]
async fn same_shape_again_paints_nothing() {
    let (commands, _replies) = ready_worker(&Timing::default()).await;
    let surface = RecordingSurface::default();
    commands.send(WorkerCommand::SetCanvas(surface.clone())).unwrap();

    commands
        .send(WorkerCommand::RenderForRelPos(pos(MIDDLE_DESK_1)))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(surface.frames(), 10);

    // Another point on the same desk.
    commands
        .send(WorkerCommand::RenderForRelPos(RelPos::new(0.4, 0.5)))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(surface.frames(), 10);

    commands
        .send(WorkerCommand::RenderForRelPos(pos(FLOOR)))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(surface.frames(), 20);
}

#[tokio::test(start_paused = true)]
async fn overlap_policy_interleaves_fades() {
    let timing = Timing {
        animation_policy: AnimationPolicy::Overlap,
        ..Timing::default()
    };
    let (commands, _replies) = ready_worker(&timing).await;
    let surface = RecordingSurface::default();
    commands.send(WorkerCommand::SetCanvas(surface.clone())).unwrap();

    commands
        .send(WorkerCommand::RenderForRelPos(pos(RIGHT_DESK_2)))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    // The first fade has not committed its shape yet, so this fades again.
    commands
        .send(WorkerCommand::RenderForRelPos(pos(RIGHT_DESK_2)))
        .unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(surface.frames(), 20);
}

#[tokio::test(start_paused = true)]
async fn supersede_policy_restarts_fade() {
    let (commands, _replies) = ready_worker(&Timing::default()).await;
    let surface = RecordingSurface::default();
    commands.send(WorkerCommand::SetCanvas(surface.clone())).unwrap();

    commands
        .send(WorkerCommand::RenderForRelPos(pos(RIGHT_DESK_2)))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    commands
        .send(WorkerCommand::RenderForRelPos(pos(RIGHT_DESK_2)))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    commands
        .send(WorkerCommand::RenderForRelPos(pos(MIDDLE_DESK_1)))
        .unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    // Three paints of the first fade, then a full fade for the new desk.
    assert_eq!(surface.frames(), 13);
}

#[tokio::test(start_paused = true)]
async fn second_canvas_is_ignored() {
    let (commands, _replies) = ready_worker(&Timing::default()).await;
    let first = RecordingSurface::default();
    let second = RecordingSurface::default();
    commands.send(WorkerCommand::SetCanvas(first.clone())).unwrap();
    commands.send(WorkerCommand::SetCanvas(second.clone())).unwrap();
    commands
        .send(WorkerCommand::RenderForRelPos(RelPos::ORIGIN))
        .unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(first.frames(), 10);
    assert_eq!(second.frames(), 0);
}

#[tokio::test(start_paused = true)]
async fn render_and_click_before_canvas_are_dropped() {
    let (commands, mut replies) = ready_worker(&Timing::default()).await;
    commands
        .send(WorkerCommand::RenderForRelPos(pos(RIGHT_DESK_2)))
        .unwrap();
    commands
        .send(WorkerCommand::EvaluateClick(pos(RIGHT_DESK_2)))
        .unwrap();

    let surface = RecordingSurface::default();
    commands.send(WorkerCommand::SetCanvas(surface.clone())).unwrap();
    settle().await;
    assert!(replies.try_recv().is_err());
    assert_eq!(surface.frames(), 0);
}

#[tokio::test(start_paused = true)]
async fn clicks_reply_only_on_a_shape() {
    let (commands, mut replies) = ready_worker(&Timing::default()).await;
    let surface = RecordingSurface::default();
    commands.send(WorkerCommand::SetCanvas(surface.clone())).unwrap();

    commands
        .send(WorkerCommand::EvaluateClick(pos(FLOOR)))
        .unwrap();
    commands
        .send(WorkerCommand::EvaluateClick(pos(RIGHT_DESK_2)))
        .unwrap();
    settle().await;

    assert_eq!(
        replies.try_recv().ok(),
        Some(WorkerReply::HoveredShape {
            shape_id: ShapeId::from("dynamic_right_desk_2")
        })
    );
    assert!(replies.try_recv().is_err());
    // Clicks never animate.
    assert_eq!(surface.frames(), 0);
}

#[tokio::test(start_paused = true)]
async fn shape_state_last_write_wins() {
    let (commands, _replies) = ready_worker(&Timing::default()).await;
    let surface = RecordingSurface::default();
    commands.send(WorkerCommand::SetCanvas(surface.clone())).unwrap();
    commands
        .send(WorkerCommand::SetStateFillStyles(vec![
            FillStyleEntry::new(1, "rgba(0,255,0,0.2)"),
            FillStyleEntry::new(2, "rgba(255,0,0,0.2)"),
        ]))
        .unwrap();
    for state in [1, 2] {
        commands
            .send(WorkerCommand::SetShapeStates(vec![ShapeStateEntry::new(
                "dynamic_separate_desk",
                state,
            )]))
            .unwrap();
    }
    commands
        .send(WorkerCommand::RenderForRelPos(pos(FLOOR)))
        .unwrap();
    settle().await;

    let doc = surface.last_document();
    assert!(doc.contains(
        r#"fill="rgb(255,0,0)" fill-opacity="0.200" data-shape="dynamic_separate_desk""#
    ));
    assert!(!doc.contains("rgb(0,255,0)"));
}

#[tokio::test(start_paused = true)]
async fn wire_commands_drive_the_worker() {
    let (commands, mut replies) = ready_worker(&Timing::default()).await;
    let surface = RecordingSurface::default();
    commands.send(WorkerCommand::SetCanvas(surface.clone())).unwrap();

    let script = [
        r#"{"command":"renderForRelPos","relX":0.5,"relY":0.95}"#,
        r#"{"command":"teleport","relX":0.1}"#,
        r#"{"command":"evaluateClick","relX":0.125}"#,
        r#"{"command":"evaluateClick","relX":0.125,"relY":0.15}"#,
    ];
    for line in script {
        if let Ok(wire) = decode_command(line) {
            commands.send(wire.into()).unwrap();
        }
    }
    settle().await;

    assert_eq!(surface.frames(), 1);
    assert_eq!(
        replies.try_recv().ok(),
        Some(WorkerReply::HoveredShape {
            shape_id: ShapeId::from("dynamic_separate_desk")
        })
    );
    assert!(replies.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn broken_map_never_sends_ready() {
    let handle = spawn_worker::<_, RecordingSurface>(
        MapEngine::new(),
        "<svg><path".to_owned(),
        &Timing::default(),
    );
    let (_commands, mut replies, task) = handle.into_parts();
    assert_eq!(replies.recv().await, None);
    if let Some(task) = task {
        assert!(task.await.is_ok());
    }
}

#[tokio::test(start_paused = true)]
async fn worker_stops_when_commands_close() {
    let handle = spawn_worker::<_, RecordingSurface>(
        MapEngine::new(),
        OFFICE.to_owned(),
        &Timing::default(),
    );
    let (commands, mut replies, task) = handle.into_parts();
    assert_eq!(replies.recv().await, Some(WorkerReply::Ready));
    drop(commands);
    assert_eq!(replies.recv().await, None);
    if let Some(task) = task {
        assert!(task.await.is_ok());
    }
}
