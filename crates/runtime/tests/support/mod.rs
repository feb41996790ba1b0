//! Shared fixtures for the runtime integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use floormap_core::svg::render_svg;
use floormap_core::{Frame, Surface};

pub const OFFICE: &str = include_str!("../../../../assets/office.svg");

/// Somewhere inside `dynamic_right_desk_2`.
pub const RIGHT_DESK_2: (f64, f64) = (0.8625, 0.5583);
/// Somewhere inside `dynamic_middle_desk_1`.
pub const MIDDLE_DESK_1: (f64, f64) = (0.375, 0.4833);
/// Open floor, no desk.
pub const FLOOR: (f64, f64) = (0.45, 0.9);

#[derive(Debug, Default)]
struct Recording {
    frames: usize,
    last: String,
}

/// Surface that counts paint calls and keeps the last frame as SVG.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingSurface {
    pub fn frames(&self) -> usize {
        self.inner.lock().unwrap().frames
    }

    pub fn last_document(&self) -> String {
        self.inner.lock().unwrap().last.clone()
    }
}

impl Surface for RecordingSurface {
    fn present(&mut self, frame: &Frame<'_>) {
        let mut rec = self.inner.lock().unwrap();
        rec.frames += 1;
        rec.last = render_svg(frame);
    }
}

/// Let every spawned task run without moving the paused clock much.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
