//! Runtime configuration.
//!
//! Map configuration (fill styles and shape states) comes from a JSON file
//! with the same shape as the `setStateFillStyles` / `setShapeStates`
//! payloads. Timing knobs come from environment variables.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use floormap_core::{EngineError, MapEngine};
use floormap_protocol::{ColorSpec, FillStyleEntry, ShapeStateEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 250;
pub const DEFAULT_FADE_FRAMES: u32 = 10;
pub const DEFAULT_FADE_DELAY_MS: u64 = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing map config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown animation policy {0:?}")]
    UnknownPolicy(String),
}

/// Fill styles and shape states pushed to the worker at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(rename = "fillStyles", default)]
    pub fill_styles: Vec<FillStyleEntry>,
    #[serde(rename = "shapeStates", default)]
    pub shape_states: Vec<ShapeStateEntry>,
    /// Overrides the engine's hover fill.
    #[serde(rename = "hoverStyle", default, skip_serializing_if = "Option::is_none")]
    pub hover_style: Option<ColorSpec>,
    /// Overrides the fill of shapes without a styled state.
    #[serde(rename = "defaultStyle", default, skip_serializing_if = "Option::is_none")]
    pub default_style: Option<ColorSpec>,
}

impl MapConfig {
    /// The stock office configuration: six occupancy states and 13 desks.
    pub fn office() -> Self {
        let fill_styles = [
            (0, "rgba(47,47,47,0.2)"),
            (1, "rgba(153,255,153,0.2)"),
            (2, "rgba(255,153,153, 0.2)"),
            (3, "rgba(179,107,107,0.2)"),
            (4, "rgba(266,100,80,0.2)"),
            (5, "rgba(107,148,179,0.2)"),
        ]
        .into_iter()
        .map(|(state, style)| FillStyleEntry::new(state, style))
        .collect();

        let shape_states = [
            ("dynamic_separate_desk", 1),
            ("dynamic_conference_desk", 0),
            ("dynamic_middle_desk_1", 1),
            ("dynamic_middle_desk_2", 1),
            ("dynamic_middle_desk_3", 2),
            ("dynamic_middle_desk_4", 2),
            ("dynamic_middle_desk_5", 1),
            ("dynamic_middle_desk_6", 1),
            ("dynamic_right_desk_1", 1),
            ("dynamic_right_desk_2", 2),
            ("dynamic_right_desk_3", 1),
            ("dynamic_right_desk_4", 1),
            ("dynamic_right_desk_5", 1),
        ]
        .into_iter()
        .map(|(shape, state)| ShapeStateEntry::new(shape, state))
        .collect();

        Self {
            fill_styles,
            shape_states,
            hover_style: None,
            default_style: None,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Install the hover/default overrides on an engine before it is handed
    /// to the worker. These have no protocol message.
    pub fn apply_engine_styles(&self, engine: &mut MapEngine) -> Result<(), EngineError> {
        if let Some(style) = &self.hover_style {
            engine.set_hover_style(style)?;
        }
        if let Some(style) = &self.default_style {
            engine.set_default_style(style)?;
        }
        Ok(())
    }
}

/// What happens when a new hover change arrives while a fade is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationPolicy {
    /// Cancel the running fade and start the new one. Hover state is
    /// committed as soon as the render message is processed.
    #[default]
    Supersede,
    /// Let fades interleave; each commits its shape to the hover state only
    /// after its last paint and delay.
    Overlap,
}

impl FromStr for AnimationPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supersede" => Ok(Self::Supersede),
            "overlap" => Ok(Self::Overlap),
            other => Err(ConfigError::UnknownPolicy(other.to_owned())),
        }
    }
}

/// Timing knobs for both coordinators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// How often the main context sends the latest pointer position.
    pub sample_interval: Duration,
    /// Paint calls per hover fade.
    pub fade_frames: u32,
    /// Delay after each fade paint.
    pub fade_delay: Duration,
    pub animation_policy: AnimationPolicy,
    /// `None` waits for the readiness handshake forever.
    pub ready_timeout: Option<Duration>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
            fade_frames: DEFAULT_FADE_FRAMES,
            fade_delay: Duration::from_millis(DEFAULT_FADE_DELAY_MS),
            animation_policy: AnimationPolicy::Supersede,
            ready_timeout: None,
        }
    }
}

impl Timing {
    /// Read from the process environment:
    /// - `FLOORMAP_SAMPLE_INTERVAL_MS` (default 250, minimum 1)
    /// - `FLOORMAP_FADE_FRAMES` (default 10)
    /// - `FLOORMAP_FADE_DELAY_MS` (default 50)
    /// - `FLOORMAP_ANIMATION_POLICY`: `supersede` (default) or `overlap`
    /// - `FLOORMAP_READY_TIMEOUT_MS`: unset waits forever
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let sample_ms = parse("FLOORMAP_SAMPLE_INTERVAL_MS").unwrap_or(DEFAULT_SAMPLE_INTERVAL_MS);
        let fade_frames = lookup("FLOORMAP_FADE_FRAMES")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_FADE_FRAMES);
        let fade_ms = parse("FLOORMAP_FADE_DELAY_MS").unwrap_or(DEFAULT_FADE_DELAY_MS);
        let animation_policy = lookup("FLOORMAP_ANIMATION_POLICY")
            .and_then(|v| match v.parse() {
                Ok(policy) => Some(policy),
                Err(e) => {
                    warn!(error = %e, "ignoring FLOORMAP_ANIMATION_POLICY");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            sample_interval: Duration::from_millis(sample_ms.max(1)),
            fade_frames,
            fade_delay: Duration::from_millis(fade_ms),
            animation_policy,
            ready_timeout: parse("FLOORMAP_READY_TIMEOUT_MS").map(Duration::from_millis),
        }
    }
}
