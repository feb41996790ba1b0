use serde::{Deserialize, Serialize};

use crate::shape_id::ShapeId;

/// Pointer position relative to the interactive element's rendered box.
///
/// Both axes are in `[0, 1]`; the protocol never carries device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelPos {
    pub x: f64,
    pub y: f64,
}

impl RelPos {
    pub const ORIGIN: RelPos = RelPos { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Normalize a device offset against the element's extent, clamping to
    /// the unit square. A zero extent maps to 0.
    pub fn from_offset(offset_x: f64, offset_y: f64, width: f64, height: f64) -> Self {
        Self {
            x: normalize(offset_x, width),
            y: normalize(offset_y, height),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

fn normalize(offset: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        (offset / extent).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// A paint style in CSS color syntax, e.g. `rgba(153,255,153,0.2)`.
///
/// Carried verbatim over the protocol; the engine parses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorSpec(pub String);

impl ColorSpec {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColorSpec {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl std::fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `setStateFillStyles` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillStyleEntry {
    pub state: i32,
    pub style: ColorSpec,
}

impl FillStyleEntry {
    pub fn new(state: i32, style: impl Into<ColorSpec>) -> Self {
        Self {
            state,
            style: style.into(),
        }
    }
}

/// One `setShapeStates` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStateEntry {
    #[serde(rename = "shapeId")]
    pub shape_id: ShapeId,
    pub state: i32,
}

impl ShapeStateEntry {
    pub fn new(shape_id: impl Into<ShapeId>, state: i32) -> Self {
        Self {
            shape_id: shape_id.into(),
            state,
        }
    }
}
