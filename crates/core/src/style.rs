use std::collections::HashMap;
use std::str::FromStr;

use floormap_protocol::ShapeId;

/// Fill for the shape under the pointer.
pub const HOVER_FILL_STYLE: &str = "rgba(107,148,179,0.2)";
/// Fill for shapes without a state, or whose state has no style.
pub const DEFAULT_FILL_STYLE: &str = "rgba(255,255,255,0.2)";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS color (`rgba(...)`, `#rrggbb`, named colors).
    /// Out-of-range channels are clamped.
    pub fn parse(spec: &str) -> Option<Self> {
        let c = svgtypes::Color::from_str(spec).ok()?;
        Some(Self::rgba(
            f32::from(c.red) / 255.0,
            f32::from(c.green) / 255.0,
            f32::from(c.blue) / 255.0,
            f32::from(c.alpha) / 255.0,
        ))
    }

    /// Source-over compositing of `self` onto `dst`.
    pub fn over(self, dst: Color) -> Color {
        let a = self.a;
        Color {
            r: self.r * a + dst.r * (1.0 - a),
            g: self.g * a + dst.g * (1.0 - a),
            b: self.b * a + dst.b * (1.0 - a),
            a: a + dst.a * (1.0 - a),
        }
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

/// The two configuration tables the engine paints from: state → fill and
/// shape → state. Both merge on update; the last write for a key wins and
/// nothing is ever removed.
#[derive(Debug, Clone)]
pub struct StyleTable {
    fill_styles: HashMap<i32, Color>,
    shape_states: HashMap<ShapeId, i32>,
    hover: Color,
    default: Color,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            fill_styles: HashMap::new(),
            shape_states: HashMap::new(),
            hover: Color::parse(HOVER_FILL_STYLE).unwrap_or(Color::BLACK),
            default: Color::parse(DEFAULT_FILL_STYLE).unwrap_or(Color::BLACK),
        }
    }
}

impl StyleTable {
    pub fn set_fill_style(&mut self, state: i32, color: Color) {
        self.fill_styles.insert(state, color);
    }

    pub fn set_shape_state(&mut self, shape_id: ShapeId, state: i32) {
        self.shape_states.insert(shape_id, state);
    }

    pub fn set_hover(&mut self, color: Color) {
        self.hover = color;
    }

    pub fn set_default(&mut self, color: Color) {
        self.default = color;
    }

    pub fn state_of(&self, shape_id: &str) -> Option<i32> {
        self.shape_states.get(shape_id).copied()
    }

    pub fn fill_style(&self, state: i32) -> Option<Color> {
        self.fill_styles.get(&state).copied()
    }

    pub fn hover(&self) -> Color {
        self.hover
    }

    /// Resting fill of a shape: its state's style, else the default.
    pub fn fill_for(&self, shape_id: &str) -> Color {
        self.state_of(shape_id)
            .and_then(|state| self.fill_style(state))
            .unwrap_or(self.default)
    }
}
