use floormap_protocol::{ColorSpec, RelPos, ShapeId};
use thiserror::Error;

use crate::map::{FloorMap, MapError, parse_map};
use crate::paint::{Frame, PaintCommand, Surface};
use crate::style::{Color, StyleTable};

const OUTLINE_WIDTH: f64 = 1.0;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("map: {0}")]
    Map(#[from] MapError),
    #[error("invalid color {0:?}")]
    InvalidColor(String),
}

/// What the render worker needs from a map engine.
pub trait RenderingEngine: Send {
    /// Parse the map description. Called once, before anything else.
    fn load_map(&mut self, description: &str) -> Result<(), EngineError>;

    /// Pure hit test: the shape at `pos`, if any.
    fn shape_at(&self, pos: RelPos) -> Option<ShapeId>;

    /// Paint one frame for the pointer at `pos`.
    fn paint_frame<S: Surface + ?Sized>(&self, surface: &mut S, pos: RelPos);

    /// Takes effect on the next `paint_frame`.
    fn set_fill_style(&mut self, state: i32, style: &ColorSpec) -> Result<(), EngineError>;

    /// Takes effect on the next `paint_frame`.
    fn set_shape_state(&mut self, shape_id: ShapeId, state: i32);
}

/// The SVG floor-plan engine.
#[derive(Debug, Default)]
pub struct MapEngine {
    map: Option<FloorMap>,
    styles: StyleTable,
}

impl MapEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self) -> Option<&FloorMap> {
        self.map.as_ref()
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn set_hover_style(&mut self, style: &ColorSpec) -> Result<(), EngineError> {
        self.styles.set_hover(parse_color(style)?);
        Ok(())
    }

    pub fn set_default_style(&mut self, style: &ColorSpec) -> Result<(), EngineError> {
        self.styles.set_default(parse_color(style)?);
        Ok(())
    }

    /// Build the frame for `pos` without painting it. `None` before a map is
    /// loaded.
    ///
    /// Backdrop outlines come first, then each shape's fill and outline in
    /// document order. The shape under the pointer gets the hover fill.
    pub fn frame(&self, pos: RelPos) -> Option<Frame<'_>> {
        let map = self.map.as_ref()?;
        let point = map.view_box.to_map(pos);
        let mut commands = Vec::with_capacity(map.backdrop.len() + map.shapes.len() * 2);

        for outline in &map.backdrop {
            commands.push(PaintCommand::Stroke {
                outline,
                color: Color::BLACK,
                width: OUTLINE_WIDTH,
            });
        }
        for shape in &map.shapes {
            let color = if shape.outline.contains(point) {
                self.styles.hover()
            } else {
                self.styles.fill_for(&shape.id)
            };
            commands.push(PaintCommand::Fill {
                outline: &shape.outline,
                color,
                shape: Some(&shape.id),
            });
            commands.push(PaintCommand::Stroke {
                outline: &shape.outline,
                color: Color::BLACK,
                width: OUTLINE_WIDTH,
            });
        }

        Some(Frame {
            view_box: map.view_box,
            commands,
        })
    }
}

impl RenderingEngine for MapEngine {
    fn load_map(&mut self, description: &str) -> Result<(), EngineError> {
        self.map = Some(parse_map(description)?);
        Ok(())
    }

    fn shape_at(&self, pos: RelPos) -> Option<ShapeId> {
        let map = self.map.as_ref()?;
        map.shape_at(pos).map(|shape| shape.id.clone())
    }

    fn paint_frame<S: Surface + ?Sized>(&self, surface: &mut S, pos: RelPos) {
        if let Some(frame) = self.frame(pos) {
            surface.present(&frame);
        }
    }

    fn set_fill_style(&mut self, state: i32, style: &ColorSpec) -> Result<(), EngineError> {
        self.styles.set_fill_style(state, parse_color(style)?);
        Ok(())
    }

    fn set_shape_state(&mut self, shape_id: ShapeId, state: i32) {
        self.styles.set_shape_state(shape_id, state);
    }
}

fn parse_color(style: &ColorSpec) -> Result<Color, EngineError> {
    Color::parse(style.as_str()).ok_or_else(|| EngineError::InvalidColor(style.0.clone()))
}
