use floormap_protocol::ShapeId;

use crate::geometry::Outline;
use crate::map::ViewBox;
use crate::style::Color;

/// A single paint instruction, in view box coordinates.
///
/// Surfaces consume a frame's commands in order.
#[derive(Debug, Clone, Copy)]
pub enum PaintCommand<'a> {
    /// Fill an outline. `shape` is set for interactive shapes.
    Fill {
        outline: &'a Outline,
        color: Color,
        shape: Option<&'a ShapeId>,
    },
    /// Stroke an outline's edges.
    Stroke {
        outline: &'a Outline,
        color: Color,
        width: f64,
    },
}

/// One painted frame.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub view_box: ViewBox,
    pub commands: Vec<PaintCommand<'a>>,
}

/// A paint target. Owned by exactly one context at a time.
pub trait Surface: Send {
    /// Paint a frame on top of the current contents.
    fn present(&mut self, frame: &Frame<'_>);
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn present(&mut self, frame: &Frame<'_>) {
        (**self).present(frame);
    }
}
