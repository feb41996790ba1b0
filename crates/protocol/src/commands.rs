use serde::{Deserialize, Serialize};

use crate::shape_id::ShapeId;
use crate::types::{FillStyleEntry, RelPos, ShapeStateEntry};

/// A command sent from the main context to the render worker.
///
/// `S` is the drawing surface type. `SetCanvas` moves the surface into the
/// message, so the sender gives up its handle when it sends it.
pub enum WorkerCommand<S> {
    /// Bind the drawing surface. Only the first one is honored.
    SetCanvas(S),
    /// Merge fill styles into the state → style table.
    SetStateFillStyles(Vec<FillStyleEntry>),
    /// Merge states into the shape → state table.
    SetShapeStates(Vec<ShapeStateEntry>),
    /// Repaint for the pointer position, fading when the hovered shape changed.
    /// No reply.
    RenderForRelPos(RelPos),
    /// Hit test a click. Replies with `HoveredShape` only on a hit.
    EvaluateClick(RelPos),
}

impl<S> WorkerCommand<S> {
    /// Wire name of the command, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            WorkerCommand::SetCanvas(_) => "setCanvas",
            WorkerCommand::SetStateFillStyles(_) => "setStateFillStyles",
            WorkerCommand::SetShapeStates(_) => "setShapeStates",
            WorkerCommand::RenderForRelPos(_) => "renderForRelPos",
            WorkerCommand::EvaluateClick(_) => "evaluateClick",
        }
    }
}

impl<S> std::fmt::Debug for WorkerCommand<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerCommand::SetCanvas(_) => f.write_str("SetCanvas(..)"),
            WorkerCommand::SetStateFillStyles(entries) => {
                f.debug_tuple("SetStateFillStyles").field(entries).finish()
            }
            WorkerCommand::SetShapeStates(entries) => {
                f.debug_tuple("SetShapeStates").field(entries).finish()
            }
            WorkerCommand::RenderForRelPos(pos) => {
                f.debug_tuple("RenderForRelPos").field(pos).finish()
            }
            WorkerCommand::EvaluateClick(pos) => f.debug_tuple("EvaluateClick").field(pos).finish(),
        }
    }
}

/// A message sent from the render worker back to the main context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum WorkerReply {
    /// The map is loaded; sent exactly once, before anything else.
    Ready,
    /// A click hit this shape.
    HoveredShape {
        #[serde(rename = "shapeId")]
        shape_id: ShapeId,
    },
}

/// The serializable subset of [`WorkerCommand`].
///
/// `setCanvas` has no wire form: a surface is transferred, never copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum WireCommand {
    SetStateFillStyles {
        #[serde(rename = "fillStyles")]
        fill_styles: Vec<FillStyleEntry>,
    },
    SetShapeStates {
        #[serde(rename = "shapeStates")]
        shape_states: Vec<ShapeStateEntry>,
    },
    RenderForRelPos {
        #[serde(rename = "relX")]
        rel_x: f64,
        #[serde(rename = "relY")]
        rel_y: f64,
    },
    EvaluateClick {
        #[serde(rename = "relX")]
        rel_x: f64,
        #[serde(rename = "relY")]
        rel_y: f64,
    },
}

impl<S> From<WireCommand> for WorkerCommand<S> {
    fn from(wire: WireCommand) -> Self {
        match wire {
            WireCommand::SetStateFillStyles { fill_styles } => {
                WorkerCommand::SetStateFillStyles(fill_styles)
            }
            WireCommand::SetShapeStates { shape_states } => {
                WorkerCommand::SetShapeStates(shape_states)
            }
            WireCommand::RenderForRelPos { rel_x, rel_y } => {
                WorkerCommand::RenderForRelPos(RelPos::new(rel_x, rel_y))
            }
            WireCommand::EvaluateClick { rel_x, rel_y } => {
                WorkerCommand::EvaluateClick(RelPos::new(rel_x, rel_y))
            }
        }
    }
}

/// Decode one JSON wire message.
///
/// Unknown commands and payloads with missing fields are errors; the
/// protocol has no negative acknowledgement, so callers drop them.
pub fn decode_command(text: &str) -> Result<WireCommand, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn encode_reply(reply: &WorkerReply) -> Result<String, serde_json::Error> {
    serde_json::to_string(reply)
}
