pub mod commands;
pub mod shape_id;
pub mod types;

pub use commands::{WireCommand, WorkerCommand, WorkerReply, decode_command, encode_reply};
pub use shape_id::ShapeId;
pub use types::{ColorSpec, FillStyleEntry, RelPos, ShapeStateEntry};
