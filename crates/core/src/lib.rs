//! Floor-plan map engine: parses an SVG map, hit-tests normalized positions
//! against its interactive shapes, and paints frames onto a [`Surface`].

pub mod engine;
pub mod geometry;
pub mod map;
pub mod paint;
pub mod raster;
pub mod style;
pub mod svg;

pub use engine::{EngineError, MapEngine, RenderingEngine};
pub use map::{FloorMap, MapError, Shape, ViewBox, parse_map};
pub use paint::{Frame, PaintCommand, Surface};
pub use raster::Raster;
pub use style::{Color, DEFAULT_FILL_STYLE, HOVER_FILL_STYLE};
pub use svg::SvgSurface;
