//! Map description parsing.
//!
//! A map is an SVG document. Paths whose `id` starts with `dynamic` are the
//! interactive shapes (desks, rooms); every other path is static backdrop.

use std::str::FromStr;

use floormap_protocol::{RelPos, ShapeId};
use thiserror::Error;

use crate::geometry::{Outline, Point};

/// Prefix marking a path as an interactive shape.
pub const DYNAMIC_PREFIX: &str = "dynamic";

#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("no <svg> root element")]
    MissingRoot,
    #[error("<svg> has no viewBox attribute")]
    MissingViewBox,
    #[error("invalid viewBox {0:?}")]
    InvalidViewBox(String),
    #[error("shape {0} has no path data")]
    MissingPathData(String),
}

/// The map's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ViewBox {
    /// Map a normalized position into view box coordinates.
    pub fn to_map(&self, pos: RelPos) -> Point {
        Point::new(self.x + pos.x * self.w, self.y + pos.y * self.h)
    }
}

impl FromStr for ViewBox {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed =
            svgtypes::ViewBox::from_str(s).map_err(|_| MapError::InvalidViewBox(s.to_owned()))?;
        if parsed.w <= 0.0 || parsed.h <= 0.0 {
            return Err(MapError::InvalidViewBox(s.to_owned()));
        }
        Ok(Self {
            x: parsed.x,
            y: parsed.y,
            w: parsed.w,
            h: parsed.h,
        })
    }
}

/// An interactive shape.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ShapeId,
    pub outline: Outline,
}

#[derive(Debug, Clone)]
pub struct FloorMap {
    pub view_box: ViewBox,
    /// Interactive shapes in document order.
    pub shapes: Vec<Shape>,
    /// Static paths, drawn as outlines only.
    pub backdrop: Vec<Outline>,
}

impl FloorMap {
    /// First shape, in document order, containing the position.
    pub fn shape_at(&self, pos: RelPos) -> Option<&Shape> {
        let point = self.view_box.to_map(pos);
        self.shapes.iter().find(|shape| shape.outline.contains(point))
    }

    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id.as_str() == id)
    }
}

/// Parse an SVG map description.
pub fn parse_map(svg: &str) -> Result<FloorMap, MapError> {
    let doc = roxmltree::Document::parse(svg)?;
    let root = doc
        .descendants()
        .find(|n| n.has_tag_name("svg"))
        .ok_or(MapError::MissingRoot)?;
    let view_box: ViewBox = root
        .attribute("viewBox")
        .ok_or(MapError::MissingViewBox)?
        .parse()?;

    let mut shapes = Vec::new();
    let mut backdrop = Vec::new();
    for node in doc.descendants().filter(|n| n.has_tag_name("path")) {
        match node.attribute("id") {
            Some(id) if id.starts_with(DYNAMIC_PREFIX) => {
                let data = node
                    .attribute("d")
                    .ok_or_else(|| MapError::MissingPathData(id.to_owned()))?;
                shapes.push(Shape {
                    id: ShapeId::from(id),
                    outline: Outline::from_path_data(data),
                });
            }
            _ => {
                if let Some(data) = node.attribute("d") {
                    let outline = Outline::from_path_data(data);
                    if !outline.is_empty() {
                        backdrop.push(outline);
                    }
                }
            }
        }
    }

    Ok(FloorMap {
        view_box,
        shapes,
        backdrop,
    })
}
