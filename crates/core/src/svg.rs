//! SVG surface: renders each painted frame as a standalone SVG document.

use std::fmt::Write as _;

use crate::geometry::Outline;
use crate::paint::{Frame, PaintCommand, Surface};
use crate::style::Color;

/// Render a frame as an SVG document string.
pub fn render_svg(frame: &Frame<'_>) -> String {
    let vb = frame.view_box;
    let mut svg = String::with_capacity(frame.commands.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
        vb.x, vb.y, vb.w, vb.h, vb.w, vb.h,
    );

    for cmd in &frame.commands {
        match cmd {
            PaintCommand::Fill {
                outline,
                color,
                shape,
            } => {
                let _ = write!(
                    svg,
                    r#"<path d="{}" fill="{}" fill-opacity="{}""#,
                    path_data(outline),
                    rgb(*color),
                    opacity(*color),
                );
                if let Some(id) = shape {
                    let _ = write!(svg, r#" data-shape="{}""#, escape_xml(id));
                }
                svg.push_str("/>");
            }
            PaintCommand::Stroke {
                outline,
                color,
                width,
            } => {
                let _ = write!(
                    svg,
                    r#"<path d="{}" fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{width}"/>"#,
                    path_data(outline),
                    rgb(*color),
                    opacity(*color),
                );
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Keeps the most recent frame as an SVG document.
#[derive(Debug, Default)]
pub struct SvgSurface {
    document: String,
    frames: u64,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last presented frame; empty before the first paint.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Surface for SvgSurface {
    fn present(&mut self, frame: &Frame<'_>) {
        self.document = render_svg(frame);
        self.frames += 1;
    }
}

fn path_data(outline: &Outline) -> String {
    let mut d = String::new();
    for ring in outline.rings() {
        for (i, p) in ring.iter().enumerate() {
            let op = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{op}{} {} ", p.x, p.y);
        }
        d.push('Z');
    }
    d
}

fn rgb(color: Color) -> String {
    let (r, g, b) = color.to_rgb8();
    format!("rgb({r},{g},{b})")
}

fn opacity(color: Color) -> String {
    format!("{:.3}", color.a.clamp(0.0, 1.0))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::ViewBox;
    use floormap_protocol::ShapeId;

    fn square() -> Outline {
        Outline::from_path_data("M0 0 H10 V10 H0 Z")
    }

    #[test]
    fn basic_svg_output() {
        let outline = square();
        let id = ShapeId::from("dynamic_desk");
        let frame = Frame {
            view_box: ViewBox {
                x: 0.0,
                y: 0.0,
                w: 800.0,
                h: 600.0,
            },
            commands: vec![PaintCommand::Fill {
                outline: &outline,
                color: Color::rgba(1.0, 0.6, 0.6, 0.2),
                shape: Some(&id),
            }],
        };
        let svg = render_svg(&frame);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"viewBox="0 0 800 600""#));
        assert!(svg.contains(r#"data-shape="dynamic_desk""#));
        assert!(svg.contains("rgb(255,153,153)"));
        assert!(svg.contains(r#"fill-opacity="0.200""#));
        assert!(svg.contains("M0 0 L10 0 L10 10 L0 10 Z"));
    }

    #[test]
    fn escapes_shape_ids() {
        let outline = square();
        let id = ShapeId::from("dynamic_<a&b>");
        let frame = Frame {
            view_box: ViewBox {
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 10.0,
            },
            commands: vec![PaintCommand::Fill {
                outline: &outline,
                color: Color::BLACK,
                shape: Some(&id),
            }],
        };
        assert!(render_svg(&frame).contains("dynamic_&lt;a&amp;b&gt;"));
    }

    #[test]
    fn surface_counts_frames() {
        let outline = square();
        let frame = Frame {
            view_box: ViewBox {
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 10.0,
            },
            commands: vec![PaintCommand::Stroke {
                outline: &outline,
                color: Color::BLACK,
                width: 1.0,
            }],
        };
        let mut surface = SvgSurface::new();
        assert!(surface.document().is_empty());
        surface.present(&frame);
        surface.present(&frame);
        assert_eq!(surface.frames(), 2);
        assert!(surface.document().contains(r#"fill="none""#));
    }
}
