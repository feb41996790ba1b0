//! Cell raster surface.
//!
//! Every frame starts from the background, like a canvas whose size is
//! reset before drawing, so repainting the same frame gives the same cells.
//! Fills and strokes within a frame composite source-over.

use crate::geometry::Point;
use crate::map::ViewBox;
use crate::paint::{Frame, PaintCommand, Surface};
use crate::style::Color;

#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    background: Color,
    cells: Vec<Color>,
}

impl Raster {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Self {
            width,
            height,
            background,
            cells: vec![background; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x).copied()
        } else {
            None
        }
    }

    /// Resize, resetting every cell to the background. No-op when the size
    /// is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height, self.background);
        }
    }

    /// Center of a cell in view box coordinates.
    fn sample_point(&self, view_box: &ViewBox, x: usize, y: usize) -> Point {
        Point::new(
            view_box.x + (x as f64 + 0.5) / self.width as f64 * view_box.w,
            view_box.y + (y as f64 + 0.5) / self.height as f64 * view_box.h,
        )
    }
}

impl Surface for Raster {
    fn present(&mut self, frame: &Frame<'_>) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        self.cells.fill(self.background);
        let vb = frame.view_box;
        // A stroke covers the cells its edge passes through.
        let half_cell = 0.5 * (vb.w / self.width as f64).max(vb.h / self.height as f64);

        for y in 0..self.height {
            for x in 0..self.width {
                let p = self.sample_point(&vb, x, y);
                let idx = y * self.width + x;
                for cmd in &frame.commands {
                    match cmd {
                        PaintCommand::Fill { outline, color, .. } => {
                            if outline.contains(p) {
                                self.cells[idx] = color.over(self.cells[idx]);
                            }
                        }
                        PaintCommand::Stroke {
                            outline,
                            color,
                            width,
                        } => {
                            if outline.distance_to_edge(p) <= half_cell.max(width / 2.0) {
                                self.cells[idx] = color.over(self.cells[idx]);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Outline;

    const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    fn frame_with(outline: &Outline, color: Color) -> Frame<'_> {
        Frame {
            view_box: ViewBox {
                x: 0.0,
                y: 0.0,
                w: 100.0,
                h: 100.0,
            },
            commands: vec![PaintCommand::Fill {
                outline,
                color,
                shape: None,
            }],
        }
    }

    #[test]
    fn repaint_is_stable() {
        let outline = Outline::from_path_data("M0 0 H50 V100 H0 Z");
        let red = Color::rgba(1.0, 0.0, 0.0, 0.2);
        let frame = frame_with(&outline, red);
        let mut raster = Raster::new(10, 10, WHITE);

        raster.present(&frame);
        let first = raster.clone();
        for _ in 0..9 {
            raster.present(&frame);
        }

        assert_eq!(raster.cells, first.cells);
        let g = raster.cell(2, 5).map(|c| c.g).unwrap_or_default();
        assert!((g - 0.8).abs() < 1e-4);
        // Outside the shape nothing changes.
        assert_eq!(raster.cell(8, 5), Some(WHITE));
    }

    #[test]
    fn new_frame_replaces_previous_one() {
        let left = Outline::from_path_data("M0 0 H50 V100 H0 Z");
        let right = Outline::from_path_data("M50 0 H100 V100 H50 Z");
        let mut raster = Raster::new(10, 10, WHITE);

        raster.present(&frame_with(&left, Color::BLACK));
        raster.present(&frame_with(&right, Color::BLACK));
        assert_eq!(raster.cell(2, 5), Some(WHITE));
        assert_eq!(raster.cell(8, 5), Some(Color::BLACK));
    }

    #[test]
    fn fills_in_one_frame_stack() {
        let outline = Outline::from_path_data("M0 0 H100 V100 H0 Z");
        let half_black = Color::rgba(0.0, 0.0, 0.0, 0.5);
        let frame = Frame {
            view_box: frame_with(&outline, half_black).view_box,
            commands: vec![
                PaintCommand::Fill {
                    outline: &outline,
                    color: half_black,
                    shape: None,
                };
                2
            ],
        };
        let mut raster = Raster::new(4, 4, WHITE);
        raster.present(&frame);
        let r = raster.cell(1, 1).map(|c| c.r).unwrap_or_default();
        assert!((r - 0.25).abs() < 1e-4);
    }

    #[test]
    fn strokes_mark_edges_only() {
        let outline = Outline::from_path_data("M0 0 H100 V100 H0 Z");
        let frame = Frame {
            view_box: ViewBox {
                x: 0.0,
                y: 0.0,
                w: 100.0,
                h: 100.0,
            },
            commands: vec![PaintCommand::Stroke {
                outline: &outline,
                color: Color::BLACK,
                width: 1.0,
            }],
        };
        let mut raster = Raster::new(10, 10, WHITE);
        raster.present(&frame);
        assert_eq!(raster.cell(0, 0), Some(Color::BLACK));
        assert_eq!(raster.cell(5, 5), Some(WHITE));
    }

    #[test]
    fn resize_resets_cells() {
        let outline = Outline::from_path_data("M0 0 H100 V100 H0 Z");
        let mut raster = Raster::new(4, 4, WHITE);
        raster.present(&frame_with(&outline, Color::BLACK));
        raster.resize(4, 4);
        assert_eq!(raster.cell(1, 1), Some(Color::BLACK));
        raster.resize(6, 3);
        assert_eq!((raster.width(), raster.height()), (6, 3));
        assert_eq!(raster.cell(1, 1), Some(WHITE));
        assert_eq!(raster.cell(6, 0), None);
    }
}
