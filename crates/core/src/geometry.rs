//! Path outlines: SVG path data flattened into closed rings of points.

use svgtypes::{SimplePathSegment, SimplifyingPathParser};

/// Line segments used to approximate one Bézier curve.
const CURVE_STEPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds, used to reject points before the winding test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// A filled region made of one or more closed rings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    rings: Vec<Vec<Point>>,
    bounds: Option<Bounds>,
}

impl Outline {
    /// Flatten SVG path data. Relative commands, `H`/`V`, arcs and smooth
    /// curves are resolved by the simplifying parser; parsing stops at the
    /// first malformed segment and keeps what came before it.
    pub fn from_path_data(data: &str) -> Self {
        let mut rings = Vec::new();
        let mut ring: Vec<Point> = Vec::new();
        let mut cursor = Point::new(0.0, 0.0);

        for segment in SimplifyingPathParser::from(data).map_while(Result::ok) {
            match segment {
                SimplePathSegment::MoveTo { x, y } => {
                    finish_ring(&mut rings, &mut ring);
                    cursor = Point::new(x, y);
                    ring.push(cursor);
                }
                SimplePathSegment::LineTo { x, y } => {
                    cursor = Point::new(x, y);
                    ring.push(cursor);
                }
                SimplePathSegment::Quadratic { x1, y1, x, y } => {
                    let (c, end) = (Point::new(x1, y1), Point::new(x, y));
                    for i in 1..=CURVE_STEPS {
                        let t = i as f64 / CURVE_STEPS as f64;
                        ring.push(quadratic(cursor, c, end, t));
                    }
                    cursor = end;
                }
                SimplePathSegment::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => {
                    let (c1, c2, end) = (Point::new(x1, y1), Point::new(x2, y2), Point::new(x, y));
                    for i in 1..=CURVE_STEPS {
                        let t = i as f64 / CURVE_STEPS as f64;
                        ring.push(cubic(cursor, c1, c2, end, t));
                    }
                    cursor = end;
                }
                SimplePathSegment::ClosePath => {
                    let start = ring.first().copied().unwrap_or(cursor);
                    finish_ring(&mut rings, &mut ring);
                    cursor = start;
                    ring.push(cursor);
                }
            }
        }
        finish_ring(&mut rings, &mut ring);

        let bounds = bounds_of(&rings);
        Self { rings, bounds }
    }

    pub fn rings(&self) -> &[Vec<Point>] {
        &self.rings
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Nonzero winding rule, matching the canvas `isPointInPath` default.
    pub fn contains(&self, p: Point) -> bool {
        match self.bounds {
            Some(bounds) if bounds.contains(p) => {
                self.rings.iter().map(|ring| winding_number(ring, p)).sum::<i32>() != 0
            }
            _ => false,
        }
    }

    /// Shortest distance from `p` to any edge of any ring.
    pub fn distance_to_edge(&self, p: Point) -> f64 {
        self.rings
            .iter()
            .flat_map(|ring| edges(ring))
            .map(|(a, b)| distance_to_segment(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }
}

fn finish_ring(rings: &mut Vec<Vec<Point>>, ring: &mut Vec<Point>) {
    if ring.len() > 1 {
        rings.push(std::mem::take(ring));
    } else {
        ring.clear();
    }
}

fn bounds_of(rings: &[Vec<Point>]) -> Option<Bounds> {
    let mut points = rings.iter().flatten();
    let first = *points.next()?;
    let mut bounds = Bounds {
        min: first,
        max: first,
    };
    for p in points {
        bounds.min.x = bounds.min.x.min(p.x);
        bounds.min.y = bounds.min.y.min(p.y);
        bounds.max.x = bounds.max.x.max(p.x);
        bounds.max.y = bounds.max.y.max(p.y);
    }
    Some(bounds)
}

/// Ring edges including the implicit closing edge.
fn edges(ring: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
}

fn winding_number(ring: &[Point], p: Point) -> i32 {
    let mut winding = 0;
    for (a, b) in edges(ring) {
        if a.y <= p.y {
            if b.y > p.y && side(a, b, p) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side(a, b, p) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Positive when `p` lies left of the directed line `a → b`.
fn side(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

fn quadratic(p0: Point, c: Point, p1: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    Point::new(
        mt * mt * p0.x + 2.0 * mt * t * c.x + t * t * p1.x,
        mt * mt * p0.y + 2.0 * mt * t * c.y + t * t * p1.y,
    )
}

fn cubic(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let (a, b, c, d) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}
