//! Diagram coordinates and routing geometry.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Vertical drop of a synthesized self-loop below its anchor.
pub const SELF_LOOP_DROP: f64 = 100.0;
/// Horizontal clearance added past half the node width.
pub const SELF_LOOP_CLEARANCE: f64 = 50.0;
/// Horizontal reach used when the node's bounding box is unknown.
pub const SELF_LOOP_FALLBACK_REACH: f64 = 300.0;

/// Routing waypoints of a link on one diagram.
pub type Vertices = SmallVec<[Point; 3]>;

/// A point in diagram coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn translate(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Measured size of a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

/// Synthesizes the L-shaped route of a self-loop anchored at `anchor`.
///
/// The path drops below the node, runs right past half its width and climbs
/// back to the anchor's height. Without a known size the reach falls back to
/// [`SELF_LOOP_FALLBACK_REACH`].
pub fn self_loop_vertices(anchor: Point, size: Option<Size>) -> Vertices {
    let reach = match size {
        Some(size) => size.width / 2.0 + SELF_LOOP_CLEARANCE,
        None => SELF_LOOP_FALLBACK_REACH,
    };
    let mut vertices = Vertices::new();
    vertices.push(Point::new(anchor.x, anchor.y + SELF_LOOP_DROP));
    vertices.push(Point::new(anchor.x + reach, anchor.y + SELF_LOOP_DROP));
    vertices.push(Point::new(anchor.x + reach, anchor.y));
    vertices
}

/// Positions `count` nodes evenly on a circle around `center`.
///
/// The radius grows with the number of nodes (`200 + 50 * count`).
pub fn circle_positions(center: Point, count: usize) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let radius = 200.0 + count as f64 * 50.0;
    (0..count)
        .map(|i| {
            let angle = (i as f64 * 2.0 * std::f64::consts::PI) / count as f64;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}
