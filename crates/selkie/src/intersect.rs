//! Rectangle boundary intersection for cluster nodes.

use crate::model::{NodeGeometry, Point};

/// Returns where the line from the rectangle's center to `point` crosses its border.
///
/// A point at the exact center resolves to the midpoint of the right-hand side.
pub fn intersect_rect(node: &NodeGeometry, point: Point) -> Point {
    let x = node.x;
    let y = node.y;
    let dx = point.x - x;
    let dy = point.y - y;
    let mut w = node.width / 2.0;
    let mut h = node.height / 2.0;

    let (sx, sy) = if dy.abs() * w > dx.abs() * h {
        if dy < 0.0 {
            h = -h;
        }
        let sx = if dy == 0.0 { 0.0 } else { (h * dx) / dy };
        (sx, h)
    } else {
        if dx < 0.0 {
            w = -w;
        }
        let sy = if dx == 0.0 { 0.0 } else { (w * dy) / dx };
        (w, sy)
    };

    Point {
        x: x + sx,
        y: y + sy,
    }
}
