//! Hit boxes and container offset tracking

use tracing::debug;

use crate::registry::Point;
use crate::types::{Offset, PagePosition, PointId};

/// Axis-aligned hit box in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Bounds {
    /// Strict containment: a position on any edge is outside
    pub fn contains(&self, position: PagePosition) -> bool {
        self.x1 < position.x && position.x < self.x2 && self.y1 < position.y && position.y < self.y2
    }
}

/// Square of side `2 * radius` centered on the point's page position
pub fn compute_bounds(point: &Point, offset: Offset, radius: f64) -> Bounds {
    let center_x = point.x + offset.left;
    let center_y = point.y + offset.top;
    Bounds {
        x1: center_x - radius,
        y1: center_y - radius,
        x2: center_x + radius,
        y2: center_y + radius,
    }
}

/// Cached container offset plus one hit box per point, indexed by point id
#[derive(Debug, Clone)]
pub struct GeometryTracker {
    offset: Offset,
    radius: f64,
    bounds: Vec<Bounds>,
}

impl GeometryTracker {
    pub fn new(offset: Offset, radius: f64, points: &[Point]) -> Self {
        let mut tracker = Self {
            offset,
            radius,
            bounds: Vec::with_capacity(points.len()),
        };
        tracker.recompute(points);
        tracker
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn bounds(&self, id: PointId) -> Option<Bounds> {
        self.bounds.get(id).copied()
    }

    /// Take a fresh offset measurement; recompute every box if it drifted
    ///
    /// Returns whether anything was recomputed.
    pub fn refresh(&mut self, measured: Offset, points: &[Point]) -> bool {
        if measured.top == self.offset.top && measured.left == self.offset.left {
            return false;
        }
        debug!(
            old_top = self.offset.top,
            old_left = self.offset.left,
            top = measured.top,
            left = measured.left,
            "Container offset changed, recomputing hit boxes"
        );
        self.offset = measured;
        self.recompute(points);
        true
    }

    fn recompute(&mut self, points: &[Point]) {
        self.bounds = points
            .iter()
            .map(|point| compute_bounds(point, self.offset, self.radius))
            .collect();
    }

    /// Whether the pointer is strictly inside the given point's box
    pub fn hit(&self, id: PointId, position: PagePosition) -> bool {
        self.bounds(id).is_some_and(|bounds| bounds.contains(position))
    }

    /// First point, in registry order, whose box contains the pointer
    pub fn first_hit(&self, position: PagePosition) -> Option<PointId> {
        self.bounds.iter().position(|bounds| bounds.contains(position))
    }
}
