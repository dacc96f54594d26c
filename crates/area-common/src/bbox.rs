//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A projected bounding box.
///
/// AREA grids are georeferenced in projected meters, so all coordinates
/// here are meters in the radar network's projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build the smallest box covering two arbitrary corner points.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_orders_coordinates() {
        let bbox = BoundingBox::from_corners((500.0, -200.0), (-100.0, 300.0));
        assert_eq!(bbox.min_x, -100.0);
        assert_eq!(bbox.min_y, -200.0);
        assert_eq!(bbox.max_x, 500.0);
        assert_eq!(bbox.max_y, 300.0);
        assert_eq!(bbox.width(), 600.0);
        assert_eq!(bbox.height(), 500.0);
    }

    #[test]
    fn test_contains_point() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(bbox.contains_point(5.0, 5.0));
        assert!(bbox.contains_point(10.0, 0.0));
        assert!(!bbox.contains_point(10.1, 5.0));
    }
}
