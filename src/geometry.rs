//! Point and rectangle math shared by the solver backends and the route
//! extractor.

use serde::{Deserialize, Serialize};

/// 2D point with f64 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Axis-aligned node rectangle derived from solver output. Lives only for
/// the duration of one layout call, while routes are being adjusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeGeometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }
}

/// Point where a ray from the rectangle's center toward `toward` exits the
/// rectangle. The exit side is picked by comparing the ray slope against the
/// rectangle's aspect ratio; the exit coordinate is clamped to the side's
/// span. `toward` equal to the center degenerates to a horizontal ray
/// (dx = 1, dy = 0) so the projection stays well-defined for self-loops.
pub fn project_to_boundary(toward: Point, rect: &NodeGeometry) -> Point {
    let cx = rect.center_x();
    let cy = rect.center_y();
    let mut dx = toward.x - cx;
    let mut dy = toward.y - cy;
    if dx == 0.0 && dy == 0.0 {
        dx = 1.0;
        dy = 0.0;
    }

    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;

    // |dy| / |dx| vs height / width, cross-multiplied to avoid division.
    if dy.abs() * rect.width <= dx.abs() * rect.height {
        // Exits through the left or right side.
        let x = cx + half_w.copysign(dx);
        let y = cy + dy * (half_w / dx.abs());
        Point::new(x, y.clamp(rect.y, rect.y + rect.height))
    } else {
        // Exits through the top or bottom side.
        let y = cy + half_h.copysign(dy);
        let x = cx + dx * (half_h / dy.abs());
        Point::new(x.clamp(rect.x, rect.x + rect.width), y)
    }
}

/// If the segment between `points[anchor]` and `points[moved]` is shorter
/// than `min_distance`, push the moved point further out along the segment
/// direction until the distance is exactly `min_distance`. Coincident
/// endpoints leave the segment untouched (there is no direction to extend
/// along).
pub fn ensure_minimum_distance(
    points: &mut [Point],
    anchor: usize,
    moved: usize,
    min_distance: f64,
) {
    let a = points[anchor];
    let m = points[moved];
    let len = a.distance_to(m);
    if len == 0.0 || len >= min_distance {
        return;
    }
    let scale = min_distance / len;
    points[moved] = Point::new(a.x + (m.x - a.x) * scale, a.y + (m.y - a.y) * scale);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> NodeGeometry {
        NodeGeometry::new(100.0, 100.0, 200.0, 100.0)
    }

    #[test]
    fn projects_to_right_side() {
        let p = project_to_boundary(Point::new(500.0, 150.0), &rect());
        assert_eq!(p, Point::new(300.0, 150.0));
    }

    #[test]
    fn projects_to_left_side() {
        let p = project_to_boundary(Point::new(0.0, 150.0), &rect());
        assert_eq!(p, Point::new(100.0, 150.0));
    }

    #[test]
    fn projects_to_bottom_side() {
        let p = project_to_boundary(Point::new(200.0, 400.0), &rect());
        assert_eq!(p, Point::new(200.0, 200.0));
    }

    #[test]
    fn projects_to_top_side() {
        let p = project_to_boundary(Point::new(200.0, -100.0), &rect());
        assert_eq!(p, Point::new(200.0, 100.0));
    }

    #[test]
    fn diagonal_ray_stays_on_boundary() {
        let r = rect();
        let p = project_to_boundary(Point::new(400.0, 300.0), &r);
        let on_vertical = (p.x - r.x).abs() < 1e-9 || (p.x - (r.x + r.width)).abs() < 1e-9;
        let on_horizontal = (p.y - r.y).abs() < 1e-9 || (p.y - (r.y + r.height)).abs() < 1e-9;
        assert!(on_vertical || on_horizontal, "{p:?} not on boundary");
    }

    #[test]
    fn degenerate_direction_exits_right() {
        let r = rect();
        let p = project_to_boundary(r.center(), &r);
        assert_eq!(p, Point::new(300.0, 150.0));
    }

    #[test]
    fn short_segment_is_extended() {
        let mut points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        ensure_minimum_distance(&mut points, 0, 1, 24.0);
        assert_eq!(points[1], Point::new(24.0, 0.0));
        assert_eq!(points[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn long_segment_is_untouched() {
        let mut points = [Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        ensure_minimum_distance(&mut points, 0, 1, 24.0);
        assert_eq!(points[1], Point::new(100.0, 0.0));
    }

    #[test]
    fn coincident_points_are_left_alone() {
        let mut points = [Point::new(5.0, 5.0), Point::new(5.0, 5.0)];
        ensure_minimum_distance(&mut points, 0, 1, 24.0);
        assert_eq!(points[1], Point::new(5.0, 5.0));
    }
}
