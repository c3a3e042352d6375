//! Cutting plane representation and point queries.

use nalgebra::{Point3, Vector3};

/// Points closer than this are treated as the same position when stitching
/// cut boundaries back together.
pub const POSITION_EPSILON: f32 = 1e-5;

/// A plane in 3D space, represented as `normal · point = offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f32>,
    offset: f32,
}

impl Plane3D {
    /// Creates a plane from a point on the plane and a normal vector.
    /// The normal will be normalized automatically.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        let norm = normal.norm();
        assert!(norm > f32::EPSILON, "Plane normal cannot be zero");
        let unit_normal = normal / norm;
        let offset = unit_normal.dot(&point.coords);
        Self {
            normal: unit_normal,
            offset,
        }
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is above (same side as normal)
    /// - Negative: point is below (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Returns `true` if the point is on the plane or on the normal's side of it.
    ///
    /// There is no separate "on plane" case, so every vertex of a mesh lands
    /// on exactly one side of a cut.
    #[inline]
    pub fn is_above(&self, point: Point3<f32>) -> bool {
        self.signed_distance(point) >= 0.0
    }

    /// Computes where the line through `start` and `end` meets the plane.
    ///
    /// Meant for edges whose endpoints lie on opposite sides, in which case
    /// the result lies on the segment. Degenerate input never fails:
    /// - coinciding endpoints return `end` unchanged
    /// - a line parallel to the plane returns `start`
    pub fn intersect_line(&self, start: Point3<f32>, end: Point3<f32>) -> Point3<f32> {
        if start == end {
            return end;
        }

        let start_distance = self.signed_distance(start);
        let end_distance = self.signed_distance(end);
        let denom = start_distance - end_distance;

        if denom.abs() < f32::EPSILON {
            return start;
        }

        let t = (start_distance / denom).clamp(0.0, 1.0);
        start + (end - start) * t
    }
}

/// Returns `true` if two points are within [`POSITION_EPSILON`] of each other.
#[inline]
pub fn same_position(a: &Point3<f32>, b: &Point3<f32>) -> bool {
    (a - b).norm_squared() < POSITION_EPSILON * POSITION_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normal_is_normalized() {
        let plane =
            Plane3D::from_point_and_normal(Point3::new(1.0, 0.0, 2.0), Vector3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(plane.normal().norm(), 1.0);
        assert_relative_eq!(plane.offset(), 2.0);
    }

    #[test]
    fn point_on_plane_counts_as_above() {
        let plane = Plane3D::from_point_and_normal(Point3::new(0.0, 0.0, 0.5), Vector3::z());
        assert!(plane.is_above(Point3::new(3.0, -1.0, 0.5)));
        assert!(plane.is_above(Point3::new(0.0, 0.0, 0.6)));
        assert!(!plane.is_above(Point3::new(0.0, 0.0, 0.4)));
    }

    #[test]
    fn intersect_line_crossing_edge() {
        let plane = Plane3D::from_point_and_normal(Point3::new(0.0, 0.0, 0.25), Vector3::z());
        let hit = plane.intersect_line(Point3::new(1.0, 2.0, 1.0), Point3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(hit.x, 1.0);
        assert_relative_eq!(hit.y, 2.0);
        assert_relative_eq!(hit.z, 0.25);
    }

    #[test]
    fn intersect_line_is_symmetric() {
        let plane =
            Plane3D::from_point_and_normal(Point3::new(0.3, 0.0, 0.0), Vector3::new(1.0, 1.0, 0.0));
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(-1.0, 0.5, 1.0);
        let ab = plane.intersect_line(a, b);
        let ba = plane.intersect_line(b, a);
        assert!(same_position(&ab, &ba));
        assert_relative_eq!(plane.signed_distance(ab), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn intersect_line_degenerate_edge_returns_endpoint() {
        let plane = Plane3D::from_point_and_normal(Point3::origin(), Vector3::y());
        let p = Point3::new(0.5, 0.0, -2.0);
        assert_eq!(plane.intersect_line(p, p), p);
    }
}
