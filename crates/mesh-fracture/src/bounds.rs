//! Axis-aligned bounding volume used to place random cutting planes.

use nalgebra::{Point3, Vector3};
use rand::Rng;

use crate::{FractureError, FractureResult};

/// An axis-aligned box given by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    min: Point3<f32>,
    max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from its two corners. No ordering is enforced here; see
    /// [`Aabb::validate`].
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Computes the tightest box around the given points.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f32>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    #[inline]
    pub fn min(&self) -> Point3<f32> {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point3<f32> {
        self.max
    }

    /// Returns the center point of the box.
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the edge lengths of the box along each axis.
    pub fn extents(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Returns `true` if the point is inside the box or on its boundary.
    pub fn contains(&self, point: &Point3<f32>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Returns `true` if all coordinates are finite and `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|i| {
            self.min[i].is_finite() && self.max[i].is_finite() && self.min[i] <= self.max[i]
        })
    }

    /// Checks [`Aabb::is_valid`], returning [`FractureError::InvalidBounds`] otherwise.
    pub fn validate(&self) -> FractureResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(FractureError::InvalidBounds)
        }
    }

    /// Scales the box component-wise about the origin.
    ///
    /// Negative factors mirror the box, so the corners are re-sorted afterwards.
    pub fn scaled(&self, scale: &Vector3<f32>) -> Self {
        let a = Point3::from(self.min.coords.component_mul(scale));
        let b = Point3::from(self.max.coords.component_mul(scale));
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Draws a point uniformly from inside the box.
    ///
    /// The box must be valid; flat axes (`min == max`) are allowed.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3<f32> {
        Point3::new(
            rng.random_range(self.min.x..=self.max.x),
            rng.random_range(self.min.y..=self.max.y),
            rng.random_range(self.min.z..=self.max.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn from_points_empty() {
        let points: Vec<Point3<f32>> = vec![];
        assert!(Aabb::from_points(&points).is_none());
    }

    #[test]
    fn from_points_encloses_all() {
        let points = vec![
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(-1.0, 3.0, 0.0),
            Point3::new(0.0, 0.0, 4.0),
        ];
        let bounds = Aabb::from_points(&points).unwrap();
        assert_eq!(bounds.min(), Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max(), Point3::new(1.0, 3.0, 4.0));
        assert!(points.iter().all(|p| bounds.contains(p)));
    }

    #[test]
    fn inverted_box_is_rejected() {
        let bounds = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0));
        assert_eq!(bounds.validate(), Err(FractureError::InvalidBounds));

        let nan = Aabb::new(Point3::new(f32::NAN, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(!nan.is_valid());
    }

    #[test]
    fn scaled_with_mirror_keeps_order() {
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        let scaled = bounds.scaled(&Vector3::new(2.0, -1.0, 1.0));
        assert_eq!(scaled.min(), Point3::new(0.0, -2.0, 0.0));
        assert_eq!(scaled.max(), Point3::new(2.0, 0.0, 3.0));
        assert!(scaled.is_valid());
    }

    #[test]
    fn samples_stay_inside() {
        let bounds = Aabb::new(Point3::new(-1.0, 0.0, 2.0), Point3::new(1.0, 0.0, 5.0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(bounds.contains(&bounds.sample_point(&mut rng)));
        }
    }
}
