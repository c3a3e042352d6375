//! Projection of cut boundaries into the cutting plane's 2D frame.

use std::collections::HashMap;
use std::f32::consts::PI;

use nalgebra::{Point2, Point3, UnitQuaternion, Vector3};

use crate::Plane3D;
use crate::loops::Loop;

/// Returns the rotation that takes the plane's normal onto +Z.
pub fn plane_rotation(plane: &Plane3D) -> UnitQuaternion<f32> {
    UnitQuaternion::rotation_between(&plane.normal(), &Vector3::z())
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI))
}

/// Maps the vertices of `boundary` into 2D coordinates within the plane.
///
/// The plane's normal is rotated onto +Z and the x/y coordinates are read
/// off, so a loop that runs clockwise when viewed from above the plane also
/// runs clockwise in the result. Only the loop's own vertices get an entry.
pub fn project_loop(
    positions: &[Point3<f32>],
    boundary: &Loop,
    plane: &Plane3D,
) -> HashMap<usize, Point2<f32>> {
    let rotation = plane_rotation(plane);
    boundary
        .to_vec()
        .into_iter()
        .map(|i| {
            let rotated = rotation * positions[i];
            (i, Point2::new(rotated.x, rotated.y))
        })
        .collect()
}
