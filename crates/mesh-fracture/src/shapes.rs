//! Closed primitive meshes, mainly for demos and tests.

use std::f32::consts::{PI, TAU};

use nalgebra::{Point3, Vector3};

use crate::Mesh;

impl Mesh {
    /// Creates an axis-aligned box with 8 vertices and 12 outward-facing triangles.
    pub fn cuboid(min: Point3<f32>, max: Point3<f32>) -> Self {
        let corners = vec![
            Point3::new(min.x, min.y, min.z), // 0: left-bottom-back
            Point3::new(max.x, min.y, min.z), // 1: right-bottom-back
            Point3::new(max.x, max.y, min.z), // 2: right-top-back
            Point3::new(min.x, max.y, min.z), // 3: left-top-back
            Point3::new(min.x, min.y, max.z), // 4: left-bottom-front
            Point3::new(max.x, min.y, max.z), // 5: right-bottom-front
            Point3::new(max.x, max.y, max.z), // 6: right-top-front
            Point3::new(min.x, max.y, max.z), // 7: left-top-front
        ];

        // 6 faces with counter-clockwise winding (viewed from outside)
        let faces: [[usize; 4]; 6] = [
            [4, 5, 6, 7], // front (+Z)
            [1, 0, 3, 2], // back (-Z)
            [0, 4, 7, 3], // left (-X)
            [5, 1, 2, 6], // right (+X)
            [7, 6, 2, 3], // top (+Y)
            [0, 1, 5, 4], // bottom (-Y)
        ];

        let triangles = faces
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
            .collect();

        Self {
            vertices: corners,
            triangles,
        }
    }

    /// Creates a cube of edge length `size` centered on `center`.
    pub fn cube(center: Point3<f32>, size: f32) -> Self {
        let half = Vector3::repeat(size / 2.0);
        Self::cuboid(center - half, center + half)
    }

    /// Creates a regular octahedron with its 6 vertices on the coordinate axes.
    pub fn octahedron(center: Point3<f32>, radius: f32) -> Self {
        let vertices = vec![
            center + Vector3::x() * radius,
            center - Vector3::x() * radius,
            center + Vector3::y() * radius,
            center - Vector3::y() * radius,
            center + Vector3::z() * radius,
            center - Vector3::z() * radius,
        ];
        let (px, nx, py, ny, pz, nz) = (0, 1, 2, 3, 4, 5);
        let triangles = vec![
            [px, py, pz],
            [py, nx, pz],
            [nx, ny, pz],
            [ny, px, pz],
            [py, px, nz],
            [nx, py, nz],
            [ny, nx, nz],
            [px, ny, nz],
        ];
        Self {
            vertices,
            triangles,
        }
    }

    /// Creates a latitude/longitude sphere with poles on the Z axis.
    ///
    /// `segments` is clamped to at least 3 and `rings` to at least 2.
    pub fn uv_sphere(center: Point3<f32>, radius: f32, segments: usize, rings: usize) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::with_capacity(2 + (rings - 1) * segments);
        vertices.push(center + Vector3::z() * radius);
        for r in 1..rings {
            let phi = PI * r as f32 / rings as f32;
            for s in 0..segments {
                let theta = TAU * s as f32 / segments as f32;
                let direction = Vector3::new(
                    phi.sin() * theta.cos(),
                    phi.sin() * theta.sin(),
                    phi.cos(),
                );
                vertices.push(center + direction * radius);
            }
        }
        vertices.push(center - Vector3::z() * radius);

        let top = 0;
        let bottom = vertices.len() - 1;
        let ring = |r: usize, s: usize| 1 + (r - 1) * segments + s % segments;

        let mut triangles = Vec::with_capacity(2 * segments * (rings - 1));
        for s in 0..segments {
            triangles.push([top, ring(1, s), ring(1, s + 1)]);
        }
        for r in 1..rings - 1 {
            for s in 0..segments {
                triangles.push([ring(r, s), ring(r + 1, s), ring(r + 1, s + 1)]);
                triangles.push([ring(r, s), ring(r + 1, s + 1), ring(r, s + 1)]);
            }
        }
        for s in 0..segments {
            triangles.push([bottom, ring(rings - 1, s + 1), ring(rings - 1, s)]);
        }

        Self {
            vertices,
            triangles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_cube() {
        let cube = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.triangle_count(), 12);
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(cube.surface_area(), 6.0, epsilon = 1e-6);
        assert!(cube.is_watertight());
    }

    #[test]
    fn centered_cube() {
        let cube = Mesh::cube(Point3::new(1.0, 2.0, 3.0), 2.0);
        assert_relative_eq!(cube.signed_volume(), 8.0, epsilon = 1e-5);
        let bounds = cube.bounds().unwrap();
        assert_eq!(bounds.min(), Point3::new(0.0, 1.0, 2.0));
    }

    #[test]
    fn octahedron_is_closed() {
        let mesh = Mesh::octahedron(Point3::origin(), 1.0);
        assert!(mesh.is_watertight());
        assert_relative_eq!(mesh.signed_volume(), 4.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn sphere_is_closed_and_outward() {
        let mesh = Mesh::uv_sphere(Point3::origin(), 1.0, 16, 8);
        assert_eq!(mesh.vertex_count(), 2 + 7 * 16);
        assert_eq!(mesh.triangle_count(), 2 * 16 * 7);
        assert!(mesh.is_watertight());
        let volume = mesh.signed_volume();
        assert!(volume > 3.0 && volume < 4.0 * PI / 3.0);
    }
}
