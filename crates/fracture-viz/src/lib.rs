//! Rendering and scene helpers for the fracture demo.

use std::hash::{Hash, Hasher};

use macroquad::models::{Mesh as RenderMesh, Vertex, draw_mesh};
use macroquad::prelude::*;
use mesh_fracture::Mesh;
use nalgebra::{Isometry3, Vector3};

pub mod camera;
pub mod debris;

pub use camera::OrbitCamera;
pub use debris::{Piece, Scene, Shape};

/// Triangles per draw call; keeps each batch under macroquad's index limit.
const MAX_TRIANGLES_PER_BATCH: usize = 1500;

/// Light level of faces turned away from the light.
const AMBIENT: f32 = 0.3;

/// Generates a deterministic color from a fragment's geometry.
///
/// Fragments are re-centered once when spawned and never change shape, so
/// each keeps its color for its whole lifetime.
pub fn fragment_color(mesh: &Mesh) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    mesh.triangle_count().hash(&mut hasher);
    for v in mesh.vertices().iter().take(16) {
        v.x.to_bits().hash(&mut hasher);
        v.y.to_bits().hash(&mut hasher);
        v.z.to_bits().hash(&mut hasher);
    }
    let hash = hasher.finish();

    let channel = |shift: u32| (((hash >> shift) & 0xFF) as u8).max(60);
    Color::from_rgba(channel(16), channel(8), channel(0), 255)
}

/// Scales the color's RGB channels by `brightness`, keeping alpha.
fn shade(color: Color, brightness: f32) -> Color {
    Color::new(
        color.r * brightness,
        color.g * brightness,
        color.b * brightness,
        color.a,
    )
}

/// Draws a fragment with flat per-triangle lighting.
///
/// Each triangle gets its own three vertices so the shading does not blend
/// across edges.
pub fn draw_fragment(mesh: &Mesh, transform: &Isometry3<f32>, color: Color) {
    let light = Vector3::new(0.4, 1.0, 0.3).normalize();

    for batch in mesh.triangles().chunks(MAX_TRIANGLES_PER_BATCH) {
        let mut vertices = Vec::with_capacity(batch.len() * 3);
        let mut indices: Vec<u16> = Vec::with_capacity(batch.len() * 3);

        for triangle in batch {
            let [a, b, c] = mesh.triangle_positions(triangle).map(|p| transform * p);
            let brightness = (b - a)
                .cross(&(c - a))
                .try_normalize(f32::EPSILON)
                .map_or(AMBIENT, |n| AMBIENT + (1.0 - AMBIENT) * n.dot(&light).max(0.0));
            let shaded = shade(color, brightness);

            for p in [a, b, c] {
                indices.push(vertices.len() as u16);
                vertices.push(Vertex::new2(vec3(p.x, p.y, p.z), vec2(0.0, 0.0), shaded));
            }
        }

        draw_mesh(&RenderMesh {
            vertices,
            indices,
            texture: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn color_is_stable_and_not_too_dark() {
        let mesh = Mesh::octahedron(Point3::origin(), 1.0);
        let first = fragment_color(&mesh);
        let second = fragment_color(&mesh.clone());
        assert_eq!(first, second);
        assert!(first.r >= 60.0 / 255.0 - 1e-6);
        assert!(first.g >= 60.0 / 255.0 - 1e-6);
        assert!(first.b >= 60.0 / 255.0 - 1e-6);
    }

    #[test]
    fn shading_keeps_alpha() {
        let shaded = shade(Color::new(1.0, 0.5, 0.2, 0.8), 0.5);
        assert_eq!(shaded, Color::new(0.5, 0.25, 0.1, 0.8));
    }
}
