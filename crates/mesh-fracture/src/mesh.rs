//! Indexed triangle mesh fragments.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::{Aabb, FractureError, FractureResult};

/// An indexed triangle mesh: vertex positions plus index triples.
///
/// Winding is significant. The outward normal of a triangle `[a, b, c]`
/// follows the right-hand rule, `(b - a) × (c - a)`.
///
/// Several vertices may share one position. Split meshes rely on this: cap
/// triangles get their own copies of the cut boundary vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub(crate) vertices: Vec<Point3<f32>>,
    pub(crate) triangles: Vec<[usize; 3]>,
}

impl Mesh {
    /// Creates a mesh, checking that every index refers to an existing vertex.
    pub fn new(vertices: Vec<Point3<f32>>, triangles: Vec<[usize; 3]>) -> FractureResult<Self> {
        let vertex_count = vertices.len();
        if let Some(&index) = triangles.iter().flatten().find(|&&i| i >= vertex_count) {
            return Err(FractureError::InvalidIndex {
                index,
                vertex_count,
            });
        }
        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Returns the vertex positions.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// Returns the triangles as index triples.
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` if the mesh has no triangles. Loose vertices do not count.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns the three corner positions of a triangle.
    #[inline]
    pub fn triangle_positions(&self, triangle: &[usize; 3]) -> [Point3<f32>; 3] {
        triangle.map(|i| self.vertices[i])
    }

    /// Computes the bounding box of the vertices, or `None` if there are none.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Returns a copy with every vertex position scaled component-wise.
    pub fn scaled(&self, scale: &Vector3<f32>) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|p| Point3::from(p.coords.component_mul(scale)))
                .collect(),
            triangles: self.triangles.clone(),
        }
    }

    /// Returns a copy with every vertex moved by `offset`.
    pub fn translated(&self, offset: &Vector3<f32>) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| p + offset).collect(),
            triangles: self.triangles.clone(),
        }
    }

    /// Computes the signed volume enclosed by the mesh.
    ///
    /// Positive for a closed mesh with outward-facing triangles. For open
    /// meshes the value depends on the origin and has no physical meaning.
    pub fn signed_volume(&self) -> f32 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = self.triangle_positions(t);
                a.coords.dot(&b.coords.cross(&c.coords))
            })
            .sum::<f32>()
            / 6.0
    }

    /// Computes the total surface area of all triangles.
    pub fn surface_area(&self) -> f32 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = self.triangle_positions(t);
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }

    /// Computes the centroid of the vertices referenced by triangles.
    ///
    /// Returns `None` for an empty mesh.
    pub fn centroid(&self) -> Option<Point3<f32>> {
        if self.triangles.is_empty() {
            return None;
        }
        let mut used = vec![false; self.vertices.len()];
        for &i in self.triangles.iter().flatten() {
            used[i] = true;
        }
        let (sum, count) = self
            .vertices
            .iter()
            .zip(&used)
            .filter(|(_, used)| **used)
            .fold((Vector3::zeros(), 0usize), |(sum, n), (p, _)| (sum + p.coords, n + 1));
        Some(Point3::from(sum / count as f32))
    }

    /// Checks that the surface is closed and consistently oriented.
    ///
    /// Vertices are welded by exact position first, because split meshes
    /// duplicate boundary vertices. The mesh passes when every directed edge
    /// is matched by exactly one edge running the opposite way.
    ///
    /// Caps whose collinear boundary vertices were dropped during
    /// triangulation leave T-junctions, and those fail this check even
    /// though the surface has no gap.
    pub fn is_watertight(&self) -> bool {
        if self.triangles.is_empty() {
            return false;
        }

        let mut welded: HashMap<[u32; 3], usize> = HashMap::new();
        let remap: Vec<usize> = self
            .vertices
            .iter()
            .map(|p| {
                let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
                let next = welded.len();
                *welded.entry(key).or_insert(next)
            })
            .collect();

        let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
        for t in &self.triangles {
            let [a, b, c] = t.map(|i| remap[i]);
            for edge in [(a, b), (b, c), (c, a)] {
                *directed.entry(edge).or_default() += 1;
            }
        }

        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }
}
