//! Splitting a mesh in two along a plane.

use std::collections::{BTreeMap, HashMap};

use nalgebra::Point3;
use tracing::debug;

use crate::loops::build_loops;
use crate::projection::project_loop;
use crate::triangulate::{reverse_winding, triangulate};
use crate::{FractureError, FractureResult, Mesh, Plane3D};

/// Triangle classification code with every vertex below the plane.
const ALL_BELOW: u8 = 0b000;
/// Triangle classification code with every vertex above the plane.
const ALL_ABOVE: u8 = 0b111;

/// Whether the cut faces of a split are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapMode {
    /// Triangulate the cut boundary so both halves stay closed.
    #[default]
    Capped,
    /// Leave the cut boundary open.
    Open,
}

/// The two halves of a split mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitResult {
    /// Part on the normal's side of the plane (including points on it).
    pub above: Mesh,
    /// Part on the opposite side.
    pub below: Mesh,
}

impl SplitResult {
    /// Returns the halves as `(above, below)`.
    pub fn into_pair(self) -> (Mesh, Mesh) {
        (self.above, self.below)
    }
}

/// Trait for geometry that can be cut by a plane.
pub trait Cuttable {
    /// Cuts the geometry by a plane, capping the cut so both halves stay closed.
    ///
    /// # Return values by classification
    ///
    /// - **All above**: `above` is the whole input, `below` has no triangles
    /// - **All below**: `below` is the whole input, `above` has no triangles
    /// - **Spanning**: both halves hold their part of the surface plus a cap
    fn cut(&self, plane: &Plane3D) -> FractureResult<SplitResult>;
}

impl Cuttable for Mesh {
    fn cut(&self, plane: &Plane3D) -> FractureResult<SplitResult> {
        split_mesh(self, plane, CapMode::Capped)
    }
}

/// An unordered pair of vertex indices naming a mesh edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey(usize, usize);

impl EdgeKey {
    /// Creates a key; `EdgeKey::new(a, b) == EdgeKey::new(b, a)`.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

/// Vertex and triangle buffers for both halves of a split.
///
/// Both halves start from a full copy of the input vertices and every new
/// vertex is pushed to both, so an index names the same position on either
/// side. Cut vertices and caps rely on this.
struct Halves {
    above: Mesh,
    below: Mesh,
}

impl Halves {
    fn new(vertices: &[Point3<f32>]) -> Self {
        let side = Mesh {
            vertices: vertices.to_vec(),
            triangles: Vec::new(),
        };
        Self {
            above: side.clone(),
            below: side,
        }
    }

    fn push_vertex(&mut self, position: Point3<f32>) -> usize {
        self.above.vertices.push(position);
        self.below.vertices.push(position);
        debug_assert_eq!(self.above.vertices.len(), self.below.vertices.len());
        self.above.vertices.len() - 1
    }

    fn side_mut(&mut self, above: bool) -> &mut Mesh {
        if above { &mut self.above } else { &mut self.below }
    }
}

/// Splits `mesh` along `plane` into the part above and the part below.
///
/// Every triangle lands wholly on one side or is cut into one triangle on
/// the side of its lone vertex and two on the other. A vertex created where
/// the plane crosses an edge is shared by every triangle using that edge,
/// so the halves have no cracks.
///
/// With [`CapMode::Capped`] the cut boundary is rebuilt into loops and
/// triangulated. The above half gets the caps over its own copies of the
/// boundary vertices; the below half gets the same triangles with reversed
/// winding over its own copies.
pub fn split_mesh(mesh: &Mesh, plane: &Plane3D, cap: CapMode) -> FractureResult<SplitResult> {
    let vertices = mesh.vertices();
    let sides: Vec<bool> = vertices.iter().map(|v| plane.is_above(*v)).collect();

    let mut halves = Halves::new(vertices);
    let mut split_edges: HashMap<EdgeKey, usize> = HashMap::new();
    let mut boundary: BTreeMap<usize, usize> = BTreeMap::new();
    let mut cut_triangles = 0usize;

    for triangle in mesh.triangles() {
        let code = triangle
            .iter()
            .enumerate()
            .fold(0u8, |acc, (bit, &i)| acc | (u8::from(sides[i]) << bit));

        match code {
            ALL_BELOW => halves.below.triangles.push(*triangle),
            ALL_ABOVE => halves.above.triangles.push(*triangle),
            _ => {
                cut_triangles += 1;
                let lone_slot = lone_vertex_slot(code);
                let lone = triangle[lone_slot];
                let next = triangle[(lone_slot + 1) % 3];
                let prev = triangle[(lone_slot + 2) % 3];
                let lone_is_above = sides[lone];

                let on_prev = cut_vertex(&mut halves, &mut split_edges, vertices, plane, lone, prev);
                let on_next = cut_vertex(&mut halves, &mut split_edges, vertices, plane, lone, next);

                halves
                    .side_mut(lone_is_above)
                    .triangles
                    .push([lone, on_next, on_prev]);
                let far = halves.side_mut(!lone_is_above);
                far.triangles.push([next, on_prev, on_next]);
                far.triangles.push([prev, on_prev, next]);

                // Directed so that the loop runs against the above half's
                // wall edge along the cut.
                let (start, end) = if lone_is_above {
                    (on_prev, on_next)
                } else {
                    (on_next, on_prev)
                };
                if boundary.insert(start, end).is_some() {
                    return Err(FractureError::NonManifoldBoundary { vertex: start });
                }
            }
        }
    }

    let mut cap_triangles = 0usize;
    if cap == CapMode::Capped && !boundary.is_empty() {
        let loops = build_loops(&halves.above.vertices, boundary)?;
        for mut boundary_loop in loops {
            let projected = project_loop(&halves.above.vertices, &boundary_loop, plane);
            let mut filler = triangulate(&projected, &mut boundary_loop)?;
            cap_triangles += filler.len();

            append_cap(&mut halves.above, &filler);
            reverse_winding(&mut filler);
            append_cap(&mut halves.below, &filler);
        }
    }

    debug!(
        "Split {} triangles ({} cut, {} new vertices, {} cap triangles): {} above, {} below",
        mesh.triangle_count(),
        cut_triangles,
        split_edges.len(),
        cap_triangles,
        halves.above.triangle_count(),
        halves.below.triangle_count(),
    );

    Ok(SplitResult {
        above: halves.above,
        below: halves.below,
    })
}

/// Returns which corner (0, 1 or 2) of a mixed triangle is alone on its side.
///
/// Bit `i` of `code` is set when corner `i` is above the plane. The lone
/// corner is the one whose bit differs from the other two.
fn lone_vertex_slot(code: u8) -> usize {
    match code {
        0b001 | 0b110 => 0,
        0b010 | 0b101 => 1,
        _ => 2,
    }
}

/// Returns the index of the vertex where the plane crosses edge `a`–`b`,
/// creating it on the first visit.
fn cut_vertex(
    halves: &mut Halves,
    split_edges: &mut HashMap<EdgeKey, usize>,
    vertices: &[Point3<f32>],
    plane: &Plane3D,
    a: usize,
    b: usize,
) -> usize {
    *split_edges
        .entry(EdgeKey::new(a, b))
        .or_insert_with(|| halves.push_vertex(plane.intersect_line(vertices[a], vertices[b])))
}

/// Appends cap triangles to `side`, using fresh copies of their vertices so
/// the cap does not share vertices with the walls.
fn append_cap(side: &mut Mesh, filler: &[[usize; 3]]) {
    let mut copies: HashMap<usize, usize> = HashMap::new();
    for triangle in filler {
        let mapped = triangle.map(|i| {
            *copies.entry(i).or_insert_with(|| {
                let position = side.vertices[i];
                side.vertices.push(position);
                side.vertices.len() - 1
            })
        });
        side.triangles.push(mapped);
    }
}
