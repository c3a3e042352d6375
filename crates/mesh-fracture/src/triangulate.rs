//! Ear-clipping triangulation of boundary loops.

use std::collections::HashMap;

use nalgebra::Point2;
use tracing::warn;

use crate::loops::Loop;
use crate::{FractureError, FractureResult};

/// Relative tolerance for treating three consecutive loop vertices as
/// collinear. Compared against the sine of the angle at the middle vertex.
pub const COLLINEAR_EPSILON: f32 = 1e-5;

/// A polygon whose area is at most this fraction of its squared perimeter is
/// a sliver. An equilateral triangle scores about 0.048.
pub const SLIVER_RATIO: f32 = 1e-3;

/// Triangulates a simple polygon by ear clipping, consuming its links.
///
/// The loop must run clockwise in the projected frame (the orientation the
/// splitter produces for the side above the plane). Each emitted triangle
/// `[v, next, prev]` has the same orientation as the loop.
///
/// Vertices whose neighbours are collinear with them, within
/// [`COLLINEAR_EPSILON`] scaled by the adjacent edge lengths, are dropped
/// without emitting a triangle. A k-vertex loop therefore yields k - 2
/// triangles, minus one for every dropped vertex.
///
/// A full pass that clips nothing usually means f32 rounding left a
/// needle-thin remainder whose corners all read as reflex. If the remainder
/// is a sliver (see [`SLIVER_RATIO`]) it is dropped with a warning and the
/// triangles emitted so far are returned. Otherwise the polygon is
/// self-intersecting or inverted and [`FractureError::TriangulationStalled`]
/// is returned.
///
/// # Panics
/// Panics if a loop vertex is missing from `points`.
pub fn triangulate(
    points: &HashMap<usize, Point2<f32>>,
    boundary: &mut Loop,
) -> FractureResult<Vec<[usize; 3]>> {
    let Some(mut index) = boundary.first() else {
        return Ok(Vec::new());
    };

    let mut triangles = Vec::with_capacity(boundary.len().saturating_sub(2));
    let mut misses = 0;

    while boundary.link_count() > 1 {
        let next = boundary.next(index);
        let prev = boundary.prev(index);
        let (p, v, n) = (points[&prev], points[&index], points[&next]);

        let a = p - v;
        let b = n - v;
        let cross = a.x * b.y - a.y * b.x;
        let tolerance = COLLINEAR_EPSILON * a.norm() * b.norm();

        let clipped = if cross > tolerance {
            let blocked = ring_between(boundary, next, prev)
                .any(|other| point_in_triangle(points[&other], n, v, p));
            if !blocked {
                triangles.push([index, next, prev]);
                boundary.remove(index);
            }
            !blocked
        } else if cross.abs() <= tolerance {
            boundary.remove(index);
            true
        } else {
            false
        };

        if clipped {
            misses = 0;
        } else {
            misses += 1;
            if misses > boundary.len() {
                if is_sliver(points, boundary) {
                    warn!(
                        "Dropping sliver of {} vertices left by ear clipping",
                        boundary.len()
                    );
                    boundary.clear();
                    return Ok(triangles);
                }
                return Err(FractureError::TriangulationStalled {
                    remaining: boundary.len(),
                });
            }
        }

        index = next;
    }

    Ok(triangles)
}

/// Iterates the loop vertices strictly after `from` and strictly before `to`.
fn ring_between(boundary: &Loop, from: usize, to: usize) -> impl Iterator<Item = usize> + '_ {
    let mut current = boundary.next(from);
    std::iter::from_fn(move || {
        if current == to {
            return None;
        }
        let item = current;
        current = boundary.next(current);
        Some(item)
    })
}

/// Compares the polygon's area against its squared perimeter.
fn is_sliver(points: &HashMap<usize, Point2<f32>>, boundary: &Loop) -> bool {
    let ring = boundary.to_vec();
    let mut twice_area = 0.0_f32;
    let mut perimeter = 0.0_f32;
    for (i, &index) in ring.iter().enumerate() {
        let a = points[&index];
        let b = points[&ring[(i + 1) % ring.len()]];
        twice_area += a.x * b.y - b.x * a.y;
        perimeter += (b - a).norm();
    }
    (twice_area * 0.5).abs() <= SLIVER_RATIO * perimeter * perimeter
}

/// Reverses the winding of every triangle by swapping its first two indices.
pub fn reverse_winding(triangles: &mut [[usize; 3]]) {
    for t in triangles {
        t.swap(0, 1);
    }
}

fn edge_sign(p1: Point2<f32>, p2: Point2<f32>, p3: Point2<f32>) -> f32 {
    (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
}

/// Returns `true` if `pt` is inside the triangle or on its boundary.
pub fn point_in_triangle(pt: Point2<f32>, v1: Point2<f32>, v2: Point2<f32>, v3: Point2<f32>) -> bool {
    let d1 = edge_sign(pt, v1, v2);
    let d2 = edge_sign(pt, v2, v3);
    let d3 = edge_sign(pt, v3, v1);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}
