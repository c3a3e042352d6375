//! Reconstruction of closed boundary loops from raw cut edges.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra::Point3;
use tracing::{debug, warn};

use super::links::Loop;
use crate::plane::same_position;
use crate::{FractureError, FractureResult};

/// A chain under construction, with whether it is known to close by index.
#[derive(Debug, Default)]
struct Chain {
    links: Loop,
    closed: bool,
}

impl Chain {
    fn is_resolved(&self, positions: &[Point3<f32>]) -> bool {
        self.closed || endpoints_coincide(&self.links, positions)
    }
}

/// Turns a boundary adjacency map (`vertex -> next vertex`) into closed loops.
///
/// The adjacency is consumed edge by edge. Chains that end where another
/// chain starts, by *position* rather than index, are stitched together;
/// this happens wherever the cut passes through an existing vertex and the
/// split created several vertices at the same point. Zero-length edges left
/// behind by stitching are collapsed afterwards.
///
/// Loops that collapse to fewer than three vertices enclose no area and are
/// dropped. A chain that cannot be closed is reported as
/// [`FractureError::OpenBoundary`].
pub fn build_loops(
    positions: &[Point3<f32>],
    adjacency: BTreeMap<usize, usize>,
) -> FractureResult<Vec<Loop>> {
    let mut chains = walk_chains(positions, adjacency)?;
    let walked = chains.len();

    stitch_chains(&mut chains, positions);

    let mut loops = Vec::with_capacity(chains.len());
    for chain in chains.into_iter().filter(|c| !c.links.is_cleared()) {
        if !chain.is_resolved(positions) {
            let (Some(start), Some(end)) = (chain.links.first(), chain.links.last()) else {
                continue;
            };
            return Err(FractureError::OpenBoundary { start, end });
        }

        let mut links = chain.links;
        collapse_duplicates(&mut links, positions);
        if links.len() < 3 {
            warn!(
                "Dropping degenerate boundary loop with {} vertices",
                links.len()
            );
            continue;
        }
        loops.push(links);
    }

    debug!("Built {} boundary loops from {} chains", loops.len(), walked);
    Ok(loops)
}

/// Follows adjacency edges until every edge has been consumed.
///
/// Walks start at vertices with no incoming edge, so each open path becomes a
/// single chain. Starting mid-path would split it at every zero-length edge
/// into pieces that look closed by position. Whatever remains afterwards is
/// made of cycles and is walked from its lowest index.
fn walk_chains(
    positions: &[Point3<f32>],
    mut adjacency: BTreeMap<usize, usize>,
) -> FractureResult<Vec<Chain>> {
    let targets: BTreeSet<usize> = adjacency.values().copied().collect();
    let heads: Vec<usize> = adjacency
        .keys()
        .copied()
        .filter(|v| !targets.contains(v))
        .collect();

    let mut chains = Vec::new();
    for head in heads {
        if let Some(end) = adjacency.remove(&head) {
            chains.push(walk_from(positions, &mut adjacency, head, end)?);
        }
    }
    while let Some((start, end)) = adjacency.pop_first() {
        chains.push(walk_from(positions, &mut adjacency, start, end)?);
    }

    Ok(chains)
}

fn walk_from(
    positions: &[Point3<f32>],
    adjacency: &mut BTreeMap<usize, usize>,
    start: usize,
    end: usize,
) -> FractureResult<Chain> {
    let mut links = Loop::new();
    links.add_link(start, end);
    let mut closed = false;

    while let Some(tail) = links.last() {
        let Some(next) = adjacency.remove(&tail) else {
            break;
        };
        if links.first() == Some(next) {
            closed = true;
            break;
        }
        if links.contains(next) {
            return Err(FractureError::NonManifoldBoundary { vertex: next });
        }
        if same_position(&positions[tail], &positions[next]) {
            links.set_last(next);
        } else {
            links.add_link(tail, next);
        }
    }

    Ok(Chain { links, closed })
}

/// Joins open chains whose endpoints meet by position.
///
/// Consumed chains are cleared in place rather than removed, so indices into
/// `chains` stay valid while merging.
fn stitch_chains(chains: &mut [Chain], positions: &[Point3<f32>]) {
    let mut unresolved: BTreeSet<usize> = chains
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_resolved(positions))
        .map(|(i, _)| i)
        .collect();

    for i in 0..chains.len() {
        if !unresolved.remove(&i) {
            continue;
        }

        while let Some(j) = find_matching_chain(chains, &unresolved, i, positions) {
            unresolved.remove(&j);
            let other = std::mem::take(&mut chains[j].links);
            if splice(&mut chains[i].links, other, positions) {
                chains[i].closed = true;
            }
            if chains[i].is_resolved(positions) {
                break;
            }
        }
    }
}

/// Finds an unresolved chain that continues chain `i` at either end.
fn find_matching_chain(
    chains: &[Chain],
    unresolved: &BTreeSet<usize>,
    i: usize,
    positions: &[Point3<f32>],
) -> Option<usize> {
    let current = &chains[i].links;
    let (first, last) = (current.first()?, current.last()?);

    unresolved.iter().copied().find(|&j| {
        let candidate = &chains[j].links;
        match (candidate.first(), candidate.last()) {
            (Some(c_first), Some(c_last)) => {
                same_position(&positions[c_first], &positions[last])
                    || same_position(&positions[c_last], &positions[first])
            }
            _ => false,
        }
    })
}

/// Splices `other` onto whichever end of `target` it continues.
///
/// Returns `true` if the splice wrapped the chain around onto its own head,
/// i.e. the merged chain now closes by index.
fn splice(target: &mut Loop, other: Loop, positions: &[Point3<f32>]) -> bool {
    let (Some(t_first), Some(t_last)) = (target.first(), target.last()) else {
        *target = other;
        return false;
    };
    let (Some(o_first), Some(o_last)) = (other.first(), other.last()) else {
        return false;
    };

    let other_precedes = same_position(&positions[o_last], &positions[t_first]);
    let (first, last, bridge) = if other_precedes {
        (o_first, t_last, (o_last, t_first))
    } else {
        (t_first, o_last, (t_last, o_first))
    };

    target.absorb_links(other);
    if bridge.0 != bridge.1 {
        target.link(bridge.0, bridge.1);
    }
    target.set_endpoints(first, last);

    if first == last {
        target.open_before(first);
        return true;
    }
    false
}

/// Removes vertices that sit at the same position as their predecessor,
/// including across the implicit closing link.
fn collapse_duplicates(links: &mut Loop, positions: &[Point3<f32>]) {
    for v in links.to_vec().into_iter().skip(1) {
        let prev = links.prev(v);
        if same_position(&positions[prev], &positions[v]) {
            links.remove(v);
        }
    }

    while links.len() > 1 && endpoints_coincide(links, positions) {
        if let Some(last) = links.last() {
            links.remove(last);
        }
    }
}

fn endpoints_coincide(links: &Loop, positions: &[Point3<f32>]) -> bool {
    match (links.first(), links.last()) {
        (Some(first), Some(last)) => same_position(&positions[first], &positions[last]),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_positions(coords: &[[f32; 2]]) -> Vec<Point3<f32>> {
        coords.iter().map(|c| Point3::new(c[0], c[1], 0.0)).collect()
    }

    fn make_adjacency(edges: &[(usize, usize)]) -> BTreeMap<usize, usize> {
        edges.iter().copied().collect()
    }

    fn loop_positions(lp: &Loop, positions: &[Point3<f32>]) -> Vec<[f32; 2]> {
        let mut result: Vec<[f32; 2]> = lp
            .to_vec()
            .iter()
            .map(|&i| [positions[i].x, positions[i].y])
            .collect();
        result.sort_by(|a, b| a.partial_cmp(b).unwrap());
        result
    }

    #[test]
    fn empty_adjacency_yields_no_loops() {
        let loops = build_loops(&[], BTreeMap::new()).unwrap();
        assert!(loops.is_empty());
    }

    #[test]
    fn closed_by_index() {
        let positions = make_positions(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        let adjacency = make_adjacency(&[(0, 1), (1, 2), (2, 3), (3, 0)]);

        let loops = build_loops(&positions, adjacency).unwrap();

        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
        assert!(loops[0].is_consistent());
        // Closing link stays implicit.
        assert_eq!(loops[0].link_count(), 3);
        assert_eq!(loops[0].next(3), 0);
    }

    #[test]
    fn two_separate_loops() {
        let positions = make_positions(&[
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [5.0, 0.0],
            [6.0, 0.0],
            [5.0, 1.0],
        ]);
        let adjacency = make_adjacency(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);

        let loops = build_loops(&positions, adjacency).unwrap();

        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(|l| l.len() == 3 && l.is_consistent()));
    }

    #[test]
    fn chains_stitched_by_position() {
        // Square split into three chains; 4 duplicates 2 and 5 duplicates 0.
        let positions = make_positions(&[
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [0.0, 0.0],
        ]);
        let adjacency = make_adjacency(&[(0, 1), (1, 2), (4, 3), (3, 5)]);

        let loops = build_loops(&positions, adjacency).unwrap();

        assert_eq!(loops.len(), 1);
        assert!(loops[0].is_consistent());
        assert_eq!(
            loop_positions(&loops[0], &positions),
            vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
        );
    }

    #[test]
    fn zero_length_edge_replaces_tail() {
        // 2 -> 3 is a zero-length edge created by a cut through a vertex.
        let positions = make_positions(&[
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [1.0, 1.0],
            [0.0, 1.0],
        ]);
        let adjacency = make_adjacency(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);

        let loops = build_loops(&positions, adjacency).unwrap();

        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
        assert!(!loops[0].contains(2));
        assert!(loops[0].is_consistent());
    }

    #[test]
    fn descending_path_with_zero_length_edges() {
        // The second path runs through descending indices. Its points 6, 5
        // and 4 are pairwise within tolerance of their neighbours but 6 and 4
        // are not, so the path must be walked in one piece.
        let positions = make_positions(&[
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 2.0],
            [0.0, 0.0],
            [0.0, 2.0 - 1.2e-5],
            [0.0, 2.0 - 0.6e-5],
            [0.0, 2.0],
            [1.0, 2.0],
            [2.0, 2.0],
        ]);
        let adjacency = make_adjacency(&[(0, 1), (1, 2), (8, 7), (7, 6), (6, 5), (5, 4), (4, 3)]);

        let loops = build_loops(&positions, adjacency).unwrap();

        assert_eq!(loops.len(), 1);
        assert!(loops[0].is_consistent());
        let mut rounded: Vec<[f32; 2]> = loop_positions(&loops[0], &positions)
            .into_iter()
            .map(|[x, y]| [x.round(), y.round()])
            .collect();
        rounded.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            rounded,
            vec![[0.0, 0.0], [0.0, 2.0], [1.0, 2.0], [2.0, 0.0], [2.0, 2.0]]
        );
    }

    #[test]
    fn unmatched_chain_is_an_error() {
        let positions = make_positions(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        let adjacency = make_adjacency(&[(0, 1), (1, 2)]);

        let result = build_loops(&positions, adjacency);

        assert_eq!(result, Err(FractureError::OpenBoundary { start: 0, end: 2 }));
    }

    #[test]
    fn point_loop_is_dropped() {
        let positions = make_positions(&[[0.5, 0.5], [0.5, 0.5], [0.5, 0.5]]);
        let adjacency = make_adjacency(&[(0, 1), (1, 2), (2, 0)]);

        let loops = build_loops(&positions, adjacency).unwrap();

        assert!(loops.is_empty());
    }
}
