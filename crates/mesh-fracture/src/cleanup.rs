//! Removal of vertices that no triangle references.

use tracing::debug;

use crate::Mesh;

/// Marker for a vertex that is dropped during compaction.
const UNUSED: usize = usize::MAX;

impl Mesh {
    /// Drops every vertex no triangle references and remaps the indices.
    ///
    /// Retained vertices keep their relative order and every triangle keeps
    /// its winding. Returns the number of vertices removed.
    pub fn remove_loose_vertices(&mut self) -> usize {
        let mut remap = vec![UNUSED; self.vertices.len()];
        for &i in self.triangles.iter().flatten() {
            remap[i] = 0;
        }

        let mut kept = 0;
        for slot in remap.iter_mut().filter(|slot| **slot != UNUSED) {
            *slot = kept;
            kept += 1;
        }

        let removed = self.vertices.len() - kept;
        if removed == 0 {
            return 0;
        }

        let mut old_index = 0;
        self.vertices.retain(|_| {
            let keep = remap[old_index] != UNUSED;
            old_index += 1;
            keep
        });
        for t in &mut self.triangles {
            *t = t.map(|i| remap[i]);
        }

        removed
    }
}

/// Compacts every fragment in place. Returns the total number of vertices removed.
pub fn remove_loose_vertices(fragments: &mut [Mesh]) -> usize {
    let removed = fragments.iter_mut().map(Mesh::remove_loose_vertices).sum();
    debug!(fragments = fragments.len(), removed, "removed loose vertices");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn make_fragment() -> Mesh {
        // Vertices 0 and 3 are unreferenced.
        Mesh::new(
            vec![
                Point3::new(9.0, 9.0, 9.0),
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(7.0, 7.0, 7.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[1, 2, 4], [4, 2, 1]],
        )
        .unwrap()
    }

    #[test]
    fn drops_unreferenced_and_keeps_order() {
        let mut mesh = make_fragment();
        let removed = mesh.remove_loose_vertices();

        assert_eq!(removed, 2);
        assert_eq!(
            mesh.vertices(),
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ]
        );
        assert_eq!(mesh.triangles(), &[[0, 1, 2], [2, 1, 0]]);
    }

    #[test]
    fn compact_mesh_is_unchanged() {
        let mut mesh = make_fragment();
        mesh.remove_loose_vertices();
        let before = mesh.clone();

        assert_eq!(mesh.remove_loose_vertices(), 0);
        assert_eq!(mesh, before);
    }

    #[test]
    fn mesh_without_triangles_loses_all_vertices() {
        let mut mesh = Mesh::new(vec![Point3::origin(); 3], Vec::new()).unwrap();
        assert_eq!(mesh.remove_loose_vertices(), 3);
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn cleans_every_fragment() {
        let mut fragments = vec![make_fragment(), make_fragment()];
        assert_eq!(remove_loose_vertices(&mut fragments), 4);
        assert!(fragments.iter().all(|f| f.vertex_count() == 3));
    }
}
