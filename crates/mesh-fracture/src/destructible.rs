//! Host integration: the destructible capability and its driver.

use nalgebra::Vector3;
use tracing::debug;

use crate::cleanup::remove_loose_vertices;
use crate::fracture::{FractureConfig, fracture};
use crate::{Aabb, FractureResult, Mesh};

/// Mesh data handed over by a host object, in the object's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSource {
    pub mesh: Mesh,
    /// Volume the cutting planes are sampled from.
    pub bounds: Aabb,
}

impl MeshSource {
    /// Uses the mesh's own vertex bounds as the sampling volume.
    ///
    /// Returns `None` if the mesh has no vertices.
    pub fn from_mesh(mesh: Mesh) -> Option<Self> {
        let bounds = mesh.bounds()?;
        Some(Self { mesh, bounds })
    }
}

/// An object that can be broken into fragments by [`destruct`].
pub trait Destructible {
    /// Called before any geometry is read.
    fn pre_destruct(&mut self);

    /// Returns the mesh to fracture and the volume to sample planes from.
    fn mesh_source(&self) -> MeshSource;

    /// Scale applied component-wise to the mesh and bounds before cutting.
    fn scale(&self) -> Vector3<f32> {
        Vector3::repeat(1.0)
    }

    /// Receives the cleaned-up fragments.
    fn post_destruct(&mut self, fragments: Vec<Mesh>);
}

/// Fractures a destructible object and hands it the pieces.
///
/// Runs `pre_destruct`, scales the mesh and its bounds, fractures with
/// `config`, drops loose vertices from every fragment, then passes the
/// fragments to `post_destruct`. Returns the number of fragments.
///
/// # Errors
/// An invalid `config` is rejected before `pre_destruct` is called. Any other
/// error is returned without calling `post_destruct`.
pub fn destruct<D: Destructible + ?Sized>(
    target: &mut D,
    config: &FractureConfig,
) -> FractureResult<usize> {
    config.plane_count()?;
    target.pre_destruct();

    let MeshSource { mesh, bounds } = target.mesh_source();
    bounds.validate()?;
    let scale = target.scale();
    let mesh = mesh.scaled(&scale);
    let bounds = bounds.scaled(&scale);

    let mut fragments = fracture(&mesh, &bounds, config)?;
    remove_loose_vertices(&mut fragments);

    let count = fragments.len();
    debug!(fragments = count, "handing fragments to destructible");
    target.post_destruct(fragments);
    Ok(count)
}
