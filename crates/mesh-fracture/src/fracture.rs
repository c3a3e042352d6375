//! Fracturing a mesh with random planes.

use std::f32::consts::TAU;

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::split::Cuttable;
use crate::{Aabb, FractureError, FractureResult, Mesh, Plane3D};

/// Settings for [`fracture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FractureConfig {
    /// Number of cutting planes. Must not be negative.
    pub granularity: i32,
    /// Seed for plane generation. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FractureConfig {
    fn default() -> Self {
        Self {
            granularity: 3,
            seed: None,
        }
    }
}

impl FractureConfig {
    pub fn with_granularity(mut self, granularity: i32) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the number of planes, or [`FractureError::InvalidGranularity`]
    /// if the granularity is negative.
    pub fn plane_count(&self) -> FractureResult<usize> {
        usize::try_from(self.granularity)
            .map_err(|_| FractureError::InvalidGranularity(self.granularity))
    }
}

/// Draws a direction uniformly from the unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f32> {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let theta: f32 = rng.random_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vector3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Generates `count` planes with uniformly random orientation, each passing
/// through a point drawn uniformly from `bounds`.
pub fn random_planes<R: Rng + ?Sized>(bounds: &Aabb, count: usize, rng: &mut R) -> Vec<Plane3D> {
    (0..count)
        .map(|_| {
            let normal = random_unit_vector(rng);
            let point = bounds.sample_point(rng);
            Plane3D::from_point_and_normal(point, normal)
        })
        .collect()
}

/// Cuts `mesh` by each plane in turn.
///
/// Every plane splits every fragment produced so far. Halves without
/// triangles are discarded, so a plane that misses a fragment leaves it as a
/// single piece. With no planes the result is a copy of the input.
pub fn fracture_with_planes(mesh: &Mesh, planes: &[Plane3D]) -> FractureResult<Vec<Mesh>> {
    let mut fragments = vec![mesh.clone()];

    for (i, plane) in planes.iter().enumerate() {
        let mut next = Vec::with_capacity(fragments.len() * 2);
        for fragment in &fragments {
            let (above, below) = fragment.cut(plane)?.into_pair();
            next.extend([above, below].into_iter().filter(|half| !half.is_empty()));
        }
        debug!(plane = i, fragments = next.len(), "applied cutting plane");
        fragments = next;
    }

    Ok(fragments)
}

/// Fractures `mesh` with `count` random planes drawn from `rng`.
///
/// # Errors
/// Returns [`FractureError::InvalidBounds`] if `bounds` is inverted or not
/// finite, and propagates any split failure.
pub fn fracture_with_rng<R: Rng + ?Sized>(
    mesh: &Mesh,
    bounds: &Aabb,
    count: usize,
    rng: &mut R,
) -> FractureResult<Vec<Mesh>> {
    bounds.validate()?;
    let planes = random_planes(bounds, count, rng);
    let fragments = fracture_with_planes(mesh, &planes)?;
    info!(
        planes = count,
        fragments = fragments.len(),
        "fractured mesh"
    );
    Ok(fragments)
}

/// Fractures `mesh` into pieces using random planes inside `bounds`.
///
/// The planes are seeded from [`FractureConfig::seed`] when set, so the same
/// config always produces the same fragments.
///
/// # Errors
/// Returns [`FractureError::InvalidGranularity`] or
/// [`FractureError::InvalidBounds`] before any geometry work is done.
pub fn fracture(mesh: &Mesh, bounds: &Aabb, config: &FractureConfig) -> FractureResult<Vec<Mesh>> {
    let count = config.plane_count()?;
    bounds.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    fracture_with_rng(mesh, bounds, count, &mut rng)
}
