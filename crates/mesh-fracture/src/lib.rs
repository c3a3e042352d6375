//! Plane-cut fracturing of closed triangle meshes.
//!
//! A mesh is cut by random planes, one at a time, and every cut is capped so
//! each fragment stays closed. The pipeline per plane is:
//!
//! 1. [`split_mesh`] classifies vertices, splits straddling triangles and
//!    records the directed boundary of the cut
//! 2. [`build_loops`] turns that boundary into closed [`Loop`]s
//! 3. [`project_loop`] flattens each loop into the plane
//! 4. [`triangulate`] fills it by ear clipping; the cap is added to both halves
//!
//! [`fracture`] drives this over a list of fragments and [`destruct`] wraps
//! it for host objects implementing [`Destructible`].

mod bounds;
mod cleanup;
mod destructible;
mod error;
mod fracture;
pub mod loops;
mod mesh;
mod plane;
mod projection;
mod shapes;
mod split;
mod triangulate;

pub use bounds::Aabb;
pub use cleanup::remove_loose_vertices;
pub use destructible::{Destructible, MeshSource, destruct};
pub use error::{FractureError, FractureResult};
pub use fracture::{
    FractureConfig, fracture, fracture_with_planes, fracture_with_rng, random_planes,
    random_unit_vector,
};
pub use loops::{Loop, build_loops};
pub use mesh::Mesh;
pub use plane::{POSITION_EPSILON, Plane3D, same_position};
pub use projection::{plane_rotation, project_loop};
pub use split::{CapMode, Cuttable, EdgeKey, SplitResult, split_mesh};
pub use triangulate::{
    COLLINEAR_EPSILON, SLIVER_RATIO, point_in_triangle, reverse_winding, triangulate,
};
