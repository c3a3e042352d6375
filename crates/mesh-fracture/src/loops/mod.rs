//! Boundary loops for capping cut meshes.
//!
//! When a plane cuts a closed mesh, the split triangles leave an open
//! boundary on each side. The splitter records that boundary as a soup of
//! directed edges; this module turns it back into closed polygons that the
//! triangulator can fill.
//!
//! # Architecture
//!
//! - [`Loop`]: cyclic doubly-linked list over vertex indices
//! - [`build_loops`]: walks the edge soup into chains and stitches chains
//!   that only meet by vertex position

mod builder;
mod links;

pub use builder::build_loops;
pub use links::Loop;
