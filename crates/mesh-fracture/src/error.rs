//! Error types for mesh fracturing.

use thiserror::Error;

/// Result type for fracture operations.
pub type FractureResult<T> = Result<T, FractureError>;

/// Errors that can occur while splitting or fracturing a mesh.
///
/// Every variant signals malformed input or configuration. None of them are
/// transient, so callers should not retry the same operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FractureError {
    /// A triangle references a vertex that does not exist.
    #[error("invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// The offending index.
        index: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Two crossing triangles produced the same outgoing cut edge, which only
    /// happens for non-manifold input.
    #[error("cut boundary is not manifold at vertex {vertex}")]
    NonManifoldBoundary {
        /// Vertex with more than one outgoing boundary edge.
        vertex: usize,
    },

    /// A boundary loop could not be closed, even after positional stitching.
    #[error("cut boundary loop is open between vertices {start} and {end}")]
    OpenBoundary {
        /// First vertex of the open chain.
        start: usize,
        /// Last vertex of the open chain.
        end: usize,
    },

    /// Ear clipping went through a full pass without removing a vertex.
    #[error("cap triangulation stalled with {remaining} vertices left")]
    TriangulationStalled {
        /// Number of loop vertices that could not be clipped.
        remaining: usize,
    },

    /// Granularity must be zero or positive.
    #[error("granularity must not be negative (got {0})")]
    InvalidGranularity(i32),

    /// The bounding volume is inverted or not finite.
    #[error("bounding volume is inverted or not finite")]
    InvalidBounds,
}
