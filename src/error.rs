use thiserror::Error;

/// Top-level error type for the surface mesh engine.
#[derive(Debug, Error)]
pub enum SurfError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors raised when a graph mutation or query would break the local
/// manifold invariants. A failed mutation leaves the graph untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("face references the same vertex more than once")]
    DegenerateFace,

    #[error("edge connects a vertex to itself")]
    DegenerateEdge,

    #[error("the face already exists in the same winding")]
    DuplicateFace,

    #[error("edge already bounds two faces")]
    NonManifoldEdge,

    #[error("face cannot be inserted in either orientation")]
    InconsistentOrientation,

    #[error("vertex still has {faces} incident faces")]
    VertexInUse { faces: usize },
}

/// Errors related to per-vertex attribute channels.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    #[error("attribute '{name}' has dimension {expected}, got {found}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("attribute '{0}' doesn't exist")]
    MissingChannel(String),

    #[error("element not found in attribute '{0}'")]
    MissingKey(String),

    #[error("attribute '{0}' already exists")]
    DuplicateChannel(String),
}

/// Errors raised by keyed lookups outside the graph and attribute store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("key was never added to the disjoint set")]
    UnknownKey,
}

/// Errors related to operation parameters.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`SurfError`].
pub type Result<T> = std::result::Result<T, SurfError>;
