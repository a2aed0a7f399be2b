use thiserror::Error;

/// Top-level error type for the vasculature generator.
#[derive(Debug, Error)]
pub enum VascError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Reconstruction(#[from] ReconstructionError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("empty point set")]
    EmptyPointSet,
}

/// Errors related to skeleton graphs and neighbor graphs.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("index {index} is out of range for {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("edge joins vertex {vertex} to itself")]
    SelfLoop { vertex: usize },

    #[error("edge ({a}, {b}) appears more than once")]
    DuplicateEdge { a: usize, b: usize },

    #[error("neighbor graph is not symmetric at ({row}, {col})")]
    AsymmetricNeighborGraph { row: usize, col: usize },
}

/// Errors related to generator operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors related to surface reconstruction.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("point cloud is empty")]
    EmptyPointCloud,

    #[error("invalid reconstruction parameters: {0}")]
    InvalidParameters(String),

    #[error("reconstruction failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`VascError`].
pub type Result<T> = std::result::Result<T, VascError>;
