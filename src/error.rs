use thiserror::Error;

/// Top-level error type for the Euler verification engine.
///
/// Individual trial failures are not errors; they are recorded in
/// [`VerificationSummary::failed_trials`](crate::verify::VerificationSummary).
#[derive(Debug, Error)]
pub enum EulerError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Invalid task parameters, rejected before any work starts.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("{parameter} must be positive")]
    NonPositive { parameter: &'static str },

    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),

    #[error("expected {expected} per-element values, got {actual}")]
    DataLength { expected: usize, actual: usize },

    #[error("{parameter} must be finite, got {value}")]
    NotFinite { parameter: &'static str, value: f64 },

    #[error("unknown {kind} selector: {value:?}")]
    UnknownSelector { kind: &'static str, value: String },
}

/// Errors related to mesh construction and validation.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("face {face} references vertex {index}, but the mesh has {len} vertices")]
    IndexOutOfBounds { face: usize, index: u32, len: usize },

    #[error("face {0} is degenerate")]
    DegenerateFace(usize),

    #[error("mesh is not closed: edge ({0}, {1}) is not shared by exactly two faces")]
    NotClosed(u32, u32),
}

/// Errors related to scene rasterization and image export.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rendering unavailable: {0}")]
    Unavailable(String),

    #[error("scene has no drawable geometry")]
    EmptyScene,

    #[error("image dimensions {width}x{height} are invalid")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Resource exhaustion while preparing or running a task.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("could not allocate {requested} elements for {what}")]
    AllocationFailed { what: &'static str, requested: usize },

    #[error("worker pool could not be started: {0}")]
    ThreadPool(String),
}

/// Convenience type alias for results using [`EulerError`].
pub type Result<T> = std::result::Result<T, EulerError>;

/// Allocates an empty vector with room for `requested` elements, reporting
/// allocation failure instead of aborting.
pub(crate) fn try_with_capacity<T>(what: &'static str, requested: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(requested)
        .map_err(|_| ResourceError::AllocationFailed { what, requested })?;
    Ok(buf)
}
