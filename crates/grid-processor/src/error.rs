//! Error types for grid sampling.

use thiserror::Error;

/// Errors that can occur while building grids or sampling them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Grids must be a single volume (rank 3) or a batch of volumes (rank 4).
    #[error("grid must have 3 or 4 dimensions, got {0}")]
    UnsupportedRank(usize),

    /// A grid axis has no samples.
    #[error("grid axis {axis} has length 0")]
    EmptyAxis { axis: usize },

    /// A query coordinate lies outside the sampled region.
    #[error(
        "vertex {vertex} is out of bounds on axis {axis}: coordinate {coordinate} not in [0, {upper}]"
    )]
    OutOfBounds {
        vertex: usize,
        axis: usize,
        coordinate: f64,
        upper: usize,
    },

    /// A sample plan was applied to a grid of a different shape.
    #[error("sample plan built for grid {expected:?} applied to grid {actual:?}")]
    ShapeMismatch {
        expected: [usize; 3],
        actual: [usize; 3],
    },

    /// Array construction failed.
    #[error("invalid grid shape: {0}")]
    InvalidShape(String),
}

impl From<ndarray::ShapeError> for GridError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::InvalidShape(err.to_string())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
