//! Error types for coordinate transformations.

use thiserror::Error;

/// Errors that can occur when building or applying an affine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The rotation/scale block cannot be inverted.
    #[error("affine 3x3 block is singular (determinant {determinant:e})")]
    SingularAffine { determinant: f64 },

    /// The matrix holds NaN or infinite entries.
    #[error("affine contains non-finite entry at ({row}, {col})")]
    NonFinite { row: usize, col: usize },
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
