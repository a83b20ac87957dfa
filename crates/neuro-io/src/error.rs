//! Error types for container and table I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing files.
#[derive(Error, Debug)]
pub enum IoError {
    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The NIfTI library rejected the file.
    #[error("NIfTI error on {path}: {source}")]
    Nifti {
        path: PathBuf,
        #[source]
        source: nifti::NiftiError,
    },

    /// Neither an sform nor a qform is set in the header.
    #[error("{0} has no valid affine (sform_code and qform_code are both 0)")]
    MissingAffine(PathBuf),

    /// The header affine is unusable.
    #[error("invalid affine in {path}: {source}")]
    InvalidAffine {
        path: PathBuf,
        #[source]
        source: projection::ProjectionError,
    },

    /// The voxel data does not form a 3D or 4D grid.
    #[error("invalid image data in {path}: {source}")]
    InvalidGrid {
        path: PathBuf,
        #[source]
        source: grid_processor::GridError,
    },

    /// Mapping table text is not a 3 × N table of numbers.
    #[error("malformed mapping table {path}: {reason}")]
    MalformedTable { path: PathBuf, reason: String },

    /// GIFTI encoding or decoding failed.
    #[error("GIFTI error on {path}: {reason}")]
    Gifti { path: PathBuf, reason: String },
}

impl IoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn gifti(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Gifti {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn table(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedTable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
