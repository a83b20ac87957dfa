//! Error types for projection requests.

use std::path::PathBuf;
use thiserror::Error;

use grid_processor::GridError;
use neuro_io::IoError;
use projection::ProjectionError;
use regfusion_common::ConfigError;

/// Broad category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something invalid. Raised before any work.
    Configuration,
    /// Image or mapping table data has the wrong shape or geometry.
    InputShape,
    /// Reading or writing a file failed.
    Io,
}

/// Errors that can occur while projecting a volume.
#[derive(Error, Debug)]
pub enum RegFusionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error(transparent)]
    Affine(#[from] ProjectionError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    File(#[from] IoError),

    /// A mapping table does not have the vertex count of the target mesh.
    #[error("mapping table {path} has {actual} vertices, expected {expected}")]
    VertexCount {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Staging or renaming an output failed. No output is left behind.
    #[error("failed to write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RegFusionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegFusionError::Config(_) | RegFusionError::Settings(_) => ErrorKind::Configuration,
            RegFusionError::Grid(GridError::UnsupportedRank(_)) => ErrorKind::Configuration,
            RegFusionError::Affine(_)
            | RegFusionError::Grid(_)
            | RegFusionError::VertexCount { .. } => ErrorKind::InputShape,
            RegFusionError::File(err) => match err {
                IoError::MissingAffine(_)
                | IoError::InvalidAffine { .. }
                | IoError::InvalidGrid { .. }
                | IoError::MalformedTable { .. } => ErrorKind::InputShape,
                _ => ErrorKind::Io,
            },
            RegFusionError::OutputDir { .. } | RegFusionError::Output { .. } => ErrorKind::Io,
        }
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, RegFusionError>;
