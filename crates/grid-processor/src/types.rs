//! Core types for grid sampling.

use ndarray::{Array3, Array4, ArrayD, ArrayView3, Axis, Ix4};
use projection::AffineTransform;
use std::path::{Path, PathBuf};

use crate::error::{GridError, Result};

/// A regular grid of samples, stored as `(x, y, z, volume)`.
///
/// Single volumes are held with a trailing axis of length 1 so every grid is
/// sampled the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeGrid {
    data: Array4<f64>,
}

impl VolumeGrid {
    /// Wrap a rank-3 or rank-4 array.
    ///
    /// # Errors
    /// - `UnsupportedRank` for any other rank
    /// - `EmptyAxis` if an axis has no samples
    pub fn new(data: ArrayD<f64>) -> Result<Self> {
        let data = match data.ndim() {
            3 => data.insert_axis(Axis(3)).into_dimensionality::<Ix4>()?,
            4 => data.into_dimensionality::<Ix4>()?,
            n => return Err(GridError::UnsupportedRank(n)),
        };
        if let Some(axis) = data.shape().iter().position(|&len| len == 0) {
            return Err(GridError::EmptyAxis { axis });
        }
        Ok(Self { data })
    }

    /// Wrap a single volume.
    pub fn from_volume(volume: Array3<f64>) -> Result<Self> {
        Self::new(volume.into_dyn())
    }

    /// Wrap a batch of volumes along the last axis.
    pub fn from_volumes(volumes: Array4<f64>) -> Result<Self> {
        Self::new(volumes.into_dyn())
    }

    /// Spatial dimensions `(x, y, z)`.
    pub fn shape(&self) -> [usize; 3] {
        let s = self.data.shape();
        [s[0], s[1], s[2]]
    }

    /// Number of volumes along the batch axis (1 for a 3D input).
    pub fn num_volumes(&self) -> usize {
        self.data.shape()[3]
    }

    /// View of one volume.
    ///
    /// # Panics
    /// If `index >= num_volumes()`.
    pub fn volume(&self, index: usize) -> ArrayView3<'_, f64> {
        self.data.index_axis(Axis(3), index)
    }

    pub fn data(&self) -> &Array4<f64> {
        &self.data
    }
}

/// A volumetric image: sample grid plus its voxel-to-world affine.
#[derive(Debug, Clone)]
pub struct VolumeImage {
    pub grid: VolumeGrid,
    pub affine: AffineTransform,
    /// File the image was read from, if any.
    pub source: Option<PathBuf>,
}

impl VolumeImage {
    /// An in-memory image with no associated file.
    pub fn new(grid: VolumeGrid, affine: AffineTransform) -> Self {
        Self {
            grid,
            affine,
            source: None,
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
