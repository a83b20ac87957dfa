//! Regular grid sampling for volume-to-surface projection.
//!
//! This crate interpolates a 3D grid (optionally batched over a trailing
//! volume axis) at arbitrary fractional voxel coordinates:
//!
//! - **Linear**: trilinear blend of the 8 surrounding voxels
//! - **Nearest**: value of the closest voxel, ties toward the lower index
//! - **Bounds**: coordinates outside `[0, dim - 1]` are an error, never
//!   extrapolated or clamped
//!
//! # Architecture
//!
//! ```text
//! VolumeImage { grid, affine }
//!      │
//!      ▼
//! AffineTransform::ras_to_voxel(mapping coords)   (projection crate)
//!      │
//!      ▼
//! SamplePlan::new(voxel coords, grid shape, method)
//!      │
//!      └─► SamplePlan::sample(grid) ─► Array2 (volumes × vertices)
//! ```
//!
//! # Example
//!
//! ```
//! use grid_processor::{sample_grid, VolumeGrid};
//! use nalgebra::Matrix3xX;
//! use ndarray::Array3;
//! use regfusion_common::Interpolation;
//!
//! let grid = VolumeGrid::from_volume(Array3::from_elem((5, 5, 5), 1.0)).unwrap();
//! let coords = Matrix3xX::from_column_slice(&[1.0, 2.0, 3.0, 0.5, 0.5, 0.5]);
//! let values = sample_grid(&grid, &coords, Interpolation::Linear).unwrap();
//! assert_eq!(values.shape(), &[1, 2]);
//! ```

pub mod error;
pub mod interpolation;
pub mod sampler;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{GridError, Result};
pub use sampler::{sample_grid, SamplePlan};
pub use types::{VolumeGrid, VolumeImage};
