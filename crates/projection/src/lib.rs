//! World (RAS millimetre) to voxel-grid coordinate transformations.
//!
//! A volumetric image places its integer grid in physical space through a
//! 4×4 affine. Surface mapping tables are stored in that physical space, so
//! sampling an image at a vertex first requires inverting the affine.

pub mod affine;
pub mod error;

pub use affine::AffineTransform;
pub use error::{ProjectionError, Result};
