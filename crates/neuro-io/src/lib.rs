//! File formats for volume-to-surface projection.
//!
//! - [`nifti`]: read volumetric images (sform/qform affine) and write the
//!   `1 × 1 × vertices × volumes` volumetric surface container
//! - [`gifti`]: ASCII GIFTI functional and label files
//! - [`mapping`]: plain-text `3 × vertices` mapping tables

pub mod error;
pub mod gifti;
pub mod mapping;
pub mod nifti;

pub use error::{IoError, IoResult};
pub use gifti::{read_gifti, write_gifti, GiftiData, GiftiDataArray, GiftiImage, GiftiIntent};
pub use mapping::{parse_mapping_table, read_mapping_table};
pub use self::nifti::{
    header_affine, read_nifti, read_nifti_data, write_surface_nifti, write_volume_nifti,
};
