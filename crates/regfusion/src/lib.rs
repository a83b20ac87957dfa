//! Registration-fusion projection of volumetric data onto fsaverage.
//!
//! Given a volume in MNI152 or Colin27 space, [`RegFusion`] samples it at the
//! world coordinates stored in per-hemisphere mapping tables and writes the
//! left and right surface data as NIfTI or GIFTI files.
//!
//! # Example
//!
//! ```no_run
//! use regfusion::{RegFusion, RegFusionConfig};
//! use regfusion_common::ProjectionRequest;
//! use std::path::Path;
//!
//! let engine = RegFusion::new(RegFusionConfig::from_env())?;
//! let request = ProjectionRequest::parse("MNI152_orig", "RF_ANTs", "linear", "func.gii")?;
//! let outcome = engine.project_file(Path::new("stat.nii.gz"), Path::new("out"), &request)?;
//! println!("{}\n{}", outcome.lh_path.display(), outcome.rh_path.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod store;

pub use config::RegFusionConfig;
pub use engine::{
    project_data, project_hemisphere, ProjectedSurface, Projection, ProjectionOutcome, RegFusion,
};
pub use error::{ErrorKind, RegFusionError, Result};
pub use output::{write_surface, write_surface_pair};
pub use store::{CacheStats, MappingStore, MappingTable};
