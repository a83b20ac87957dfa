//! Shared types for projecting volumetric data onto fsaverage surfaces.
//!
//! - Closed enumerations for hemispheres, registration-fusion families,
//!   templates, interpolation and output containers
//! - [`MappingFamily`], the only legal (rf_type, template) pairings
//! - Request validation and the label-output interpolation rule
//! - Deterministic output naming

pub mod error;
pub mod family;
pub mod naming;
pub mod types;
pub mod validation;

pub use error::{format_template_list, ConfigError, ConfigResult};
pub use family::{MappingFamily, MappingKey};
pub use naming::{image_prefix, output_file_name};
pub use types::{Hemisphere, Interpolation, OutputType, RfType, TemplateType};
pub use validation::{resolve_interp, Diagnostic, ProjectionRequest, ValidatedRequest};

/// Vertex count of each fsaverage hemisphere (ico7 tessellation).
pub const FSAVERAGE_VERTICES: usize = 163_842;
