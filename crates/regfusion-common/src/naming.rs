//! Output file naming.

use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::family::MappingFamily;
use crate::types::{Hemisphere, OutputType};
use crate::validation::Diagnostic;

/// Derive the output prefix from the input image's file name.
///
/// The `.nii.gz` / `.nii` extension is stripped; any other extension is
/// rejected. Images without a file name get an empty prefix plus the
/// diagnostics the caller is expected to emit.
pub fn image_prefix(source: Option<&Path>) -> ConfigResult<(String, Vec<Diagnostic>)> {
    let name = match source.and_then(|p| p.file_name()) {
        Some(name) => name.to_string_lossy().into_owned(),
        None => {
            return Ok((
                String::new(),
                vec![Diagnostic::MissingFilename, Diagnostic::EmptyPrefix],
            ))
        }
    };

    let prefix = if let Some(stripped) = name.strip_suffix(".nii.gz") {
        stripped
    } else if let Some(stripped) = name.strip_suffix(".nii") {
        stripped
    } else {
        return Err(ConfigError::InvalidInputExtension(name));
    };

    let diagnostics = if prefix.is_empty() {
        vec![Diagnostic::EmptyPrefix]
    } else {
        Vec::new()
    };
    Ok((prefix.to_string(), diagnostics))
}

/// File name for one hemisphere's output.
///
/// `{hemi}.{prefix}.allSub_{rf_type}_{template}_to_fsaverage.{ext}`, with the
/// prefix segment omitted when empty.
pub fn output_file_name(
    prefix: &str,
    hemisphere: Hemisphere,
    family: MappingFamily,
    out_type: OutputType,
) -> String {
    if prefix.is_empty() {
        format!(
            "{}.allSub_{}.{}",
            hemisphere,
            family.stem(),
            out_type.extension()
        )
    } else {
        format!(
            "{}.{}.allSub_{}.{}",
            hemisphere,
            prefix,
            family.stem(),
            out_type.extension()
        )
    }
}
