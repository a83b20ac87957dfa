//! Output container dispatch.

use ndarray::Array2;
use std::path::Path;
use tempfile::TempPath;
use tracing::{debug, info, warn};

use neuro_io::{write_gifti, write_surface_nifti, GiftiImage};
use regfusion_common::OutputType;

use crate::error::{RegFusionError, Result};

/// Write one hemisphere's `(volumes × vertices)` data in the chosen container.
pub fn write_surface(path: &Path, out_type: OutputType, data: &Array2<f64>) -> Result<()> {
    match out_type {
        OutputType::Volumetric => write_surface_nifti(path, data)?,
        OutputType::FuncSurface => write_gifti(path, &GiftiImage::func(data))?,
        OutputType::LabelSurface => write_gifti(path, &GiftiImage::label(data))?,
    }
    debug!(path = %path.display(), out_type = %out_type, "Wrote surface data");
    Ok(())
}

/// Write the left and right outputs so that either both appear or neither.
///
/// Each hemisphere goes to a hidden sibling of its final path first. Both
/// are renamed into place only once both writes succeed; if the second
/// rename fails the first output is removed again.
pub fn write_surface_pair(
    out_type: OutputType,
    (lh_path, lh_data): (&Path, &Array2<f64>),
    (rh_path, rh_data): (&Path, &Array2<f64>),
) -> Result<()> {
    let lh_staged = stage(lh_path, out_type, lh_data)?;
    let rh_staged = stage(rh_path, out_type, rh_data)?;

    lh_staged
        .persist(lh_path)
        .map_err(|err| output_error(lh_path, err.error))?;
    if let Err(err) = rh_staged.persist(rh_path) {
        if let Err(cleanup) = std::fs::remove_file(lh_path) {
            warn!(path = %lh_path.display(), error = %cleanup, "Failed to remove partial output");
        }
        return Err(output_error(rh_path, err.error));
    }

    info!(
        lh = %lh_path.display(),
        rh = %rh_path.display(),
        out_type = %out_type,
        "Wrote outputs"
    );
    Ok(())
}

/// Write to a temporary file next to `path`, deleted on drop unless persisted.
///
/// The temporary keeps the container extension so writers that pick
/// compression from the file name behave as they would for `path`.
fn stage(path: &Path, out_type: OutputType, data: &Array2<f64>) -> Result<TempPath> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let staged = tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(&format!(".{}", out_type.extension()))
        .tempfile_in(dir)
        .map_err(|source| output_error(path, source))?
        .into_temp_path();

    write_surface(&staged, out_type, data)?;
    Ok(staged)
}

fn output_error(path: &Path, source: std::io::Error) -> RegFusionError {
    RegFusionError::Output {
        path: path.to_path_buf(),
        source,
    }
}
