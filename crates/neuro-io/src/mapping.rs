//! Mapping table reader.
//!
//! Tables are plain text: three rows (x, y, z in world millimetres), one
//! whitespace-separated column per surface vertex. Lines starting with `#`
//! and blank lines are ignored.

use nalgebra::Matrix3xX;
use std::path::Path;
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Read a mapping table file into a `3 × vertices` matrix.
pub fn read_mapping_table(path: &Path) -> IoResult<Matrix3xX<f64>> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
    let coords = parse_mapping_table(&text, path)?;
    debug!(path = %path.display(), vertices = coords.ncols(), "Read mapping table");
    Ok(coords)
}

/// Parse mapping table text. `path` is only used in error messages.
pub fn parse_mapping_table(text: &str, path: &Path) -> IoResult<Matrix3xX<f64>> {
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>().map_err(|_| {
                    IoError::table(path, format!("line {}: '{}' is not a number", line_no + 1, tok))
                })
            })
            .collect::<IoResult<Vec<f64>>>()?;
        rows.push(row);
    }

    if rows.len() != 3 {
        return Err(IoError::table(
            path,
            format!("expected 3 coordinate rows, found {}", rows.len()),
        ));
    }

    let num_vertices = rows[0].len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != num_vertices) {
        return Err(IoError::table(
            path,
            format!(
                "row {} has {} values, row 1 has {}",
                i + 1,
                row.len(),
                num_vertices
            ),
        ));
    }

    Ok(Matrix3xX::from_fn(num_vertices, |r, c| rows[r][c]))
}
