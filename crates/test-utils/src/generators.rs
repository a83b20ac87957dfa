//! Test data generators for synthetic volumes and mapping tables.
//!
//! These generators create predictable, verifiable patterns that can be used
//! across the test suite.

use nalgebra::Matrix3xX;
use ndarray::{Array3, Array4};
use std::fmt::Write as _;
use std::path::Path;

/// Creates a volume with predictable values.
///
/// Each voxel value is calculated as: `x * 10000 + y * 100 + z`
///
/// This makes it easy to verify that nearest-neighbour sampling picked the
/// expected voxel by decoding the value.
///
/// # Example
///
/// ```
/// use test_utils::create_test_volume;
///
/// let vol = create_test_volume((3, 4, 5));
/// assert_eq!(vol[[0, 0, 0]], 0.0);
/// assert_eq!(vol[[1, 2, 3]], 10203.0);
/// ```
pub fn create_test_volume(shape: (usize, usize, usize)) -> Array3<f64> {
    Array3::from_shape_fn(shape, |(x, y, z)| (x * 10000 + y * 100 + z) as f64)
}

/// Creates a volume where every voxel holds the same value.
pub fn create_constant_volume(shape: (usize, usize, usize), value: f64) -> Array3<f64> {
    Array3::from_elem(shape, value)
}

/// Creates a volume that is an affine function of the voxel index.
///
/// Trilinear interpolation reproduces such a field exactly, so the expected
/// value at any fractional coordinate is `a*x + b*y + c*z + d`.
pub fn create_linear_volume(shape: (usize, usize, usize), coeffs: [f64; 4]) -> Array3<f64> {
    let [a, b, c, d] = coeffs;
    Array3::from_shape_fn(shape, |(x, y, z)| {
        a * x as f64 + b * y as f64 + c * z as f64 + d
    })
}

/// Creates a label volume with integer-valued parcels.
///
/// The grid is split into slabs along x, labelled `1..=num_labels`.
pub fn create_label_volume(shape: (usize, usize, usize), num_labels: usize) -> Array3<f64> {
    let num_labels = num_labels.max(1);
    let slab = shape.0.div_ceil(num_labels).max(1);
    Array3::from_shape_fn(shape, |(x, _, _)| (x / slab + 1) as f64)
}

/// Creates a 4D series where volume `t` is the constant `t * step`.
pub fn create_time_series(
    shape: (usize, usize, usize),
    num_volumes: usize,
    step: f64,
) -> Array4<f64> {
    Array4::from_shape_fn((shape.0, shape.1, shape.2, num_volumes), |(_, _, _, t)| {
        t as f64 * step
    })
}

/// Converts voxel indices to world coordinates for an axis-aligned grid.
///
/// `world = voxel * voxel_size + origin`, one column per point.
pub fn voxels_to_world(voxels: &[[f64; 3]], voxel_size: f64, origin: [f64; 3]) -> Matrix3xX<f64> {
    let flat: Vec<f64> = voxels
        .iter()
        .flat_map(|v| (0..3).map(move |i| v[i] * voxel_size + origin[i]))
        .collect();
    Matrix3xX::from_column_slice(&flat)
}

/// Creates `count` in-bounds voxel positions spread through a grid.
///
/// The positions are deterministic and include fractional coordinates so
/// linear interpolation actually blends.
pub fn spread_voxels(shape: (usize, usize, usize), count: usize) -> Vec<[f64; 3]> {
    let max = [
        (shape.0 - 1) as f64,
        (shape.1 - 1) as f64,
        (shape.2 - 1) as f64,
    ];
    (0..count)
        .map(|i| {
            let f = if count > 1 {
                i as f64 / (count - 1) as f64
            } else {
                0.5
            };
            [max[0] * f, max[1] * (1.0 - f), max[2] * (0.25 + 0.5 * f)]
        })
        .collect()
}

/// Formats world coordinates the way mapping tables are stored on disk:
/// three whitespace separated rows (x, y, z), one column per vertex.
pub fn format_mapping_table(coords: &Matrix3xX<f64>) -> String {
    let mut out = String::new();
    for row in 0..3 {
        let values: Vec<String> = (0..coords.ncols())
            .map(|col| format!("{:.18e}", coords[(row, col)]))
            .collect();
        let _ = writeln!(out, "{}", values.join(" "));
    }
    out
}

/// Writes a mapping table file.
pub fn write_mapping_table(path: &Path, coords: &Matrix3xX<f64>) -> std::io::Result<()> {
    std::fs::write(path, format_mapping_table(coords))
}
