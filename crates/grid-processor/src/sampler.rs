//! Batched sampling of a grid at fractional voxel coordinates.
//!
//! Sampling is split in two steps:
//!
//! ```text
//! voxel coords (3 × N) ──► SamplePlan::new ──► stencils (bounds checked once)
//!                                  │
//!        VolumeGrid ──────────────►│ sample()
//!                                  ▼
//!                    rows: one per volume, N values each
//! ```
//!
//! The plan depends only on the coordinates and the grid's spatial shape, so
//! a 4D series pays for index arithmetic once. Rows are filled in parallel
//! across vertices; vertex order follows the order of the coordinates.

use nalgebra::Matrix3xX;
use ndarray::{Array2, ArrayView3};
use rayon::prelude::*;
use regfusion_common::Interpolation;
use tracing::debug;

use crate::error::{GridError, Result};
use crate::interpolation::{check_bounds, nearest_index, AxisSpan, LinearCell};
use crate::types::VolumeGrid;

/// Pre-computed read locations for a set of query points.
#[derive(Debug, Clone)]
pub struct SamplePlan {
    shape: [usize; 3],
    stencils: Stencils,
}

#[derive(Debug, Clone)]
enum Stencils {
    Nearest(Vec<[usize; 3]>),
    Linear(Vec<LinearCell>),
}

impl SamplePlan {
    /// Resolve every column of `coords` against a grid of spatial `shape`.
    ///
    /// # Errors
    /// `OutOfBounds` for the first vertex with a coordinate outside
    /// `[0, dim - 1]` on any axis.
    pub fn new(coords: &Matrix3xX<f64>, shape: [usize; 3], method: Interpolation) -> Result<Self> {
        if let Some(axis) = shape.iter().position(|&d| d == 0) {
            return Err(GridError::EmptyAxis { axis });
        }

        for (vertex, column) in coords.column_iter().enumerate() {
            for axis in 0..3 {
                check_bounds(vertex, axis, column[axis], shape[axis])?;
            }
        }

        let stencils = match method {
            Interpolation::Nearest => Stencils::Nearest(
                coords
                    .column_iter()
                    .map(|c| {
                        [
                            nearest_index(c[0], shape[0]),
                            nearest_index(c[1], shape[1]),
                            nearest_index(c[2], shape[2]),
                        ]
                    })
                    .collect(),
            ),
            Interpolation::Linear => Stencils::Linear(
                coords
                    .column_iter()
                    .map(|c| LinearCell {
                        spans: [
                            AxisSpan::new(c[0], shape[0]),
                            AxisSpan::new(c[1], shape[1]),
                            AxisSpan::new(c[2], shape[2]),
                        ],
                    })
                    .collect(),
            ),
        };

        debug!(vertices = coords.ncols(), method = %method, ?shape, "Built sample plan");
        Ok(Self { shape, stencils })
    }

    /// Number of query points.
    pub fn len(&self) -> usize {
        match &self.stencils {
            Stencils::Nearest(s) => s.len(),
            Stencils::Linear(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn method(&self) -> Interpolation {
        match self.stencils {
            Stencils::Nearest(_) => Interpolation::Nearest,
            Stencils::Linear(_) => Interpolation::Linear,
        }
    }

    /// Sample one volume at every planned point.
    fn sample_volume(&self, volume: ArrayView3<'_, f64>) -> Vec<f64> {
        match &self.stencils {
            Stencils::Nearest(indices) => indices
                .par_iter()
                .map(|&[x, y, z]| volume[[x, y, z]])
                .collect(),
            Stencils::Linear(cells) => cells
                .par_iter()
                .map(|cell| cell.interpolate(&volume))
                .collect(),
        }
    }

    /// Sample every volume of `grid`, producing a `(volumes × points)` matrix.
    ///
    /// # Errors
    /// `ShapeMismatch` if the grid's spatial shape differs from the one the
    /// plan was built for.
    pub fn sample(&self, grid: &VolumeGrid) -> Result<Array2<f64>> {
        if grid.shape() != self.shape {
            return Err(GridError::ShapeMismatch {
                expected: self.shape,
                actual: grid.shape(),
            });
        }

        let num_volumes = grid.num_volumes();
        let num_points = self.len();
        let mut flat = Vec::with_capacity(num_volumes * num_points);
        for v in 0..num_volumes {
            flat.extend(self.sample_volume(grid.volume(v)));
        }
        Ok(Array2::from_shape_vec((num_volumes, num_points), flat)?)
    }
}

/// Plan and sample in one call.
pub fn sample_grid(
    grid: &VolumeGrid,
    coords: &Matrix3xX<f64>,
    method: Interpolation,
) -> Result<Array2<f64>> {
    SamplePlan::new(coords, grid.shape(), method)?.sample(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Array4};

    fn coords(points: &[[f64; 3]]) -> Matrix3xX<f64> {
        let flat: Vec<f64> = points.iter().flat_map(|p| p.iter().copied()).collect();
        Matrix3xX::from_column_slice(&flat)
    }

    fn ramp_grid() -> VolumeGrid {
        let volume = Array3::from_shape_fn((4, 4, 4), |(x, y, z)| {
            (x + 4 * y + 16 * z) as f64
        });
        VolumeGrid::from_volume(volume).unwrap()
    }

    #[test]
    fn test_nearest_samples() {
        let grid = ramp_grid();
        let pts = coords(&[[0.0, 0.0, 0.0], [1.4, 0.6, 0.0], [3.0, 3.0, 3.0], [2.5, 0.0, 0.0]]);
        let out = sample_grid(&grid, &pts, Interpolation::Nearest).unwrap();
        assert_eq!(out.shape(), &[1, 4]);
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[0, 1]], 1.0 + 4.0);
        assert_eq!(out[[0, 2]], 63.0);
        assert_eq!(out[[0, 3]], 2.0);
    }

    #[test]
    fn test_linear_samples() {
        let grid = ramp_grid();
        let pts = coords(&[[0.5, 0.0, 0.0], [1.0, 1.5, 2.25], [3.0, 3.0, 3.0]]);
        let out = sample_grid(&grid, &pts, Interpolation::Linear).unwrap();
        assert!((out[[0, 0]] - 0.5).abs() < 1e-12);
        assert!((out[[0, 1]] - (1.0 + 6.0 + 36.0)).abs() < 1e-9);
        assert!((out[[0, 2]] - 63.0).abs() < 1e-12);
    }

    #[test]
    fn test_batched_volumes_one_row_each() {
        let volumes = Array4::from_shape_fn((3, 3, 3, 5), |(_, _, _, t)| t as f64 * 10.0);
        let grid = VolumeGrid::from_volumes(volumes).unwrap();
        let pts = coords(&[[0.3, 1.7, 2.0], [1.0, 1.0, 1.0]]);
        let out = sample_grid(&grid, &pts, Interpolation::Linear).unwrap();
        assert_eq!(out.shape(), &[5, 2]);
        for t in 0..5 {
            for v in 0..2 {
                assert!((out[[t, v]] - t as f64 * 10.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_out_of_bounds_raises() {
        let grid = ramp_grid();
        let pts = coords(&[[1.0, 1.0, 1.0], [1.0, 3.5, 1.0]]);
        let err = sample_grid(&grid, &pts, Interpolation::Linear).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfBounds {
                vertex: 1,
                axis: 1,
                coordinate: 3.5,
                upper: 3
            }
        );
        assert!(sample_grid(&grid, &pts, Interpolation::Nearest).is_err());
    }

    #[test]
    fn test_plan_reused_across_grids() {
        let pts = coords(&[[0.5, 0.5, 0.5]]);
        let plan = SamplePlan::new(&pts, [2, 2, 2], Interpolation::Linear).unwrap();
        let ones = VolumeGrid::from_volume(Array3::from_elem((2, 2, 2), 1.0)).unwrap();
        let twos = VolumeGrid::from_volume(Array3::from_elem((2, 2, 2), 2.0)).unwrap();
        assert!((plan.sample(&ones).unwrap()[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((plan.sample(&twos).unwrap()[[0, 0]] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_plan_shape_mismatch() {
        let pts = coords(&[[0.0, 0.0, 0.0]]);
        let plan = SamplePlan::new(&pts, [2, 2, 2], Interpolation::Nearest).unwrap();
        let grid = ramp_grid();
        assert_eq!(
            plan.sample(&grid).unwrap_err(),
            GridError::ShapeMismatch {
                expected: [2, 2, 2],
                actual: [4, 4, 4]
            }
        );
    }

    #[test]
    fn test_empty_coordinates() {
        let grid = ramp_grid();
        let pts = Matrix3xX::<f64>::zeros(0);
        let out = sample_grid(&grid, &pts, Interpolation::Linear).unwrap();
        assert_eq!(out.shape(), &[1, 0]);
    }

    #[test]
    fn test_plan_reports_method() {
        let pts = coords(&[[0.0, 0.0, 0.0]]);
        let plan = SamplePlan::new(&pts, [1, 1, 1], Interpolation::Nearest).unwrap();
        assert_eq!(plan.method(), Interpolation::Nearest);
        assert_eq!(plan.len(), 1);
        assert!(!plan.is_empty());
    }
}
