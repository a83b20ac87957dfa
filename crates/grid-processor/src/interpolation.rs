//! Per-axis interpolation stencils.
//!
//! A query coordinate is resolved once into the grid indices (and weights) it
//! reads, so the same stencil can be reused for every volume of a batch.
//!
//! Boundary policy: coordinates must lie in `[0, dim - 1]` on every axis.
//! Anything outside, including NaN, is rejected rather than extrapolated.

use ndarray::ArrayView3;

use crate::error::{GridError, Result};

/// Check a coordinate against the sampled extent of one axis.
#[inline]
pub fn check_bounds(vertex: usize, axis: usize, coordinate: f64, dim: usize) -> Result<()> {
    let upper = dim - 1;
    if coordinate.is_finite() && coordinate >= 0.0 && coordinate <= upper as f64 {
        Ok(())
    } else {
        Err(GridError::OutOfBounds {
            vertex,
            axis,
            coordinate,
            upper,
        })
    }
}

/// Nearest grid index along one axis.
///
/// Ties (fractional part exactly 0.5) go to the lower index. The coordinate
/// must already be in bounds.
#[inline]
pub fn nearest_index(coordinate: f64, dim: usize) -> usize {
    let base = coordinate.floor();
    let index = if coordinate - base <= 0.5 {
        base as usize
    } else {
        base as usize + 1
    };
    index.min(dim - 1)
}

/// Two bracketing indices along one axis and the weight of the upper one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpan {
    pub lo: usize,
    pub hi: usize,
    pub t: f64,
}

impl AxisSpan {
    /// Bracket an in-bounds coordinate.
    ///
    /// Coordinates that land exactly on a sample, including the last one,
    /// collapse to a single index so no neighbour is read with zero weight.
    #[inline]
    pub fn new(coordinate: f64, dim: usize) -> Self {
        let lo = (coordinate.floor() as usize).min(dim - 1);
        let t = coordinate - lo as f64;
        if t == 0.0 || lo + 1 >= dim {
            Self { lo, hi: lo, t: 0.0 }
        } else {
            Self { lo, hi: lo + 1, t }
        }
    }
}

/// Trilinear cell: one span per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCell {
    pub spans: [AxisSpan; 3],
}

impl LinearCell {
    /// Blend the 8 surrounding samples.
    #[inline]
    pub fn interpolate(&self, volume: &ArrayView3<'_, f64>) -> f64 {
        let [x, y, z] = self.spans;

        let c000 = volume[[x.lo, y.lo, z.lo]];
        let c100 = volume[[x.hi, y.lo, z.lo]];
        let c010 = volume[[x.lo, y.hi, z.lo]];
        let c110 = volume[[x.hi, y.hi, z.lo]];
        let c001 = volume[[x.lo, y.lo, z.hi]];
        let c101 = volume[[x.hi, y.lo, z.hi]];
        let c011 = volume[[x.lo, y.hi, z.hi]];
        let c111 = volume[[x.hi, y.hi, z.hi]];

        // Collapse x, then y, then z
        let c00 = c000 * (1.0 - x.t) + c100 * x.t;
        let c10 = c010 * (1.0 - x.t) + c110 * x.t;
        let c01 = c001 * (1.0 - x.t) + c101 * x.t;
        let c11 = c011 * (1.0 - x.t) + c111 * x.t;

        let c0 = c00 * (1.0 - y.t) + c10 * y.t;
        let c1 = c01 * (1.0 - y.t) + c11 * y.t;

        c0 * (1.0 - z.t) + c1 * z.t
    }
}
