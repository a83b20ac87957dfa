//! Voxel-to-world affine and its inverse.
//!
//! The affine `A` maps voxel indices `(i, j, k, 1)` to world coordinates
//! `(x, y, z, 1)`:
//!
//! ```text
//! | x |   | R  t | | i |
//! | y | = |      | | j |
//! | z |   | 0  1 | | k |
//! | 1 |            | 1 |
//! ```
//!
//! World coordinates are converted back with `v = R⁻¹ (w − t)`. The last row
//! of `A` is ignored, as NIfTI readers do.

use nalgebra::{Matrix3, Matrix3xX, Matrix4, Vector3};

use crate::error::{ProjectionError, Result};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A validated voxel-to-world affine with its inverse rotation/scale block
/// pre-computed.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform {
    matrix: Matrix4<f64>,
    rotation: Matrix3<f64>,
    rotation_inv: Matrix3<f64>,
    translation: Vector3<f64>,
}

impl AffineTransform {
    /// Validate `matrix` and pre-compute `R⁻¹`.
    ///
    /// # Errors
    /// - `NonFinite` if any entry is NaN or infinite
    /// - `SingularAffine` if the upper-left 3×3 block is not invertible
    pub fn new(matrix: Matrix4<f64>) -> Result<Self> {
        for row in 0..4 {
            for col in 0..4 {
                if !matrix[(row, col)].is_finite() {
                    return Err(ProjectionError::NonFinite { row, col });
                }
            }
        }

        let rotation: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let translation: Vector3<f64> = matrix.fixed_view::<3, 1>(0, 3).into_owned();

        let determinant = rotation.determinant();
        if determinant.abs() < SINGULAR_EPSILON {
            return Err(ProjectionError::SingularAffine { determinant });
        }
        let rotation_inv = rotation
            .try_inverse()
            .ok_or(ProjectionError::SingularAffine { determinant })?;

        Ok(Self {
            matrix,
            rotation,
            rotation_inv,
            translation,
        })
    }

    /// Build from row-major entries (the order affines are usually printed in).
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Result<Self> {
        let matrix = Matrix4::from_fn(|r, c| rows[r][c]);
        Self::new(matrix)
    }

    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
            rotation: Matrix3::identity(),
            rotation_inv: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Axis-aligned grid with isotropic voxel size (mm) and an origin offset.
    pub fn scaled(voxel_size: f64, origin: [f64; 3]) -> Result<Self> {
        Self::from_rows([
            [voxel_size, 0.0, 0.0, origin[0]],
            [0.0, voxel_size, 0.0, origin[1]],
            [0.0, 0.0, voxel_size, origin[2]],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// The full 4×4 voxel-to-world matrix.
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// Convert one world coordinate to fractional voxel indices.
    #[inline]
    pub fn ras_to_voxel_point(&self, ras: &Vector3<f64>) -> Vector3<f64> {
        self.rotation_inv * (ras - self.translation)
    }

    /// Convert world coordinates (one column per vertex) to fractional voxel
    /// indices, preserving column order.
    pub fn ras_to_voxel(&self, ras: &Matrix3xX<f64>) -> Matrix3xX<f64> {
        let mut voxels = Matrix3xX::zeros(ras.ncols());
        for (i, column) in ras.column_iter().enumerate() {
            let world: Vector3<f64> = column.into_owned();
            voxels.set_column(i, &self.ras_to_voxel_point(&world));
        }
        voxels
    }

    /// Forward map: voxel indices to world coordinates.
    pub fn voxel_to_ras(&self, voxels: &Matrix3xX<f64>) -> Matrix3xX<f64> {
        let mut world = Matrix3xX::zeros(voxels.ncols());
        for (i, column) in voxels.column_iter().enumerate() {
            let v: Vector3<f64> = column.into_owned();
            world.set_column(i, &(self.rotation * v + self.translation));
        }
        world
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity_is_noop() {
        let affine = AffineTransform::identity();
        let ras = Matrix3xX::from_column_slice(&[1.0, 2.0, 3.0, -4.0, 5.5, 0.0]);
        assert_eq!(affine.ras_to_voxel(&ras), ras);
    }

    #[test]
    fn test_scaled_affine_divides_by_voxel_size() {
        let affine = AffineTransform::scaled(2.0, [0.0, 0.0, 0.0]).unwrap();
        let ras = Matrix3xX::from_column_slice(&[2.0, 4.0, 6.0]);
        let vox = affine.ras_to_voxel(&ras);
        assert!(approx(vox[(0, 0)], 1.0));
        assert!(approx(vox[(1, 0)], 2.0));
        assert!(approx(vox[(2, 0)], 3.0));
    }

    #[test]
    fn test_mni_like_affine() {
        // 2mm MNI152 grid: origin at voxel (45, 63, 36), x axis flipped
        let affine = AffineTransform::from_rows([
            [-2.0, 0.0, 0.0, 90.0],
            [0.0, 2.0, 0.0, -126.0],
            [0.0, 0.0, 2.0, -72.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();
        let origin = affine.ras_to_voxel_point(&Vector3::new(0.0, 0.0, 0.0));
        assert!(approx(origin.x, 45.0));
        assert!(approx(origin.y, 63.0));
        assert!(approx(origin.z, 36.0));
    }

    #[test]
    fn test_roundtrip_with_oblique_affine() {
        let affine = AffineTransform::from_rows([
            [0.9, -0.2, 0.1, 10.0],
            [0.2, 1.1, 0.0, -5.0],
            [-0.1, 0.05, 1.2, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();
        let vox = Matrix3xX::from_column_slice(&[1.5, 2.25, 3.0, 10.0, 0.0, 7.5]);
        let back = affine.ras_to_voxel(&affine.voxel_to_ras(&vox));
        for (a, b) in back.iter().zip(vox.iter()) {
            assert!(approx(*a, *b));
        }
    }

    #[test]
    fn test_column_order_preserved() {
        let affine = AffineTransform::scaled(1.0, [1.0, 1.0, 1.0]).unwrap();
        let ras = Matrix3xX::from_column_slice(&[1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0, 3.0]);
        let vox = affine.ras_to_voxel(&ras);
        assert_eq!(vox.ncols(), 3);
        for i in 0..3 {
            assert!(approx(vox[(0, i)], i as f64));
        }
    }

    #[test]
    fn test_singular_affine_rejected() {
        let result = AffineTransform::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert!(matches!(result, Err(ProjectionError::SingularAffine { .. })));
    }

    #[test]
    fn test_non_finite_affine_rejected() {
        let result = AffineTransform::from_rows([
            [1.0, 0.0, 0.0, f64::NAN],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(result, Err(ProjectionError::NonFinite { row: 0, col: 3 }));
    }
}
