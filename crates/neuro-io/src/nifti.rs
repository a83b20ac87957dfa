//! NIfTI-1 volumes: input images and the volumetric surface container.
//!
//! Reading goes through the `nifti` crate (scaling applied, any stored
//! datatype widened to f64). The voxel-to-world affine is taken from the
//! sform when `sform_code > 0`, otherwise from the quaternion qform when
//! `qform_code > 0`. Files with neither are rejected.

use nalgebra::{Matrix3, Matrix4};
use ndarray::{Array2, Array4, ArrayD};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use std::path::Path;
use tracing::{debug, info};

use grid_processor::{VolumeGrid, VolumeImage};
use projection::AffineTransform;

use crate::error::{IoError, IoResult};

/// Load a `.nii` / `.nii.gz` image.
pub fn read_nifti(path: &Path) -> IoResult<VolumeImage> {
    let nifti_err = |source| IoError::Nifti {
        path: path.to_path_buf(),
        source,
    };

    let object = ReaderOptions::new().read_file(path).map_err(nifti_err)?;

    let matrix = header_affine(object.header())
        .ok_or_else(|| IoError::MissingAffine(path.to_path_buf()))?;
    let affine = AffineTransform::new(matrix).map_err(|source| IoError::InvalidAffine {
        path: path.to_path_buf(),
        source,
    })?;

    let data = object.into_volume().into_ndarray::<f64>().map_err(nifti_err)?;
    let grid = VolumeGrid::new(data).map_err(|source| IoError::InvalidGrid {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = %path.display(),
        shape = ?grid.shape(),
        volumes = grid.num_volumes(),
        "Loaded volume"
    );

    Ok(VolumeImage::new(grid, affine).with_source(path))
}

/// Load only the voxel values of an image, ignoring its header geometry.
///
/// Projected outputs written by other tools often carry a placeholder
/// affine that would fail [`read_nifti`]'s checks.
pub fn read_nifti_data(path: &Path) -> IoResult<ArrayD<f64>> {
    let nifti_err = |source| IoError::Nifti {
        path: path.to_path_buf(),
        source,
    };
    let object = ReaderOptions::new().read_file(path).map_err(nifti_err)?;
    object.into_volume().into_ndarray::<f64>().map_err(nifti_err)
}

/// Voxel-to-world affine stored in a header, preferring the sform.
pub fn header_affine(header: &NiftiHeader) -> Option<Matrix4<f64>> {
    if header.sform_code > 0 {
        let rows = [header.srow_x, header.srow_y, header.srow_z];
        Some(Matrix4::from_fn(|r, c| match r {
            0..=2 => rows[r][c] as f64,
            _ if c == 3 => 1.0,
            _ => 0.0,
        }))
    } else if header.qform_code > 0 {
        Some(qform_affine(header))
    } else {
        None
    }
}

/// Affine from the quaternion representation (NIfTI-1 method 2).
fn qform_affine(header: &NiftiHeader) -> Matrix4<f64> {
    let b = header.quatern_b as f64;
    let c = header.quatern_c as f64;
    let d = header.quatern_d as f64;

    let bcd = b * b + c * c + d * d;
    let (a, b, c, d) = if 1.0 - bcd < 1e-7 {
        // 180 degree rotation: a is 0 and (b, c, d) is renormalised
        let norm = bcd.sqrt();
        (0.0, b / norm, c / norm, d / norm)
    } else {
        ((1.0 - bcd).sqrt(), b, c, d)
    };

    let rotation = Matrix3::new(
        a * a + b * b - c * c - d * d,
        2.0 * (b * c - a * d),
        2.0 * (b * d + a * c),
        2.0 * (b * c + a * d),
        a * a + c * c - b * b - d * d,
        2.0 * (c * d - a * b),
        2.0 * (b * d - a * c),
        2.0 * (c * d + a * b),
        a * a + d * d - c * c - b * b,
    );

    let pix = |i: usize| {
        let v = header.pixdim[i] as f64;
        if v > 0.0 {
            v
        } else {
            1.0
        }
    };
    let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
    let scale = Matrix3::from_diagonal(&nalgebra::Vector3::new(pix(1), pix(2), pix(3) * qfac));

    let linear = rotation * scale;
    let offset = [
        header.quatern_x as f64,
        header.quatern_y as f64,
        header.quatern_z as f64,
    ];
    Matrix4::from_fn(|r, c| match (r, c) {
        (0..=2, 0..=2) => linear[(r, c)],
        (0..=2, _) => offset[r],
        (_, 3) => 1.0,
        _ => 0.0,
    })
}

/// Header carrying an identity affine in both sform and qform.
fn identity_header() -> NiftiHeader {
    NiftiHeader {
        sform_code: 1,
        qform_code: 1,
        srow_x: [1.0, 0.0, 0.0, 0.0],
        srow_y: [0.0, 1.0, 0.0, 0.0],
        srow_z: [0.0, 0.0, 1.0, 0.0],
        quatern_b: 0.0,
        quatern_c: 0.0,
        quatern_d: 0.0,
        quatern_x: 0.0,
        quatern_y: 0.0,
        quatern_z: 0.0,
        pixdim: [1.0; 8],
        ..NiftiHeader::default()
    }
}

/// Write projected surface data as a `1 × 1 × vertices × volumes` float32
/// NIfTI image with an identity affine. Gzip is used for `.gz` paths.
///
/// `data` is `(volumes × vertices)`.
pub fn write_surface_nifti(path: &Path, data: &Array2<f64>) -> IoResult<()> {
    let (num_volumes, num_vertices) = data.dim();
    let volume: Array4<f32> =
        Array4::from_shape_fn((1, 1, num_vertices, num_volumes), |(_, _, v, t)| {
            data[[t, v]] as f32
        });

    let header = identity_header();
    WriterOptions::new(path)
        .reference_header(&header)
        .write_nifti(&volume)
        .map_err(|source| IoError::Nifti {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), vertices = num_vertices, volumes = num_volumes, "Wrote NIfTI surface");
    Ok(())
}

/// Write a volume (any rank accepted by NIfTI) with the given affine.
///
/// Used to produce input images for tests and tooling.
pub fn write_volume_nifti(path: &Path, image: &VolumeImage) -> IoResult<()> {
    let m = image.affine.matrix();
    let row = |r: usize| {
        [
            m[(r, 0)] as f32,
            m[(r, 1)] as f32,
            m[(r, 2)] as f32,
            m[(r, 3)] as f32,
        ]
    };
    let header = NiftiHeader {
        sform_code: 2,
        qform_code: 0,
        srow_x: row(0),
        srow_y: row(1),
        srow_z: row(2),
        pixdim: [1.0; 8],
        ..NiftiHeader::default()
    };

    let data = image.grid.data().mapv(|v| v as f32);
    let result = if image.grid.num_volumes() == 1 {
        WriterOptions::new(path)
            .reference_header(&header)
            .write_nifti(&data.index_axis(ndarray::Axis(3), 0))
    } else {
        WriterOptions::new(path)
            .reference_header(&header)
            .write_nifti(&data)
    };
    result.map_err(|source| IoError::Nifti {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sform_preferred() {
        let mut header = identity_header();
        header.srow_x = [2.0, 0.0, 0.0, -90.0];
        header.quatern_x = 500.0;
        let m = header_affine(&header).unwrap();
        assert_eq!(m[(0, 0)], 2.0);
        assert_eq!(m[(0, 3)], -90.0);
        assert_eq!(m[(3, 3)], 1.0);
        assert_eq!(m[(3, 0)], 0.0);
    }

    #[test]
    fn test_qform_identity_rotation_with_pixdim() {
        let mut header = identity_header();
        header.sform_code = 0;
        header.pixdim = [1.0, 2.0, 3.0, 4.0, 1.0, 1.0, 1.0, 1.0];
        header.quatern_x = 10.0;
        header.quatern_y = -20.0;
        header.quatern_z = 30.0;
        let m = header_affine(&header).unwrap();
        assert!((m[(0, 0)] - 2.0).abs() < 1e-9);
        assert!((m[(1, 1)] - 3.0).abs() < 1e-9);
        assert!((m[(2, 2)] - 4.0).abs() < 1e-9);
        assert_eq!(m[(0, 3)], 10.0);
        assert_eq!(m[(1, 3)], -20.0);
        assert_eq!(m[(2, 3)], 30.0);
    }

    #[test]
    fn test_qform_negative_qfac_flips_z() {
        let mut header = identity_header();
        header.sform_code = 0;
        header.pixdim = [-1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0];
        let m = header_affine(&header).unwrap();
        assert!((m[(2, 2)] + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_qform_180_degree_about_z() {
        let mut header = identity_header();
        header.sform_code = 0;
        header.quatern_d = 1.0;
        let m = header_affine(&header).unwrap();
        assert!((m[(0, 0)] + 1.0).abs() < 1e-9);
        assert!((m[(1, 1)] + 1.0).abs() < 1e-9);
        assert!((m[(2, 2)] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_affine_codes() {
        let mut header = identity_header();
        header.sform_code = 0;
        header.qform_code = 0;
        assert!(header_affine(&header).is_none());
    }
}
