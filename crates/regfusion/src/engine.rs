//! Volume-to-surface projection.
//!
//! ```text
//! ProjectionRequest ──validate──► ValidatedRequest (+ diagnostics)
//!                                        │
//!                  MappingStore::load_pair(family)
//!                                        │
//!               ┌────────── rayon::join ─┴───────────┐
//!               ▼                                     ▼
//!   project_hemisphere(lh)                project_hemisphere(rh)
//!   affine⁻¹ · table ─► SamplePlan         affine⁻¹ · table ─► SamplePlan
//!               └──────────────┬──────────────────────┘
//!                              ▼
//!                 Projection { left, right }
//!                              │ project_volume only
//!                              ▼
//!        write_surface_pair (staged, renamed) ─► absolute paths
//! ```
//!
//! Every check (request, file name, both tables, both samplings) completes
//! before the first output file is created, and the two outputs are renamed
//! into place together: a failed write leaves neither behind.

use nalgebra::Matrix3xX;
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use grid_processor::{SamplePlan, VolumeGrid, VolumeImage};
use neuro_io::read_nifti;
use projection::AffineTransform;
use regfusion_common::{
    image_prefix, output_file_name, Diagnostic, Hemisphere, Interpolation, MappingFamily,
    OutputType, ProjectionRequest, ValidatedRequest,
};

use crate::config::RegFusionConfig;
use crate::error::{RegFusionError, Result};
use crate::output::write_surface_pair;
use crate::store::{CacheStats, MappingStore, MappingTable};

/// Resample `grid` at world coordinates `coords`.
///
/// Returns a `(volumes × vertices)` matrix; vertex order follows the columns
/// of `coords`.
pub fn project_data(
    grid: &VolumeGrid,
    affine: &AffineTransform,
    coords: &Matrix3xX<f64>,
    interp: Interpolation,
) -> Result<Array2<f64>> {
    let voxels = affine.ras_to_voxel(coords);
    let plan = SamplePlan::new(&voxels, grid.shape(), interp)?;
    Ok(plan.sample(grid)?)
}

/// Projected values for one hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedSurface {
    pub hemisphere: Hemisphere,
    /// `(volumes × vertices)`
    pub data: Array2<f64>,
}

impl ProjectedSurface {
    pub fn num_volumes(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_vertices(&self) -> usize {
        self.data.ncols()
    }
}

/// Project an image through one hemisphere's mapping table.
pub fn project_hemisphere(
    image: &VolumeImage,
    table: &MappingTable,
    interp: Interpolation,
) -> Result<ProjectedSurface> {
    let data = project_data(&image.grid, &image.affine, table.coords(), interp)?;
    debug_assert_eq!(data.ncols(), table.num_vertices());
    Ok(ProjectedSurface {
        hemisphere: table.key().hemisphere,
        data,
    })
}

/// Both hemispheres of one projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub left: ProjectedSurface,
    pub right: ProjectedSurface,
    pub family: MappingFamily,
    /// Interpolation actually used.
    pub interp: Interpolation,
    pub out_type: OutputType,
    pub diagnostics: Vec<Diagnostic>,
}

impl Projection {
    pub fn surface(&self, hemisphere: Hemisphere) -> &ProjectedSurface {
        match hemisphere {
            Hemisphere::Left => &self.left,
            Hemisphere::Right => &self.right,
        }
    }
}

/// A projection written to disk.
#[derive(Debug, Clone)]
pub struct ProjectionOutcome {
    pub projection: Projection,
    /// Absolute path of the left hemisphere output.
    pub lh_path: PathBuf,
    /// Absolute path of the right hemisphere output.
    pub rh_path: PathBuf,
}

impl ProjectionOutcome {
    pub fn paths(&self) -> (&Path, &Path) {
        (&self.lh_path, &self.rh_path)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.projection.diagnostics
    }
}

/// Projects volumes onto fsaverage using the tables in a mapping directory.
pub struct RegFusion {
    config: RegFusionConfig,
    store: MappingStore,
}

impl RegFusion {
    pub fn new(config: RegFusionConfig) -> Result<Self> {
        config.validate()?;
        let store = MappingStore::from_config(&config);
        info!(
            mapping_dir = %config.mapping_dir.display(),
            vertex_count = config.vertex_count,
            cache_entries = config.mapping_cache_entries,
            "Projection engine ready"
        );
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &RegFusionConfig {
        &self.config
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Project an in-memory image without writing anything.
    pub fn project(&self, image: &VolumeImage, request: &ProjectionRequest) -> Result<Projection> {
        let validated = validate(request)?;
        self.run(image, validated)
    }

    /// Project an in-memory image and write both hemisphere outputs to
    /// `out_dir`, created if missing.
    ///
    /// The output prefix comes from the image's source file name; images
    /// without one produce unprefixed names and a diagnostic.
    pub fn project_volume(
        &self,
        image: &VolumeImage,
        out_dir: &Path,
        request: &ProjectionRequest,
    ) -> Result<ProjectionOutcome> {
        let validated = validate(request)?;
        let prefix = derive_prefix(image.source())?;
        let projection = self.run(image, validated.with_extra(prefix.diagnostics))?;
        self.write(projection, &prefix.value, out_dir)
    }

    /// Load a `.nii` / `.nii.gz` file and project it.
    pub fn project_file(
        &self,
        input: &Path,
        out_dir: &Path,
        request: &ProjectionRequest,
    ) -> Result<ProjectionOutcome> {
        let validated = validate(request)?;
        let prefix = derive_prefix(Some(input))?;
        let image = read_nifti(input)?;
        let projection = self.run(&image, validated.with_extra(prefix.diagnostics))?;
        self.write(projection, &prefix.value, out_dir)
    }

    fn run(&self, image: &VolumeImage, validated: Validated) -> Result<Projection> {
        let Validated {
            request,
            diagnostics,
        } = validated;

        let (lh_table, rh_table) = self.store.load_pair(request.family)?;

        info!(
            family = %request.family,
            interp = %request.interp,
            shape = ?image.grid.shape(),
            volumes = image.grid.num_volumes(),
            vertices = lh_table.num_vertices(),
            "Projecting volume"
        );

        let (left, right) = rayon::join(
            || project_hemisphere(image, &lh_table, request.interp),
            || project_hemisphere(image, &rh_table, request.interp),
        );

        Ok(Projection {
            left: left?,
            right: right?,
            family: request.family,
            interp: request.interp,
            out_type: request.out_type,
            diagnostics,
        })
    }

    fn write(&self, projection: Projection, prefix: &str, out_dir: &Path) -> Result<ProjectionOutcome> {
        std::fs::create_dir_all(out_dir).map_err(|source| RegFusionError::OutputDir {
            path: out_dir.to_path_buf(),
            source,
        })?;
        let out_dir = out_dir
            .canonicalize()
            .map_err(|source| RegFusionError::OutputDir {
                path: out_dir.to_path_buf(),
                source,
            })?;

        let path_for = |hemisphere| {
            out_dir.join(output_file_name(
                prefix,
                hemisphere,
                projection.family,
                projection.out_type,
            ))
        };
        let lh_path = path_for(Hemisphere::Left);
        let rh_path = path_for(Hemisphere::Right);

        write_surface_pair(
            projection.out_type,
            (&lh_path, &projection.left.data),
            (&rh_path, &projection.right.data),
        )?;

        Ok(ProjectionOutcome {
            projection,
            lh_path,
            rh_path,
        })
    }
}

/// A validated request plus every diagnostic raised while preparing it.
struct Validated {
    request: ValidatedRequest,
    diagnostics: Vec<Diagnostic>,
}

impl Validated {
    fn with_extra(mut self, extra: Vec<Diagnostic>) -> Self {
        for diagnostic in &extra {
            warn!("{}", diagnostic);
        }
        self.diagnostics.extend(extra);
        self
    }
}

fn validate(request: &ProjectionRequest) -> Result<Validated> {
    let request = request.validate()?;
    let diagnostics = request.diagnostics.clone();
    for diagnostic in &diagnostics {
        warn!("{}", diagnostic);
    }
    Ok(Validated {
        request,
        diagnostics,
    })
}

struct Prefix {
    value: String,
    diagnostics: Vec<Diagnostic>,
}

fn derive_prefix(source: Option<&Path>) -> Result<Prefix> {
    let (value, diagnostics) = image_prefix(source)?;
    Ok(Prefix { value, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use regfusion_common::MappingKey;
    use test_utils::{assert_approx_eq, create_linear_volume, create_test_volume};

    fn table(hemisphere: Hemisphere, voxels: &[[f64; 3]], affine: &AffineTransform) -> MappingTable {
        let voxels = Matrix3xX::from_fn(voxels.len(), |r, c| voxels[c][r]);
        MappingTable::new(
            MappingKey::new(hemisphere, MappingFamily::AntsMni152),
            "memory",
            affine.voxel_to_ras(&voxels),
        )
    }

    #[test]
    fn test_project_data_identity_affine() {
        let grid = VolumeGrid::from_volume(create_test_volume((4, 4, 4))).unwrap();
        let coords = Matrix3xX::from_column_slice(&[1.0, 2.0, 3.0, 3.0, 0.0, 1.0]);
        let out = project_data(&grid, &AffineTransform::identity(), &coords, Interpolation::Nearest)
            .unwrap();
        assert_eq!(out.shape(), &[1, 2]);
        assert_eq!(out[[0, 0]], 10203.0);
        assert_eq!(out[[0, 1]], 30001.0);
    }

    #[test]
    fn test_project_data_linear_field_through_affine() {
        let affine = AffineTransform::scaled(2.0, [-10.0, 4.0, 0.0]).unwrap();
        let grid =
            VolumeGrid::from_volume(create_linear_volume((6, 6, 6), [1.0, 2.0, -1.0, 5.0])).unwrap();
        let t = table(Hemisphere::Left, &[[0.5, 1.25, 4.0], [2.0, 2.0, 2.0]], &affine);

        let surface = project_hemisphere(
            &VolumeImage::new(grid, affine),
            &t,
            Interpolation::Linear,
        )
        .unwrap();
        assert_eq!(surface.hemisphere, Hemisphere::Left);
        assert_approx_eq!(surface.data[[0, 0]], 0.5 + 2.5 - 4.0 + 5.0, 1e-9);
        assert_approx_eq!(surface.data[[0, 1]], 2.0 + 4.0 - 2.0 + 5.0, 1e-9);
    }

    #[test]
    fn test_out_of_grid_vertex_is_error() {
        let affine = AffineTransform::identity();
        let grid = VolumeGrid::from_volume(Array3::zeros((3, 3, 3))).unwrap();
        let t = table(Hemisphere::Right, &[[1.0, 1.0, 1.0], [1.0, 3.5, 1.0]], &affine);

        let err = project_hemisphere(&VolumeImage::new(grid, affine), &t, Interpolation::Linear)
            .unwrap_err();
        assert!(matches!(
            err,
            RegFusionError::Grid(grid_processor::GridError::OutOfBounds { vertex: 1, axis: 1, .. })
        ));
    }

    #[test]
    fn test_projection_surface_lookup() {
        let surface = |hemisphere| ProjectedSurface {
            hemisphere,
            data: Array2::zeros((1, 2)),
        };
        let projection = Projection {
            left: surface(Hemisphere::Left),
            right: surface(Hemisphere::Right),
            family: MappingFamily::AntsMni152,
            interp: Interpolation::Linear,
            out_type: OutputType::Volumetric,
            diagnostics: Vec::new(),
        };
        assert_eq!(projection.surface(Hemisphere::Right).hemisphere, Hemisphere::Right);
        assert_eq!(projection.surface(Hemisphere::Left).num_vertices(), 2);
    }
}
