//! Common test fixtures for projection tests.
//!
//! This module provides pre-defined grids and a mapping directory builder
//! that lays out per-hemisphere tables under their canonical file names.

use nalgebra::Matrix3xX;
use regfusion_common::{Hemisphere, MappingFamily, MappingKey};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::generators::{spread_voxels, voxels_to_world, write_mapping_table};

/// Common grid specifications for testing.
pub mod grid {
    /// Axis-aligned grid description: shape, isotropic voxel size, origin.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub shape: (usize, usize, usize),
        pub voxel_size: f64,
        pub origin: [f64; 3],
    }

    impl GridSpec {
        /// Returns the total number of voxels.
        pub fn size(&self) -> usize {
            self.shape.0 * self.shape.1 * self.shape.2
        }

        /// Row-major 4×4 voxel-to-world affine.
        pub fn affine_rows(&self) -> [[f64; 4]; 4] {
            let s = self.voxel_size;
            let o = self.origin;
            [
                [s, 0.0, 0.0, o[0]],
                [0.0, s, 0.0, o[1]],
                [0.0, 0.0, s, o[2]],
                [0.0, 0.0, 0.0, 1.0],
            ]
        }
    }

    /// 5×5×5 grid with 2mm voxels at the origin.
    pub const SMALL_2MM: GridSpec = GridSpec {
        shape: (5, 5, 5),
        voxel_size: 2.0,
        origin: [0.0, 0.0, 0.0],
    };

    /// Downsized MNI-like grid: 4mm voxels, origin shifted so (0,0,0)mm is inside.
    pub const MNI_4MM: GridSpec = GridSpec {
        shape: (12, 14, 12),
        voxel_size: 4.0,
        origin: [-22.0, -26.0, -22.0],
    };
}

/// A temporary mapping directory populated with left/right tables.
pub struct MappingDirFixture {
    dir: TempDir,
}

impl MappingDirFixture {
    /// Empty mapping directory.
    pub fn new() -> Self {
        Self {
            dir: tempfile::Builder::new()
                .prefix("regfusion_mappings_")
                .tempdir()
                .expect("Failed to create mapping directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path a table for `key` lives at.
    pub fn table_path(&self, key: MappingKey) -> PathBuf {
        self.dir.path().join(key.file_name())
    }

    /// Write one hemisphere's table.
    pub fn write_table(&self, key: MappingKey, coords: &Matrix3xX<f64>) -> PathBuf {
        let path = self.table_path(key);
        write_mapping_table(&path, coords).expect("Failed to write mapping table");
        path
    }

    /// Write the same table for both hemispheres of `family`.
    pub fn write_family(&self, family: MappingFamily, coords: &Matrix3xX<f64>) {
        for hemisphere in Hemisphere::ALL {
            self.write_table(MappingKey::new(hemisphere, family), coords);
        }
    }

    /// Write tables for every family, `count` vertices spread through `spec`.
    pub fn with_all_families(spec: grid::GridSpec, count: usize) -> Self {
        let fixture = Self::new();
        let world = voxels_to_world(&spread_voxels(spec.shape, count), spec.voxel_size, spec.origin);
        for family in MappingFamily::ALL {
            fixture.write_family(family, &world);
        }
        fixture
    }
}

impl Default for MappingDirFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_spec_size() {
        assert_eq!(grid::SMALL_2MM.size(), 125);
        assert_eq!(grid::SMALL_2MM.affine_rows()[0][0], 2.0);
    }

    #[test]
    fn test_mapping_fixture_writes_all_tables() {
        let fixture = MappingDirFixture::with_all_families(grid::SMALL_2MM, 4);
        for family in MappingFamily::ALL {
            for key in MappingKey::pair(family) {
                assert!(fixture.table_path(key).exists(), "{}", key);
            }
        }
    }
}
