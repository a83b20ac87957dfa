//! Locating the full-size data set and scratch directories.
//!
//! The published mapping tables hold 163,842 vertices per hemisphere and
//! the expected projections of the two probability maps are of similar
//! size, so neither lives in the repository. Tests that compare against
//! them look in a few places and skip when something is missing.

use std::path::{Path, PathBuf};

/// Directory searched first for reference inputs and expected outputs.
pub const REFERENCE_DIR_ENV: &str = "REGFUSION_REFERENCE_DIR";

/// Directory holding the published mapping tables.
pub const MAPPING_DIR_ENV: &str = "REGFUSION_MAPPING_DIR";

/// The workspace root (two levels above this crate's manifest).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Directories searched by [`find_reference_file`], in order.
///
/// `$REGFUSION_REFERENCE_DIR`, then `$REGFUSION_MAPPING_DIR`, then
/// `testdata/reference` under the workspace root.
pub fn reference_search_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [REFERENCE_DIR_ENV, MAPPING_DIR_ENV]
        .into_iter()
        .filter_map(std::env::var_os)
        .map(PathBuf::from)
        .collect();
    dirs.push(workspace_root().join("testdata").join("reference"));
    dirs
}

/// First existing `dir/name` over [`reference_search_dirs`].
pub fn find_reference_file(name: &str) -> Option<PathBuf> {
    reference_search_dirs()
        .into_iter()
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}

/// Scratch directory removed when the returned handle is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}
