//! Test support for the regfusion workspace.
//!
//! - [`generators`]: synthetic volumes and mapping tables with known values
//! - [`fixtures`]: grid geometries and on-disk mapping directories
//! - [`reference`]: where the full-size published data set is looked up
//! - `require_reference_files!`: skip a test when that data set is absent
//! - `assert_approx_eq!` / `assert_all_approx_eq!`: float comparisons

pub mod fixtures;
pub mod generators;
pub mod reference;

pub use fixtures::*;
pub use generators::*;
pub use reference::*;

/// Resolve every named file with [`find_reference_file`], returning the
/// paths in argument order, or return early from the calling test when
/// any is missing.
///
/// ```ignore
/// let paths = require_reference_files!(
///     "lh.avgMapping_allSub_RF_ANTs_MNI152_orig_to_fsaverage.txt",
///     "lh.MNI_probMap_ants.central_sulc.allSub_RF_ANTs_MNI152_orig_to_fsaverage.nii.gz",
/// );
/// let (table, expected) = (&paths[0], &paths[1]);
/// ```
#[macro_export]
macro_rules! require_reference_files {
    ($($name:expr),+ $(,)?) => {{
        let mut found = Vec::new();
        let mut missing = Vec::new();
        $(
            let name = $name;
            let name: &str = ::std::convert::AsRef::<str>::as_ref(&name);
            match $crate::find_reference_file(name) {
                Some(path) => found.push(path),
                None => missing.push(name.to_string()),
            }
        )+
        if !missing.is_empty() {
            eprintln!(
                "SKIPPED: reference data not found: {}. Set {} or {}.",
                missing.join(", "),
                $crate::REFERENCE_DIR_ENV,
                $crate::MAPPING_DIR_ENV,
            );
            return;
        }
        found
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for element-wise approximate equality of two sequences.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_all_approx_eq;
///
/// assert_all_approx_eq!(&[1.0001, 2.0001], &[1.0, 2.0], 0.001);
/// ```
#[macro_export]
macro_rules! assert_all_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: Vec<f64> = $left.iter().map(|v| *v as f64).collect();
        let right: Vec<f64> = $right.iter().map(|v| *v as f64).collect();
        assert_eq!(left.len(), right.len(), "length mismatch");
        for (l, r) in left.iter().zip(right.iter()) {
            $crate::assert_approx_eq!(*l, *r, $epsilon);
        }
    }};
}
