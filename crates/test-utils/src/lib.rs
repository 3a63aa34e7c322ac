//! Test support for the GNSS-R mapping workspace.
//!
//! - [`fixtures`]: hand-checkable rasters, cell sizes and archive periods,
//!   plus writers for the JSON raster and observation feed formats
//! - [`generators`]: deterministic synthetic observation batches and
//!   global distance rasters
//! - [`paths`]: temporary output directories and lookup of optional data
//!
//! ```ignore
//! use test_utils::{require_test_file, temp_test_dir, write_raster_json};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a data file with [`find_test_file`], or return from the calling
/// test after printing a skip notice.
///
/// ```ignore
/// #[test]
/// fn test_published_raster() {
///     let path = require_test_file!("dist_to_coast.nc");
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: {} not found (set TEST_DATA_DIR)", $name);
                return;
            }
        }
    }};
}

/// Assert `|left - right| <= epsilon` on values convertible to f64.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        assert!(
            diff <= epsilon,
            "assertion failed: `(left ~ right)`\n  left: `{:?}`\n right: `{:?}`\n  \
             diff: `{:?}` > `{:?}`",
            left,
            right,
            diff,
            epsilon
        );
    }};
}
