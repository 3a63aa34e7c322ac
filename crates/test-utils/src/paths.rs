//! Locating optional test data.
//!
//! Large inputs such as NetCDF coastal rasters are not checked in. Tests
//! that need them look in a few well-known places and skip when absent.

use std::path::PathBuf;

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Search for a test data file.
///
/// Checked in order: `$TEST_DATA_DIR`, `crates/coastal-distance/testdata/`,
/// `services/gnssr-mapper/testdata/`, then `testdata/` at the workspace root.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let root = workspace_root();
    let env_dir = std::env::var_os("TEST_DATA_DIR").map(PathBuf::from);

    env_dir
        .into_iter()
        .chain([
            root.join("crates/coastal-distance/testdata"),
            root.join("services/gnssr-mapper/testdata"),
            root.join("testdata"),
        ])
        .map(|dir| dir.join(name))
        .find(|path| path.exists())
}

/// Temporary directory for test output, removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("gnssr_test_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}
