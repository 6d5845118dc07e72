//! Path utilities for locating test data files.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the test-utils manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a test file in multiple locations.
///
/// Checked in order:
/// 1. Environment variable `TEST_DATA_DIR` (if set)
/// 2. `crates/raster-io/testdata/`
/// 3. `services/seismic-dashboard/testdata/`
/// 4. `testdata/` at the workspace root
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        root.join("crates/raster-io/testdata").join(name),
        root.join("services/seismic-dashboard/testdata").join(name),
        root.join("testdata").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Creates a temporary directory with a specific prefix.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}
