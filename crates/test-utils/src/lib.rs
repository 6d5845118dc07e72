//! Shared test utilities for the seismic-dashboard workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Test data path helpers
//! - Skip macros for optional real-world rasters
//! - Synthetic shaking-grid generators
//! - GeoTIFF fixture writers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{require_test_file, write_geotiff, GeoTiffOptions};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro to skip a test if the required file is not found.
///
/// Real ShakeMap rasters are large and not checked in; tests that need them
/// print a skip message and return early when they are missing.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_real_intensity_raster() {
///     let path = require_test_file!("intensity_mmi.tif");
///     // Test code using path...
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Download test data or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
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

/// Macro for approximate equality of `(x, y)` coordinate pairs.
///
/// Either side may be any expression yielding a pair, such as the result of
/// `AffineTransform::apply`.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (x1, y1) = $left;
        let (x2, y2) = $right;
        $crate::assert_approx_eq!(x1, x2, $epsilon);
        $crate::assert_approx_eq!(y1, y2, $epsilon);
    }};
}
