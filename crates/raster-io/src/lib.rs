//! Raster input for the seismic dashboard.
//!
//! - [`loader`]: read band 1 and the affine transform from a GeoTIFF
//! - [`flatten`]: turn a raster into parallel x / y / value sequences
//! - [`table`]: CRS-tagged point collections

pub mod flatten;
pub mod loader;
pub mod table;

pub use flatten::{flatten, flatten_grid, FlattenedPoints};
pub use loader::{load_raster, AffineTransform, RasterSample};
pub use table::{GeoTable, PointRecord};
