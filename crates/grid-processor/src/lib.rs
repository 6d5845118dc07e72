//! Grid resampling for scattered point samples.
//!
//! ```text
//! GeoTable (x, y, value)
//!      │
//!      ├─► Extent of all points ──► DegenerateRange if an axis is flat
//!      │
//!      ├─► R-tree over the points
//!      │
//!      └─► grid_size × grid_size mesh, each node takes its nearest point
//!               │
//!               ▼
//!          InterpolatedGrid (origin + step) ──► renderer
//! ```

pub mod interpolation;
pub mod types;

pub use interpolation::{bilinear_sample, interpolate_nearest, nearest_sample};
pub use types::{InterpolatedGrid, DEFAULT_GRID_SIZE};
