//! Seismic ground-motion dashboard.
//!
//! Loads one GeoTIFF per ground-motion parameter, resamples each onto a
//! regular grid and composes the four heatmaps into a single dashboard.

pub mod config;
pub mod pipeline;

pub use config::{DashboardConfig, StyleSettings};
pub use pipeline::{build_dashboard, run_all, run_parameter, ParameterOutput};
