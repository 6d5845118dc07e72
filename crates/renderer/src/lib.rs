//! Image rendering for seismic ground-motion grids.
//!
//! - [`gradient`]: color ramps and heatmap panels
//! - [`dashboard`]: panel layout, composition and display
//! - [`png`]: in-tree PNG encoder
//! - [`style`]: JSON style files for color ramps
//!
//! [`init`] must be called once per process before a dashboard is allocated.

use std::sync::OnceLock;

use seismic_common::{SeismicError, SeismicResult};
use tracing::{debug, info};

pub mod dashboard;
pub mod gradient;
pub mod png;
pub mod style;

pub use dashboard::{
    Dashboard, DashboardManifest, DashboardState, DisplayedDashboard, PanelEntry, PanelSlot, Theme,
};
pub use gradient::{
    render_heatmap, render_legend, Color, ColorRamp, ColorStop, HeatmapPanel, HeatmapStyle,
    PanelMetadata,
};

static RUNTIME: OnceLock<InitOptions> = OnceLock::new();

/// Process-wide renderer settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitOptions {
    /// License key recorded in dashboard manifests.
    pub license_key: Option<String>,
}

/// Initialize the renderer for this process.
///
/// Idempotent: later calls keep the options of the first successful call.
/// There is no teardown.
pub fn init(options: InitOptions) -> SeismicResult<()> {
    if let Some(key) = &options.license_key {
        if key.trim().is_empty() {
            return Err(SeismicError::config("license key must not be blank"));
        }
    }

    let licensed = options.license_key.is_some();
    let mut first = false;
    RUNTIME.get_or_init(|| {
        first = true;
        options
    });

    if first {
        info!(licensed, "Renderer initialized");
    } else {
        debug!("Renderer already initialized");
    }
    Ok(())
}

/// Whether [`init`] has completed in this process.
pub fn is_initialized() -> bool {
    RUNTIME.get().is_some()
}

/// Whether the process was initialized with a license key.
pub fn is_licensed() -> bool {
    RUNTIME
        .get()
        .map(|options| options.license_key.is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_rejects_blank_key() {
        let err = init(InitOptions {
            license_key: Some("  ".to_string()),
        })
        .unwrap_err();
        assert_eq!(err.kind(), seismic_common::ErrorKind::Config);
    }

    #[test]
    fn test_init_is_idempotent() {
        init(InitOptions::default()).unwrap();
        init(InitOptions::default()).unwrap();
        assert!(is_initialized());
    }
}
