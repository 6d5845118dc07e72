//! Per-parameter processing and dashboard assembly.
//!
//! ```text
//! GeoTIFF ─▶ load_raster ─▶ flatten ─▶ GeoTable ─▶ interpolate_nearest ─▶ render_heatmap
//!                                                                              │
//!                          Dashboard ◀── attach (one slot per parameter) ◀─────┘
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{error, info};

use grid_processor::{interpolate_nearest, InterpolatedGrid};
use raster_io::{flatten, load_raster, GeoTable};
use renderer::{
    render_heatmap, Dashboard, DisplayedDashboard, HeatmapPanel, HeatmapStyle, InitOptions,
    PanelSlot,
};
use seismic_common::{Parameter, SeismicError, SeismicResult};

use crate::config::DashboardConfig;

/// Everything produced for one parameter.
#[derive(Debug, Clone)]
pub struct ParameterOutput {
    pub parameter: Parameter,
    /// Number of flattened raster samples
    pub points: usize,
    pub grid: InterpolatedGrid,
    pub panel: HeatmapPanel,
}

/// Run the full chain for one parameter.
pub fn run_parameter(
    param: Parameter,
    config: &DashboardConfig,
    style: &HeatmapStyle,
) -> SeismicResult<ParameterOutput> {
    let started = Instant::now();
    let info = param.info();
    let path = config.raster_path(param);

    let mut raster = load_raster(&path)?;
    if config.mask_nodata && raster.nodata.is_some() {
        raster = raster.mask_nodata();
    }

    let points = flatten(&raster);
    let table = GeoTable::from_flattened(&points, Some(&config.crs))?;
    table.check_source_epsg(raster.epsg);

    let grid = interpolate_nearest(&table, config.grid_size)?;

    let (x_title, y_title) = table.crs().axis_titles();
    let panel = render_heatmap(
        &grid,
        style,
        info.title,
        info.units,
        config.panel_width,
        config.panel_height,
    )?
    .with_axis_titles(x_title, y_title);

    info!(
        parameter = info.key,
        path = %path.display(),
        points = table.len(),
        grid_size = grid.size,
        value_range = ?grid.value_range(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Parameter processed"
    );

    Ok(ParameterOutput {
        parameter: param,
        points: table.len(),
        grid,
        panel,
    })
}

/// Run every parameter, in parallel when configured.
///
/// Results come back in `Parameter::ALL` order regardless of scheduling.
pub fn run_all(
    config: &DashboardConfig,
    styles: &BTreeMap<Parameter, HeatmapStyle>,
) -> Vec<(Parameter, SeismicResult<ParameterOutput>)> {
    let run = |param: Parameter| {
        let result = match styles.get(&param) {
            Some(style) => run_parameter(param, config, style),
            None => Err(SeismicError::config(format!("no heatmap style for {}", param))),
        };
        (param, result)
    };

    if config.parallel {
        Parameter::ALL.par_iter().map(|&p| run(p)).collect()
    } else {
        Parameter::ALL.iter().map(|&p| run(p)).collect()
    }
}

/// Claim one slot per parameter before any processing starts.
fn claim_slots(dashboard: &mut Dashboard) -> SeismicResult<BTreeMap<Parameter, PanelSlot>> {
    Parameter::ALL
        .iter()
        .map(|&param| {
            let info = param.info();
            let (column, row) = info.slot;
            Ok((param, dashboard.panel(column, row, info.title)?))
        })
        .collect()
}

/// Build and display the dashboard described by `config`.
///
/// Any failed parameter aborts the run before anything is displayed; every
/// failure is logged and the first one is returned.
pub fn build_dashboard(config: &DashboardConfig) -> SeismicResult<DisplayedDashboard> {
    config.validate()?;
    renderer::init(InitOptions {
        license_key: config.license_key.clone(),
    })?;

    let mut dashboard = Dashboard::new(config.theme);
    dashboard.allocate(config.columns, config.rows)?;
    let slots = claim_slots(&mut dashboard)?;
    let styles = config.heatmap_styles()?;

    info!(
        data_dir = %config.data_dir.display(),
        grid_size = config.grid_size,
        parallel = config.parallel,
        "Processing parameters"
    );

    let mut outputs = Vec::with_capacity(Parameter::ALL.len());
    let mut first_error = None;
    for (param, result) in run_all(config, &styles) {
        match result {
            Ok(output) => outputs.push(output),
            Err(e) => {
                error!(parameter = param.key(), error = %e, "Parameter pipeline failed");
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    for output in outputs {
        if let Some(slot) = slots.get(&output.parameter) {
            output.panel.attach(&mut dashboard, slot)?;
        }
    }

    dashboard.show(&config.output_dir)
}
