//! Dashboard configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file
//! (with `${VAR}` / `${VAR:-default}` substitution), then `SEISMIC_*`
//! environment variables, then command-line flags applied by `main`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use grid_processor::DEFAULT_GRID_SIZE;
use renderer::style::{build_ramp, StopDefinition, StyleConfig};
use renderer::{ColorRamp, HeatmapStyle, Theme};
use seismic_common::{CrsCode, Parameter, SeismicError, SeismicResult};

/// Top-level dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding the parameter rasters
    pub data_dir: PathBuf,

    /// Directory receiving dashboard.png and dashboard.json
    pub output_dir: PathBuf,

    /// Mesh nodes per axis
    pub grid_size: usize,

    /// CRS tag for the point tables
    pub crs: String,

    pub theme: Theme,
    pub columns: usize,
    pub rows: usize,

    /// Heatmap size in pixels
    pub panel_width: usize,
    pub panel_height: usize,

    /// Run the parameter pipelines on the rayon pool
    pub parallel: bool,

    /// Replace GDAL no-data sentinels with NaN before flattening
    pub mask_nodata: bool,

    pub license_key: Option<String>,

    /// Per-parameter raster paths; relative paths resolve against `data_dir`
    pub files: BTreeMap<Parameter, PathBuf>,

    pub style: StyleSettings,
}

/// Heatmap style shared by all panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    pub interpolate_intensity: bool,
    pub show_wireframe: bool,
    /// Ramp stops as fractions of the value range. When unset this is true
    /// for the default ramp and false for a custom `palette_steps`, whose
    /// stops are then absolute values.
    pub percentage_mode: Option<bool>,
    /// Custom ramp; the default seismic ramp when absent
    pub palette_steps: Option<Vec<StopDefinition>>,
    /// JSON style file with per-parameter overrides keyed by parameter key
    pub styles_file: Option<PathBuf>,
}

impl StyleSettings {
    /// Effective percentage mode after applying the palette-dependent default.
    pub fn percentage_mode(&self) -> bool {
        self.percentage_mode.unwrap_or(self.palette_steps.is_none())
    }
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            interpolate_intensity: true,
            show_wireframe: false,
            percentage_mode: None,
            palette_steps: None,
            styles_file: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("TongariroAndBayOfPlenty"),
            output_dir: PathBuf::from("output"),
            grid_size: DEFAULT_GRID_SIZE,
            crs: "EPSG:4326".to_string(),
            theme: Theme::White,
            columns: 2,
            rows: 2,
            panel_width: 480,
            panel_height: 400,
            parallel: true,
            mask_nodata: true,
            license_key: None,
            files: BTreeMap::new(),
            style: StyleSettings::default(),
        }
    }
}

impl DashboardConfig {
    /// Parse YAML after expanding environment variable references.
    pub fn from_yaml_str(content: &str) -> SeismicResult<Self> {
        let expanded = expand_env_vars(content)?;
        serde_yaml::from_str(&expanded)
            .map_err(|e| SeismicError::config(format!("invalid dashboard config: {}", e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> SeismicResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SeismicError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Defaults or the given file, then environment overrides.
    pub fn load(path: Option<&Path>) -> SeismicResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `SEISMIC_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> SeismicResult<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup, using the environment variable
    /// names as keys.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> SeismicResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SEISMIC_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("SEISMIC_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup("SEISMIC_GRID_SIZE") {
            self.grid_size = size.trim().parse().map_err(|_| {
                SeismicError::config(format!("SEISMIC_GRID_SIZE is not a number: {}", size))
            })?;
        }
        if let Some(theme) = lookup("SEISMIC_THEME") {
            self.theme = theme.parse()?;
        }
        if let Some(crs) = lookup("SEISMIC_CRS") {
            self.crs = crs;
        }
        if let Some(parallel) = lookup("SEISMIC_PARALLEL") {
            self.parallel = parse_bool(&parallel).ok_or_else(|| {
                SeismicError::config(format!("SEISMIC_PARALLEL is not a boolean: {}", parallel))
            })?;
        }
        if let Some(key) = lookup("SEISMIC_LICENSE_KEY") {
            self.license_key = Some(key);
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// The layout is not checked here: the dashboard reports a `Layout`
    /// error when a parameter slot falls outside it.
    pub fn validate(&self) -> SeismicResult<()> {
        if self.grid_size == 0 {
            return Err(SeismicError::config("grid_size must be greater than 0"));
        }
        if self.panel_width == 0 || self.panel_height == 0 {
            return Err(SeismicError::config("panel size must be greater than 0"));
        }
        self.crs_code()?;
        Ok(())
    }

    pub fn crs_code(&self) -> SeismicResult<CrsCode> {
        CrsCode::parse(&self.crs)
    }

    /// Raster path for a parameter.
    pub fn raster_path(&self, param: Parameter) -> PathBuf {
        match self.files.get(&param) {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.data_dir.join(path),
            None => self.data_dir.join(param.info().file_name),
        }
    }

    /// The shared heatmap style before per-parameter overrides.
    pub fn base_style(&self) -> SeismicResult<HeatmapStyle> {
        let settings = &self.style;
        let percentage = settings.percentage_mode();
        let palette_steps = match &settings.palette_steps {
            Some(stops) => build_ramp(stops, percentage)?,
            None => ColorRamp::new(ColorRamp::default_seismic().stops().to_vec(), percentage)?,
        };

        Ok(HeatmapStyle {
            interpolate_intensity: settings.interpolate_intensity,
            show_wireframe: settings.show_wireframe,
            palette_steps,
        })
    }

    /// Resolve the heatmap style of every parameter.
    pub fn heatmap_styles(&self) -> SeismicResult<BTreeMap<Parameter, HeatmapStyle>> {
        let base = self.base_style()?;
        let overrides = match &self.style.styles_file {
            Some(path) => Some(StyleConfig::from_file(path)?),
            None => None,
        };

        Parameter::ALL
            .iter()
            .map(|&param| {
                let style = match overrides.as_ref().and_then(|c| c.get_style(param.key())) {
                    Some(definition) => definition.to_heatmap_style(&base)?,
                    None => base.clone(),
                };
                Ok((param, style))
            })
            .collect()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> SeismicResult<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next(); // consume '{'

        let mut expr = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => expr.push(c),
                None => {
                    return Err(SeismicError::config(format!(
                        "unclosed variable substitution: ${{{}",
                        expr
                    )))
                }
            }
        }
        result.push_str(&resolve_var_expr(&expr)?);
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> SeismicResult<String> {
    if let Some((name, default)) = expr.split_once(":-") {
        return Ok(match env::var(name.trim()) {
            Ok(value) if !value.is_empty() => value,
            _ => default.to_string(),
        });
    }
    env::var(expr.trim())
        .map_err(|_| SeismicError::config(format!("environment variable {} not set", expr)))
}
