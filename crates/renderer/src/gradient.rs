//! Gradient/heatmap rendering for interpolated seismic grids.

use std::fmt;

use grid_processor::{bilinear_sample, nearest_sample, InterpolatedGrid};
use rayon::prelude::*;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use seismic_common::{Extent, SeismicError, SeismicResult};

use crate::dashboard::{Dashboard, PanelSlot};
use crate::style::hex_to_rgb;

/// Height of the legend strip under each heatmap, in pixels.
pub const LEGEND_HEIGHT: usize = 12;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let trimmed = hex.trim_start_matches('#');
        if !trimmed.is_ascii() {
            return None;
        }
        match trimmed.len() {
            6 => hex_to_rgb(trimmed).map(|(r, g, b)| Self::rgb(r, g, b)),
            8 => {
                let (r, g, b) = hex_to_rgb(&trimmed[0..6])?;
                let a = u8::from_str_radix(&trimmed[6..8], 16).ok()?;
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }

    /// `#RRGGBB`, with an alpha byte appended when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Linear interpolation towards `other`; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Source-over blend of `self` onto an opaque `background`.
    pub fn over(self, background: Color) -> Color {
        match self.a {
            255 => self,
            0 => background,
            a => {
                let blended = background.lerp(Color::new(self.r, self.g, self.b, 255), a as f32 / 255.0);
                Color::new(blended.r, blended.g, blended.b, 255)
            }
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::from_hex(&text).ok_or_else(|| D::Error::custom(format!("invalid color '{}'", text)))
    }
}

/// One stop of a color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub value: f64,
    pub color: Color,
}

impl ColorStop {
    pub fn new(value: f64, color: Color) -> Self {
        Self { value, color }
    }
}

/// Ordered color stops with linear blending between neighbours.
///
/// In percentage mode stop values are fractions of the data range in
/// `[0, 1]`; otherwise they are absolute data values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
    percentage_values: bool,
}

impl ColorRamp {
    /// Build a ramp, validating stop order and range.
    ///
    /// # Errors
    /// `Config` when the ramp is empty, a stop value is not finite, values
    /// are not strictly increasing, or a percentage stop lies outside [0, 1].
    pub fn new(stops: Vec<ColorStop>, percentage_values: bool) -> SeismicResult<Self> {
        if stops.is_empty() {
            return Err(SeismicError::config("color ramp needs at least one stop"));
        }
        if let Some(stop) = stops.iter().find(|s| !s.value.is_finite()) {
            return Err(SeismicError::config(format!(
                "color stop value {} is not finite",
                stop.value
            )));
        }
        if let Some(pair) = stops.windows(2).find(|w| w[1].value <= w[0].value) {
            return Err(SeismicError::config(format!(
                "color stops must be strictly increasing ({} then {})",
                pair[0].value, pair[1].value
            )));
        }
        if percentage_values {
            if let Some(stop) = stops.iter().find(|s| !(0.0..=1.0).contains(&s.value)) {
                return Err(SeismicError::config(format!(
                    "percentage stop {} is outside [0, 1]",
                    stop.value
                )));
            }
            let first = stops[0].value;
            let last = stops[stops.len() - 1].value;
            if first != 0.0 || last != 1.0 {
                warn!(first, last, "Percentage ramp does not cover the full data range");
            }
        }

        Ok(Self {
            stops,
            percentage_values,
        })
    }

    /// Deep blue through orange to white, in percentage mode.
    pub fn default_seismic() -> Self {
        Self {
            stops: vec![
                ColorStop::new(0.0, Color::rgb(0, 0, 139)),
                ColorStop::new(0.25, Color::rgb(0, 104, 204)),
                ColorStop::new(0.5, Color::rgb(255, 140, 0)),
                ColorStop::new(0.75, Color::rgb(255, 185, 110)),
                ColorStop::new(1.0, Color::rgb(255, 255, 255)),
            ],
            percentage_values: true,
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn is_percentage(&self) -> bool {
        self.percentage_values
    }

    /// Ramp position of `value`.
    ///
    /// Absolute ramps use the value itself. Percentage ramps use its fraction
    /// of `range`; a zero or missing range maps to 0.
    pub fn position(&self, value: f32, range: Option<(f32, f32)>) -> f64 {
        if !self.percentage_values {
            return value as f64;
        }
        match range {
            Some((lo, hi)) if hi > lo => (value as f64 - lo as f64) / (hi as f64 - lo as f64),
            _ => 0.0,
        }
    }

    /// Color at a ramp position, clamped to the end stops.
    pub fn color_at_position(&self, position: f64) -> Color {
        if position.is_nan() {
            return Color::transparent();
        }
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if position <= first.value {
            return first.color;
        }
        if position >= last.value {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if position <= high.value {
                let t = (position - low.value) / (high.value - low.value);
                return low.color.lerp(high.color, t as f32);
            }
        }
        last.color
    }

    /// Color for a data value; NaN is transparent.
    pub fn color_for(&self, value: f32, range: Option<(f32, f32)>) -> Color {
        if value.is_nan() {
            return Color::transparent();
        }
        self.color_at_position(self.position(value, range))
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::default_seismic()
    }
}

/// Visual options for one heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapStyle {
    /// Blend between grid nodes instead of drawing flat cells.
    pub interpolate_intensity: bool,
    /// Outline grid cells in the dashboard theme's wireframe color.
    pub show_wireframe: bool,
    pub palette_steps: ColorRamp,
}

impl HeatmapStyle {
    /// Whether ramp stops are fractions of the data range.
    pub fn percentage_mode(&self) -> bool {
        self.palette_steps.is_percentage()
    }
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            interpolate_intensity: true,
            show_wireframe: false,
            palette_steps: ColorRamp::default_seismic(),
        }
    }
}

/// Axis title and interval shown alongside a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisInfo {
    pub title: String,
    pub min: f64,
    pub max: f64,
}

/// Descriptive data recorded for each panel in the dashboard manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelMetadata {
    pub title: String,
    pub units: String,
    pub x_axis: AxisInfo,
    pub y_axis: AxisInfo,
    pub grid_size: usize,
    pub origin: [f64; 2],
    pub step: [f64; 2],
    pub value_range: Option<[f32; 2]>,
    pub nan_cells: usize,
    pub interpolate_intensity: bool,
    pub show_wireframe: bool,
    pub percentage_mode: bool,
    pub stops: Vec<ColorStop>,
}

/// A rendered heatmap, ready to be placed in a dashboard slot.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPanel {
    pub width: usize,
    pub height: usize,
    /// RGBA, row 0 at the grid's max-y edge
    pub pixels: Vec<u8>,
    /// Cell-boundary pixels, present when the style shows the wireframe
    pub wireframe: Option<Vec<bool>>,
    /// RGBA legend strip, `width × LEGEND_HEIGHT`
    pub legend: Vec<u8>,
    pub metadata: PanelMetadata,
}

impl HeatmapPanel {
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// Replace the default `Longitude` / `Latitude` axis titles.
    pub fn with_axis_titles(mut self, x_title: &str, y_title: &str) -> Self {
        self.metadata.x_axis.title = x_title.to_string();
        self.metadata.y_axis.title = y_title.to_string();
        self
    }

    /// Register this panel in its dashboard slot.
    pub fn attach(self, dashboard: &mut Dashboard, slot: &PanelSlot) -> SeismicResult<()> {
        dashboard.populate(slot, self)
    }
}

/// Map a pixel center to a fractional grid coordinate along one axis.
#[inline]
fn pixel_to_grid(px: usize, pixels: usize, nodes: usize) -> f64 {
    (px as f64 + 0.5) * nodes as f64 / pixels as f64 - 0.5
}

/// Grid cell drawn at pixel `px` with nearest sampling.
#[inline]
fn cell_index(px: usize, pixels: usize, nodes: usize) -> usize {
    let g = pixel_to_grid(px, pixels, nodes).round().max(0.0) as usize;
    g.min(nodes - 1)
}

/// Render an interpolated grid into a heatmap panel.
///
/// Each pixel samples the grid (bilinear or nearest, per the style), resolves
/// a ramp position and takes the blended ramp color. NaN cells stay
/// transparent.
///
/// # Errors
/// `Config` for a zero panel size, `Render` when the grid values do not
/// match its size.
pub fn render_heatmap(
    grid: &InterpolatedGrid,
    style: &HeatmapStyle,
    title: &str,
    units: &str,
    width: usize,
    height: usize,
) -> SeismicResult<HeatmapPanel> {
    if width == 0 || height == 0 {
        return Err(SeismicError::config(format!(
            "panel size must be positive, got {}x{}",
            width, height
        )));
    }
    let n = grid.size;
    if n == 0 || grid.values.len() != n * n {
        return Err(SeismicError::render(format!(
            "grid of size {} holds {} values",
            n,
            grid.values.len()
        )));
    }

    let range = grid.value_range();
    let ramp = &style.palette_steps;
    let mut pixels = vec![0u8; width * height * 4];

    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(py, row)| {
            // Flip so image row 0 is the max-y edge
            let gy = (n - 1) as f64 - pixel_to_grid(py, height, n);
            for (px, pixel) in row.chunks_exact_mut(4).enumerate() {
                let gx = pixel_to_grid(px, width, n);
                let value = if style.interpolate_intensity {
                    bilinear_sample(grid, gx, gy)
                } else {
                    nearest_sample(grid, gx, gy)
                };
                let color = ramp.color_for(value, range);
                pixel.copy_from_slice(&[color.r, color.g, color.b, color.a]);
            }
        });

    let wireframe = style
        .show_wireframe
        .then(|| wireframe_mask(width, height, n));
    let legend = render_legend(ramp, width, LEGEND_HEIGHT);

    debug!(
        title,
        width,
        height,
        grid_size = n,
        interpolated = style.interpolate_intensity,
        "Rendered heatmap"
    );

    Ok(HeatmapPanel {
        width,
        height,
        pixels,
        wireframe,
        legend,
        metadata: panel_metadata(grid, style, title, units, range),
    })
}

fn panel_metadata(
    grid: &InterpolatedGrid,
    style: &HeatmapStyle,
    title: &str,
    units: &str,
    range: Option<(f32, f32)>,
) -> PanelMetadata {
    let Extent {
        min_x,
        max_x,
        min_y,
        max_y,
    } = grid.extent;

    PanelMetadata {
        title: title.to_string(),
        units: units.to_string(),
        x_axis: AxisInfo {
            title: "Longitude".to_string(),
            min: min_x,
            max: max_x,
        },
        y_axis: AxisInfo {
            title: "Latitude".to_string(),
            min: min_y,
            max: max_y,
        },
        grid_size: grid.size,
        origin: [grid.origin_x, grid.origin_y],
        step: [grid.step_x, grid.step_y],
        value_range: range.map(|(lo, hi)| [lo, hi]),
        nan_cells: grid.nan_count(),
        interpolate_intensity: style.interpolate_intensity,
        show_wireframe: style.show_wireframe,
        percentage_mode: style.percentage_mode(),
        stops: style.palette_steps.stops().to_vec(),
    }
}

/// Pixels where the drawn grid cell changes from the previous pixel.
fn wireframe_mask(width: usize, height: usize, n: usize) -> Vec<bool> {
    let col_edges: Vec<bool> = (0..width)
        .map(|px| px > 0 && cell_index(px, width, n) != cell_index(px - 1, width, n))
        .collect();
    let row_edges: Vec<bool> = (0..height)
        .map(|py| py > 0 && cell_index(py, height, n) != cell_index(py - 1, height, n))
        .collect();

    let mut mask = vec![false; width * height];
    for (py, row) in mask.chunks_exact_mut(width).enumerate() {
        for (px, cell) in row.iter_mut().enumerate() {
            *cell = row_edges[py] || col_edges[px];
        }
    }
    mask
}

/// Render a horizontal legend strip from the first to the last stop.
pub fn render_legend(ramp: &ColorRamp, width: usize, height: usize) -> Vec<u8> {
    let stops = ramp.stops();
    let first = stops[0].value;
    let last = stops[stops.len() - 1].value;

    let row: Vec<u8> = (0..width)
        .flat_map(|px| {
            let t = if width > 1 {
                px as f64 / (width - 1) as f64
            } else {
                0.0
            };
            let c = ramp.color_at_position(first + (last - first) * t);
            [c.r, c.g, c.b, c.a]
        })
        .collect();

    row.repeat(height)
}
