//! Dashboard layout, composition and display.
//!
//! A dashboard moves through a fixed lifecycle:
//!
//! ```text
//! Uninitialized --allocate--> Allocated --populate (all slots)--> Populated
//!                                 |                                   |
//!                                 +--------------show-----------------+--> Displayed
//! ```
//!
//! There is no way back; `Displayed` is terminal.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use seismic_common::{SeismicError, SeismicResult};

use crate::gradient::{Color, HeatmapPanel, PanelMetadata, LEGEND_HEIGHT};
use crate::png::create_png_auto;

/// Space around each panel, in pixels.
const MARGIN: usize = 16;

/// Gap between a heatmap and its legend strip.
const LEGEND_GAP: usize = 6;

pub const IMAGE_FILE: &str = "dashboard.png";
pub const MANIFEST_FILE: &str = "dashboard.json";

/// Visual theme for the composed dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    White,
    Dark,
}

impl Theme {
    pub fn background(&self) -> Color {
        match self {
            Theme::White => Color::rgb(255, 255, 255),
            Theme::Dark => Color::rgb(24, 26, 31),
        }
    }

    pub fn frame(&self) -> Color {
        match self {
            Theme::White => Color::rgb(160, 160, 160),
            Theme::Dark => Color::rgb(90, 94, 104),
        }
    }

    pub fn wireframe(&self) -> Color {
        match self {
            Theme::White => Color::rgb(64, 64, 64),
            Theme::Dark => Color::rgb(200, 200, 200),
        }
    }

    /// Fill for slots that were never populated.
    pub fn empty_slot(&self) -> Color {
        match self {
            Theme::White => Color::rgb(240, 240, 240),
            Theme::Dark => Color::rgb(36, 38, 44),
        }
    }
}

impl FromStr for Theme {
    type Err = SeismicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "light" => Ok(Theme::White),
            "dark" | "black" => Ok(Theme::Dark),
            other => Err(SeismicError::config(format!("unknown theme '{}'", other))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::White => write!(f, "white"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Lifecycle state of a [`Dashboard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardState {
    Uninitialized,
    Allocated,
    Populated,
    Displayed,
}

impl fmt::Display for DashboardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DashboardState::Uninitialized => "uninitialized",
            DashboardState::Allocated => "allocated",
            DashboardState::Populated => "populated",
            DashboardState::Displayed => "displayed",
        };
        f.write_str(name)
    }
}

/// Handle to one claimed panel slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelSlot {
    column: usize,
    row: usize,
    title: String,
}

impl PanelSlot {
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

#[derive(Debug)]
struct SlotEntry {
    title: String,
    panel: Option<HeatmapPanel>,
}

/// A `columns × rows` grid of heatmap panels.
#[derive(Debug)]
pub struct Dashboard {
    theme: Theme,
    state: DashboardState,
    columns: usize,
    rows: usize,
    slots: Vec<Option<SlotEntry>>,
}

/// Files written by [`Dashboard::show`].
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedDashboard {
    pub image_path: PathBuf,
    pub manifest_path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub populated_panels: usize,
}

/// One slot as recorded in `dashboard.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub column: usize,
    pub row: usize,
    pub title: String,
    pub metadata: Option<PanelMetadata>,
}

/// Machine-readable description of a displayed dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardManifest {
    pub generated_at: DateTime<Utc>,
    pub theme: Theme,
    pub columns: usize,
    pub rows: usize,
    pub image: String,
    pub width: usize,
    pub height: usize,
    pub licensed: bool,
    pub panels: Vec<PanelEntry>,
}

/// Composed RGBA canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl ComposedImage {
    fn filled(width: usize, height: usize, color: Color) -> Self {
        let pixels = [color.r, color.g, color.b, color.a].repeat(width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    fn put(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * 4;
            self.pixels[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    fn get(&self, x: usize, y: usize) -> Color {
        let i = (y * self.width + x) * 4;
        Color::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    /// Blend an RGBA block with its top-left corner at (x0, y0).
    fn blit(&mut self, x0: usize, y0: usize, width: usize, height: usize, rgba: &[u8]) {
        for (dy, row) in rgba.chunks_exact(width * 4).take(height).enumerate() {
            for (dx, p) in row.chunks_exact(4).enumerate() {
                let (x, y) = (x0 + dx, y0 + dy);
                if x < self.width && y < self.height {
                    let src = Color::new(p[0], p[1], p[2], p[3]);
                    let blended = src.over(self.get(x, y));
                    self.put(x, y, blended);
                }
            }
        }
    }

    fn fill_rect(&mut self, x0: usize, y0: usize, width: usize, height: usize, color: Color) {
        for y in y0..y0 + height {
            for x in x0..x0 + width {
                self.put(x, y, color);
            }
        }
    }

    /// One-pixel outline just outside the given rectangle.
    fn outline(&mut self, x0: usize, y0: usize, width: usize, height: usize, color: Color) {
        let left = x0.saturating_sub(1);
        let top = y0.saturating_sub(1);
        let right = x0 + width;
        let bottom = y0 + height;
        for x in left..=right {
            self.put(x, top, color);
            self.put(x, bottom, color);
        }
        for y in top..=bottom {
            self.put(left, y, color);
            self.put(right, y, color);
        }
    }
}

impl Dashboard {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            state: DashboardState::Uninitialized,
            columns: 0,
            rows: 0,
            slots: Vec::new(),
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// `(columns, rows)` once allocated.
    pub fn layout(&self) -> Option<(usize, usize)> {
        match self.state {
            DashboardState::Uninitialized => None,
            _ => Some((self.columns, self.rows)),
        }
    }

    fn ensure_not_displayed(&self, action: &str) -> SeismicResult<()> {
        if self.state == DashboardState::Displayed {
            return Err(SeismicError::invalid_state(
                self.state.to_string(),
                format!("cannot {} a displayed dashboard", action),
            ));
        }
        Ok(())
    }

    /// Allocate the panel layout.
    ///
    /// # Errors
    /// - `Config` if [`crate::init`] has not run
    /// - `Layout` for a zero column or row count
    /// - `InvalidState` if the layout was already allocated
    pub fn allocate(&mut self, columns: usize, rows: usize) -> SeismicResult<()> {
        if !crate::is_initialized() {
            return Err(SeismicError::config(
                "renderer::init must be called before allocating a dashboard",
            ));
        }
        self.ensure_not_displayed("allocate")?;
        if self.state != DashboardState::Uninitialized {
            return Err(SeismicError::invalid_state(
                self.state.to_string(),
                "layout is already allocated",
            ));
        }
        if columns == 0 || rows == 0 {
            return Err(SeismicError::Layout {
                column: 0,
                row: 0,
                columns,
                rows,
            });
        }

        self.columns = columns;
        self.rows = rows;
        self.slots = (0..columns * rows).map(|_| None).collect();
        self.state = DashboardState::Allocated;
        info!(columns, rows, theme = %self.theme, "Dashboard allocated");
        Ok(())
    }

    fn slot_index(&self, column: usize, row: usize) -> SeismicResult<usize> {
        if column >= self.columns || row >= self.rows {
            return Err(SeismicError::Layout {
                column,
                row,
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(row * self.columns + column)
    }

    /// Claim the slot at (`column_index`, `row_index`).
    ///
    /// Claiming an already-claimed slot returns the same handle.
    ///
    /// # Errors
    /// `Layout` if the dashboard is not allocated or an index is out of
    /// bounds; `InvalidState` once displayed.
    pub fn panel(
        &mut self,
        column_index: usize,
        row_index: usize,
        title: &str,
    ) -> SeismicResult<PanelSlot> {
        self.ensure_not_displayed("claim a panel on")?;
        let index = self.slot_index(column_index, row_index)?;

        let entry = self.slots[index].get_or_insert_with(|| SlotEntry {
            title: title.to_string(),
            panel: None,
        });
        if entry.title != title {
            warn!(
                column = column_index,
                row = row_index,
                claimed = %entry.title,
                requested = title,
                "Slot already claimed under another title"
            );
        }
        debug!(column = column_index, row = row_index, title = %entry.title, "Panel slot claimed");

        Ok(PanelSlot {
            column: column_index,
            row: row_index,
            title: entry.title.clone(),
        })
    }

    /// Place a rendered panel in a claimed slot.
    ///
    /// # Errors
    /// `Layout` for a slot outside this layout, `InvalidState` for an
    /// unclaimed or already populated slot, or once displayed.
    pub fn populate(&mut self, slot: &PanelSlot, panel: HeatmapPanel) -> SeismicResult<()> {
        self.ensure_not_displayed("populate")?;
        let index = self.slot_index(slot.column, slot.row)?;
        let state = self.state.to_string();

        let entry = self.slots[index].as_mut().ok_or_else(|| {
            SeismicError::invalid_state(
                state.clone(),
                format!("slot ({}, {}) was never claimed", slot.column, slot.row),
            )
        })?;
        if entry.panel.is_some() {
            return Err(SeismicError::invalid_state(
                state,
                format!("slot ({}, {}) is already populated", slot.column, slot.row),
            ));
        }
        entry.panel = Some(panel);
        debug!(column = slot.column, row = slot.row, title = %slot.title, "Panel populated");

        let all_filled = self
            .slots
            .iter()
            .all(|s| s.as_ref().map(|e| e.panel.is_some()).unwrap_or(false));
        if all_filled {
            self.state = DashboardState::Populated;
            info!(panels = self.slots.len(), "Dashboard populated");
        }
        Ok(())
    }

    /// Number of slots holding a panel.
    pub fn populated_panels(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.as_ref().map(|e| e.panel.is_some()).unwrap_or(false))
            .count()
    }

    /// Compose every panel onto a single canvas.
    pub fn compose(&self) -> ComposedImage {
        let panels = || self.slots.iter().flatten().filter_map(|e| e.panel.as_ref());
        let panel_w = panels().map(|p| p.width).max().unwrap_or(0);
        let panel_h = panels().map(|p| p.height).max().unwrap_or(0);

        let cell_w = panel_w + 2 * MARGIN;
        let cell_h = panel_h + LEGEND_GAP + LEGEND_HEIGHT + 2 * MARGIN;
        let mut canvas = ComposedImage::filled(
            cell_w * self.columns,
            cell_h * self.rows,
            self.theme.background(),
        );

        for row in 0..self.rows {
            for column in 0..self.columns {
                let x0 = column * cell_w + MARGIN;
                let y0 = row * cell_h + MARGIN;
                let panel = self.slots[row * self.columns + column]
                    .as_ref()
                    .and_then(|e| e.panel.as_ref());

                match panel {
                    Some(panel) => self.draw_panel(&mut canvas, x0, y0, panel),
                    None => canvas.fill_rect(x0, y0, panel_w, panel_h, self.theme.empty_slot()),
                }
                canvas.outline(x0, y0, panel_w, panel_h, self.theme.frame());
            }
        }

        canvas
    }

    fn draw_panel(&self, canvas: &mut ComposedImage, x0: usize, y0: usize, panel: &HeatmapPanel) {
        canvas.blit(x0, y0, panel.width, panel.height, &panel.pixels);

        if let Some(mask) = &panel.wireframe {
            let color = self.theme.wireframe();
            for (i, _) in mask.iter().enumerate().filter(|(_, on)| **on) {
                canvas.put(x0 + i % panel.width, y0 + i / panel.width, color);
            }
        }

        let legend_y = y0 + panel.height + LEGEND_GAP;
        canvas.blit(x0, legend_y, panel.width, LEGEND_HEIGHT, &panel.legend);
    }

    /// Manifest entries for every slot in row-major order.
    fn panel_entries(&self) -> Vec<PanelEntry> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                s.as_ref().map(|entry| PanelEntry {
                    column: i % self.columns,
                    row: i / self.columns,
                    title: entry.title.clone(),
                    metadata: entry.panel.as_ref().map(|p| p.metadata.clone()),
                })
            })
            .collect()
    }

    /// Compose the dashboard and write `dashboard.png` and `dashboard.json`
    /// into `output_dir`.
    ///
    /// # Errors
    /// `InvalidState` before allocation, with no populated panel, or when
    /// already displayed; `Render` or `Io` while writing output.
    pub fn show(&mut self, output_dir: impl AsRef<Path>) -> SeismicResult<DisplayedDashboard> {
        self.ensure_not_displayed("show")?;
        if self.state == DashboardState::Uninitialized {
            return Err(SeismicError::invalid_state(
                self.state.to_string(),
                "allocate a layout before showing",
            ));
        }
        let populated = self.populated_panels();
        if populated == 0 {
            return Err(SeismicError::invalid_state(
                self.state.to_string(),
                "no panel has been populated",
            ));
        }
        if self.state != DashboardState::Populated {
            warn!(
                populated,
                slots = self.columns * self.rows,
                "Showing a partially populated dashboard"
            );
        }

        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        let canvas = self.compose();
        let png = create_png_auto(&canvas.pixels, canvas.width, canvas.height)?;
        let image_path = output_dir.join(IMAGE_FILE);
        fs::write(&image_path, &png)?;

        let manifest = DashboardManifest {
            generated_at: Utc::now(),
            theme: self.theme,
            columns: self.columns,
            rows: self.rows,
            image: IMAGE_FILE.to_string(),
            width: canvas.width,
            height: canvas.height,
            licensed: crate::is_licensed(),
            panels: self.panel_entries(),
        };
        let manifest_path = output_dir.join(MANIFEST_FILE);
        fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?)?;

        self.state = DashboardState::Displayed;
        info!(
            path = %image_path.display(),
            width = canvas.width,
            height = canvas.height,
            bytes = png.len(),
            panels = populated,
            "Dashboard displayed"
        );

        Ok(DisplayedDashboard {
            image_path,
            manifest_path,
            width: canvas.width,
            height: canvas.height,
            populated_panels: populated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse() {
        assert_eq!("White".parse::<Theme>().unwrap(), Theme::White);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_outline_and_blit() {
        let mut canvas = ComposedImage::filled(6, 6, Color::rgb(255, 255, 255));
        canvas.outline(1, 1, 4, 4, Color::rgb(0, 0, 0));
        assert_eq!(canvas.get(0, 0), Color::rgb(0, 0, 0));
        assert_eq!(canvas.get(5, 5), Color::rgb(0, 0, 0));
        assert_eq!(canvas.get(2, 2), Color::rgb(255, 255, 255));

        // A transparent pixel keeps the background
        canvas.blit(2, 2, 2, 1, &[10, 20, 30, 255, 0, 0, 0, 0]);
        assert_eq!(canvas.get(2, 2), Color::rgb(10, 20, 30));
        assert_eq!(canvas.get(3, 2), Color::rgb(255, 255, 255));
    }

    #[test]
    fn test_panel_before_allocate_is_layout_error() {
        let mut dashboard = Dashboard::new(Theme::White);
        let err = dashboard.panel(0, 0, "x").unwrap_err();
        assert_eq!(err.kind(), seismic_common::ErrorKind::Layout);
    }
}
