//! Core types for grid processing.

use serde::{Deserialize, Serialize};

use seismic_common::Extent;

/// Default number of mesh nodes per axis.
pub const DEFAULT_GRID_SIZE: usize = 500;

/// A dense `size × size` grid resampled from scattered points.
///
/// `values` is row-major: row index follows y (row 0 at `min_y`), column
/// index follows x (column 0 at `min_x`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedGrid {
    /// Nodes per axis
    pub size: usize,
    /// Row-major cell values
    pub values: Vec<f32>,
    /// Extent of the source points
    pub extent: Extent,
    /// Heatmap origin (min x)
    pub origin_x: f64,
    /// Heatmap origin (min y)
    pub origin_y: f64,
    /// `(max_x - min_x) / size`
    pub step_x: f64,
    /// `(max_y - min_y) / size`
    pub step_y: f64,
}

impl InterpolatedGrid {
    /// Value of the node at (col, row), or `None` outside the grid.
    pub fn value_at(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.size || row >= self.size {
            return None;
        }
        self.values.get(row * self.size + col).copied()
    }

    /// Coordinates of the mesh node at (col, row).
    ///
    /// Nodes span the extent inclusively, so the first and last node of each
    /// axis sit exactly on the extent edges.
    pub fn node_coord(&self, col: usize, row: usize) -> (f64, f64) {
        (
            mesh_coord(self.extent.min_x, self.extent.max_x, self.size, col),
            mesh_coord(self.extent.min_y, self.extent.max_y, self.size, row),
        )
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    pub fn step(&self) -> (f64, f64) {
        (self.step_x, self.step_y)
    }

    /// Min and max of the finite cell values.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Number of NaN cells.
    pub fn nan_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }
}

/// i-th of `n` evenly spaced positions on `[min, max]`, both ends included.
#[inline]
pub(crate) fn mesh_coord(min: f64, max: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        return min;
    }
    if i == n - 1 {
        return max;
    }
    min + (max - min) * i as f64 / (n - 1) as f64
}
