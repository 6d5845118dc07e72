//! Coordinate extents of point sets and grids.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{SeismicError, SeismicResult};

/// Coordinate axis, used to report degenerate ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Axis-aligned extent in the coordinate units of the owning CRS.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Compute the extent of a set of (x, y) coordinates.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let extent = iter.fold(Extent::new(x0, x0, y0, y0), |mut e, (x, y)| {
            e.min_x = e.min_x.min(x);
            e.max_x = e.max_x.max(x);
            e.min_y = e.min_y.min(y);
            e.max_y = e.max_y.max(y);
            e
        });
        Some(extent)
    }

    /// Width of the extent in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the extent in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this extent (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Fail with `DegenerateRange` if either axis has zero (or non-finite) width.
    pub fn ensure_non_degenerate(&self) -> SeismicResult<()> {
        let width = self.width();
        if !(width.is_finite() && width > 0.0) {
            return Err(SeismicError::DegenerateRange {
                axis: Axis::X,
                value: self.min_x,
            });
        }
        let height = self.height();
        if !(height.is_finite() && height > 0.0) {
            return Err(SeismicError::DegenerateRange {
                axis: Axis::Y,
                value: self.min_y,
            });
        }
        Ok(())
    }
}
