//! Flatten a raster into georeferenced (x, y, value) triples.

use crate::loader::{AffineTransform, RasterSample};

/// Three parallel sequences of equal length, in row-major raster order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedPoints {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Vec<f32>,
}

impl FlattenedPoints {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Flatten a loaded raster.
pub fn flatten(raster: &RasterSample) -> FlattenedPoints {
    flatten_grid(&raster.values, raster.width, raster.height, &raster.transform)
}

/// Walk every cell row-major and map `(col, row)` through the transform.
///
/// Sentinel values (no-data, NaN) are passed through untouched.
pub fn flatten_grid(
    values: &[f32],
    width: usize,
    height: usize,
    transform: &AffineTransform,
) -> FlattenedPoints {
    let count = (width * height).min(values.len());
    let mut out = FlattenedPoints {
        xs: Vec::with_capacity(count),
        ys: Vec::with_capacity(count),
        values: Vec::with_capacity(count),
    };

    for row in 0..height {
        for col in 0..width {
            let Some(&value) = values.get(row * width + col) else {
                return out;
            };
            // Column first: the transform maps (col, row)
            let (x, y) = transform.apply(col as f64, row as f64);
            out.xs.push(x);
            out.ys.push(y);
            out.values.push(value);
        }
    }

    out
}
