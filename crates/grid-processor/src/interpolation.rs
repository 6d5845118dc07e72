//! Interpolation methods for grid resampling.

use rayon::prelude::*;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::{debug, warn};

use raster_io::GeoTable;
use seismic_common::{Extent, SeismicError, SeismicResult};

use crate::types::{mesh_coord, InterpolatedGrid};

/// A source point in the R-tree, remembering its position in the table.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    coord: [f64; 2],
    index: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coord)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.coord[0] - point[0];
        let dy = self.coord[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Find the source index nearest to `query`.
///
/// Ties at exactly equal squared distance go to the lowest source index,
/// i.e. the earliest cell in row-major raster order.
fn nearest_index(tree: &RTree<IndexedPoint>, query: &[f64; 2]) -> Option<usize> {
    let mut iter = tree.nearest_neighbor_iter_with_distance_2(query);
    let (first, best_dist) = iter.next()?;
    let mut best = first.index;
    for (candidate, dist) in iter {
        if dist > best_dist {
            break;
        }
        best = best.min(candidate.index);
    }
    Some(best)
}

/// Resample a point table onto a `grid_size × grid_size` mesh using
/// nearest-neighbour interpolation.
///
/// The mesh spans the table's extent with both edges included. Every output
/// cell holds the value of some input point.
///
/// # Errors
/// - `Config` if `grid_size` is zero
/// - `EmptyInput` if the table has no points with finite coordinates
/// - `DegenerateRange` if all points share one x or one y coordinate
pub fn interpolate_nearest(table: &GeoTable, grid_size: usize) -> SeismicResult<InterpolatedGrid> {
    if grid_size == 0 {
        return Err(SeismicError::config("grid_size must be at least 1"));
    }

    let indexed: Vec<IndexedPoint> = table
        .points()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.x.is_finite() && p.y.is_finite())
        .map(|(index, p)| IndexedPoint {
            coord: [p.x, p.y],
            index,
        })
        .collect();

    if indexed.is_empty() {
        return Err(SeismicError::empty_input(
            "no points with finite coordinates to interpolate",
        ));
    }
    let skipped = table.len() - indexed.len();
    if skipped > 0 {
        warn!(skipped, "Ignoring points with non-finite coordinates");
    }

    let extent = Extent::from_points(indexed.iter().map(|p| (p.coord[0], p.coord[1])))
        .ok_or_else(|| SeismicError::empty_input("no points to interpolate"))?;
    extent.ensure_non_degenerate()?;

    let tree = RTree::bulk_load(indexed);
    let points = table.points();

    let mut values = vec![f32::NAN; grid_size * grid_size];
    values
        .par_chunks_mut(grid_size)
        .enumerate()
        .for_each(|(row, row_values)| {
            let y = mesh_coord(extent.min_y, extent.max_y, grid_size, row);
            for (col, cell) in row_values.iter_mut().enumerate() {
                let x = mesh_coord(extent.min_x, extent.max_x, grid_size, col);
                if let Some(index) = nearest_index(&tree, &[x, y]) {
                    *cell = points[index].value;
                }
            }
        });

    let step_x = extent.width() / grid_size as f64;
    let step_y = extent.height() / grid_size as f64;

    debug!(
        points = table.len(),
        grid_size,
        min_x = extent.min_x,
        max_x = extent.max_x,
        min_y = extent.min_y,
        max_y = extent.max_y,
        step_x,
        step_y,
        "Interpolated grid"
    );

    Ok(InterpolatedGrid {
        size: grid_size,
        values,
        extent,
        origin_x: extent.min_x,
        origin_y: extent.min_y,
        step_x,
        step_y,
    })
}

/// Nearest grid node value at fractional grid position (`gx`, `gy`).
///
/// Returns NaN outside the grid.
pub fn nearest_sample(grid: &InterpolatedGrid, gx: f64, gy: f64) -> f32 {
    if gx < -0.5 || gy < -0.5 {
        return f32::NAN;
    }
    let col = gx.round() as usize;
    let row = gy.round() as usize;
    grid.value_at(col, row).unwrap_or(f32::NAN)
}

/// Bilinear interpolation at fractional grid position (`gx`, `gy`).
///
/// Smoothly blends the four surrounding nodes; positions are clamped to the
/// grid edges and any NaN corner yields NaN.
pub fn bilinear_sample(grid: &InterpolatedGrid, gx: f64, gy: f64) -> f32 {
    let n = grid.size;
    if n == 0 {
        return f32::NAN;
    }
    let max = (n - 1) as f64;
    let x = gx.clamp(0.0, max);
    let y = gy.clamp(0.0, max);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(n - 1);
    let y1 = (y0 + 1).min(n - 1);

    let xf = (x - x0 as f64) as f32;
    let yf = (y - y0 as f64) as f32;

    let v00 = grid.values[y0 * n + x0];
    let v10 = grid.values[y0 * n + x1];
    let v01 = grid.values[y1 * n + x0];
    let v11 = grid.values[y1 * n + x1];

    // Handle NaN values - if any corner is NaN, return NaN
    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let bottom = v00 * (1.0 - xf) + v10 * xf;
    let top = v01 * (1.0 - xf) + v11 * xf;
    bottom * (1.0 - yf) + top * yf
}
