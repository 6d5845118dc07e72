//! Test data generators for synthetic ground-motion rasters.
//!
//! All grids are `Vec<f32>` in row-major order (row 0 first).

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);  // col=1, row=0
/// assert_eq!(grid[10], 1.0);    // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a shaking field that decays with distance from an epicentre.
///
/// The epicentre sits at the fractional position (`epi_col`, `epi_row`);
/// the peak value is `peak` and falls off as `peak / (1 + d / 4)` where `d`
/// is the distance in cells.
pub fn create_shaking_grid(
    width: usize,
    height: usize,
    epi_col: f32,
    epi_row: f32,
    peak: f32,
) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - epi_col;
            let dy = row as f32 - epi_row;
            let d = (dx * dx + dy * dy).sqrt();
            data.push(peak / (1.0 + d / 4.0));
        }
    }
    data
}

/// Creates an MMI-like grid with values between 1 and 9.
pub fn create_mmi_grid(width: usize, height: usize) -> Vec<f32> {
    create_shaking_grid(
        width,
        height,
        width as f32 / 2.0,
        height as f32 / 2.0,
        8.0,
    )
    .into_iter()
    .map(|v| v + 1.0)
    .collect()
}

/// Creates a grid where every cell has the same value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid with a sentinel value in every `period`-th cell.
pub fn create_grid_with_sentinel(
    width: usize,
    height: usize,
    sentinel: f32,
    period: usize,
) -> Vec<f32> {
    create_test_grid(width, height)
        .into_iter()
        .enumerate()
        .map(|(i, v)| if period > 0 && i % period == 0 { sentinel } else { v })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shaking_peak_at_epicentre() {
        let grid = create_shaking_grid(9, 9, 4.0, 4.0, 1.5);
        let peak = grid[4 * 9 + 4];
        assert_eq!(peak, 1.5);
        assert!(grid.iter().all(|&v| v <= peak && v > 0.0));
    }

    #[test]
    fn test_mmi_range() {
        let grid = create_mmi_grid(20, 10);
        assert!(grid.iter().all(|&v| (1.0..=9.0).contains(&v)));
    }

    #[test]
    fn test_sentinel_period() {
        let grid = create_grid_with_sentinel(4, 2, -9999.0, 3);
        let count = grid.iter().filter(|&&v| v == -9999.0).count();
        assert_eq!(count, 3); // indices 0, 3, 6
    }
}
