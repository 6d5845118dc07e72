//! Benchmarks for nearest-neighbour interpolation.
//!
//! Run with: cargo bench --package grid-processor --bench interpolation_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grid_processor::interpolate_nearest;
use raster_io::{flatten_grid, AffineTransform, GeoTable};
use test_utils::create_mmi_grid;

fn shakemap_table(width: usize, height: usize) -> GeoTable {
    let values = create_mmi_grid(width, height);
    let t = AffineTransform::north_up(174.5, -37.0, 3.5 / width as f64, 3.0 / height as f64);
    let points = flatten_grid(&values, width, height, &t);
    GeoTable::from_flattened(&points, Some("EPSG:4326")).expect("valid table")
}

fn bench_interpolate_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate_nearest");
    let table = shakemap_table(210, 180);

    for grid_size in [100usize, 250, 500] {
        group.throughput(Throughput::Elements((grid_size * grid_size) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(grid_size),
            &grid_size,
            |b, &size| b.iter(|| interpolate_nearest(black_box(&table), size)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_interpolate_nearest);
criterion_main!(benches);
