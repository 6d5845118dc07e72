//! Tests for GeoTIFF loading, flattening and table building.

use raster_io::{flatten, load_raster, AffineTransform, GeoTable};
use seismic_common::{CrsCode, ErrorKind, SeismicError};
use test_utils::{
    assert_approx_eq, assert_coords_approx_eq, create_grid_with_sentinel, create_test_grid, require_test_file,
    temp_test_dir_with_prefix, write_geotiff, GeoReference, GeoTiffOptions,
};

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_missing_file() {
    let dir = temp_test_dir_with_prefix("missing_");
    let path = dir.path().join("pga_g.tif");
    match load_raster(&path) {
        Err(SeismicError::FileNotFound(p)) => assert_eq!(p, path),
        other => panic!("expected FileNotFound, got {:?}", other),
    }
}

#[test]
fn test_garbage_bytes_are_decode_error() {
    let dir = temp_test_dir_with_prefix("garbage_");
    let path = dir.path().join("broken.tif");
    std::fs::write(&path, b"definitely not a tiff").unwrap();
    assert_eq!(load_raster(&path).unwrap_err().kind(), ErrorKind::Decode);
}

#[test]
fn test_pixel_scale_georeference() {
    let dir = temp_test_dir_with_prefix("scale_");
    let path = dir.path().join("grid.tif");
    let data = create_test_grid(5, 3);
    write_geotiff(&path, 5, 3, &data, &GeoTiffOptions::default()).unwrap();

    let raster = load_raster(&path).unwrap();
    assert_eq!(raster.shape(), (3, 5));
    assert_eq!(raster.values, data);
    assert_eq!(raster.epsg, Some(4326));
    assert_eq!(raster.nodata, None);

    let t = raster.transform;
    assert_approx_eq!(t.a, 0.1, 1e-12);
    assert_approx_eq!(t.e, -0.1, 1e-12);
    assert_approx_eq!(t.c, 174.5, 1e-12);
    assert_approx_eq!(t.f, -37.0, 1e-12);
    assert_eq!(raster.get(1, 2), Some(1002.0));
}

#[test]
fn test_transformation_tag_takes_precedence() {
    let dir = temp_test_dir_with_prefix("matrix_");
    let path = dir.path().join("rotated.tif");
    let options = GeoTiffOptions {
        georef: GeoReference::Transformation([0.5, 0.1, 170.0, 0.05, -0.5, -35.0]),
        ..GeoTiffOptions::default()
    };
    write_geotiff(&path, 2, 2, &[1.0, 2.0, 3.0, 4.0], &options).unwrap();

    let raster = load_raster(&path).unwrap();
    assert_eq!(
        raster.transform,
        AffineTransform::new(0.5, 0.1, 170.0, 0.05, -0.5, -35.0)
    );
}

#[test]
fn test_pixel_is_point_shifts_origin() {
    let dir = temp_test_dir_with_prefix("point_");
    let path = dir.path().join("point.tif");
    let options = GeoTiffOptions {
        pixel_is_point: true,
        ..GeoTiffOptions::default()
    };
    write_geotiff(&path, 2, 2, &[0.0; 4], &options).unwrap();

    let t = load_raster(&path).unwrap().transform;
    assert_coords_approx_eq!((t.c, t.f), (174.45, -36.95), 1e-12);
    // Cell (1, 1) center sits on the tiepoint grid
    assert_coords_approx_eq!(t.apply(1.0, 1.0), (174.55, -37.05), 1e-12);
}

#[test]
fn test_no_georeference_uses_identity() {
    let dir = temp_test_dir_with_prefix("plain_");
    let path = dir.path().join("plain.tif");
    let options = GeoTiffOptions {
        georef: GeoReference::None,
        epsg: None,
        ..GeoTiffOptions::default()
    };
    write_geotiff(&path, 3, 2, &[0.0; 6], &options).unwrap();

    let raster = load_raster(&path).unwrap();
    assert!(raster.transform.is_identity());
    assert_eq!(raster.epsg, None);
}

#[test]
fn test_nodata_is_read_and_masked_on_request() {
    let dir = temp_test_dir_with_prefix("nodata_");
    let path = dir.path().join("nodata.tif");
    let data = create_grid_with_sentinel(4, 4, -9999.0, 5);
    let options = GeoTiffOptions {
        nodata: Some(-9999.0),
        ..GeoTiffOptions::default()
    };
    write_geotiff(&path, 4, 4, &data, &options).unwrap();

    let raster = load_raster(&path).unwrap();
    assert_eq!(raster.nodata, Some(-9999.0));
    // Loading keeps the sentinel; masking is explicit
    assert_eq!(raster.values[0], -9999.0);

    let masked = raster.mask_nodata();
    let nan_count = masked.values.iter().filter(|v| v.is_nan()).count();
    assert_eq!(nan_count, 4); // indices 0, 5, 10, 15
}

// ============================================================================
// Flattening and tables
// ============================================================================

#[test]
fn test_flatten_matches_transform_per_record() {
    let dir = temp_test_dir_with_prefix("flatten_");
    let path = dir.path().join("grid.tif");
    let data = create_test_grid(7, 4);
    write_geotiff(&path, 7, 4, &data, &GeoTiffOptions::default()).unwrap();

    let raster = load_raster(&path).unwrap();
    let points = flatten(&raster);
    assert_eq!(points.len(), 7 * 4);

    for row in 0..4 {
        for col in 0..7 {
            let i = row * 7 + col;
            let (x, y) = raster.transform.apply(col as f64, row as f64);
            assert_eq!(points.xs[i], x);
            assert_eq!(points.ys[i], y);
            assert_eq!(points.values[i], raster.values[i]);
        }
    }
}

#[test]
fn test_table_from_loaded_raster() {
    let dir = temp_test_dir_with_prefix("table_");
    let path = dir.path().join("grid.tif");
    write_geotiff(&path, 3, 3, &create_test_grid(3, 3), &GeoTiffOptions::default()).unwrap();

    let raster = load_raster(&path).unwrap();
    let table = GeoTable::from_flattened(&flatten(&raster), Some("EPSG:4326")).unwrap();
    assert_eq!(table.len(), 9);
    assert_eq!(table.crs(), CrsCode::Epsg4326);

    let extent = table.extent().unwrap();
    assert_approx_eq!(extent.min_x, 174.5, 1e-12);
    assert_approx_eq!(extent.max_x, 174.7, 1e-12);
    assert_approx_eq!(extent.min_y, -37.2, 1e-12);
    assert_approx_eq!(extent.max_y, -37.0, 1e-12);
}

#[test]
fn test_table_requires_known_crs() {
    let points = raster_io::flatten_grid(&[1.0], 1, 1, &AffineTransform::identity());
    assert_eq!(
        GeoTable::from_flattened(&points, None).unwrap_err().kind(),
        ErrorKind::Config
    );
    assert_eq!(
        GeoTable::from_flattened(&points, Some("EPSG:99999")).unwrap_err().kind(),
        ErrorKind::Config
    );
}

// ============================================================================
// Real data (skipped when not present)
// ============================================================================

#[test]
fn test_real_intensity_raster() {
    let path = require_test_file!("intensity_mmi.tif");
    let raster = load_raster(&path).unwrap();
    let (h, w) = raster.shape();
    assert!(w > 1 && h > 1);

    let points = flatten(&raster);
    assert_eq!(points.len(), w * h);
    let finite = points.values.iter().filter(|v| v.is_finite()).count();
    assert!(finite > 0);
}
