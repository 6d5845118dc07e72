//! Tests for Extent computation and degenerate-range detection.

use seismic_common::{Axis, ErrorKind, Extent, SeismicError};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_extent_new() {
    let extent = Extent::new(172.0, 178.5, -41.0, -36.5);
    assert_eq!(extent.min_x, 172.0);
    assert_eq!(extent.max_x, 178.5);
    assert_eq!(extent.min_y, -41.0);
    assert_eq!(extent.max_y, -36.5);
}

#[test]
fn test_extent_copy() {
    let e1 = Extent::new(0.0, 10.0, 0.0, 10.0);
    let e2 = e1;
    assert_eq!(e1, e2);
}

// ============================================================================
// from_points tests
// ============================================================================

#[test]
fn test_from_single_point() {
    let extent = Extent::from_points([(175.5, -39.2)]).unwrap();
    assert_eq!(extent.width(), 0.0);
    assert_eq!(extent.height(), 0.0);
    assert!(extent.contains_point(175.5, -39.2));
}

#[test]
fn test_from_raster_like_points() {
    // 3x2 grid at 0.5 degree spacing, north-up
    let mut points = Vec::new();
    for row in 0..2 {
        for col in 0..3 {
            points.push((175.0 + col as f64 * 0.5, -38.0 - row as f64 * 0.5));
        }
    }

    let extent = Extent::from_points(points).unwrap();
    assert_eq!(extent.min_x, 175.0);
    assert_eq!(extent.max_x, 176.0);
    assert_eq!(extent.min_y, -38.5);
    assert_eq!(extent.max_y, -38.0);
}

// ============================================================================
// contains_point tests
// ============================================================================

#[test]
fn test_contains_point_edges_inclusive() {
    let extent = Extent::new(0.0, 1.0, 0.0, 1.0);
    assert!(extent.contains_point(0.0, 0.0));
    assert!(extent.contains_point(1.0, 1.0));
    assert!(extent.contains_point(0.5, 0.5));
    assert!(!extent.contains_point(1.0001, 0.5));
    assert!(!extent.contains_point(0.5, -0.0001));
}

// ============================================================================
// Degenerate range tests
// ============================================================================

#[test]
fn test_zero_width_is_degenerate() {
    let extent = Extent::from_points([(5.0, 0.0), (5.0, 1.0), (5.0, 2.0)]).unwrap();
    let err = extent.ensure_non_degenerate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DegenerateRange);
    match err {
        SeismicError::DegenerateRange { axis, value } => {
            assert_eq!(axis, Axis::X);
            assert_eq!(value, 5.0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_zero_height_is_degenerate() {
    let extent = Extent::from_points([(0.0, -3.0), (1.0, -3.0)]).unwrap();
    assert!(matches!(
        extent.ensure_non_degenerate(),
        Err(SeismicError::DegenerateRange { axis: Axis::Y, .. })
    ));
}

#[test]
fn test_infinite_width_is_degenerate() {
    let extent = Extent::new(0.0, f64::INFINITY, 0.0, 1.0);
    assert!(extent.ensure_non_degenerate().is_err());
}
