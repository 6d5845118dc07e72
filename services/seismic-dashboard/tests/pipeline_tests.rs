//! End-to-end tests for the dashboard pipeline.

use std::path::Path;

use renderer::{DashboardManifest, HeatmapStyle, Theme};
use seismic_common::{ErrorKind, Parameter};
use seismic_dashboard::{build_dashboard, run_all, run_parameter, DashboardConfig};
use test_utils::{
    require_test_file, temp_test_dir_with_prefix, write_geotiff, write_seismic_dataset,
    GeoReference, GeoTiffOptions,
};

fn small_config(data_dir: &Path, output_dir: &Path) -> DashboardConfig {
    DashboardConfig {
        data_dir: data_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        grid_size: 40,
        panel_width: 64,
        panel_height: 48,
        ..DashboardConfig::default()
    }
}

// ============================================================================
// Full run
// ============================================================================

#[test]
fn test_build_dashboard_writes_image_and_manifest() {
    let data = temp_test_dir_with_prefix("pipeline_data_");
    let out = temp_test_dir_with_prefix("pipeline_out_");
    write_seismic_dataset(data.path(), 30, 20).unwrap();

    let config = DashboardConfig {
        theme: Theme::Dark,
        ..small_config(data.path(), out.path())
    };
    let displayed = build_dashboard(&config).unwrap();

    assert!(displayed.image_path.exists());
    assert!(displayed.manifest_path.exists());
    assert_eq!(displayed.populated_panels, 4);
    assert!(displayed.width > 2 * 64);
    assert!(displayed.height > 2 * 48);

    let png = std::fs::read(&displayed.image_path).unwrap();
    assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

    let manifest: DashboardManifest =
        serde_json::from_str(&std::fs::read_to_string(&displayed.manifest_path).unwrap())
            .unwrap();
    assert_eq!(manifest.theme, Theme::Dark);
    assert_eq!((manifest.columns, manifest.rows), (2, 2));
    assert_eq!(manifest.panels.len(), 4);

    for param in Parameter::ALL {
        let info = param.info();
        let entry = manifest
            .panels
            .iter()
            .find(|p| (p.column, p.row) == info.slot)
            .unwrap();
        assert_eq!(entry.title, info.title);
        let metadata = entry.metadata.as_ref().unwrap();
        assert_eq!(metadata.grid_size, 40);
        assert_eq!(metadata.units, info.units);
        assert_eq!(metadata.x_axis.title, "Longitude");
    }
}

#[test]
fn test_sequential_and_parallel_runs_match() {
    let data = temp_test_dir_with_prefix("pipeline_par_");
    let out = temp_test_dir_with_prefix("pipeline_par_out_");
    write_seismic_dataset(data.path(), 25, 25).unwrap();

    let parallel = small_config(data.path(), out.path());
    let sequential = DashboardConfig {
        parallel: false,
        ..parallel.clone()
    };
    let styles = parallel.heatmap_styles().unwrap();

    let a = run_all(&parallel, &styles);
    let b = run_all(&sequential, &styles);
    assert_eq!(a.len(), 4);

    for ((pa, ra), (pb, rb)) in a.into_iter().zip(b) {
        assert_eq!(pa, pb);
        let (ra, rb) = (ra.unwrap(), rb.unwrap());
        let bits_a: Vec<u32> = ra.grid.values.iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u32> = rb.grid.values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
        assert_eq!(ra.panel.pixels, rb.panel.pixels);
    }
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_raster_aborts_before_display() {
    let data = temp_test_dir_with_prefix("pipeline_missing_");
    let out = temp_test_dir_with_prefix("pipeline_missing_out_");
    write_seismic_dataset(data.path(), 10, 10).unwrap();
    std::fs::remove_file(data.path().join(Parameter::Pgv.info().file_name)).unwrap();

    let config = small_config(data.path(), out.path());
    let err = build_dashboard(&config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FileNotFound);
    assert_eq!(err.exit_code(), 3);
    assert!(!out.path().join("dashboard.png").exists());
    assert!(!out.path().join("dashboard.json").exists());
}

#[test]
fn test_layout_too_small_is_layout_error() {
    let data = temp_test_dir_with_prefix("pipeline_layout_");
    let out = temp_test_dir_with_prefix("pipeline_layout_out_");
    // No rasters on disk: the slot claim must fail before any loading
    for (columns, rows) in [(1, 2), (1, 1), (2, 1)] {
        let config = DashboardConfig {
            columns,
            rows,
            ..small_config(data.path(), out.path())
        };
        let err = build_dashboard(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Layout, "{}x{}", columns, rows);
        assert_eq!(err.exit_code(), 2);
    }
    assert!(!out.path().join("dashboard.png").exists());
}

#[test]
fn test_zero_layout_is_layout_error() {
    let data = temp_test_dir_with_prefix("pipeline_zero_");
    let out = temp_test_dir_with_prefix("pipeline_zero_out_");

    let config = DashboardConfig {
        rows: 0,
        ..small_config(data.path(), out.path())
    };
    let err = build_dashboard(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Layout);
}

// ============================================================================
// Single parameter
// ============================================================================

#[test]
fn test_identity_raster_round_trips_through_pipeline() {
    let data = temp_test_dir_with_prefix("pipeline_identity_");
    let out = temp_test_dir_with_prefix("pipeline_identity_out_");
    let options = GeoTiffOptions {
        georef: GeoReference::Transformation([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
        ..GeoTiffOptions::default()
    };
    write_geotiff(
        &data.path().join("identity.tif"),
        2,
        2,
        &[1.0, 2.0, 3.0, 4.0],
        &options,
    )
    .unwrap();

    let mut config = small_config(data.path(), out.path());
    config.grid_size = 2;
    config.files.insert(Parameter::Mmi, "identity.tif".into());

    let output = run_parameter(Parameter::Mmi, &config, &HeatmapStyle::default()).unwrap();

    assert_eq!(output.points, 4);
    assert_eq!(output.grid.values, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(output.grid.origin(), (0.0, 0.0));
    assert_eq!(output.grid.step(), (0.5, 0.5));
    assert_eq!(output.panel.title(), Parameter::Mmi.title());
}

#[test]
fn test_nodata_cells_are_masked() {
    let data = temp_test_dir_with_prefix("pipeline_nodata_");
    let out = temp_test_dir_with_prefix("pipeline_nodata_out_");
    let options = GeoTiffOptions {
        nodata: Some(-9999.0),
        ..GeoTiffOptions::default()
    };
    let values = [5.0, -9999.0, 6.0, 7.0, 8.0, -9999.0];
    write_geotiff(&data.path().join("masked.tif"), 3, 2, &values, &options).unwrap();

    let mut config = small_config(data.path(), out.path());
    config.grid_size = 3;
    config.files.insert(Parameter::Pga, "masked.tif".into());

    let output = run_parameter(Parameter::Pga, &config, &HeatmapStyle::default()).unwrap();
    let (lo, hi) = output.grid.value_range().unwrap();
    assert_eq!((lo, hi), (5.0, 8.0));
    assert!(output.grid.nan_count() > 0);
}

// ============================================================================
// Real data
// ============================================================================

#[test]
fn test_real_intensity_raster() {
    let path = require_test_file!("intensity_mmi.tif");
    let out = temp_test_dir_with_prefix("pipeline_real_");

    let mut config = small_config(path.parent().unwrap(), out.path());
    config.grid_size = 100;

    let output = run_parameter(Parameter::Mmi, &config, &HeatmapStyle::default()).unwrap();
    let (lo, hi) = output.grid.value_range().unwrap();
    assert!(lo >= 0.0);
    assert!(hi <= 12.0);
}
