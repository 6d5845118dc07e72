//! CRS-tagged point tables.

use serde::{Deserialize, Serialize};
use tracing::warn;

use seismic_common::{CrsCode, Extent, SeismicError, SeismicResult};

use crate::flatten::FlattenedPoints;

/// One geographic coordinate and its sample value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub value: f32,
}

/// A point collection whose coordinates are expressed in `crs`.
#[derive(Debug, Clone)]
pub struct GeoTable {
    points: Vec<PointRecord>,
    crs: CrsCode,
}

impl GeoTable {
    /// Build a table from parallel columns.
    ///
    /// Fails with `Config` when the CRS tag is missing or unrecognized, or
    /// when the columns have different lengths.
    pub fn from_columns(
        xs: &[f64],
        ys: &[f64],
        values: &[f32],
        crs: Option<&str>,
    ) -> SeismicResult<Self> {
        let crs = match crs {
            Some(tag) if !tag.trim().is_empty() => CrsCode::parse(tag)?,
            _ => return Err(SeismicError::config("point table requires a CRS tag")),
        };

        if xs.len() != ys.len() || xs.len() != values.len() {
            return Err(SeismicError::config(format!(
                "column lengths differ: {} x, {} y, {} values",
                xs.len(),
                ys.len(),
                values.len()
            )));
        }

        let points = xs
            .iter()
            .zip(ys)
            .zip(values)
            .map(|((&x, &y), &value)| PointRecord { x, y, value })
            .collect();

        Ok(Self { points, crs })
    }

    /// Build a table from flattened raster output.
    pub fn from_flattened(points: &FlattenedPoints, crs: Option<&str>) -> SeismicResult<Self> {
        Self::from_columns(&points.xs, &points.ys, &points.values, crs)
    }

    /// Build a table from already-assembled records.
    pub fn from_records(points: Vec<PointRecord>, crs: CrsCode) -> Self {
        Self { points, crs }
    }

    pub fn points(&self) -> &[PointRecord] {
        &self.points
    }

    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Coordinate extent of all points.
    pub fn extent(&self) -> SeismicResult<Extent> {
        Extent::from_points(self.points.iter().map(|p| (p.x, p.y)))
            .ok_or_else(|| SeismicError::empty_input("point table has no points"))
    }

    /// Warn when the raster declared a different CRS than the tag.
    pub fn check_source_epsg(&self, epsg: Option<u16>) {
        if let Some(code) = epsg {
            if code != self.crs.epsg() {
                warn!(
                    raster_epsg = code,
                    table_crs = %self.crs,
                    "Raster CRS differs from table tag; coordinates are not reprojected"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seismic_common::ErrorKind;

    #[test]
    fn test_from_columns() {
        let table =
            GeoTable::from_columns(&[0.0, 1.0], &[2.0, 3.0], &[5.0, 6.0], Some("EPSG:4326"))
                .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.crs(), CrsCode::Epsg4326);
        assert_eq!(
            table.points()[1],
            PointRecord {
                x: 1.0,
                y: 3.0,
                value: 6.0
            }
        );
    }

    #[test]
    fn test_missing_crs_is_config_error() {
        let err = GeoTable::from_columns(&[0.0], &[0.0], &[1.0], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = GeoTable::from_columns(&[0.0], &[0.0], &[1.0], Some("  ")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_unknown_crs_is_config_error() {
        let err = GeoTable::from_columns(&[0.0], &[0.0], &[1.0], Some("EPSG:1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_length_mismatch() {
        let err = GeoTable::from_columns(&[0.0, 1.0], &[0.0], &[1.0], Some("EPSG:4326"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_empty_extent() {
        let table = GeoTable::from_columns(&[], &[], &[], Some("EPSG:4326")).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.extent().unwrap_err().kind(), ErrorKind::EmptyInput);
    }
}
