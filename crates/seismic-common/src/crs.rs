//! Coordinate Reference System tags.
//!
//! Points are tagged, never reprojected: the tag only records what the
//! x/y values mean.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SeismicError;

/// Well-known CRS codes accepted for point tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// New Zealand Geodetic Datum 2000
    Epsg4167,
    /// Web Mercator (meters)
    Epsg3857,
    /// New Zealand Transverse Mercator 2000 (meters)
    Epsg2193,
}

impl CrsCode {
    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:4326"
    /// - "4326"
    /// - "CRS:84" or "WGS84" (equivalent to EPSG:4326)
    pub fn parse(s: &str) -> Result<Self, SeismicError> {
        let normalized = s.trim().to_uppercase();
        let code = normalized.strip_prefix("EPSG:").unwrap_or(&normalized);

        match code {
            "4326" | "CRS:84" | "WGS84" => Ok(CrsCode::Epsg4326),
            "4269" => Ok(CrsCode::Epsg4269),
            "4167" => Ok(CrsCode::Epsg4167),
            "3857" | "900913" => Ok(CrsCode::Epsg3857),
            "2193" => Ok(CrsCode::Epsg2193),
            _ => Err(SeismicError::config(format!("Unsupported CRS: {}", s))),
        }
    }

    /// Look up a CRS from a numeric EPSG code (as found in GeoTIFF keys).
    pub fn from_epsg(code: u16) -> Option<Self> {
        match code {
            4326 => Some(CrsCode::Epsg4326),
            4269 => Some(CrsCode::Epsg4269),
            4167 => Some(CrsCode::Epsg4167),
            3857 => Some(CrsCode::Epsg3857),
            2193 => Some(CrsCode::Epsg2193),
            _ => None,
        }
    }

    pub fn epsg(&self) -> u16 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg4269 => 4269,
            CrsCode::Epsg4167 => 4167,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Epsg2193 => 2193,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(
            self,
            CrsCode::Epsg4326 | CrsCode::Epsg4269 | CrsCode::Epsg4167
        )
    }

    /// Axis titles as shown on a chart.
    pub fn axis_titles(&self) -> (&'static str, &'static str) {
        if self.is_geographic() {
            ("Longitude", "Latitude")
        } else {
            ("Easting", "Northing")
        }
    }
}

impl FromStr for CrsCode {
    type Err = SeismicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrsCode::parse(s)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}
