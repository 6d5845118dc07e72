//! Seismic ground-motion parameters shown on the dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SeismicError;

/// One of the four ground-motion parameters, each backed by its own raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Parameter {
    /// Modified Mercalli Intensity
    #[serde(rename = "intensity")]
    Mmi,
    /// Peak Ground Acceleration
    #[serde(rename = "pga")]
    Pga,
    /// Peak Ground Velocity
    #[serde(rename = "pgv")]
    Pgv,
    /// Peak Spectral Acceleration at 1.0s
    #[serde(rename = "psa_1.0")]
    Psa10,
}

/// Static description of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterInfo {
    /// Short key used in config files and logs.
    pub key: &'static str,
    /// Chart title.
    pub title: &'static str,
    /// Unit label shown next to the legend.
    pub units: &'static str,
    /// Raster file name inside the data directory.
    pub file_name: &'static str,
    /// Default (column, row) slot in the 2x2 layout.
    pub slot: (usize, usize),
}

const MMI: ParameterInfo = ParameterInfo {
    key: "intensity",
    title: "Modified Mercalli Intensity (mmi)",
    units: "mmi",
    file_name: "intensity_mmi.tif",
    slot: (0, 0),
};

const PGA: ParameterInfo = ParameterInfo {
    key: "pga",
    title: "Peak Ground Acceleration (g)",
    units: "g",
    file_name: "pga_g.tif",
    slot: (1, 0),
};

const PGV: ParameterInfo = ParameterInfo {
    key: "pgv",
    title: "Peak Ground Velocity (cm/s)",
    units: "cm/s",
    file_name: "pgv_cms.tif",
    slot: (0, 1),
};

const PSA10: ParameterInfo = ParameterInfo {
    key: "psa_1.0",
    title: "Peak Spectral Acceleration at 1.0s (g)",
    units: "g",
    file_name: "psa_1p0_g.tif",
    slot: (1, 1),
};

impl Parameter {
    /// All parameters in dashboard order.
    pub const ALL: [Parameter; 4] = [
        Parameter::Mmi,
        Parameter::Pga,
        Parameter::Pgv,
        Parameter::Psa10,
    ];

    pub fn info(&self) -> &'static ParameterInfo {
        match self {
            Parameter::Mmi => &MMI,
            Parameter::Pga => &PGA,
            Parameter::Pgv => &PGV,
            Parameter::Psa10 => &PSA10,
        }
    }

    pub fn key(&self) -> &'static str {
        self.info().key
    }

    pub fn title(&self) -> &'static str {
        self.info().title
    }
}

impl FromStr for Parameter {
    type Err = SeismicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intensity" | "mmi" => Ok(Parameter::Mmi),
            "pga" => Ok(Parameter::Pga),
            "pgv" => Ok(Parameter::Pgv),
            "psa_1.0" | "psa" | "psa10" => Ok(Parameter::Psa10),
            other => Err(SeismicError::config(format!("Unknown parameter: {}", other))),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
