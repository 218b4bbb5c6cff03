//! Calibration configuration files.
//!
//! A configuration is a JSON object; every key is optional:
//!
//! ```json
//! {
//!   "Method": "Planck",
//!   "Region": { "RowLow": 10, "RowHigh": 200, "ColLow": 0, "ColHigh": 320 },
//!   "Polynomial": { "Cr_0": -3.42255e-03, "Ct_6": -2.45221e+13 },
//!   "Planck": { "Emiss": 0.95, "Dist": 1.5, "ExtOpticsTemp": 295.0 }
//! }
//! ```
//!
//! Missing constants fall back to the reference camera
//! calibration and a missing region selects the whole frame.
use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde_derive::*;

use crate::{
    calibration::{Calibration, Method},
    polynomial::PolynomialCalibration,
    region::RegionBounds,
    temperature::PlanckParameters,
};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct Config {
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionBounds>,
    pub polynomial: PolynomialCalibration,
    pub planck: PlanckParameters,
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("opening config {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing config {}", path.display()))
    }

    /// Constants of the selected method.
    pub fn calibration(&self) -> Calibration {
        match self.method {
            Method::Polynomial => Calibration::Polynomial(self.polynomial),
            Method::Planck => Calibration::Planck(self.planck),
        }
    }

    /// Configured region, or the whole frame.
    pub fn bounds_for(&self, width: usize, height: usize) -> RegionBounds {
        self.region
            .unwrap_or_else(|| RegionBounds::full(width, height))
    }
}
