//! Counts to temperature through a fitted polynomial.
//!
//! Counts are mapped linearly to radiance, and radiance to
//! temperature by a degree 6 polynomial fitted by the camera
//! vendor software. The output scale is whatever the fit
//! encodes; it is not guaranteed to be celsius.
use ndarray::{Array2, Zip};
use serde_derive::*;

use crate::{
    error::Result,
    frame::RawFrame,
    region::{extract, RegionBounds},
};

/// Coefficients of the polynomial calibration.
///
/// `Cr_*` map counts to radiance (`Cr_0 + Cr_1 * counts`) and
/// `Ct_*` map radiance to temperature, lowest degree first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PolynomialCalibration {
    #[serde(rename = "Cr_0")]
    pub cr_0: f64,
    #[serde(rename = "Cr_1")]
    pub cr_1: f64,

    #[serde(rename = "Ct_0")]
    pub ct_0: f64,
    #[serde(rename = "Ct_1")]
    pub ct_1: f64,
    #[serde(rename = "Ct_2")]
    pub ct_2: f64,
    #[serde(rename = "Ct_3")]
    pub ct_3: f64,
    #[serde(rename = "Ct_4")]
    pub ct_4: f64,
    #[serde(rename = "Ct_5")]
    pub ct_5: f64,
    #[serde(rename = "Ct_6")]
    pub ct_6: f64,
}

impl Default for PolynomialCalibration {
    /// Coefficients exported by the vendor software for the
    /// reference camera.
    fn default() -> Self {
        PolynomialCalibration {
            cr_0: -3.42255e-03,
            cr_1: 5.01980e-07,

            ct_0: -6.32251e+01,
            ct_1: 3.52488e+04,
            ct_2: -4.55977e+06,
            ct_3: 5.02369e+08,
            ct_4: -3.55013e+10,
            ct_5: 1.42222e+12,
            ct_6: -2.45221e+13,
        }
    }
}

impl PolynomialCalibration {
    /// Radiance to temperature coefficients, lowest degree
    /// first.
    pub fn temperature_coeffs(&self) -> [f64; 7] {
        [
            self.ct_0, self.ct_1, self.ct_2, self.ct_3, self.ct_4, self.ct_5, self.ct_6,
        ]
    }

    pub fn radiance(&self, counts: f64) -> f64 {
        self.cr_0 + self.cr_1 * counts
    }

    pub fn temperature(&self, counts: f64) -> f64 {
        horner(&self.temperature_coeffs(), self.radiance(counts))
    }

    pub fn temperature_transform(&self) -> impl Fn(f64) -> f64 + Sync + '_ {
        let coeffs = self.temperature_coeffs();
        move |counts| horner(&coeffs, self.radiance(counts))
    }
}

/// Evaluates `sum(coeffs[i] * x^i)` from the highest degree
/// down.
#[inline]
pub fn horner(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0., |acc, &c| acc * x + c)
}

/// Converts the `bounds` region of `frame` to temperatures.
pub fn convert_poly(
    frame: &RawFrame,
    bounds: &RegionBounds,
    calibration: &PolynomialCalibration,
) -> Result<Array2<f64>> {
    let counts = extract(frame.samples(), frame.width(), frame.height(), bounds)?;
    let temp_t = calibration.temperature_transform();
    Ok(Zip::from(&counts).par_map_collect(|&c| temp_t(c)))
}
