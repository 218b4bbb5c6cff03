//! Choice between the two conversion strategies.
//!
//! The polynomial and planck paths are independent: their
//! outputs are not on a common scale and are never mixed.
use std::{fmt, str::FromStr};

use anyhow::bail;
use ndarray::Array2;
use serde_derive::*;

use crate::{
    error::Result,
    frame::RawFrame,
    polynomial::{convert_poly, PolynomialCalibration},
    region::RegionBounds,
    temperature::{PlanckParameters, PlanckTransform},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Polynomial,
    Planck,
}

impl Default for Method {
    fn default() -> Self {
        Method::Planck
    }
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "polynomial" | "poly" => Method::Polynomial,
            "planck" => Method::Planck,
            _ => bail!("unknown conversion method: {} (expected polynomial or planck)", s),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Polynomial => "polynomial",
            Method::Planck => "planck",
        })
    }
}

/// Constants of one conversion strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calibration {
    Polynomial(PolynomialCalibration),
    Planck(PlanckParameters),
}

impl Calibration {
    pub fn method(&self) -> Method {
        match self {
            Calibration::Polynomial(_) => Method::Polynomial,
            Calibration::Planck(_) => Method::Planck,
        }
    }

    /// Computes everything that only depends on the
    /// constants, so that it is done once per session rather
    /// than once per frame.
    pub fn prepare(&self) -> Result<Converter> {
        Ok(match self {
            Calibration::Polynomial(p) => Converter::Polynomial(*p),
            Calibration::Planck(p) => Converter::Planck(p.transform()?),
        })
    }
}

/// A ready to use conversion from raw frames to temperature
/// fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Converter {
    Polynomial(PolynomialCalibration),
    Planck(PlanckTransform),
}

impl Converter {
    pub fn convert(&self, frame: &RawFrame, bounds: &RegionBounds) -> Result<Array2<f64>> {
        match self {
            Converter::Polynomial(p) => convert_poly(frame, bounds, p),
            Converter::Planck(t) => t.convert(frame, bounds),
        }
    }
}
