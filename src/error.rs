//! Errors reported by the conversion functions.
//!
//! Every error is local to a single call and is never
//! retried or recovered inside the crate: a failing call
//! returns no temperature field at all.
use thiserror::Error;

use crate::region::RegionBounds;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("sample count mismatch: found {found} samples, expected {width}x{height}")]
    ShapeError {
        found: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid region {bounds} for a {width}x{height} frame")]
    BoundsError {
        bounds: RegionBounds,
        width: usize,
        height: usize,
    },

    #[error("radiance domain violation: {quantity} = {value}{}", pixel_suffix(.pixel))]
    RadianceDomainError {
        quantity: &'static str,
        value: f64,
        pixel: Option<Pixel>,
    },
}

/// Location (in frame coordinates) and raw counts of the
/// first pixel that failed the planck inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub row: usize,
    pub col: usize,
    pub counts: f64,
}

fn pixel_suffix(pixel: &Option<Pixel>) -> String {
    match pixel {
        Some(p) => format!(" at ({}, {}) with counts {}", p.row, p.col, p.counts),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
