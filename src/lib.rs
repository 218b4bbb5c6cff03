//! Library to convert raw thermal camera frames into
//! temperature fields.
//!
//! A frame is a grid of raw 16-bit sensor counts. The crate
//! provides two independent ways of turning a rectangular
//! region of such a frame into temperatures:
//!
//! 1. A [polynomial] calibration: counts are mapped linearly
//! to radiance, and radiance to temperature by a fitted
//! degree 6 polynomial.
//!
//! 2. A physical [planck model][temperature]: counts are
//! mapped to radiance, the radiance reflected off the object
//! and emitted by the atmosphere and external optics is
//! removed, and the remainder is inverted through planck's
//! law to give celsius.
//!
//! Both are pure functions of the frame, the region and the
//! calibration constants.
//!
//! # Usage
//!
//! ```rust
//! # fn test_compile() -> anyhow::Result<()> {
//! use thermal_radiometry::{convert_planck, PlanckParameters, RawFrame, RegionBounds};
//!
//! let frame = RawFrame::new(4, 2, vec![15000; 8])?;
//! let bounds = RegionBounds::new(0, 2, 1, 3);
//! let field = convert_planck(&frame, &bounds, &PlanckParameters::default())?;
//! assert_eq!(field.dim(), (2, 2));
//! # Ok(())
//! # }
//! ```
//!
//! When converting a stream of frames, prepare the
//! conversion once with [`Calibration::prepare`] and reuse
//! the resulting [`Converter`]; the [`acquisition`] module
//! drives a [`FrameSource`] this way.

pub mod error;
pub mod frame;
pub mod region;

pub mod polynomial;
pub mod temperature;

pub mod calibration;
pub mod config;
pub mod stats;

pub mod acquisition;
pub mod source;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod logger;

pub use crate::calibration::{Calibration, Converter, Method};
pub use crate::error::{ConversionError, Result};
pub use crate::frame::{FrameSource, Grab, RawFrame};
pub use crate::polynomial::{convert_poly, PolynomialCalibration};
pub use crate::region::{extract, RegionBounds};
pub use crate::temperature::{convert_planck, PlanckParameters, PlanckTransform};
