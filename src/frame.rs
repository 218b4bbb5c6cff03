//! Raw frames and the capability that produces them.
//!
//! The conversion functions never talk to a camera. They
//! only see [`RawFrame`]s handed over by a [`FrameSource`],
//! which owns device setup and buffer lifecycle. Callers
//! must only convert frames that were fully retrieved:
//! asking a device for a frame it never captured can block
//! forever, and that is the source's problem to avoid.
use anyhow::Result;

use crate::error::{self, ConversionError};

/// A complete frame of raw 16-bit sensor counts, stored
/// row-major (`height` rows of `width` samples).
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    width: usize,
    height: usize,
    samples: Vec<u16>,
}

impl RawFrame {
    /// Wraps `samples` as a `width`x`height` frame. Fails
    /// with [`ConversionError::ShapeError`] unless there are
    /// exactly `width * height` samples.
    pub fn new(width: usize, height: usize, samples: Vec<u16>) -> error::Result<Self> {
        if sample_count(width, height) != Some(samples.len()) {
            return Err(ConversionError::ShapeError {
                found: samples.len(),
                width,
                height,
            });
        }
        Ok(RawFrame {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

}

/// Number of samples in a `width`x`height` frame, or `None`
/// for an empty or unrepresentable frame.
pub fn sample_count(width: usize, height: usize) -> Option<usize> {
    match width.checked_mul(height) {
        Some(0) | None => None,
        n => n,
    }
}

/// Outcome of asking a source for its next frame.
#[derive(Debug, Clone)]
pub enum Grab {
    Complete(RawFrame),
    /// The device delivered a partial buffer. `status` is
    /// the device specific status code. The source has
    /// already reclaimed the buffer.
    Incomplete { status: u32 },
}

/// A producer of raw frames, e.g. a camera driver.
///
/// The expected call sequence is `begin`, any number of
/// `next` (each complete frame followed by `release`), then
/// `end`. `next` returns `None` once the source is drained.
pub trait FrameSource {
    fn begin(&mut self) -> Result<()>;
    fn next(&mut self) -> Result<Option<Grab>>;
    fn release(&mut self, frame: RawFrame) -> Result<()>;
    fn end(&mut self) -> Result<()>;
}
