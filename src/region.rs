//! Region of interest extraction.
use std::fmt;

use ndarray::{s, Array2, ArrayView2};
use serde_derive::*;

use crate::{
    error::{ConversionError, Result},
    frame::sample_count,
};

/// Half-open row and column ranges of a frame:
/// `row_low..row_high` by `col_low..col_high`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RegionBounds {
    pub row_low: usize,
    pub row_high: usize,
    pub col_low: usize,
    pub col_high: usize,
}

impl RegionBounds {
    pub fn new(row_low: usize, row_high: usize, col_low: usize, col_high: usize) -> Self {
        RegionBounds {
            row_low,
            row_high,
            col_low,
            col_high,
        }
    }

    /// Bounds covering an entire `width`x`height` frame.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, height, 0, width)
    }

    /// Shape `(rows, cols)` of the extracted grid.
    pub fn dim(&self) -> (usize, usize) {
        (
            self.row_high.saturating_sub(self.row_low),
            self.col_high.saturating_sub(self.col_low),
        )
    }

    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        let ok = self.row_low < self.row_high
            && self.row_high <= height
            && self.col_low < self.col_high
            && self.col_high <= width;
        if ok {
            Ok(())
        } else {
            Err(ConversionError::BoundsError {
                bounds: *self,
                width,
                height,
            })
        }
    }
}

impl fmt::Display for RegionBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}, {}..{}]",
            self.row_low, self.row_high, self.col_low, self.col_high
        )
    }
}

/// Reshapes `samples` into `height` rows of `width` values
/// and copies out the `bounds` sub-grid as `f64`s.
///
/// Rows are contiguous in `samples`: flat index `i` lands
/// at `(i / width, i % width)`, which is how the sensor
/// streams them.
pub fn extract<T>(samples: &[T], width: usize, height: usize, bounds: &RegionBounds) -> Result<Array2<f64>>
where
    T: Copy + Into<f64>,
{
    if sample_count(width, height) != Some(samples.len()) {
        return Err(ConversionError::ShapeError {
            found: samples.len(),
            width,
            height,
        });
    }
    bounds.validate(width, height)?;

    let grid = ArrayView2::from_shape((height, width), samples).map_err(|_| {
        ConversionError::ShapeError {
            found: samples.len(),
            width,
            height,
        }
    })?;
    Ok(grid
        .slice(s![bounds.row_low..bounds.row_high, bounds.col_low..bounds.col_high])
        .mapv(|v| v.into()))
}
