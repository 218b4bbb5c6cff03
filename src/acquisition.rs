//! Continuous acquisition: pull frames from a source,
//! convert them, report their statistics.
use anyhow::Result;
use serde_derive::*;
use tracing::{debug_span, info, instrument, warn};

use crate::{
    calibration::Converter,
    frame::{FrameSource, Grab},
    region::RegionBounds,
    stats::Stats,
};

/// What to do when a frame fails to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and move on to the next frame.
    Skip,
    /// Stop acquiring and return the error.
    Abort,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub index: usize,
    pub stats: Stats,
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub converted: usize,
    pub incomplete: usize,
    pub failed: usize,
    pub cumulative: Stats,
}

pub struct Acquisition<S> {
    source: S,
    converter: Converter,
    bounds: RegionBounds,
    policy: FailurePolicy,
}

impl<S: FrameSource> Acquisition<S> {
    pub fn new(source: S, converter: Converter, bounds: RegionBounds) -> Self {
        Acquisition {
            source,
            converter,
            bounds,
            policy: FailurePolicy::Skip,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Acquires until the source is drained or `limit`
    /// grabs were taken, calling `on_frame` for every
    /// converted frame.
    ///
    /// The source is always ended once begun, and every
    /// complete frame is released whether or not it
    /// converted.
    #[instrument(skip(self, on_frame))]
    pub fn run<F>(&mut self, limit: Option<usize>, mut on_frame: F) -> Result<RunSummary>
    where
        F: FnMut(&FrameReport),
    {
        self.source.begin()?;
        let result = self.acquire(limit, &mut on_frame);
        let ended = self.source.end();
        let summary = result?;
        ended?;
        Ok(summary)
    }

    fn acquire(
        &mut self,
        limit: Option<usize>,
        on_frame: &mut dyn FnMut(&FrameReport),
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut index = 0;

        while limit.map_or(true, |l| index < l) {
            let _frame_span = debug_span!("frame", index).entered();
            let frame = match self.source.next()? {
                None => break,
                Some(Grab::Incomplete { status }) => {
                    warn!(index, status, "image incomplete");
                    summary.incomplete += 1;
                    index += 1;
                    continue;
                }
                Some(Grab::Complete(frame)) => frame,
            };

            let converted = self.converter.convert(&frame, &self.bounds);
            self.source.release(frame)?;

            match converted {
                Ok(field) => {
                    let stats = Stats::from_field(&field);
                    info!(index, max = stats.max, "converted frame");
                    summary.converted += 1;
                    summary.cumulative += &stats;
                    on_frame(&FrameReport { index, stats });
                }
                Err(e) => {
                    summary.failed += 1;
                    match self.policy {
                        FailurePolicy::Skip => warn!(index, error = %e, "skipping frame"),
                        FailurePolicy::Abort => return Err(e.into()),
                    }
                }
            }
            index += 1;
        }
        Ok(summary)
    }
}
