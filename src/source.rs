//! Frames stored as raw sample dumps.
//!
//! Each file holds one frame: `width * height` little-endian
//! `u16` counts, row after row, with no header. Dimensions
//! come from the caller, as they would from the camera's
//! node map.
use std::{
    collections::VecDeque,
    fs::read,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use byteordered::ByteOrdered;
use tracing::debug;

use crate::frame::{sample_count, FrameSource, Grab, RawFrame};

/// Status reported for files whose size does not match the
/// frame dimensions.
pub const STATUS_SIZE_MISMATCH: u32 = 1;

/// Reads the samples of a raw dump. Returns `None` if the
/// file does not hold exactly `width * height` samples.
pub fn read_raw_frame(path: &Path, width: usize, height: usize) -> Result<Option<RawFrame>> {
    let bytes = read(path).with_context(|| format!("reading frame {}", path.display()))?;
    let count = match sample_count(width, height) {
        Some(count) if count.checked_mul(2) == Some(bytes.len()) => count,
        _ => return Ok(None),
    };

    let mut rdr = ByteOrdered::le(Cursor::new(&bytes));
    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        samples.push(rdr.read_u16()?);
    }
    Ok(Some(RawFrame::new(width, height, samples)?))
}

/// A [`FrameSource`] over a list of raw dump files.
pub struct RawFileSource {
    width: usize,
    height: usize,
    pending: VecDeque<PathBuf>,
    started: bool,
}

impl RawFileSource {
    pub fn new<I>(width: usize, height: usize, paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        RawFileSource {
            width,
            height,
            pending: paths.into_iter().map(Into::into).collect(),
            started: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for RawFileSource {
    fn begin(&mut self) -> Result<()> {
        anyhow::ensure!(!self.started, "acquisition already started");
        self.started = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Grab>> {
        anyhow::ensure!(self.started, "acquisition not started");
        let path = match self.pending.pop_front() {
            Some(path) => path,
            None => return Ok(None),
        };
        debug!(path = %path.display(), "reading frame");
        Ok(Some(match read_raw_frame(&path, self.width, self.height)? {
            Some(frame) => Grab::Complete(frame),
            None => Grab::Incomplete {
                status: STATUS_SIZE_MISMATCH,
            },
        }))
    }

    fn release(&mut self, _frame: RawFrame) -> Result<()> {
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.started = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs, process};

    fn write_dump(name: &str, samples: &[u16]) -> Result<PathBuf> {
        let path = env::temp_dir().join(format!("thermal-radiometry-{}-{}.raw", process::id(), name));
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes().to_vec()).collect();
        fs::write(&path, bytes)?;
        Ok(path)
    }

    #[test]
    fn reads_little_endian_rows() -> Result<()> {
        let path = write_dump("rows", &[1, 258, 65535, 4, 5, 6])?;
        let frame = read_raw_frame(&path, 3, 2);
        fs::remove_file(&path)?;

        let frame = frame?.expect("complete frame");
        assert_eq!(frame.samples(), &[1, 258, 65535, 4, 5, 6]);
        assert_eq!((frame.width(), frame.height()), (3, 2));
        Ok(())
    }

    #[test]
    fn short_files_are_incomplete() -> Result<()> {
        let good = write_dump("good", &[7; 4])?;
        let short = write_dump("short", &[7; 3])?;

        let mut source = RawFileSource::new(2, 2, vec![short.clone(), good.clone()]);
        assert!(source.next().is_err());
        source.begin()?;
        let first = source.next();
        let second = source.next();
        let third = source.next();
        source.end()?;
        fs::remove_file(&good)?;
        fs::remove_file(&short)?;

        assert!(matches!(
            first?,
            Some(Grab::Incomplete {
                status: STATUS_SIZE_MISMATCH
            })
        ));
        match second? {
            Some(Grab::Complete(frame)) => assert_eq!(frame.samples(), &[7; 4]),
            other => panic!("expected frame, got {:?}", other),
        }
        assert!(third?.is_none());
        assert_eq!(source.remaining(), 0);
        Ok(())
    }

    #[test]
    fn oversized_dimensions_are_incomplete() -> Result<()> {
        let path = write_dump("oversized", &[7; 4])?;
        let mut source = RawFileSource::new(usize::MAX, 2, vec![path.clone()]);
        source.begin()?;
        let grab = source.next();
        fs::remove_file(&path)?;

        assert!(matches!(
            grab?,
            Some(Grab::Incomplete {
                status: STATUS_SIZE_MISMATCH
            })
        ));
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut source = RawFileSource::new(2, 2, vec!["/nonexistent/frame.raw"]);
        source.begin().unwrap();
        let err = source.next().unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/frame.raw"));
    }
}
