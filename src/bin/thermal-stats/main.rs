mod args;

use anyhow::{Context, Result};
use args::Args;
use rayon::prelude::*;
use serde_derive::*;
use tracing::warn;

use thermal_radiometry::cli::{process_paths_par, ConversionSettings, FrameInput};
use thermal_radiometry::{logger, stats::Stats, Method};

fn main() -> Result<()> {
    logger::init();
    let Args { paths, settings } = Args::from_cmd_line()?;

    let (stats, cumulative) = process_paths_par(paths, settings.width, settings.height)
        .map(|try_frame| -> Result<_> {
            let input = try_frame?;
            ImageStats::from_frame(&input, &settings)
        })
        .try_fold(
            || (vec![], Stats::default()),
            |mut acc, try_stats| -> Result<_> {
                let item = try_stats?;
                acc.1 += &item.stats;
                acc.0.push(item);
                Ok(acc)
            },
        )
        .try_reduce(
            || (vec![], Stats::default()),
            |mut acc1, acc2| -> Result<_> {
                acc1.0.extend(acc2.0);
                acc1.1 += &acc2.1;
                Ok(acc1)
            },
        )?;

    if cumulative.is_empty() {
        warn!("no frames converted");
    }

    #[derive(Debug, Serialize)]
    struct OutputJson {
        method: Method,
        image_stats: Vec<ImageStats>,
        cumulative: Stats,
    }

    serde_json::to_writer(
        std::io::stdout().lock(),
        &OutputJson {
            method: settings.method,
            image_stats: stats,
            cumulative,
        },
    )?;

    Ok(())
}

#[derive(Serialize, Debug)]
pub struct ImageStats {
    path: String,
    width: usize,
    height: usize,
    pub(crate) stats: Stats,
}

impl ImageStats {
    pub fn from_frame(input: &FrameInput, settings: &ConversionSettings) -> Result<Self> {
        let field = settings
            .converter
            .convert(&input.frame, &settings.bounds)
            .with_context(|| format!("converting {}", input.filename))?;
        let (height, width) = field.dim();
        Ok(ImageStats {
            path: input.filename.clone(),
            width,
            height,
            stats: Stats::from_field(&field),
        })
    }
}
