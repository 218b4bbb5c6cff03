mod args;

use std::io::{stdout, Write};

use anyhow::Result;
use tracing::info;

use args::Args;
use thermal_radiometry::{
    acquisition::{Acquisition, FailurePolicy},
    logger,
    source::RawFileSource,
};

fn main() -> Result<()> {
    logger::init();
    let Args {
        paths,
        settings,
        limit,
        abort_on_error,
    } = Args::from_cmd_line()?;

    let source = RawFileSource::new(settings.width, settings.height, paths);
    let policy = if abort_on_error {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Skip
    };
    let mut acquisition =
        Acquisition::new(source, settings.converter, settings.bounds).with_policy(policy);

    let out = stdout();
    let mut out = out.lock();
    let mut write_err = None;
    let summary = acquisition.run(limit, |report| {
        if write_err.is_none() {
            if let Err(e) = writeln!(out, "{}", report.stats.max) {
                write_err = Some(e);
            }
        }
    })?;
    if let Some(e) = write_err {
        return Err(e.into());
    }

    info!(
        method = %settings.method,
        converted = summary.converted,
        incomplete = summary.incomplete,
        failed = summary.failed,
        max = summary.cumulative.max,
        "acquisition finished"
    );
    Ok(())
}
