//! Helpers to parse CLI arguments in the accompanying
//! binaries.
//!
//! APIs here shouldn't be considered stable / used as a
//! library.
use std::path::Path;

use anyhow::{anyhow, ensure, Context, Result};
pub use clap::{App, Arg, ArgMatches};
use indicatif::{ProgressBar, ProgressStyle};
pub use inflector::Inflector;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    calibration::{Converter, Method},
    config::Config,
    frame::RawFrame,
    region::RegionBounds,
    source::read_raw_frame,
};

#[macro_export]
macro_rules! args_parser {
    ($name:expr) => {{
        $crate::cli::App::new($name)
            .version(clap::crate_version!())
            .author(clap::crate_authors!())
    }};
}

#[macro_export]
macro_rules! arg {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name).value_name(&$name.to_screaming_snake_case())
    }};
}

#[macro_export]
macro_rules! opt {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name)
            .long(&$name.to_kebab_case())
            .value_name(&$name.to_screaming_snake_case())
    }};
}

/// Adds the options shared by all binaries: frame
/// dimensions, calibration config, method and region.
pub fn conversion_args<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
    app.arg(
        Arg::with_name("width")
            .long("width")
            .short("W")
            .value_name("WIDTH")
            .required(true)
            .help("Frame width in pixels"),
    )
    .arg(
        Arg::with_name("height")
            .long("height")
            .short("H")
            .value_name("HEIGHT")
            .required(true)
            .help("Frame height in pixels"),
    )
    .arg(
        Arg::with_name("config")
            .long("config")
            .short("c")
            .value_name("CONFIG")
            .help("Calibration config (json). Default is the reference camera"),
    )
    .arg(
        Arg::with_name("method")
            .long("method")
            .short("m")
            .value_name("METHOD")
            .possible_values(&["planck", "polynomial"])
            .help("Conversion method; overrides the config"),
    )
    .arg(
        Arg::with_name("region")
            .long("region")
            .short("r")
            .value_name("REGION")
            .help("Region as ROW_LOW,ROW_HIGH,COL_LOW,COL_HIGH; overrides the config"),
    )
}

/// Conversion settings resolved from the command line.
pub struct ConversionSettings {
    pub width: usize,
    pub height: usize,
    pub bounds: RegionBounds,
    pub method: Method,
    pub converter: Converter,
}

impl ConversionSettings {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let width: usize = parse_value(matches, "width")?;
        let height: usize = parse_value(matches, "height")?;

        let mut config = match matches.value_of("config") {
            Some(path) => Config::from_path(path)?,
            None => Config::default(),
        };
        if let Some(method) = matches.value_of("method") {
            config.method = method.parse()?;
        }
        if let Some(region) = matches.value_of("region") {
            config.region = Some(parse_region(region)?);
        }

        let bounds = config.bounds_for(width, height);
        bounds.validate(width, height)?;
        let calibration = config.calibration();
        let converter = calibration.prepare()?;

        Ok(ConversionSettings {
            width,
            height,
            bounds,
            method: calibration.method(),
            converter,
        })
    }
}

fn parse_value<T>(matches: &ArgMatches, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let val = matches
        .value_of(name)
        .ok_or_else(|| anyhow!("missing `{}`", name))?;
    val.parse()
        .with_context(|| format!("invalid `{}`: {}", name, val))
}

/// Parses `ROW_LOW,ROW_HIGH,COL_LOW,COL_HIGH`.
pub fn parse_region(s: &str) -> Result<RegionBounds> {
    let vals = s
        .split(',')
        .map(|v| v.trim().parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid region: {}", s))?;
    ensure!(
        vals.len() == 4,
        "invalid region: {} (expected 4 values, found {})",
        s,
        vals.len()
    );
    Ok(RegionBounds::new(vals[0], vals[1], vals[2], vals[3]))
}

pub struct FrameInput {
    pub filename: String,
    pub frame: RawFrame,
}

pub fn process_paths_par(
    paths: Vec<String>,
    width: usize,
    height: usize,
) -> impl ParallelIterator<Item = Result<FrameInput>> {
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {wide_bar:cyan/blue} {pos:>7}/{len:7}"),
    );

    paths
        .into_par_iter()
        .map(move |filename| {
            let frame = read_raw_frame(Path::new(&filename), width, height)?
                .ok_or_else(|| {
                    anyhow!(
                        "{}: incomplete frame (expected {}x{} samples)",
                        filename,
                        width,
                        height
                    )
                })?;
            Ok(FrameInput { filename, frame })
        })
        .inspect(move |_| bar.inc(1))
}
