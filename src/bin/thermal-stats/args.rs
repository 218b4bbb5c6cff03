use anyhow::Result;
use thermal_radiometry::cli::{conversion_args, ConversionSettings};
use thermal_radiometry::{arg, args_parser};

pub struct Args {
    pub paths: Vec<String>,
    pub settings: ConversionSettings,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = conversion_args(
            args_parser!("thermal-stats").about("Compute temperature stats of raw frames."),
        )
        .arg(
            arg!("paths")
                .required(true)
                .multiple(true)
                .help("Raw frame paths (little-endian u16 samples)"),
        )
        .get_matches();

        let paths = matches
            .values_of("paths")
            .into_iter()
            .flatten()
            .map(|f| f.into())
            .collect();
        let settings = ConversionSettings::from_matches(&matches)?;

        Ok(Args { paths, settings })
    }
}
