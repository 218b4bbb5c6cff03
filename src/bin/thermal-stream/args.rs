use anyhow::Result;
use clap::value_t_or_exit;
use thermal_radiometry::cli::{conversion_args, ConversionSettings};
use thermal_radiometry::{arg, args_parser, opt};

pub struct Args {
    pub paths: Vec<String>,
    pub settings: ConversionSettings,
    pub limit: Option<usize>,
    pub abort_on_error: bool,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = conversion_args(
            args_parser!("thermal-stream")
                .about("Print the maximum temperature of each frame, in order."),
        )
        .arg(
            opt!("limit")
                .short("n")
                .help("Stop after this many frames.  Default is all"),
        )
        .arg(
            opt!("abort")
                .short("a")
                .takes_value(false)
                .help("Stop at the first frame that fails to convert (default: skip it)"),
        )
        .arg(
            arg!("frames")
                .required(true)
                .multiple(true)
                .help("Raw frame paths, in acquisition order"),
        )
        .get_matches();

        let paths = matches
            .values_of("frames")
            .into_iter()
            .flatten()
            .map(|f| f.into())
            .collect();
        let limit = matches
            .is_present("limit")
            .then(|| value_t_or_exit!(matches.value_of("limit"), usize));
        let abort_on_error = matches.is_present("abort");
        let settings = ConversionSettings::from_matches(&matches)?;

        Ok(Args {
            paths,
            settings,
            limit,
            abort_on_error,
        })
    }
}
