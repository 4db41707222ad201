use clap::{AppSettings, Parser};
use hifitime::Epoch;
use log::error;

use momxml::{
    angles::Angle,
    catalogue::{Band, ElevationLimits, SourceCatalogue},
    constants::{DEFAULT_MAX_ELEVATION_DEG, LOFAR_CORE},
    ephem::{lofar_sidereal_time, next_sunrise, next_sunset},
    formats::mom_timestamp,
    setup_logging, MomXmlError,
};

#[derive(Parser)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_long_args = true)]
#[clap(about = "What the sky over LOFAR looks like at a given time")]
struct Args {
    /// UTC, e.g. 2013-06-21T20:00:00.
    date: String,

    /// Which band's calibrators and pulsars to consider (LBA or HBA).
    #[clap(short, long, default_value = "HBA")]
    band: Band,

    /// Only consider sources higher than this \[degrees\].
    #[clap(long, default_value = "0")]
    min_elevation: f64,

    /// Only consider sources lower than this \[degrees\].
    #[clap(long, default_value_t = DEFAULT_MAX_ELEVATION_DEG)]
    max_elevation: f64,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbosity);

    if let Err(e) = try_main(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn try_main(args: Args) -> Result<(), MomXmlError> {
    let date = Epoch::from_gregorian_str(&args.date).map_err(|e| MomXmlError::BadDate {
        value: args.date.clone(),
        err: e.to_string(),
    })?;
    let limits = ElevationLimits {
        min: Angle::from_deg(args.min_elevation),
        max: Angle::from_deg(args.max_elevation),
    };
    let catalogue = SourceCatalogue::default();

    println!("Date:       {}", mom_timestamp(date));
    println!("LOFAR LST:  {}", lofar_sidereal_time(date).format_shms(1));
    println!("Sunset:     {}", mom_timestamp(next_sunset(date, *LOFAR_CORE)?));
    println!("Sunrise:    {}", mom_timestamp(next_sunrise(date, *LOFAR_CORE)?));
    println!("Calibrator: {}", catalogue.cal_source(date, args.band, limits)?);
    println!("Pulsar:     {}", catalogue.psr_source(date, args.band, limits)?);
    Ok(())
}
