use std::{fs::File, io::Write, path::PathBuf};

use clap::{AppSettings, Parser};
use log::{debug, error, info};

use momxml::{
    as_xml_mom_project, setup_logging,
    target::{NoLookup, SourceLookup},
    MomXmlError, Plan, SourceCatalogue,
};

#[derive(Parser)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_long_args = true)]
#[clap(about = "Turn an observation plan (.toml or .json) into MoM XML")]
struct Args {
    /// The observation plan.
    plan: PathBuf,

    /// The MoM project to write the specification for. Overrides the plan's
    /// project.
    #[clap(short, long)]
    project: Option<String>,

    /// Where to write the XML. The default is stdout.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Look up targets that aren't in the built-in catalogue on SIMBAD.
    #[cfg(feature = "simbad")]
    #[clap(long)]
    simbad: bool,

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
    let plan = Plan::read(&args.plan)?;
    let project = args.project.unwrap_or_else(|| plan.project.clone());
    debug!("Writing for project '{project}'");

    #[cfg(feature = "simbad")]
    let lookup: Box<dyn SourceLookup> = if args.simbad {
        Box::new(momxml::target::SimbadLookup::default())
    } else {
        Box::new(NoLookup)
    };
    #[cfg(not(feature = "simbad"))]
    let lookup: Box<dyn SourceLookup> = Box::new(NoLookup);

    let (tree, roots) = plan.to_tree(&SourceCatalogue::default(), lookup.as_ref())?;
    let xml = as_xml_mom_project(&tree, &roots, &project)?;

    match args.output {
        Some(output) => {
            let mut file = File::create(&output)?;
            file.write_all(xml.as_bytes())?;
            info!("Wrote {}", output.display());
        }
        None => std::io::stdout().write_all(xml.as_bytes())?,
    }
    Ok(())
}
