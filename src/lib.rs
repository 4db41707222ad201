//! Generate LOFAR observation specifications as MoM XML.
//!
//! Observations, their beams, averaging pipelines and folders are assembled
//! in a [`SpecificationTree`](spec::SpecificationTree) (usually from a
//! [`Plan`](plan::Plan) file) and written out with
//! [`as_xml_mom_project`](project::as_xml_mom_project).

pub mod angles;
pub mod catalogue;
pub mod constants;
pub mod coord;
pub mod ephem;
pub mod formats;
pub mod plan;
pub mod project;
pub mod spec;
pub mod stations;
pub mod target;

pub use angles::Angle;
pub use catalogue::SourceCatalogue;
pub use plan::Plan;
pub use project::as_xml_mom_project;
pub use spec::{Beam, Folder, Observation, SpecificationTree};
pub use target::TargetSource;

use thiserror::Error;

/// Everything that can go wrong, for the binaries.
#[derive(Error, Debug)]
pub enum MomXmlError {
    #[error(transparent)]
    Plan(#[from] plan::PlanError),

    #[error(transparent)]
    Specification(#[from] spec::SpecificationError),

    #[error(transparent)]
    Catalogue(#[from] catalogue::CatalogueError),

    #[error(transparent)]
    Ephem(#[from] ephem::EphemError),

    #[error(transparent)]
    Angle(#[from] angles::AngleError),

    #[error("Couldn't parse '{value}' as a UTC date: {err}")]
    BadDate { value: String, err: String },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Set up `env_logger` for the binaries. Logs go to stderr; stdout is kept
/// for the program's output.
pub fn setup_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stderr);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.init();
}
