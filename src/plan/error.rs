use thiserror::Error;

use super::PLAN_FILE_TYPES_COMMA_SEPARATED;
use crate::{
    angles::AngleError, catalogue::CatalogueError, coord::CoordError, ephem::EphemError,
    spec::SpecificationError, stations::StationError, target::SourceSpecificationError,
};

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Plan file '{0}' doesn't have a recognised file extension! Valid extensions are: {}", *PLAN_FILE_TYPES_COMMA_SEPARATED)]
    UnrecognisedPlanFileExt(String),

    #[error("Couldn't decode toml structure from {file}:\n{err}")]
    TomlDecode { file: String, err: String },

    #[error("Couldn't decode json structure from {file}:\n{err}")]
    JsonDecode { file: String, err: String },

    #[error("Observation {observation}: couldn't parse '{value}' as a UTC date: {err}")]
    BadDate {
        observation: String,
        value: String,
        err: String,
    },

    #[error("Observation {observation} needs exactly one of 'start' and 'transit_after'")]
    StartTime { observation: String },

    #[error("Observation {observation} has no beams")]
    NoBeams { observation: String },

    #[error("Beam {beam} of observation {observation} needs exactly one of 'target' and 'calibrator = true'")]
    BeamTarget { observation: String, beam: usize },

    #[error("Beam 0 of observation {observation} must have a fixed target, as the other beams or the start time are derived from it")]
    NoReferenceTarget { observation: String },

    #[error("Target '{name}' needs both 'ra' and 'dec', or neither")]
    IncompleteTarget { name: String },

    #[error("Target '{name}' has both coordinates and an offset")]
    OverspecifiedTarget { name: String },

    #[error("Pipeline '{pipeline}' refers to beam {beam}, but observation {observation} has only {num_beams} beam(s)")]
    NoSuchBeam {
        pipeline: String,
        observation: String,
        beam: usize,
        num_beams: usize,
    },

    #[error("IO error when trying to read plan file: {0}")]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Specification(#[from] SpecificationError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Station(#[from] StationError),

    #[error(transparent)]
    Angle(#[from] AngleError),

    #[error(transparent)]
    Source(#[from] SourceSpecificationError),

    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Ephem(#[from] EphemError),
}
