use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecificationError {
    #[error("Invalid {field} '{value}'; allowed values are: {allowed}")]
    InvalidValue {
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("Antenna set {antenna_set} cannot observe frequency range {frequency_range}")]
    MismatchedBand {
        antenna_set: String,
        frequency_range: String,
    },

    #[error("Invalid sub-band specification '{spec}': {reason}")]
    BadSubbandSpec { spec: String, reason: String },

    #[error("Sub-band {subband} is out of range; sub-bands are 0 to {max}")]
    SubbandOutOfRange { subband: u32, max: u32 },

    #[error("NDPPP.{field} must be positive")]
    NdpppZeroStep { field: &'static str },

    #[error("NDPPP.{field}({step}) is not a multiple of NDPPP.{avg_field}({avg_step})")]
    NdpppStepNotMultiple {
        field: &'static str,
        step: u32,
        avg_field: &'static str,
        avg_step: u32,
    },

    #[error("Pipeline '{pipeline}' has more than one predecessor observation: {labels}")]
    MultiplePredecessors { pipeline: String, labels: String },

    #[error("Pipeline '{pipeline}' has no predecessor observation; its input beams must belong to an observation")]
    NoPredecessor { pipeline: String },

    #[error("Pipeline '{pipeline}' can only take beams and observations as input, not {kind} '{name}'")]
    InvalidPipelineInput {
        pipeline: String,
        kind: &'static str,
        name: String,
    },

    #[error("Observation '{observation}' produces no correlated data for pipeline '{pipeline}' to use")]
    NoUvDataProducts {
        pipeline: String,
        observation: String,
    },

    #[error("A {child} cannot be a child of a {parent}")]
    InvalidParent {
        child: &'static str,
        parent: &'static str,
    },

    #[error("'{child}' is already a child of '{parent}'")]
    AlreadyAttached { child: String, parent: String },

    #[error("'{node}' cannot become a descendant of itself")]
    WouldCreateCycle { node: String },

    #[error("'{child}' is not a child of '{parent}'")]
    NotAChild { parent: String, child: String },

    #[error("Beam '{beam}' is not part of an observation")]
    BeamWithoutObservation { beam: String },
}
