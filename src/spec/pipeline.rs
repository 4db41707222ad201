//! Processing of an observation's correlated data.

use itertools::Itertools;
use strum_macros::{Display, EnumIter, EnumString};
use vec1::Vec1;

use super::{NodeId, SpecificationError};
use crate::formats::{indent, lower_case, mom_duration, xml_escape};

/// Bright sources that NDPPP knows how to demix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum DemixSource {
    CasA,
    CygA,
    TauA,
    HydraA,
    VirA,
    HerA,
}

/// Averaging and demixing parameters for NDPPP.
#[derive(Debug, Clone, PartialEq)]
pub struct Ndppp {
    avg_freq_step: u32,
    avg_time_step: u32,
    demix_freq_step: u32,
    demix_time_step: u32,
    pub demix_always: Option<Vec<DemixSource>>,
    pub demix_if_needed: Option<Vec<DemixSource>>,
    /// `None` leaves it to the observatory default.
    pub ignore_target: Option<bool>,
}

impl Default for Ndppp {
    fn default() -> Ndppp {
        Ndppp {
            avg_freq_step: 64,
            avg_time_step: 1,
            demix_freq_step: 64,
            demix_time_step: 10,
            demix_always: None,
            demix_if_needed: None,
            ignore_target: None,
        }
    }
}

impl Ndppp {
    /// The demixing windows must be whole multiples of the averaging steps.
    pub fn new(
        avg_freq_step: u32,
        avg_time_step: u32,
        demix_freq_step: u32,
        demix_time_step: u32,
    ) -> Result<Ndppp, SpecificationError> {
        for (field, step) in [
            ("avg_freq_step", avg_freq_step),
            ("avg_time_step", avg_time_step),
            ("demix_freq_step", demix_freq_step),
            ("demix_time_step", demix_time_step),
        ] {
            if step == 0 {
                return Err(SpecificationError::NdpppZeroStep { field });
            }
        }
        if demix_freq_step % avg_freq_step != 0 {
            return Err(SpecificationError::NdpppStepNotMultiple {
                field: "demix_freq_step",
                step: demix_freq_step,
                avg_field: "avg_freq_step",
                avg_step: avg_freq_step,
            });
        }
        if demix_time_step % avg_time_step != 0 {
            return Err(SpecificationError::NdpppStepNotMultiple {
                field: "demix_time_step",
                step: demix_time_step,
                avg_field: "avg_time_step",
                avg_step: avg_time_step,
            });
        }

        Ok(Ndppp {
            avg_freq_step,
            avg_time_step,
            demix_freq_step,
            demix_time_step,
            ..Ndppp::default()
        })
    }

    pub fn with_demix_always(mut self, sources: Vec<DemixSource>) -> Ndppp {
        self.demix_always = Some(sources);
        self
    }

    pub fn with_demix_if_needed(mut self, sources: Vec<DemixSource>) -> Ndppp {
        self.demix_if_needed = Some(sources);
        self
    }

    pub fn with_ignore_target(mut self, ignore_target: bool) -> Ndppp {
        self.ignore_target = Some(ignore_target);
        self
    }

    pub fn avg_freq_step(&self) -> u32 {
        self.avg_freq_step
    }

    pub fn avg_time_step(&self) -> u32 {
        self.avg_time_step
    }

    pub fn demix_freq_step(&self) -> u32 {
        self.demix_freq_step
    }

    pub fn demix_time_step(&self) -> u32 {
        self.demix_time_step
    }

    pub fn xml(&self) -> String {
        let source_list = |sources: &Option<Vec<DemixSource>>| {
            sources
                .as_ref()
                .map(|s| format!("[{}]", s.iter().join(",")))
                .unwrap_or_default()
        };
        format!(
            "<demixingParameters>\
             \n  <averagingFreqStep>{}</averagingFreqStep>\
             \n  <averagingTimeStep>{}</averagingTimeStep>\
             \n  <demixFreqStep>{}</demixFreqStep>\
             \n  <demixTimeStep>{}</demixTimeStep>\
             \n  <demixAlways>{}</demixAlways>\
             \n  <demixIfNeeded>{}</demixIfNeeded>\
             \n  <ignoreTarget>{}</ignoreTarget>\
             \n</demixingParameters>",
            self.avg_freq_step,
            self.avg_time_step,
            self.demix_freq_step,
            self.demix_time_step,
            source_list(&self.demix_always),
            source_list(&self.demix_if_needed),
            self.ignore_target.map(lower_case).unwrap_or_default(),
        )
    }
}

/// An NDPPP averaging (and demixing) pipeline. Its inputs are beams, or
/// observations standing for all of their beams, and they must all belong to
/// one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragingPipeline {
    name: String,
    pub(super) inputs: Vec1<NodeId>,
    pub ndppp: Ndppp,
    /// Defaults to e.g. "HBAdefault", after the input observation's antennas.
    pub flagging_strategy: Option<String>,
    pub duration_s: Option<u64>,
}

/// Everything a pipeline needs to know about the rest of the tree to render
/// itself.
pub(super) struct PipelineContext<'a> {
    pub(super) label: &'a str,
    pub(super) predecessor_label: &'a str,
    pub(super) input_labels: &'a [String],
    pub(super) flagging_strategy: &'a str,
}

impl AveragingPipeline {
    pub fn new<S: Into<String>>(name: S, inputs: Vec1<NodeId>) -> AveragingPipeline {
        AveragingPipeline {
            name: name.into(),
            inputs,
            ndppp: Ndppp::default(),
            flagging_strategy: None,
            duration_s: None,
        }
    }

    pub fn with_ndppp(mut self, ndppp: Ndppp) -> AveragingPipeline {
        self.ndppp = ndppp;
        self
    }

    pub fn with_flagging_strategy<S: Into<String>>(mut self, strategy: S) -> AveragingPipeline {
        self.flagging_strategy = Some(strategy.into());
        self
    }

    pub fn with_duration(mut self, duration_s: u64) -> AveragingPipeline {
        self.duration_s = Some(duration_s);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub(super) fn xml_prefix(&self, context: &PipelineContext) -> String {
        let label = xml_escape(context.label);
        let name = xml_escape(&self.name);
        let duration = self
            .duration_s
            .map(|d| format!("\n  <duration>{}</duration>", mom_duration(None, None, Some(d))))
            .unwrap_or_default();
        let used_data_products = context
            .input_labels
            .iter()
            .map(|input| {
                format!(
                    "\n  <item>\
                     \n    <lofar:uvDataProduct topology=\"{}.dps\">\
                     \n    </lofar:uvDataProduct>\
                     \n  </item>",
                    xml_escape(input)
                )
            })
            .join("");

        format!(
            "<lofar:pipeline xsi:type=\"lofar:AveragingPipelineType\">\
             \n<topology>{label}</topology>\
             \n<predecessor_topology>{predecessor}</predecessor_topology>\
             \n<name>{name}</name>\
             \n<description>{name}</description>\
             \n<currentStatus>\
             \n  <mom2:openedStatus/>\
             \n</currentStatus>\
             \n<averagingPipelineAttributes>\
             \n  <defaultTemplate>Averaging Pipeline</defaultTemplate>{duration}\
             \n  <flaggingStrategy>{flagging}</flaggingStrategy>\
             \n{demixing}\
             \n</averagingPipelineAttributes>\
             \n<usedDataProducts>{used_data_products}\
             \n</usedDataProducts>\
             \n<resultDataProducts>\
             \n  <item>\
             \n    <lofar:uvDataProduct>\
             \n      <name>{label}.dps</name>\
             \n      <topology>{label}.dps</topology>\
             \n      <status>no_data</status>\
             \n    </lofar:uvDataProduct>\
             \n  </item>\
             \n</resultDataProducts>",
            predecessor = xml_escape(context.predecessor_label),
            flagging = xml_escape(context.flagging_strategy),
            demixing = indent(&self.ndppp.xml(), 2),
        )
    }

    pub(super) fn xml_suffix(&self) -> &'static str {
        "\n</lofar:pipeline>"
    }
}
