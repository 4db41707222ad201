use itertools::Itertools;
use strum_macros::{Display, EnumIter, EnumString};

use super::{observation::Observation, SpecificationError};
use crate::{
    constants::NUM_SUBBANDS,
    formats::{indent, mom_duration, xml_escape},
    target::TargetSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
pub enum MeasurementType {
    #[default]
    Target,
    Calibration,
}

/// Sub-bands as MoM text (e.g. "77..324" or "100,102,104") or as a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubbandSpec {
    Text(String),
    List(Vec<u32>),
}

impl From<&str> for SubbandSpec {
    fn from(s: &str) -> SubbandSpec {
        SubbandSpec::Text(s.to_string())
    }
}

impl From<String> for SubbandSpec {
    fn from(s: String) -> SubbandSpec {
        SubbandSpec::Text(s)
    }
}

impl From<Vec<u32>> for SubbandSpec {
    fn from(v: Vec<u32>) -> SubbandSpec {
        SubbandSpec::List(v)
    }
}

/// Expand a MoM sub-band specification. Ranges are inclusive, so
/// "77..79,100" is [77, 78, 79, 100].
pub fn parse_subband_list(spec: &str) -> Result<Vec<u32>, SpecificationError> {
    let bad = |reason: String| SpecificationError::BadSubbandSpec {
        spec: spec.to_string(),
        reason,
    };
    let parse_one = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| bad(format!("'{}' is not a sub-band number", s.trim())))
    };
    let out_of_range = |subband| SpecificationError::SubbandOutOfRange {
        subband,
        max: NUM_SUBBANDS - 1,
    };

    let mut subbands = vec![];
    for item in spec.split(',') {
        match item.split_once("..") {
            Some((first, last)) => {
                let (first, last) = (parse_one(first)?, parse_one(last)?);
                if first > last {
                    return Err(bad(format!("range {first}..{last} is backwards")));
                }
                // Bounded before expanding, so a huge range can't allocate.
                if last >= NUM_SUBBANDS {
                    return Err(out_of_range(first.max(NUM_SUBBANDS)));
                }
                subbands.extend(first..=last);
            }
            None => {
                let subband = parse_one(item)?;
                if subband >= NUM_SUBBANDS {
                    return Err(out_of_range(subband));
                }
                subbands.push(subband);
            }
        }
    }
    Ok(subbands)
}

/// A station beam (sub-array pointing) of an observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub target_source: TargetSource,
    subband_spec: String,
    subbands: Vec<u32>,
    /// How long the beam is active; the whole observation if not given.
    pub duration_s: Option<u64>,
    pub measurement_type: MeasurementType,
}

impl Beam {
    pub fn new<S: Into<SubbandSpec>>(
        target_source: TargetSource,
        subbands: S,
    ) -> Result<Beam, SpecificationError> {
        let (subband_spec, subbands) = match subbands.into() {
            SubbandSpec::Text(spec) => {
                let spec = spec.trim().to_string();
                let subbands = parse_subband_list(&spec)?;
                (spec, subbands)
            }
            SubbandSpec::List(list) => {
                if list.is_empty() {
                    return Err(SpecificationError::BadSubbandSpec {
                        spec: String::new(),
                        reason: "no sub-bands given".to_string(),
                    });
                }
                (list.iter().join(","), list)
            }
        };
        if let Some(&subband) = subbands.iter().find(|&&s| s >= NUM_SUBBANDS) {
            return Err(SpecificationError::SubbandOutOfRange {
                subband,
                max: NUM_SUBBANDS - 1,
            });
        }

        Ok(Beam {
            target_source,
            subband_spec,
            subbands,
            duration_s: None,
            measurement_type: MeasurementType::default(),
        })
    }

    pub fn with_duration(mut self, duration_s: u64) -> Beam {
        self.duration_s = Some(duration_s);
        self
    }

    pub fn with_measurement_type(mut self, measurement_type: MeasurementType) -> Beam {
        self.measurement_type = measurement_type;
        self
    }

    pub fn name(&self) -> &str {
        self.target_source.name()
    }

    /// The sub-band specification as it appears in MoM.
    pub fn subband_spec(&self) -> &str {
        &self.subband_spec
    }

    pub fn subbands(&self) -> &[u32] {
        &self.subbands
    }

    /// Total bandwidth when observed by `observation` \[MHz\].
    pub fn bandwidth_mhz(&self, observation: &Observation) -> f64 {
        self.subbands.len() as f64 * observation.subband_width_mhz()
    }

    /// Sky frequency of the mean sub-band when observed by `observation`
    /// \[MHz\].
    pub fn central_frequency_mhz(&self, observation: &Observation) -> f64 {
        let mean_subband =
            self.subbands.iter().map(|&s| f64::from(s)).sum::<f64>() / self.subbands.len() as f64;
        mean_subband * observation.subband_width_mhz() + observation.frequency_offset_mhz()
    }

    pub(super) fn xml_prefix(&self, label: &str, observation: &Observation) -> String {
        let backend = &observation.backend;
        let label = xml_escape(label);
        let name = xml_escape(self.name());
        let duration_s = self.duration_s.unwrap_or(observation.duration_s);

        let tied_array_beams = if backend.need_beam_observation() {
            format!("\n{}", indent(&backend.tied_array_beams.xml(), 4))
        } else {
            String::new()
        };
        let result_data_products = if backend.need_beam_observation() {
            String::new()
        } else {
            format!(
                "\n<resultDataProducts>\
                 \n  <item>\
                 \n    <lofar:uvDataProduct>\
                 \n      <name>{label}.dps</name>\
                 \n      <topology>{label}.dps</topology>\
                 \n      <status>no_data</status>\
                 \n    </lofar:uvDataProduct>\
                 \n  </item>\
                 \n</resultDataProducts>"
            )
        };

        format!(
            "<lofar:measurement xsi:type=\"{measurement_xsi_type}\">\
             \n<name>{name}</name>\
             \n<description>{description}</description>\
             \n<topology>{label}</topology>\
             \n<currentStatus>\
             \n  <mom2:openedStatus/>\
             \n</currentStatus>\
             \n<lofar:{attributes}>\
             \n  <measurementType>{measurement_type}</measurementType>\
             \n  <specification>\
             \n    <targetName>{name}</targetName>\
             \n    <ra>{ra:?}</ra>\
             \n    <dec>{dec:?}</dec>\
             \n    <equinox>J2000</equinox>\
             \n    <duration>{duration}</duration>\
             \n    <subbandsSpecification>\
             \n      <bandWidth unit=\"MHz\">{bandwidth:.4}</bandWidth>\
             \n      <centralFrequency unit=\"MHz\">{central:.4}</centralFrequency>\
             \n      <contiguous>false</contiguous>\
             \n      <subbands>{subbands}</subbands>\
             \n    </subbandsSpecification>{tied_array_beams}\
             \n  </specification>\
             \n</lofar:{attributes}>{result_data_products}",
            measurement_xsi_type = backend.measurement_type(),
            description = xml_escape(observation.name()),
            attributes = backend.measurement_attributes(),
            measurement_type = self.measurement_type,
            ra = self.target_source.ra_deg(),
            dec = self.target_source.dec_deg(),
            duration = mom_duration(None, None, Some(duration_s)),
            bandwidth = self.bandwidth_mhz(observation),
            central = self.central_frequency_mhz(observation),
            subbands = self.subband_spec,
        )
    }

    pub(super) fn xml_suffix(&self) -> &'static str {
        "\n</lofar:measurement>"
    }
}
