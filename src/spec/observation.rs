use std::fmt;

use hifitime::{Duration, Epoch};
use itertools::Itertools;
use log::debug;
use strum_macros::{Display, EnumIter, EnumString};
use vec1::Vec1;

use super::{backend::BackendProcessing, beam::Beam, SpecificationError};
use crate::{
    constants::SUBBANDS_PER_CLOCK,
    formats::{indent, mom_antenna_name, mom_duration, mom_frequency_range, mom_timestamp, xml_escape},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AntennaSet {
    LbaInner,
    LbaOuter,
    HbaZero,
    HbaOne,
    HbaDual,
    HbaJoined,
    HbaDualInner,
}

impl AntennaSet {
    pub fn is_lba(self) -> bool {
        matches!(self, AntennaSet::LbaInner | AntennaSet::LbaOuter)
    }

    /// "LBA" or "HBA".
    pub fn band_name(self) -> &'static str {
        if self.is_lba() {
            "LBA"
        } else {
            "HBA"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FrequencyRange {
    LbaLow,
    LbaHigh,
    HbaLow,
    HbaMid,
    HbaHigh,
}

impl FrequencyRange {
    pub fn is_lba(self) -> bool {
        matches!(self, FrequencyRange::LbaLow | FrequencyRange::LbaHigh)
    }
}

/// The station sampling clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    Mhz160,
    #[default]
    Mhz200,
}

impl Clock {
    pub fn mhz(self) -> u32 {
        match self {
            Clock::Mhz160 => 160,
            Clock::Mhz200 => 200,
        }
    }
}

impl TryFrom<u32> for Clock {
    type Error = SpecificationError;

    fn try_from(mhz: u32) -> Result<Clock, SpecificationError> {
        match mhz {
            160 => Ok(Clock::Mhz160),
            200 => Ok(Clock::Mhz200),
            _ => Err(SpecificationError::InvalidValue {
                field: "clock frequency",
                value: mhz.to_string(),
                allowed: "160, 200".to_string(),
            }),
        }
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} MHz", self.mhz())
    }
}

/// Bits per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitMode {
    Bits4,
    Bits8,
    #[default]
    Bits16,
}

impl BitMode {
    pub fn bits(self) -> u32 {
        match self {
            BitMode::Bits4 => 4,
            BitMode::Bits8 => 8,
            BitMode::Bits16 => 16,
        }
    }
}

impl TryFrom<u32> for BitMode {
    type Error = SpecificationError;

    fn try_from(bits: u32) -> Result<BitMode, SpecificationError> {
        match bits {
            4 => Ok(BitMode::Bits4),
            8 => Ok(BitMode::Bits8),
            16 => Ok(BitMode::Bits16),
            _ => Err(SpecificationError::InvalidValue {
                field: "bit mode",
                value: bits.to_string(),
                allowed: "4, 8, 16".to_string(),
            }),
        }
    }
}

/// A single observation: when, with which stations and how. Its beams become
/// its first children when it is added to a
/// [`SpecificationTree`](super::SpecificationTree).
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    name: String,
    antenna_set: AntennaSet,
    frequency_range: FrequencyRange,
    pub start_date: Epoch,
    pub duration_s: u64,
    pub stations: Vec<String>,
    pub clock: Clock,
    pub bit_mode: BitMode,
    pub backend: BackendProcessing,
    pub(super) beams: Vec<Beam>,
}

impl Observation {
    /// The name defaults to the first beam's target followed by the antenna
    /// set, e.g. "Cyg A HBA_DUAL_INNER".
    pub fn new(
        antenna_set: AntennaSet,
        frequency_range: FrequencyRange,
        start_date: Epoch,
        duration_s: u64,
        stations: Vec<String>,
        clock: Clock,
        beams: Vec1<Beam>,
    ) -> Result<Observation, SpecificationError> {
        if antenna_set.is_lba() != frequency_range.is_lba() {
            return Err(SpecificationError::MismatchedBand {
                antenna_set: antenna_set.to_string(),
                frequency_range: frequency_range.to_string(),
            });
        }
        let name = format!("{} {antenna_set}", beams.first().target_source.name());
        debug!(
            "Observation '{name}': {} beam(s), {} station(s), {duration_s} s from {start_date}",
            beams.len(),
            stations.len()
        );
        Ok(Observation {
            name,
            antenna_set,
            frequency_range,
            start_date,
            duration_s,
            stations,
            clock,
            bit_mode: BitMode::default(),
            backend: BackendProcessing::default(),
            beams: beams.into_vec(),
        })
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Observation {
        self.name = name.into();
        self
    }

    pub fn with_bit_mode(mut self, bit_mode: BitMode) -> Observation {
        self.bit_mode = bit_mode;
        self
    }

    pub fn with_backend(mut self, backend: BackendProcessing) -> Observation {
        self.backend = backend;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn antenna_set(&self) -> AntennaSet {
        self.antenna_set
    }

    pub fn frequency_range(&self) -> FrequencyRange {
        self.frequency_range
    }

    pub fn end_date(&self) -> Epoch {
        self.start_date + Duration::from_seconds(self.duration_s as f64)
    }

    /// The width of one sub-band \[MHz\].
    pub fn subband_width_mhz(&self) -> f64 {
        f64::from(self.clock.mhz()) / SUBBANDS_PER_CLOCK
    }

    /// What to add to `subband * subband_width` to get a sky frequency; the
    /// HBA bands are sampled in the second and third Nyquist zones.
    pub fn frequency_offset_mhz(&self) -> f64 {
        let clock = f64::from(self.clock.mhz());
        match self.frequency_range {
            FrequencyRange::LbaLow | FrequencyRange::LbaHigh => 0.0,
            FrequencyRange::HbaLow => clock / 2.0,
            FrequencyRange::HbaMid | FrequencyRange::HbaHigh => clock,
        }
    }

    pub(super) fn xml_prefix(&self, label: &str, project_name: &str) -> String {
        let name = xml_escape(&self.name);
        let stations = if self.stations.is_empty() {
            "<stations/>".to_string()
        } else {
            let stations = self
                .stations
                .iter()
                .map(|s| format!("<station name=\"{}\"/>", xml_escape(s)))
                .join("\n  ");
            format!("<stations>\n  {stations}\n</stations>")
        };
        let user_specification = format!(
            "{backend}\
             \n<antenna>{antenna}</antenna>\
             \n<clock mode=\"{clock}\"/>\
             \n<instrumentFilter>{filter}</instrumentFilter>\
             \n<stationSet>Custom</stationSet>\
             \n{stations}\
             \n<timeFrame>UT</timeFrame>\
             \n<startTime>{start}</startTime>\
             \n<endTime>{end}</endTime>\
             \n<duration>{duration}</duration>\
             \n<numberOfBitsPerSample>{bits}</numberOfBitsPerSample>",
            backend = self.backend.xml(),
            antenna = mom_antenna_name(&self.antenna_set.to_string()),
            clock = self.clock,
            filter = mom_frequency_range(self.frequency_range),
            start = mom_timestamp(self.start_date),
            end = mom_timestamp(self.end_date()),
            duration = mom_duration(None, None, Some(self.duration_s)),
            bits = self.bit_mode.bits(),
        );

        format!(
            "<lofar:observation>\
             \n<name>{name}</name>\
             \n<description>{name}</description>\
             \n<topology>{label}</topology>\
             \n<currentStatus>\
             \n  <mom2:openedStatus/>\
             \n</currentStatus>\
             \n<lofar:observationAttributes>\
             \n  <name>{name}</name>\
             \n  <projectName>{project}</projectName>\
             \n  <instrument>{instrument}</instrument>\
             \n  <defaultTemplate>{template}</defaultTemplate>\
             \n  <userSpecification>\
             \n{user_specification}\
             \n  </userSpecification>\
             \n</lofar:observationAttributes>",
            label = xml_escape(label),
            project = xml_escape(project_name),
            instrument = self.backend.instrument_name(),
            template = self.backend.default_template(),
            user_specification = indent(&user_specification, 4),
        )
    }

    pub(super) fn xml_suffix(&self) -> &'static str {
        "\n</lofar:observation>"
    }
}
