//! Correlator and beamformer settings of an observation.

use itertools::Itertools;
use strum_macros::{Display, EnumIter, EnumString};

use crate::formats::{indent, lower_case};

/// Tied-array beam (TAB) settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TiedArrayBeams {
    /// Store each station's data stream individually.
    pub flyseye: bool,

    /// Phase-centre offsets (l, m) of explicit TABs, relative to the station
    /// beam.
    pub beam_offsets: Vec<(f64, f64)>,

    /// Alternatively, tile the station beam with this many rings of TABs.
    pub nr_tab_rings: u32,

    /// Distance between TAB rings.
    pub tab_ring_size: f64,
}

impl TiedArrayBeams {
    pub fn xml(&self) -> String {
        let mut xml = format!(
            "<tiedArrayBeams>\n  <flyseye>{}</flyseye>\n  <nrTabRings>{}</nrTabRings>\n  <tabRingSize>{:.6}</tabRingSize>",
            lower_case(self.flyseye),
            self.nr_tab_rings,
            self.tab_ring_size
        );
        if self.beam_offsets.is_empty() {
            xml.push_str("\n  <tiedArrayBeamList/>");
        } else {
            let beams = self
                .beam_offsets
                .iter()
                .map(|(angle_1, angle_2)| {
                    format!("<tiedArrayBeam><coherent>true</coherent><angle1>{angle_1:.6}</angle1><angle2>{angle_2:.6}</angle2></tiedArrayBeam>")
                })
                .join("\n    ");
            xml.push_str(&format!(
                "\n  <tiedArrayBeamList>\n    {beams}\n  </tiedArrayBeamList>"
            ));
        }
        xml.push_str("\n</tiedArrayBeams>");
        xml
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StokesMode {
    Coherent,
    Incoherent,
}

impl StokesMode {
    /// The suffix MoM puts on every Stokes element.
    pub fn suffix(self) -> &'static str {
        match self {
            StokesMode::Coherent => "CS",
            StokesMode::Incoherent => "IS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
pub enum Polarizations {
    #[default]
    #[strum(serialize = "I")]
    I,
    #[strum(serialize = "IQUV")]
    Iquv,
}

/// Settings for coherent or incoherent Stokes data.
#[derive(Debug, Clone, PartialEq)]
pub struct Stokes {
    pub subbands_per_file: u32,
    pub number_collapsed_channels: u32,
    pub stokes_downsampling_steps: u32,
    pub polarizations: Polarizations,
}

impl Default for Stokes {
    fn default() -> Stokes {
        Stokes {
            subbands_per_file: 512,
            number_collapsed_channels: 0,
            stokes_downsampling_steps: 1,
            polarizations: Polarizations::I,
        }
    }
}

impl Stokes {
    pub fn xml(&self, mode: StokesMode) -> String {
        let s = mode.suffix();
        format!(
            "<subbandsPerFile{s}>{}</subbandsPerFile{s}>\
             \n<numberCollapsedChannels{s}>{}</numberCollapsedChannels{s}>\
             \n<stokesDownsamplingSteps{s}>{}</stokesDownsamplingSteps{s}>\
             \n<which{s}>{}</which{s}>",
            self.subbands_per_file,
            self.number_collapsed_channels,
            self.stokes_downsampling_steps,
            self.polarizations
        )
    }
}

/// What the correlator and beamformer produce.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendProcessing {
    pub channels_per_subband: u32,
    /// Correlator integration time \[seconds\]. MoM takes whole seconds; see
    /// [`BackendProcessing::integration_interval`].
    pub integration_time_seconds: f64,
    pub correlated_data: bool,
    pub filtered_data: bool,
    pub beamformed_data: bool,
    pub coherent_stokes_data: Option<Stokes>,
    pub incoherent_stokes_data: Option<Stokes>,
    pub stokes_integrate_channels: bool,
    pub coherent_dedispersed_channels: bool,
    pub tied_array_beams: TiedArrayBeams,
    pub bypass_pff: bool,
    pub enable_superterp: bool,
}

impl Default for BackendProcessing {
    fn default() -> BackendProcessing {
        BackendProcessing {
            channels_per_subband: 64,
            integration_time_seconds: 2.0,
            correlated_data: true,
            filtered_data: false,
            beamformed_data: false,
            coherent_stokes_data: None,
            incoherent_stokes_data: None,
            stokes_integrate_channels: false,
            coherent_dedispersed_channels: false,
            tied_array_beams: TiedArrayBeams::default(),
            bypass_pff: false,
            enable_superterp: false,
        }
    }
}

impl BackendProcessing {
    /// The integration time rounded to whole seconds (halves round away from
    /// zero). Negative or non-finite times give 0.
    pub fn integration_interval(&self) -> u64 {
        // `as` saturates, and maps NaN to 0.
        self.integration_time_seconds.round() as u64
    }

    /// Anything other than correlated data makes this a beam observation.
    pub fn need_beam_observation(&self) -> bool {
        self.coherent_stokes_data.is_some()
            || self.incoherent_stokes_data.is_some()
            || self.filtered_data
            || self.beamformed_data
    }

    pub fn instrument_name(&self) -> &'static str {
        if self.need_beam_observation() {
            "Beam Observation"
        } else {
            "Interferometer"
        }
    }

    pub fn default_template(&self) -> &'static str {
        if self.need_beam_observation() {
            "BeamObservation"
        } else {
            "Interferometer"
        }
    }

    pub fn measurement_type(&self) -> &'static str {
        if self.need_beam_observation() {
            "lofar:BFMeasurementType"
        } else {
            "lofar:UVMeasurementType"
        }
    }

    pub fn measurement_attributes(&self) -> &'static str {
        if self.need_beam_observation() {
            "bfMeasurementAttributes"
        } else {
            "uvMeasurementAttributes"
        }
    }

    /// The backend part of an observation's `userSpecification`.
    pub fn xml(&self) -> String {
        let flyseye = self.coherent_stokes_data.is_some() && self.tied_array_beams.flyseye;

        let mut xml = format!(
            "<correlatedData>{}</correlatedData>\
             \n<filteredData>{}</filteredData>\
             \n<beamformedData>{}</beamformedData>\
             \n<coherentStokesData>{}</coherentStokesData>\
             \n<incoherentStokesData>{}</incoherentStokesData>",
            lower_case(self.correlated_data),
            lower_case(self.filtered_data),
            lower_case(self.beamformed_data),
            lower_case(self.coherent_stokes_data.is_some()),
            lower_case(self.incoherent_stokes_data.is_some()),
        );
        if self.correlated_data {
            xml.push_str(&format!(
                "\n<integrationInterval>{}</integrationInterval>",
                self.integration_interval()
            ));
        }
        xml.push_str(&format!(
            "\n<channelsPerSubband>{}</channelsPerSubband>\
             \n<coherentDedisperseChannels>{}</coherentDedisperseChannels>\
             \n<pencilBeams>\
             \n  <flyseye>{}</flyseye>\
             \n  <pencilBeamList/>\
             \n</pencilBeams>",
            self.channels_per_subband,
            lower_case(self.coherent_dedispersed_channels),
            lower_case(flyseye),
        ));
        xml.push('\n');
        xml.push_str(&self.tied_array_beams.xml());
        xml.push_str(&format!(
            "\n<stokes>\n  <integrateChannels>{}</integrateChannels>",
            lower_case(self.stokes_integrate_channels)
        ));
        if let Some(stokes) = &self.incoherent_stokes_data {
            xml.push('\n');
            xml.push_str(&indent(&stokes.xml(StokesMode::Incoherent), 2));
        }
        if let Some(stokes) = &self.coherent_stokes_data {
            xml.push('\n');
            xml.push_str(&indent(&stokes.xml(StokesMode::Coherent), 2));
        }
        xml.push_str(&format!(
            "\n</stokes>\
             \n<bypassPff>{}</bypassPff>\
             \n<enableSuperterp>{}</enableSuperterp>",
            lower_case(self.bypass_pff),
            lower_case(self.enable_superterp),
        ));
        xml
    }
}
