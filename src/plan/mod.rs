//! Observation plans: TOML or JSON files describing a project's folders,
//! observations, beams and pipelines, and their conversion into a
//! [`SpecificationTree`].
//!
//! A minimal TOML plan looks like
//!
//! ```toml
//! project = "LC0_001"
//!
//! [[observations]]
//! antenna_set = "HBA_DUAL_INNER"
//! frequency_range = "HBA_LOW"
//! start = "2013-06-21T20:00:00"
//! duration_s = 3600
//! stations = { set = "core" }
//!
//! [[observations.beams]]
//! target = { name = "3C196", ra = { shms = "08:13:36.0678" }, dec = { sdms = "+48:13:02.581" } }
//! subbands = "77..324"
//! ```

mod error;

pub use error::PlanError;

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use hifitime::{Duration, Epoch};
use itertools::Itertools;
use lazy_static::lazy_static;
use log::{debug, info};
use serde::Deserialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use vec1::Vec1;

use crate::{
    angles::{parse_sexagesimal, Angle},
    catalogue::{Band, ElevationLimits, SourceCatalogue},
    constants::LOFAR_CORE,
    coord::{radec_from_lm, rotate_lm_ccw},
    ephem::{next_date_with_lofar_lst, next_sunset},
    spec::{
        parse_enum, AntennaSet, AveragingPipeline, BackendProcessing, Beam, BitMode, Clock,
        DemixSource, Folder, FrequencyRange, MeasurementType, Ndppp, NodeId, Observation,
        Polarizations, SpecificationTree, Stokes, SubbandSpec, TiedArrayBeams,
    },
    stations::{exclude_conflicting_eu_stations, station_list_by_name},
    target::{SourceLookup, TargetSource},
};

#[derive(Debug, Display, EnumIter, EnumString)]
enum PlanFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

lazy_static! {
    static ref PLAN_FILE_TYPES_COMMA_SEPARATED: String = PlanFileType::iter().join(", ");
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// The MoM project the document is for.
    pub project: String,

    #[serde(default)]
    pub folders: Vec<FolderPlan>,

    /// Observations outside any folder.
    #[serde(default)]
    pub observations: Vec<ObservationPlan>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolderPlan {
    pub name: String,
    pub description: Option<String>,
    pub mom_id: Option<u64>,
    #[serde(default)]
    pub grouping_parent: bool,
    #[serde(default)]
    pub observations: Vec<ObservationPlan>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationPlan {
    pub name: Option<String>,
    pub antenna_set: String,
    pub frequency_range: String,

    /// UTC, e.g. "2013-06-21T20:00:00".
    pub start: Option<String>,

    /// Centre the observation on beam 0's first transit after the next sunset
    /// following this UTC date.
    pub transit_after: Option<String>,

    pub duration_s: u64,
    pub stations: StationsPlan,
    #[serde(default = "default_clock_mhz")]
    pub clock_mhz: u32,
    #[serde(default = "default_bit_mode")]
    pub bit_mode: u32,
    pub backend: Option<BackendPlan>,
    #[serde(default)]
    pub beams: Vec<BeamPlan>,
    #[serde(default)]
    pub pipelines: Vec<PipelinePlan>,
}

fn default_clock_mhz() -> u32 {
    200
}

fn default_bit_mode() -> u32 {
    16
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationsPlan {
    /// A station set name, e.g. "core" or "nl".
    pub set: String,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Drop international stations whose HBA ear clashes with a core
    /// station's.
    #[serde(default)]
    pub exclude_conflicting_eu: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeamPlan {
    pub target: Option<TargetPlan>,

    /// Observe the best placed calibrator instead of a fixed target.
    #[serde(default)]
    pub calibrator: bool,

    pub subbands: SubbandsPlan,
    pub duration_s: Option<u64>,
    pub measurement_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubbandsPlan {
    Text(String),
    List(Vec<u32>),
}

impl From<SubbandsPlan> for SubbandSpec {
    fn from(s: SubbandsPlan) -> SubbandSpec {
        match s {
            SubbandsPlan::Text(t) => SubbandSpec::Text(t),
            SubbandsPlan::List(l) => SubbandSpec::List(l),
        }
    }
}

/// A named target. Without coordinates or an offset, the name is looked up.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetPlan {
    pub name: String,
    pub ra: Option<AnglePlan>,
    pub dec: Option<AnglePlan>,
    pub offset: Option<OffsetPlan>,
}

/// Exactly one of the fields must be given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnglePlan {
    pub shms: Option<String>,
    pub sdms: Option<String>,
    pub rad: Option<f64>,
    pub deg: Option<f64>,
}

impl AnglePlan {
    pub fn to_angle(&self) -> Result<Angle, PlanError> {
        let shms = self.shms.as_deref().map(parse_sexagesimal).transpose()?;
        let sdms = self.sdms.as_deref().map(parse_sexagesimal).transpose()?;
        Ok(Angle::try_new(shms, sdms, self.rad, self.deg)?)
    }
}

/// A position relative to beam 0's target.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OffsetPlan {
    pub radius_deg: f64,
    /// Measured from north through east.
    pub position_angle_deg: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendPlan {
    pub channels_per_subband: Option<u32>,
    pub integration_time_s: Option<f64>,
    pub correlated_data: Option<bool>,
    pub filtered_data: Option<bool>,
    pub beamformed_data: Option<bool>,
    pub coherent_stokes: Option<StokesPlan>,
    pub incoherent_stokes: Option<StokesPlan>,
    pub stokes_integrate_channels: Option<bool>,
    pub coherent_dedispersed_channels: Option<bool>,
    pub flyseye: Option<bool>,
    pub nr_tab_rings: Option<u32>,
    pub tab_ring_size: Option<f64>,
    /// (l, m) offsets of explicit tied-array beams.
    pub tab_offsets: Option<Vec<(f64, f64)>>,
    pub bypass_pff: Option<bool>,
    pub enable_superterp: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StokesPlan {
    pub subbands_per_file: Option<u32>,
    pub number_collapsed_channels: Option<u32>,
    pub stokes_downsampling_steps: Option<u32>,
    /// "I" or "IQUV".
    pub polarizations: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelinePlan {
    pub name: String,
    pub duration_s: Option<u64>,

    /// Indices of the observation's beams to process; all of them if empty.
    #[serde(default)]
    pub beams: Vec<usize>,

    pub ndppp: Option<NdpppPlan>,
    pub flagging_strategy: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NdpppPlan {
    #[serde(default = "default_avg_freq_step")]
    pub avg_freq_step: u32,
    #[serde(default = "default_avg_time_step")]
    pub avg_time_step: u32,
    #[serde(default = "default_demix_freq_step")]
    pub demix_freq_step: u32,
    #[serde(default = "default_demix_time_step")]
    pub demix_time_step: u32,
    pub demix_always: Option<Vec<String>>,
    pub demix_if_needed: Option<Vec<String>>,
    pub ignore_target: Option<bool>,
}

fn default_avg_freq_step() -> u32 {
    64
}

fn default_avg_time_step() -> u32 {
    1
}

fn default_demix_freq_step() -> u32 {
    64
}

fn default_demix_time_step() -> u32 {
    10
}

impl Plan {
    /// Read a plan, choosing the format by the file's extension.
    pub fn read<P: AsRef<Path>>(plan_file: P) -> Result<Plan, PlanError> {
        let plan_file = PathBuf::from(plan_file.as_ref());
        debug!("Attempting to parse plan file {} ...", plan_file.display());

        let mut contents = String::new();
        let plan_file_type = plan_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| PlanFileType::from_str(&e).ok());
        match plan_file_type {
            Some(PlanFileType::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&plan_file)?;
                fh.read_to_string(&mut contents)?;
                toml::from_str(&contents).map_err(|e| PlanError::TomlDecode {
                    file: plan_file.display().to_string(),
                    err: e.to_string(),
                })
            }

            Some(PlanFileType::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&plan_file)?;
                fh.read_to_string(&mut contents)?;
                serde_json::from_str(&contents).map_err(|e| PlanError::JsonDecode {
                    file: plan_file.display().to_string(),
                    err: e.to_string(),
                })
            }

            None => Err(PlanError::UnrecognisedPlanFileExt(
                plan_file.display().to_string(),
            )),
        }
    }

    /// Build the specification tree. The returned roots are the folders
    /// followed by the observations outside any folder, in plan order.
    pub fn to_tree(
        &self,
        catalogue: &SourceCatalogue,
        lookup: &dyn SourceLookup,
    ) -> Result<(SpecificationTree, Vec<NodeId>), PlanError> {
        let mut tree = SpecificationTree::new();
        let mut roots = vec![];

        for folder_plan in &self.folders {
            let mut folder =
                Folder::new(&folder_plan.name).with_grouping_parent(folder_plan.grouping_parent);
            if let Some(description) = &folder_plan.description {
                folder = folder.with_description(description);
            }
            if let Some(mom_id) = folder_plan.mom_id {
                folder = folder.with_mom_id(mom_id);
            }
            let folder_id = tree.add(folder);
            for (i, obs_plan) in folder_plan.observations.iter().enumerate() {
                let observation = obs_plan.to_observation(i, catalogue, lookup)?;
                let obs_id = tree.add_child(folder_id, observation)?;
                obs_plan.add_pipelines(&mut tree, obs_id, Some(folder_id))?;
            }
            roots.push(folder_id);
        }

        for (i, obs_plan) in self.observations.iter().enumerate() {
            let observation = obs_plan.to_observation(i, catalogue, lookup)?;
            let obs_id = tree.add(observation);
            obs_plan.add_pipelines(&mut tree, obs_id, None)?;
            roots.push(obs_id);
        }

        info!(
            "Plan for project '{}': {} top-level item(s)",
            self.project,
            roots.len()
        );
        Ok((tree, roots))
    }
}

fn parse_utc(observation: &str, value: &str) -> Result<Epoch, PlanError> {
    Epoch::from_gregorian_str(value).map_err(|e| PlanError::BadDate {
        observation: observation.to_string(),
        value: value.to_string(),
        err: e.to_string(),
    })
}

impl ObservationPlan {
    /// How this observation is referred to in errors.
    fn describe(&self, index: usize) -> String {
        match &self.name {
            Some(name) => format!("'{name}'"),
            None => format!("#{index}"),
        }
    }

    pub fn to_observation(
        &self,
        index: usize,
        catalogue: &SourceCatalogue,
        lookup: &dyn SourceLookup,
    ) -> Result<Observation, PlanError> {
        let describe = self.describe(index);
        let antenna_set: AntennaSet = parse_enum("antenna set", &self.antenna_set)?;
        let frequency_range: FrequencyRange = parse_enum("frequency range", &self.frequency_range)?;
        let clock = Clock::try_from(self.clock_mhz)?;
        let bit_mode = BitMode::try_from(self.bit_mode)?;

        let mut stations = station_list_by_name(
            &self.stations.set,
            &self.stations.include,
            &self.stations.exclude,
        )?;
        if self.stations.exclude_conflicting_eu {
            stations = exclude_conflicting_eu_stations(&stations);
        }

        // Fixed targets first; they may be needed to place the observation
        // in time, which the calibrators depend on.
        let reference = match self.beams.first() {
            None => {
                return Err(PlanError::NoBeams {
                    observation: describe,
                })
            }
            Some(BeamPlan {
                target: Some(target),
                calibrator: false,
                ..
            }) if target.offset.is_none() => Some(target.to_target(None, catalogue, lookup)?),
            Some(_) => None,
        };

        let start_date = match (&self.start, &self.transit_after) {
            (Some(start), None) => parse_utc(&describe, start)?,
            (None, Some(after)) => {
                let reference = reference.as_ref().ok_or_else(|| PlanError::NoReferenceTarget {
                    observation: describe.clone(),
                })?;
                let after = parse_utc(&describe, after)?;
                let sunset = next_sunset(after, *LOFAR_CORE)?;
                let transit = next_date_with_lofar_lst(reference.ra_angle().as_rad(), sunset);
                debug!("{} transits at {transit}", reference.name());
                transit - Duration::from_seconds(self.duration_s as f64 / 2.0)
            }
            _ => {
                return Err(PlanError::StartTime {
                    observation: describe,
                })
            }
        };
        let midpoint = start_date + Duration::from_seconds(self.duration_s as f64 / 2.0);
        let band = if antenna_set.is_lba() { Band::Lba } else { Band::Hba };

        let mut beams = Vec::with_capacity(self.beams.len());
        for (i_beam, beam_plan) in self.beams.iter().enumerate() {
            let (target, default_type) = match (&beam_plan.target, beam_plan.calibrator) {
                (Some(target), false) => {
                    let target = match (i_beam, &reference) {
                        (0, Some(reference)) => reference.clone(),
                        (0, None) => {
                            return Err(PlanError::NoReferenceTarget {
                                observation: describe,
                            })
                        }
                        (_, reference) => target.to_target(reference.as_ref(), catalogue, lookup)?,
                    };
                    (target, MeasurementType::Target)
                }
                (None, true) => {
                    let source = catalogue.cal_source(midpoint, band, ElevationLimits::default())?;
                    info!("Observation {describe}: calibrator {} for beam {i_beam}", source.name());
                    (source, MeasurementType::Calibration)
                }
                _ => {
                    return Err(PlanError::BeamTarget {
                        observation: describe,
                        beam: i_beam,
                    })
                }
            };

            let mut beam = Beam::new(target, beam_plan.subbands.clone())?
                .with_measurement_type(match &beam_plan.measurement_type {
                    Some(t) => parse_enum("measurement type", t)?,
                    None => default_type,
                });
            if let Some(duration_s) = beam_plan.duration_s {
                beam = beam.with_duration(duration_s);
            }
            beams.push(beam);
        }
        let beams = Vec1::try_from_vec(beams).map_err(|_| PlanError::NoBeams {
            observation: describe.clone(),
        })?;

        let mut observation = Observation::new(
            antenna_set,
            frequency_range,
            start_date,
            self.duration_s,
            stations,
            clock,
            beams,
        )?
        .with_bit_mode(bit_mode);
        if let Some(name) = &self.name {
            observation = observation.with_name(name);
        }
        if let Some(backend) = &self.backend {
            observation = observation.with_backend(backend.to_backend()?);
        }
        Ok(observation)
    }

    /// Add this observation's pipelines to `tree`, under `folder` if there is
    /// one and under the observation itself otherwise.
    fn add_pipelines(
        &self,
        tree: &mut SpecificationTree,
        observation: NodeId,
        folder: Option<NodeId>,
    ) -> Result<(), PlanError> {
        let beam_ids = tree.children(observation).to_vec();
        for pipeline_plan in &self.pipelines {
            let inputs = pipeline_plan
                .beams
                .iter()
                .map(|&beam| {
                    beam_ids.get(beam).copied().ok_or_else(|| PlanError::NoSuchBeam {
                        pipeline: pipeline_plan.name.clone(),
                        observation: tree.label(observation),
                        beam,
                        num_beams: beam_ids.len(),
                    })
                })
                .collect::<Result<Vec<NodeId>, PlanError>>()?;
            let inputs = Vec1::try_from_vec(inputs).unwrap_or_else(|_| Vec1::new(observation));

            let mut pipeline = AveragingPipeline::new(&pipeline_plan.name, inputs);
            if let Some(ndppp) = &pipeline_plan.ndppp {
                pipeline = pipeline.with_ndppp(ndppp.to_ndppp()?);
            }
            if let Some(strategy) = &pipeline_plan.flagging_strategy {
                pipeline = pipeline.with_flagging_strategy(strategy);
            }
            if let Some(duration_s) = pipeline_plan.duration_s {
                pipeline = pipeline.with_duration(duration_s);
            }
            tree.add_child(folder.unwrap_or(observation), pipeline)?;
        }
        Ok(())
    }
}

impl TargetPlan {
    /// `reference` is what offsets are relative to.
    pub fn to_target(
        &self,
        reference: Option<&TargetSource>,
        catalogue: &SourceCatalogue,
        lookup: &dyn SourceLookup,
    ) -> Result<TargetSource, PlanError> {
        match (&self.ra, &self.dec, &self.offset) {
            (Some(ra), Some(dec), None) => {
                Ok(TargetSource::new(&self.name, ra.to_angle()?, dec.to_angle()?)?)
            }
            (None, None, Some(offset)) => {
                let reference = reference.ok_or_else(|| PlanError::IncompleteTarget {
                    name: self.name.clone(),
                })?;
                let (l, m) = rotate_lm_ccw(
                    0.0,
                    offset.radius_deg.to_radians().sin(),
                    Angle::from_deg(offset.position_angle_deg),
                );
                let (ra, dec) =
                    radec_from_lm(l, m, reference.ra_angle(), reference.dec_angle())?;
                Ok(TargetSource::new(&self.name, ra, dec)?)
            }
            (None, None, None) => Ok(catalogue
                .find_source(&self.name, lookup)?
                .with_name(&self.name)?),
            (Some(_), Some(_), Some(_)) => Err(PlanError::OverspecifiedTarget {
                name: self.name.clone(),
            }),
            _ => Err(PlanError::IncompleteTarget {
                name: self.name.clone(),
            }),
        }
    }
}

impl StokesPlan {
    fn to_stokes(&self) -> Result<Stokes, PlanError> {
        let default = Stokes::default();
        Ok(Stokes {
            subbands_per_file: self.subbands_per_file.unwrap_or(default.subbands_per_file),
            number_collapsed_channels: self
                .number_collapsed_channels
                .unwrap_or(default.number_collapsed_channels),
            stokes_downsampling_steps: self
                .stokes_downsampling_steps
                .unwrap_or(default.stokes_downsampling_steps),
            polarizations: match &self.polarizations {
                Some(p) => parse_enum::<Polarizations>("polarizations", p)?,
                None => default.polarizations,
            },
        })
    }
}

impl BackendPlan {
    fn to_backend(&self) -> Result<BackendProcessing, PlanError> {
        let default = BackendProcessing::default();
        let default_tabs = TiedArrayBeams::default();
        Ok(BackendProcessing {
            channels_per_subband: self.channels_per_subband.unwrap_or(default.channels_per_subband),
            integration_time_seconds: self
                .integration_time_s
                .unwrap_or(default.integration_time_seconds),
            correlated_data: self.correlated_data.unwrap_or(default.correlated_data),
            filtered_data: self.filtered_data.unwrap_or(default.filtered_data),
            beamformed_data: self.beamformed_data.unwrap_or(default.beamformed_data),
            coherent_stokes_data: self.coherent_stokes.as_ref().map(StokesPlan::to_stokes).transpose()?,
            incoherent_stokes_data: self
                .incoherent_stokes
                .as_ref()
                .map(StokesPlan::to_stokes)
                .transpose()?,
            stokes_integrate_channels: self
                .stokes_integrate_channels
                .unwrap_or(default.stokes_integrate_channels),
            coherent_dedispersed_channels: self
                .coherent_dedispersed_channels
                .unwrap_or(default.coherent_dedispersed_channels),
            tied_array_beams: TiedArrayBeams {
                flyseye: self.flyseye.unwrap_or(default_tabs.flyseye),
                beam_offsets: self.tab_offsets.clone().unwrap_or_default(),
                nr_tab_rings: self.nr_tab_rings.unwrap_or(default_tabs.nr_tab_rings),
                tab_ring_size: self.tab_ring_size.unwrap_or(default_tabs.tab_ring_size),
            },
            bypass_pff: self.bypass_pff.unwrap_or(default.bypass_pff),
            enable_superterp: self.enable_superterp.unwrap_or(default.enable_superterp),
        })
    }
}

impl NdpppPlan {
    fn to_ndppp(&self) -> Result<Ndppp, PlanError> {
        let demix_sources = |sources: &Option<Vec<String>>| {
            sources
                .as_ref()
                .map(|s| {
                    s.iter()
                        .map(|name| parse_enum::<DemixSource>("demix source", name))
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()
        };
        let mut ndppp = Ndppp::new(
            self.avg_freq_step,
            self.avg_time_step,
            self.demix_freq_step,
            self.demix_time_step,
        )?;
        ndppp.demix_always = demix_sources(&self.demix_always)?;
        ndppp.demix_if_needed = demix_sources(&self.demix_if_needed)?;
        ndppp.ignore_target = self.ignore_target;
        Ok(ndppp)
    }
}
