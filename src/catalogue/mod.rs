//! Well-known calibrators and pulsars, and picking the best placed one.

mod error;
#[cfg(test)]
mod tests;

pub use error::CatalogueError;

use hifitime::Epoch;
use itertools::Itertools;
use lazy_static::lazy_static;
use log::{debug, trace, warn};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    angles::{Angle, Sexagesimal},
    constants::DEFAULT_MAX_ELEVATION_DEG,
    ephem::{elevation, lofar_observer, Observer},
    target::{SourceLookup, TargetSource},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum Band {
    #[strum(serialize = "LBA")]
    Lba,
    #[strum(serialize = "HBA")]
    Hba,
}

/// A catalogue entry. The first alias is the name the source is known by.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueRow {
    pub aliases: &'static [&'static str],
    /// Right ascension as (hours, minutes, seconds).
    pub ra: (u32, u32, f64),
    pub dec: Sexagesimal,
}

impl CatalogueRow {
    pub fn name(&self) -> &'static str {
        self.aliases.first().copied().unwrap_or_default()
    }

    pub fn target_source(&self) -> Result<TargetSource, CatalogueError> {
        let bad_row = |err| CatalogueError::BadRow {
            name: self.name().to_string(),
            err,
        };
        let (h, m, s) = self.ra;
        let ra = Angle::from_shms('+', h, m, s).map_err(bad_row)?;
        let (sign, d, m, s) = self.dec;
        let dec = Angle::from_sdms(sign, d, m, s).map_err(bad_row)?;
        Ok(TargetSource::new(self.name(), ra, dec)?)
    }
}

/// Catalogue rows per observing band.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub lba: Vec<CatalogueRow>,
    pub hba: Vec<CatalogueRow>,
}

impl SourceTable {
    pub fn rows(&self, band: Band) -> &[CatalogueRow] {
        match band {
            Band::Lba => &self.lba,
            Band::Hba => &self.hba,
        }
    }
}

/// Sources are only picked if their elevation is strictly between `min` and
/// `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationLimits {
    pub min: Angle,
    pub max: Angle,
}

impl Default for ElevationLimits {
    fn default() -> ElevationLimits {
        ElevationLimits {
            min: Angle::from_deg(0.0),
            max: Angle::from_deg(DEFAULT_MAX_ELEVATION_DEG),
        }
    }
}

const fn row(
    aliases: &'static [&'static str],
    ra: (u32, u32, f64),
    dec: Sexagesimal,
) -> CatalogueRow {
    CatalogueRow { aliases, ra, dec }
}

const CAL_3C48: CatalogueRow = row(&["3C 48", "48"], (1, 37, 41.2994), ('+', 33, 9, 35.134));
const CAL_3C147: CatalogueRow = row(&["3C 147", "147"], (5, 42, 36.1379), ('+', 49, 51, 7.234));
const CAL_3C196: CatalogueRow = row(&["3C 196", "196"], (8, 13, 36.0), ('+', 48, 13, 3.0));
const CAL_3C295: CatalogueRow = row(&["3C 295", "295"], (14, 11, 20.6), ('+', 52, 12, 9.0));
const CAL_3C380: CatalogueRow = row(&["3C 380", "380"], (18, 29, 31.7248), ('+', 48, 44, 46.9515));
const CAL_CYG_A: CatalogueRow = row(&["Cyg A", "cyg"], (19, 59, 28.3), ('+', 40, 44, 2.0));

const PULSARS: &[CatalogueRow] = &[
    row(&["PSR B0329+54", "B0329+54"], (3, 32, 59.37), ('+', 54, 34, 43.6)),
    row(&["PSR B0809+74", "B0809+74"], (8, 14, 59.50), ('+', 74, 29, 5.7)),
    row(&["PSR B0823+26", "B0823+26"], (8, 26, 51.38), ('+', 26, 37, 23.8)),
    row(&["PSR B1133+16", "B1133+16"], (11, 36, 3.25), ('+', 15, 51, 4.5)),
    row(&["PSR B1508+55", "B1508+55"], (15, 9, 25.63), ('+', 55, 31, 32.4)),
    row(&["PSR B1919+21", "B1919+21"], (19, 21, 44.815), ('+', 21, 53, 2.25)),
    row(&["PSR B2217+47", "B2217+47"], (22, 19, 48.139), ('+', 47, 54, 53.93)),
];

lazy_static! {
    static ref CALIBRATORS: SourceTable = SourceTable {
        lba: vec![CAL_3C196, CAL_CYG_A],
        hba: vec![CAL_3C48, CAL_3C147, CAL_3C196, CAL_3C295, CAL_3C380],
    };
    static ref PULSAR_TABLE: SourceTable = SourceTable {
        lba: PULSARS.to_vec(),
        hba: PULSARS.to_vec(),
    };
}

/// The built-in calibrator and pulsar tables.
#[derive(Debug, Clone, Copy)]
pub struct SourceCatalogue {
    pub calibrators: &'static SourceTable,
    pub pulsars: &'static SourceTable,
}

impl Default for SourceCatalogue {
    fn default() -> SourceCatalogue {
        SourceCatalogue {
            calibrators: &CALIBRATORS,
            pulsars: &PULSAR_TABLE,
        }
    }
}

impl SourceCatalogue {
    /// Look `name` up amongst the aliases of the HBA calibrators. Unknown
    /// names are handed to `lookup`.
    pub fn find_source(
        &self,
        name: &str,
        lookup: &dyn SourceLookup,
    ) -> Result<TargetSource, CatalogueError> {
        let mut matches = self
            .calibrators
            .rows(Band::Hba)
            .iter()
            .filter(|row| row.aliases.iter().any(|alias| *alias == name));
        match (matches.next(), matches.next()) {
            (Some(row), None) => {
                debug!("'{name}' is catalogue source '{}'", row.name());
                row.target_source()
            }
            _ => {
                warn!("'{name}' is not in the source catalogue; looking it up externally");
                Ok(lookup.lookup(name)?)
            }
        }
    }

    /// The calibrator highest above the LOFAR horizon at `date`.
    pub fn cal_source(
        &self,
        date: Epoch,
        band: Band,
        limits: ElevationLimits,
    ) -> Result<TargetSource, CatalogueError> {
        let observer = lofar_observer(date);
        closest_to_meridian(observer.sidereal_time(), band, self.calibrators, &observer, limits)
    }

    /// The pulsar highest above the LOFAR horizon at `date`.
    pub fn psr_source(
        &self,
        date: Epoch,
        band: Band,
        limits: ElevationLimits,
    ) -> Result<TargetSource, CatalogueError> {
        let observer = lofar_observer(date);
        closest_to_meridian(observer.sidereal_time(), band, self.pulsars, &observer, limits)
    }
}

/// Of the `band` sources in `table`, pick the one with the highest elevation
/// for `observer` at `sidereal_time`, as long as that elevation is within
/// `limits`. Sources near the meridian are highest, hence the name.
pub fn closest_to_meridian(
    sidereal_time: Angle,
    band: Band,
    table: &SourceTable,
    observer: &Observer,
    limits: ElevationLimits,
) -> Result<TargetSource, CatalogueError> {
    let mut candidates = table
        .rows(band)
        .iter()
        .map(|row| {
            let source = row.target_source()?;
            let el = elevation(
                source.ra_angle(),
                source.dec_angle(),
                sidereal_time,
                observer.position.latitude_rad,
            );
            trace!("{band} candidate {} at {:.2} deg elevation", source.name(), el.as_deg());
            Ok((source, el))
        })
        .collect::<Result<Vec<_>, CatalogueError>>()?;
    candidates.sort_by(|(_, a), (_, b)| b.as_rad().total_cmp(&a.as_rad()));

    let best = candidates
        .iter()
        .position(|(_, el)| *el > limits.min && *el < limits.max);
    match best {
        Some(i) => {
            let (source, el) = candidates.swap_remove(i);
            debug!(
                "Picked {} at {:.2} deg elevation (LST {})",
                source.name(),
                el.as_deg(),
                sidereal_time.format_shms(0)
            );
            Ok(source)
        }
        None => Err(CatalogueError::NoSuitableSource {
            band,
            min_deg: limits.min.as_deg(),
            max_deg: limits.max.as_deg(),
            candidates: candidates
                .into_iter()
                .map(|(source, el)| format!("{}: {:.2} deg", source.name(), el.as_deg()))
                .join("\n"),
        }),
    }
}
