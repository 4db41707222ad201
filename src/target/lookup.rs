//! Resolving source names that aren't in the local catalogue.

use log::debug;

use super::{LookupError, TargetSource};
use crate::angles::Angle;

/// Something that turns a source name into coordinates, typically by asking
/// an external catalogue service.
pub trait SourceLookup {
    fn lookup(&self, name: &str) -> Result<TargetSource, LookupError>;
}

impl<F> SourceLookup for F
where
    F: Fn(&str) -> Result<TargetSource, LookupError>,
{
    fn lookup(&self, name: &str) -> Result<TargetSource, LookupError> {
        self(name)
    }
}

/// A lookup that never finds anything; useful when working offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl SourceLookup for NoLookup {
    fn lookup(&self, name: &str) -> Result<TargetSource, LookupError> {
        Err(LookupError::NoSimbadCoordinates(name.to_string()))
    }
}

/// Find the J2000 coordinates line of a SIMBAD ASCII response, e.g.
///
/// `Coordinates(ICRS,ep=J2000,eq=2000): 08 13 36.0561  +48 13 02.636 (Opt ) A`
///
/// and build a [`TargetSource`] called `name` from it.
pub fn parse_simbad_coordinates(name: &str, response: &str) -> Result<TargetSource, LookupError> {
    let line = response
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("Coordinates(") && l.contains("J2000"))
        .ok_or_else(|| LookupError::NoSimbadCoordinates(name.to_string()))?;

    let bad_coordinates = |err| LookupError::BadCoordinates {
        name: name.to_string(),
        line: line.to_string(),
        err,
    };
    let fields: Vec<&str> = line
        .split_once(':')
        .map(|(_, rest)| rest.split_whitespace().take(6).collect())
        .unwrap_or_default();
    if fields.len() < 6 {
        return Err(LookupError::NoSimbadCoordinates(name.to_string()));
    }
    let ra = Angle::parse_shms(&fields[0..3].join(" ")).map_err(bad_coordinates)?;
    let dec = Angle::parse_sdms(&fields[3..6].join(" ")).map_err(bad_coordinates)?;
    debug!(
        "SIMBAD: {name} is at {} {}",
        ra.format_shms(4),
        dec.format_sdms(4)
    );

    Ok(TargetSource::new(name, ra, dec)?)
}

/// Blocking SIMBAD client. There is no retry and no timeout beyond the HTTP
/// client's defaults; wrap it if that matters.
#[cfg(feature = "simbad")]
#[derive(Debug, Clone)]
pub struct SimbadLookup {
    pub base_url: String,
}

#[cfg(feature = "simbad")]
impl Default for SimbadLookup {
    fn default() -> SimbadLookup {
        SimbadLookup {
            base_url: "https://simbad.cds.unistra.fr/simbad/sim-id".to_string(),
        }
    }
}

#[cfg(feature = "simbad")]
impl SourceLookup for SimbadLookup {
    fn lookup(&self, name: &str) -> Result<TargetSource, LookupError> {
        let request_error = |err: reqwest::Error| LookupError::Request {
            name: name.to_string(),
            err: err.to_string(),
        };
        let url = reqwest::Url::parse_with_params(
            &self.base_url,
            &[("output.format", "ASCII"), ("Ident", name)],
        )
        .map_err(|err| LookupError::Request {
            name: name.to_string(),
            err: err.to_string(),
        })?;
        debug!("Querying {url}");
        let response = reqwest::blocking::get(url)
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(request_error)?;
        parse_simbad_coordinates(name, &response)
    }
}
