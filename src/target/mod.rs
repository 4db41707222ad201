//! Named directions on the sky.

mod error;
mod lookup;
#[cfg(test)]
mod tests;

pub use error::{LookupError, SourceSpecificationError};
#[cfg(feature = "simbad")]
pub use lookup::SimbadLookup;
pub use lookup::{parse_simbad_coordinates, NoLookup, SourceLookup};

use std::fmt;

use crate::angles::Angle;

/// A source name with its J2000 right ascension and declination.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSource {
    name: String,
    ra_angle: Angle,
    dec_angle: Angle,
}

impl TargetSource {
    /// The name ends up verbatim in MoM, which only accepts plain ASCII.
    pub fn new<S: Into<String>>(
        name: S,
        ra_angle: Angle,
        dec_angle: Angle,
    ) -> Result<TargetSource, SourceSpecificationError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(TargetSource {
            name,
            ra_angle,
            dec_angle,
        })
    }

    /// The same direction under a different name.
    pub fn with_name<S: Into<String>>(
        self,
        name: S,
    ) -> Result<TargetSource, SourceSpecificationError> {
        TargetSource::new(name, self.ra_angle, self.dec_angle)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ra_angle(&self) -> Angle {
        self.ra_angle
    }

    pub fn dec_angle(&self) -> Angle {
        self.dec_angle
    }

    /// Right ascension in degrees.
    pub fn ra_deg(&self) -> f64 {
        self.ra_angle.as_deg()
    }

    /// Declination in degrees.
    pub fn dec_deg(&self) -> f64 {
        self.dec_angle.as_deg()
    }
}

fn validate_name(name: &str) -> Result<(), SourceSpecificationError> {
    if name.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        Ok(())
    } else {
        Err(SourceSpecificationError::NonAsciiName(name.to_string()))
    }
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TargetSource(name = {:?}, ra = {}, dec = {})",
            self.name,
            self.ra_angle.format_shms(4),
            self.dec_angle.format_sdms(4)
        )
    }
}
