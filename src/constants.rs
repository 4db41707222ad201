//! Useful constants.

use lazy_static::lazy_static;
use marlu::LatLngHeight;

lazy_static! {
    /// The LOFAR reference position: CS002 LBA in ITRF2005, epoch 2009.5.
    pub static ref LOFAR_CORE: LatLngHeight = LatLngHeight {
        longitude_rad: 6.869837540_f64.to_radians(),
        latitude_rad: 52.915122495_f64.to_radians(),
        height_metres: 49.344,
    };
}

/// The length of a mean sidereal day \[seconds\].
pub const SIDEREAL_DAY_SECONDS: f64 = 86164.0905;

/// The elevation of the Sun's centre at sunrise and sunset, including
/// refraction and the solar semi-diameter \[degrees\].
pub const SUNRISE_ELEVATION_DEG: f64 = -0.8333;

/// The number of sub-bands a station's total bandwidth is split into. A
/// sub-band is `clock / SUBBANDS_PER_CLOCK` wide.
pub const SUBBANDS_PER_CLOCK: f64 = 1024.0;

/// Default upper elevation limit when selecting calibrators; just above the
/// zenith so that a source exactly overhead still qualifies \[degrees\].
pub const DEFAULT_MAX_ELEVATION_DEG: f64 = 90.01;

/// Sub-bands are numbered from 0 to `NUM_SUBBANDS - 1`.
pub const NUM_SUBBANDS: u32 = 512;
