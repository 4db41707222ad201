//! Sidereal time, elevations and the Sun, as seen from LOFAR.
//!
//! The Sun's position uses the Astronomical Almanac's low-precision formulae
//! (good to ~0.01 degrees), which is plenty for planning when night falls.

use std::f64::consts::{PI, TAU};

use hifitime::{Duration, Epoch};
use log::trace;
use marlu::{precession::get_lmst, LatLngHeight, RADec};
use thiserror::Error;

use crate::{
    angles::Angle,
    constants::{LOFAR_CORE, SIDEREAL_DAY_SECONDS, SUNRISE_ELEVATION_DEG},
};

#[derive(Error, Debug)]
pub enum EphemError {
    #[error("There is no {event} within {days} days of {start}")]
    NoSunCrossing {
        event: &'static str,
        start: Epoch,
        days: u32,
    },
}

/// A place on Earth at a moment in time.
#[derive(Debug, Clone, Copy)]
pub struct Observer {
    pub position: LatLngHeight,
    pub epoch: Epoch,
}

impl Observer {
    /// The local mean sidereal time.
    pub fn sidereal_time(&self) -> Angle {
        sidereal_time(self.position, self.epoch)
    }

    /// The elevation of (`ra`, `dec`) above the horizon.
    pub fn elevation(&self, ra: Angle, dec: Angle) -> Angle {
        elevation(ra, dec, self.sidereal_time(), self.position.latitude_rad)
    }
}

/// The LOFAR core at `epoch`.
pub fn lofar_observer(epoch: Epoch) -> Observer {
    Observer {
        position: *LOFAR_CORE,
        epoch,
    }
}

/// The local mean sidereal time at the LOFAR core.
pub fn lofar_sidereal_time(epoch: Epoch) -> Angle {
    sidereal_time(*LOFAR_CORE, epoch)
}

fn sidereal_time(position: LatLngHeight, epoch: Epoch) -> Angle {
    // DUT1 is below a second; ignoring it shifts the LST by < 15 arcsec.
    Angle::from_rad(get_lmst(
        position.longitude_rad,
        epoch,
        Duration::from_seconds(0.0),
    ))
}

/// The elevation of (`ra`, `dec`) at local sidereal time `lst` for an observer
/// at `latitude_rad`.
pub fn elevation(ra: Angle, dec: Angle, lst: Angle, latitude_rad: f64) -> Angle {
    let radec = RADec {
        ra: ra.as_rad(),
        dec: dec.as_rad(),
    };
    Angle::from_rad(radec.to_hadec(lst.as_rad()).to_azel(latitude_rad).el)
}

/// The first moment at or after `start` at which the LOFAR LST equals
/// `target_lst_rad`.
pub fn next_date_with_lofar_lst(target_lst_rad: f64, start: Epoch) -> Epoch {
    let seconds_per_radian = SIDEREAL_DAY_SECONDS / TAU;
    let mut date = start;
    for i in 0..4 {
        let lst = lofar_sidereal_time(date).as_rad();
        let mut delta = (target_lst_rad - lst).rem_euclid(TAU);
        // After the first jump only small corrections either way remain.
        if i > 0 && delta > PI {
            delta -= TAU;
        }
        date = date + Duration::from_seconds(delta * seconds_per_radian);
    }
    if date < start {
        date = date + Duration::from_seconds(SIDEREAL_DAY_SECONDS);
    }
    trace!("LST {target_lst_rad} rad next occurs at {date}");
    date
}

/// The Sun's apparent (ra, dec).
pub fn sun_radec(epoch: Epoch) -> (Angle, Angle) {
    let n = epoch.to_jde_utc_days() - 2451545.0;
    let mean_longitude = (280.460 + 0.9856474 * n).to_radians();
    let mean_anomaly = (357.528 + 0.9856003 * n).to_radians();
    let ecliptic_longitude = mean_longitude
        + 1.915_f64.to_radians() * mean_anomaly.sin()
        + 0.020_f64.to_radians() * (2.0 * mean_anomaly).sin();
    let obliquity = (23.439 - 0.0000004 * n).to_radians();

    let (s_lambda, c_lambda) = ecliptic_longitude.sin_cos();
    let ra = (obliquity.cos() * s_lambda).atan2(c_lambda).rem_euclid(TAU);
    let dec = (obliquity.sin() * s_lambda).asin();
    (Angle::from_rad(ra), Angle::from_rad(dec))
}

/// The elevation of the Sun's centre.
pub fn sun_elevation(epoch: Epoch, position: LatLngHeight) -> Angle {
    let (ra, dec) = sun_radec(epoch);
    elevation(ra, dec, sidereal_time(position, epoch), position.latitude_rad)
}

/// The first sunrise after `date` at `position`.
pub fn next_sunrise(date: Epoch, position: LatLngHeight) -> Result<Epoch, EphemError> {
    next_horizon_crossing(date, position, true)
}

/// The first sunset after `date` at `position`.
pub fn next_sunset(date: Epoch, position: LatLngHeight) -> Result<Epoch, EphemError> {
    next_horizon_crossing(date, position, false)
}

fn next_horizon_crossing(
    date: Epoch,
    position: LatLngHeight,
    rising: bool,
) -> Result<Epoch, EphemError> {
    const SEARCH_DAYS: u32 = 2;
    let step = Duration::from_seconds(600.0);
    let above = |epoch: Epoch| sun_elevation(epoch, position).as_deg() >= SUNRISE_ELEVATION_DEG;

    let mut before = date;
    let num_steps = SEARCH_DAYS * 24 * 6;
    for _ in 0..num_steps {
        let after = before + step;
        if above(before) != rising && above(after) == rising {
            // Bisect down to a second.
            let (mut low, mut high) = (before, after);
            while (high - low).to_seconds() > 1.0 {
                let mid = low + (high - low) / 2;
                if above(mid) == rising {
                    high = mid;
                } else {
                    low = mid;
                }
            }
            return Ok(high);
        }
        before = after;
    }

    Err(EphemError::NoSunCrossing {
        event: if rising { "sunrise" } else { "sunset" },
        start: date,
        days: SEARCH_DAYS,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_lofar_sidereal_time_at_j2000() {
        // GMST at 2000-01-01 12:00 UT is 280.46062 degrees.
        let lst = lofar_sidereal_time(Epoch::from_gregorian_utc_at_noon(2000, 1, 1));
        assert_abs_diff_eq!(lst.as_deg(), 280.46062 + 6.869837540, epsilon = 0.02);
    }

    #[test]
    fn test_next_date_with_lofar_lst() {
        let start = Epoch::from_gregorian_utc_hms(2013, 3, 14, 17, 0, 0);
        for target_deg in [0.0, 45.0, 123.4, 300.0] {
            let target = f64::to_radians(target_deg);
            let date = next_date_with_lofar_lst(target, start);
            assert!(date >= start);
            assert!((date - start).to_seconds() < SIDEREAL_DAY_SECONDS);

            let lst = lofar_sidereal_time(date).as_rad();
            let diff = (lst - target + PI).rem_euclid(TAU) - PI;
            assert_abs_diff_eq!(diff, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_observer_elevation_of_zenith() {
        let observer = lofar_observer(Epoch::from_gregorian_utc_at_midnight(2013, 6, 1));
        let zenith_dec = Angle::from_rad(observer.position.latitude_rad);
        let el = observer.elevation(observer.sidereal_time(), zenith_dec);
        assert_abs_diff_eq!(el.as_deg(), 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sun_at_solstice() {
        let (_, dec) = sun_radec(Epoch::from_gregorian_utc_at_noon(2013, 6, 21));
        assert_abs_diff_eq!(dec.as_deg(), 23.44, epsilon = 0.05);
    }

    #[test]
    fn test_sunrise_and_sunset_at_midsummer() {
        let midnight = Epoch::from_gregorian_utc_at_midnight(2013, 6, 21);
        let sunrise = next_sunrise(midnight, *LOFAR_CORE).unwrap();
        let sunset = next_sunset(midnight, *LOFAR_CORE).unwrap();

        // Roughly 03:07 and 20:01 UTC.
        let expected_sunrise = Epoch::from_gregorian_utc_hms(2013, 6, 21, 3, 7, 0);
        let expected_sunset = Epoch::from_gregorian_utc_hms(2013, 6, 21, 20, 1, 0);
        assert!((sunrise - expected_sunrise).abs().to_seconds() < 900.0);
        assert!((sunset - expected_sunset).abs().to_seconds() < 900.0);

        assert_abs_diff_eq!(
            sun_elevation(sunrise, *LOFAR_CORE).as_deg(),
            SUNRISE_ELEVATION_DEG,
            epsilon = 0.01
        );

        // Asking again just after sunrise gives the next day's.
        let tomorrow = next_sunrise(sunrise + Duration::from_seconds(60.0), *LOFAR_CORE).unwrap();
        assert!((tomorrow - sunrise).to_seconds() > 23.0 * 3600.0);
    }
}
