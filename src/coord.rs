//! Tangent-plane (SIN projection) coordinates relative to a pointing centre.

use thiserror::Error;

use crate::angles::Angle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordError {
    #[error("(l, m) = ({l}, {m}) is outside the unit circle; l^2 + m^2 must not exceed 1")]
    OutsideUnitCircle { l: f64, m: f64 },
}

/// The direction cosines (l, m) of (`ra`, `dec`) in a SIN projection towards
/// (`ra0`, `dec0`).
pub fn lm_from_radec(ra: Angle, dec: Angle, ra0: Angle, dec0: Angle) -> (f64, f64) {
    let (s_dec, c_dec) = dec.as_rad().sin_cos();
    let (s_dec0, c_dec0) = dec0.as_rad().sin_cos();
    let (s_dra, c_dra) = (ra - ra0).as_rad().sin_cos();
    let l = c_dec * s_dra;
    let m = s_dec * c_dec0 - c_dec * s_dec0 * c_dra;
    (l, m)
}

/// The inverse of [`lm_from_radec`]. Points with l^2 + m^2 > 1 are not on the
/// sphere and are rejected rather than turned into NaNs.
pub fn radec_from_lm(
    l: f64,
    m: f64,
    ra0: Angle,
    dec0: Angle,
) -> Result<(Angle, Angle), CoordError> {
    let n_squared = 1.0 - l * l - m * m;
    // Also catches non-finite l or m.
    if !n_squared.is_finite() || n_squared < 0.0 {
        return Err(CoordError::OutsideUnitCircle { l, m });
    }
    let n = n_squared.sqrt();
    let (s_dec0, c_dec0) = dec0.as_rad().sin_cos();
    let ra = ra0 + l.atan2(c_dec0 * n - m * s_dec0);
    let dec = Angle::from_rad((m * c_dec0 + s_dec0 * n).clamp(-1.0, 1.0).asin());
    Ok((ra, dec))
}

/// Rotate (l, m) by `ccw_angle` on the sky. Because l increases towards the
/// east, a positive angle turns +l towards -m.
pub fn rotate_lm_ccw(l: f64, m: f64, ccw_angle: Angle) -> (f64, f64) {
    let (s, c) = ccw_angle.as_rad().sin_cos();
    (l * c + m * s, -l * s + m * c)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use marlu::RADec;

    use super::*;

    #[test]
    fn test_lm_matches_marlu() {
        let ra0 = Angle::from_shms('+', 8, 13, 36.0678).unwrap();
        let dec0 = Angle::from_sdms('+', 48, 13, 2.581).unwrap();
        let ra = Angle::from_shms('+', 8, 30, 35.8).unwrap();
        let dec = Angle::from_sdms('+', 45, 43, 30.0).unwrap();

        let (l, m) = lm_from_radec(ra, dec, ra0, dec0);
        let radec = RADec {
            ra: ra.as_rad(),
            dec: dec.as_rad(),
        };
        let phase_centre = RADec {
            ra: ra0.as_rad(),
            dec: dec0.as_rad(),
        };
        let lmn = radec.to_lmn(phase_centre);
        assert_abs_diff_eq!(l, lmn.l, epsilon = 1e-12);
        assert_abs_diff_eq!(m, lmn.m, epsilon = 1e-12);
    }

    #[test]
    fn test_pointing_centre_is_origin() {
        let ra0 = Angle::from_deg(123.4);
        let dec0 = Angle::from_deg(-30.0);
        let (l, m) = lm_from_radec(ra0, dec0, ra0, dec0);
        assert_abs_diff_eq!(l, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(m, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_round_trip() {
        let ra0 = Angle::from_deg(123.4);
        let dec0 = Angle::from_deg(48.2);
        for (ra_deg, dec_deg) in [(120.0, 45.0), (126.0, 50.5), (123.4, 49.0), (110.0, 30.0)] {
            let (l, m) = lm_from_radec(Angle::from_deg(ra_deg), Angle::from_deg(dec_deg), ra0, dec0);
            let (ra, dec) = radec_from_lm(l, m, ra0, dec0).unwrap();
            assert_abs_diff_eq!(ra.as_deg(), ra_deg, epsilon = 1e-9);
            assert_abs_diff_eq!(dec.as_deg(), dec_deg, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_outside_unit_circle_is_an_error() {
        let result = radec_from_lm(0.8, 0.8, Angle::from_deg(0.0), Angle::from_deg(0.0));
        assert_eq!(result, Err(CoordError::OutsideUnitCircle { l: 0.8, m: 0.8 }));
        // The rim itself is fine.
        assert!(radec_from_lm(1.0, 0.0, Angle::from_deg(0.0), Angle::from_deg(0.0)).is_ok());

        for (l, m) in [(f64::NAN, 0.0), (0.0, f64::NAN), (f64::INFINITY, 0.0)] {
            assert!(matches!(
                radec_from_lm(l, m, Angle::from_deg(0.0), Angle::from_deg(0.0)),
                Err(CoordError::OutsideUnitCircle { .. })
            ));
        }
    }

    #[test]
    fn test_rotation() {
        let (l, m) = rotate_lm_ccw(1.0, 0.0, Angle::from_deg(90.0));
        assert_abs_diff_eq!(l, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(m, -1.0, epsilon = 1e-15);

        let (l, m) = rotate_lm_ccw(0.3, -0.2, Angle::from_deg(37.0));
        assert_abs_diff_eq!(l.hypot(m), 0.3_f64.hypot(-0.2), epsilon = 1e-15);

        let (l2, m2) = rotate_lm_ccw(l, m, Angle::from_deg(-37.0));
        assert_abs_diff_eq!(l2, 0.3, epsilon = 1e-15);
        assert_abs_diff_eq!(m2, -0.2, epsilon = 1e-15);
    }
}
