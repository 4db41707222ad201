use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_signum_and_sign_char() {
    assert_eq!(signum(3.0), 1);
    assert_eq!(signum(0.0), 1);
    assert_eq!(signum(-0.0), 1);
    assert_eq!(signum(-1e-30), -1);

    assert_eq!(sign_char(3.0), '+');
    assert_eq!(sign_char(0.0), '+');
    assert_eq!(sign_char(-0.0), '+');
    assert_eq!(sign_char(f64::from(0_i32)), '+');
    assert_eq!(sign_char(-1e-30), '-');
}

#[test]
fn test_int_from_sign_char() {
    assert_eq!(int_from_sign_char('+'), Ok(1));
    assert_eq!(int_from_sign_char('-'), Ok(-1));
    for c in ['f', ' ', '0', '±'] {
        assert_eq!(int_from_sign_char(c), Err(AngleError::InvalidSignChar(c)));
    }
}

#[test]
fn test_direct_values() {
    assert_abs_diff_eq!(Angle::from_deg(360.0).as_rad(), 6.28318530718, epsilon = 1e-11);
    assert_abs_diff_eq!(Angle::from_rad(PI).as_deg(), 180.0);
}

#[test]
fn test_hours_and_degrees() {
    let a = Angle::from_shms('+', 3, 15, 30.2).unwrap();
    assert_abs_diff_eq!(a.as_rad(), 0.853044216323, epsilon = 1e-12);
    let a = Angle::from_shms('-', 3, 15, 30.2).unwrap();
    assert_abs_diff_eq!(a.as_rad(), -0.853044216323, epsilon = 1e-12);

    let a = Angle::from_sdms('+', 3, 15, 30.2).unwrap();
    assert_abs_diff_eq!(a.as_rad(), 0.0568696144215, epsilon = 1e-12);
    let a = Angle::from_sdms('-', 3, 15, 30.2).unwrap();
    assert_abs_diff_eq!(a.as_rad(), -0.0568696144215, epsilon = 1e-12);

    assert!(matches!(
        Angle::from_shms('x', 3, 15, 30.2),
        Err(AngleError::InvalidSignChar('x'))
    ));
}

#[test]
fn test_try_new_needs_exactly_one() {
    assert_eq!(
        Angle::try_new(None, None, None, None),
        Err(AngleError::NotExactlyOne(0))
    );
    assert_eq!(
        Angle::try_new(None, None, Some(1.0), Some(1.0)),
        Err(AngleError::NotExactlyOne(2))
    );
    assert_eq!(
        Angle::try_new(Some(('+', 1, 0, 0.0)), Some(('+', 1, 0, 0.0)), None, Some(1.0)),
        Err(AngleError::NotExactlyOne(3))
    );

    let a = Angle::try_new(None, None, None, Some(15.0)).unwrap();
    let b = Angle::try_new(Some(('+', 1, 0, 0.0)), None, None, None).unwrap();
    assert_abs_diff_eq!(a.as_rad(), b.as_rad(), epsilon = 1e-15);
}

#[test]
fn test_rad_round_trip() {
    for rad in [-7.1, -PI, -1e-9, 0.0, 0.3, 1.0, PI, 6.2] {
        for angle in [
            Angle::from_rad(rad),
            Angle::from_deg(Angle::from_rad(rad).as_deg()),
        ] {
            let again = Angle::from_rad(angle.as_rad());
            assert_abs_diff_eq!(again.as_rad(), rad, epsilon = 1e-14);
        }
    }
}

#[test]
fn test_sexagesimal_round_trip() {
    for rad in [-2.9, -0.4, -1e-6, 0.0, 0.0001, 0.853044216323, 1.3, 3.1] {
        let angle = Angle::from_rad(rad);

        let (sign, h, m, s) = angle.as_shms();
        assert!(m < 60);
        assert!((0.0..60.0).contains(&s));
        let again = Angle::from_shms(sign, h, m, s).unwrap();
        assert_abs_diff_eq!(again.as_rad(), rad, epsilon = 1e-13);

        let (sign, d, m, s) = angle.as_sdms();
        let again = Angle::from_sdms(sign, d, m, s).unwrap();
        assert_abs_diff_eq!(again.as_rad(), rad, epsilon = 1e-13);
    }
}

#[test]
fn test_as_shms_decomposition() {
    let (sign, h, m, s) = Angle::from_shms('-', 19, 59, 28.3566).unwrap().as_shms();
    assert_eq!(sign, '-');
    assert_eq!(h, 19);
    assert_eq!(m, 59);
    assert_abs_diff_eq!(s, 28.3566, epsilon = 1e-9);

    let (sign, d, m, s) = Angle::from_sdms('+', 40, 44, 2.097).unwrap().as_sdms();
    assert_eq!(sign, '+');
    assert_eq!(d, 40);
    assert_eq!(m, 44);
    assert_abs_diff_eq!(s, 2.097, epsilon = 1e-9);
}

#[test]
fn test_formatting_carries_rounding() {
    let a = Angle::from_shms('+', 8, 13, 36.0678).unwrap();
    assert_eq!(a.format_shms(4), "+08:13:36.0678");
    assert_eq!(a.format_shms(0), "+08:13:36");

    let a = Angle::from_shms('+', 8, 13, 59.99999).unwrap();
    assert_eq!(a.format_shms(4), "+08:14:00.0000");

    let a = Angle::from_sdms('-', 5, 59, 59.99999).unwrap();
    assert_eq!(a.format_sdms(4), "-06:00:00.0000");

    let a = Angle::from_sdms('+', 48, 13, 2.581).unwrap();
    assert_eq!(a.format_sdms(4), "+48:13:02.5810");
}

#[test]
fn test_formatting_caps_decimals() {
    let a = Angle::from_shms('+', 8, 13, 36.0678).unwrap();
    assert!(a.format_shms(9).starts_with("+08:13:36.0678"));
    assert_eq!(a.format_shms(9).len(), "+08:13:36.".len() + 9);
    assert_eq!(a.format_shms(20), a.format_shms(9));
    assert_eq!(a.format_sdms(usize::MAX), a.format_sdms(9));
}

#[test]
fn test_parse_sexagesimal() {
    let a = Angle::parse_shms("+08:13:36.0678").unwrap();
    let b = Angle::from_shms('+', 8, 13, 36.0678).unwrap();
    assert_abs_diff_eq!(a.as_rad(), b.as_rad());

    let a = Angle::parse_shms("8 13 36.0678").unwrap();
    assert_abs_diff_eq!(a.as_rad(), b.as_rad());

    let a = Angle::parse_sdms("-5:23").unwrap();
    let b = Angle::from_sdms('-', 5, 23, 0.0).unwrap();
    assert_abs_diff_eq!(a.as_rad(), b.as_rad());

    for bad in ["", "+", "12:61:00", "1:2:3:4", "a:b:c", "12:00:60.0"] {
        assert!(
            matches!(Angle::parse_sdms(bad), Err(AngleError::Parse { .. })),
            "'{bad}' should not parse"
        );
    }
}

#[test]
fn test_arithmetic_returns_new_angles() {
    let a = Angle::from_deg(30.0);
    let b = Angle::from_deg(60.0);

    assert_abs_diff_eq!((a + b).as_deg(), 90.0, epsilon = 1e-12);
    assert_abs_diff_eq!((b - a).as_deg(), 30.0, epsilon = 1e-12);
    assert_abs_diff_eq!((a * 2).as_deg(), 60.0, epsilon = 1e-12);
    assert_abs_diff_eq!((b / 2.0).as_deg(), 30.0, epsilon = 1e-12);
    assert_abs_diff_eq!((a + 0.5).as_rad(), a.as_rad() + 0.5);
    assert_abs_diff_eq!((-a).as_deg(), -30.0, epsilon = 1e-12);
    // The operands are untouched.
    assert_abs_diff_eq!(a.as_deg(), 30.0, epsilon = 1e-12);
}

#[test]
fn test_setters_overwrite() {
    let mut a = Angle::from_deg(10.0);
    a.set_deg(20.0);
    assert_abs_diff_eq!(a.as_deg(), 20.0, epsilon = 1e-12);
    a.set_rad(1.0);
    assert_abs_diff_eq!(a.as_rad(), 1.0);
    assert!(a.set_shms('?', 1, 0, 0.0).is_err());
    assert_abs_diff_eq!(a.as_rad(), 1.0);
}

#[test]
fn test_display() {
    assert_eq!(format!("{}", Angle::from_rad(0.5)), "Angle(rad = 0.5)");
}
