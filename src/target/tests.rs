use approx::assert_abs_diff_eq;
use indoc::indoc;

use super::*;
use crate::angles::Angle;

fn cyg_a() -> TargetSource {
    TargetSource::new(
        "Cyg A",
        Angle::from_shms('+', 19, 59, 28.3566).unwrap(),
        Angle::from_sdms('+', 40, 44, 2.097).unwrap(),
    )
    .unwrap()
}

#[test]
fn test_degrees_delegate_to_angles() {
    let source = cyg_a();
    assert_abs_diff_eq!(source.ra_deg(), 299.8681525, epsilon = 1e-9);
    assert_abs_diff_eq!(source.dec_deg(), 40.733915833333334, epsilon = 1e-9);
    assert_eq!(source.name(), "Cyg A");
}

#[test]
fn test_names_must_be_ascii() {
    let ra = Angle::from_deg(10.0);
    let dec = Angle::from_deg(20.0);
    assert!(TargetSource::new("3C 196", ra, dec).is_ok());
    assert!(TargetSource::new("", ra, dec).is_ok());
    assert_eq!(
        TargetSource::new("Cygnus α", ra, dec),
        Err(SourceSpecificationError::NonAsciiName("Cygnus α".to_string()))
    );
    assert!(TargetSource::new("tab\tname", ra, dec).is_err());
}

#[test]
fn test_display_rounds_to_four_decimals() {
    assert_eq!(
        cyg_a().to_string(),
        r#"TargetSource(name = "Cyg A", ra = +19:59:28.3566, dec = +40:44:02.0970)"#
    );
}

#[test]
fn test_with_name() {
    let renamed = cyg_a().with_name("3C405").unwrap();
    assert_eq!(renamed.name(), "3C405");
    assert_eq!(renamed.ra_angle(), cyg_a().ra_angle());
}

#[test]
fn test_parse_simbad_response() {
    let response = indoc! {"
        C.D.S.  -  SIMBAD4 rel 1.7  -  2013.06.07CEST09:25:12

        3C196
        -----

        Object 3C 196  ---  QSO  ---  OID=@232093   (@@11870,20)  ---  coobox=8316

        Coordinates(ICRS,ep=J2000,eq=2000): 08 13 36.0561  +48 13 02.636 (Opt ) A [1.71 1.36 90] 2009AJ....137.4846O
        Coordinates(FK4,ep=B1950,eq=1950): 08 09 59.42  +48 22 07.2
    "};
    let source = parse_simbad_coordinates("3C196", response).unwrap();
    assert_eq!(source.name(), "3C196");
    let expected_ra = Angle::from_shms('+', 8, 13, 36.0561).unwrap();
    let expected_dec = Angle::from_sdms('+', 48, 13, 2.636).unwrap();
    assert_abs_diff_eq!(source.ra_deg(), expected_ra.as_deg(), epsilon = 1e-12);
    assert_abs_diff_eq!(source.dec_deg(), expected_dec.as_deg(), epsilon = 1e-12);
}

#[test]
fn test_parse_simbad_response_without_coordinates() {
    let response = "!! No known catalog could be found\n";
    assert!(matches!(
        parse_simbad_coordinates("nonsense", response),
        Err(LookupError::NoSimbadCoordinates(name)) if name == "nonsense"
    ));

    let response = "Coordinates(ICRS,ep=J2000,eq=2000): 08 13 xx  +48 13 02.636\n";
    assert!(matches!(
        parse_simbad_coordinates("3C196", response),
        Err(LookupError::BadCoordinates { .. })
    ));
}

#[test]
fn test_lookups() {
    assert!(matches!(
        NoLookup.lookup("3C 196"),
        Err(LookupError::NoSimbadCoordinates(_))
    ));

    let fixed = |name: &str| TargetSource::new(name, Angle::from_deg(1.0), Angle::from_deg(2.0))
        .map_err(LookupError::from);
    let source = fixed.lookup("J0000+0000").unwrap();
    assert_eq!(source.name(), "J0000+0000");
}
