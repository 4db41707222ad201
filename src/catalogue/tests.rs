use approx::assert_abs_diff_eq;
use hifitime::{Duration, Epoch};

use super::*;
use crate::{
    constants::LOFAR_CORE,
    target::{LookupError, NoLookup},
};

const HALF_UP: CatalogueRow = row(&["Half up"], (0, 0, 0.0), ('+', 7, 54, 54.44));
const NEAR_ZENITH: CatalogueRow = row(&["Near zenith"], (0, 0, 0.0), ('+', 53, 24, 54.44));
const BELOW_HORIZON: CatalogueRow = row(&["Below"], (12, 0, 0.0), ('-', 60, 0, 0.0));

fn observer() -> Observer {
    lofar_observer(Epoch::from_gregorian_utc_at_midnight(2013, 6, 1))
}

fn table(rows: Vec<CatalogueRow>) -> SourceTable {
    SourceTable {
        lba: vec![],
        hba: rows,
    }
}

fn limits(min_deg: f64, max_deg: f64) -> ElevationLimits {
    ElevationLimits {
        min: Angle::from_deg(min_deg),
        max: Angle::from_deg(max_deg),
    }
}

#[test]
fn test_test_rows_have_the_expected_elevation() {
    let lat = LOFAR_CORE.latitude_rad;
    let lst = Angle::from_rad(0.0);
    let half_up = HALF_UP.target_source().unwrap();
    let el = elevation(half_up.ra_angle(), half_up.dec_angle(), lst, lat);
    assert_abs_diff_eq!(el.as_deg(), 45.0, epsilon = 0.01);

    let near_zenith = NEAR_ZENITH.target_source().unwrap();
    let el = elevation(near_zenith.ra_angle(), near_zenith.dec_angle(), lst, lat);
    assert_abs_diff_eq!(el.as_deg(), 89.5, epsilon = 0.01);
}

#[test]
fn test_closest_to_meridian_skips_sources_below_the_horizon() {
    let table = table(vec![BELOW_HORIZON, HALF_UP]);
    let source = closest_to_meridian(
        Angle::from_rad(0.0),
        Band::Hba,
        &table,
        &observer(),
        limits(0.0, 90.0),
    )
    .unwrap();
    assert_eq!(source.name(), "Half up");
}

#[test]
fn test_closest_to_meridian_prefers_highest() {
    let table = table(vec![HALF_UP, BELOW_HORIZON, NEAR_ZENITH]);
    let lst = Angle::from_rad(0.0);

    let source =
        closest_to_meridian(lst, Band::Hba, &table, &observer(), ElevationLimits::default())
            .unwrap();
    assert_eq!(source.name(), "Near zenith");

    // Too high is as bad as too low.
    let source = closest_to_meridian(lst, Band::Hba, &table, &observer(), limits(0.0, 89.0))
        .unwrap();
    assert_eq!(source.name(), "Half up");
}

#[test]
fn test_closest_to_meridian_lists_all_candidates_on_failure() {
    let table = table(vec![HALF_UP, BELOW_HORIZON]);
    let result = closest_to_meridian(
        Angle::from_rad(0.0),
        Band::Hba,
        &table,
        &observer(),
        limits(50.0, 90.0),
    );
    match result {
        Err(CatalogueError::NoSuitableSource { band, candidates, .. }) => {
            assert_eq!(band, Band::Hba);
            let lines: Vec<&str> = candidates.lines().collect();
            assert_eq!(lines.len(), 2);
            assert!(lines[0].starts_with("Half up: 45.0"), "{candidates}");
            assert!(lines[1].starts_with("Below: -"), "{candidates}");
        }
        other => panic!("Expected NoSuitableSource, got {other:?}"),
    }

    // An empty band is also unsuitable.
    assert!(matches!(
        closest_to_meridian(
            Angle::from_rad(0.0),
            Band::Lba,
            &table,
            &observer(),
            ElevationLimits::default()
        ),
        Err(CatalogueError::NoSuitableSource { .. })
    ));
}

#[test]
fn test_cal_and_psr_source_stay_within_limits() {
    let catalogue = SourceCatalogue::default();
    let limits = limits(20.0, 90.0);
    let start = Epoch::from_gregorian_utc_at_midnight(2013, 3, 1);
    for hour in 0..48 {
        let date = start + Duration::from_seconds(hour as f64 * 1800.0);
        let observer = lofar_observer(date);
        for band in [Band::Lba, Band::Hba] {
            for source in [
                catalogue.cal_source(date, band, limits),
                catalogue.psr_source(date, band, limits),
            ]
            .into_iter()
            .flatten()
            {
                let el = observer.elevation(source.ra_angle(), source.dec_angle());
                assert!(el > limits.min && el < limits.max, "{source} at {date}");
            }
        }
    }

    // B0809+74 is circumpolar at LOFAR.
    assert!(catalogue.psr_source(start, Band::Hba, ElevationLimits::default()).is_ok());
}

#[test]
fn test_find_source_by_alias() {
    let catalogue = SourceCatalogue::default();
    let by_number = catalogue.find_source("196", &NoLookup).unwrap();
    let by_name = catalogue.find_source("3C 196", &NoLookup).unwrap();
    assert_eq!(by_number, by_name);
    assert_eq!(by_number.name(), "3C 196");
    assert_abs_diff_eq!(by_number.ra_deg(), 123.4, epsilon = 1e-9);
    assert_abs_diff_eq!(by_number.dec_deg(), 48.2175, epsilon = 1e-9);
}

#[test]
fn test_find_source_falls_through_to_lookup() {
    let catalogue = SourceCatalogue::default();
    assert!(matches!(
        catalogue.find_source("4C45.16", &NoLookup),
        Err(CatalogueError::Lookup(LookupError::NoSimbadCoordinates(name))) if name == "4C45.16"
    ));

    // Cyg A is only an LBA calibrator, so an HBA name lookup goes external.
    let lookup = |name: &str| {
        TargetSource::new(name, Angle::from_deg(299.868), Angle::from_deg(40.734))
            .map_err(LookupError::from)
    };
    let source = catalogue.find_source("Cyg A", &lookup).unwrap();
    assert_eq!(source.name(), "Cyg A");
    assert_abs_diff_eq!(source.ra_deg(), 299.868, epsilon = 1e-12);
}

#[test]
fn test_band_names() {
    assert_eq!(Band::Hba.to_string(), "HBA");
    assert_eq!("LBA".parse::<Band>().unwrap(), Band::Lba);
    assert!("hba".parse::<Band>().is_err());
}
