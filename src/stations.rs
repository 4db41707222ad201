//! Named LOFAR station sets.

use std::{collections::BTreeSet, str::FromStr};

use itertools::Itertools;
use lazy_static::lazy_static;
use log::debug;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StationError {
    #[error("Invalid station set '{set}'; valid sets are: {}", *STATION_SETS_COMMA_SEPARATED)]
    InvalidStationSet { set: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StationSet {
    Superterp,
    Core,
    Remote,
    Nl,
    Europe,
    All,
    #[strum(serialize = "none")]
    Empty,
}

const SUPERTERP: &[&str] = &["CS002", "CS003", "CS004", "CS005", "CS006", "CS007"];

const CORE_OUTSIDE_SUPERTERP: &[&str] = &[
    "CS001", "CS011", "CS013", "CS017", "CS021", "CS024", "CS026", "CS028", "CS030", "CS031",
    "CS032", "CS101", "CS103", "CS201", "CS301", "CS302", "CS401", "CS501",
];

const REMOTE: &[&str] = &[
    "RS106", "RS205", "RS208", "RS210", "RS305", "RS306", "RS307", "RS310", "RS406", "RS407",
    "RS409", "RS503", "RS508", "RS509",
];

const EUROPE: &[&str] = &[
    "DE601", "DE602", "DE603", "DE604", "DE605", "FR606", "SE607", "UK608", "DE609", "PL610",
    "PL611", "PL612", "IE613",
];

/// International stations whose HBA ear is processed on the same compute node
/// as one of the core station's HBA ears. Only one of each pair can observe
/// in dual-HBA mode.
const EAR_CONFLICTS: &[(&str, &str)] = &[
    ("CS001", "DE601"),
    ("CS031", "DE602"),
    ("CS028", "DE603"),
    ("CS011", "DE604"),
    ("CS401", "DE605"),
    ("CS030", "FR606"),
    ("CS301", "SE607"),
    ("CS013", "UK608"),
    ("CS032", "DE609"),
    ("CS201", "PL610"),
    ("CS101", "PL611"),
    ("CS501", "PL612"),
    ("CS103", "IE613"),
];

lazy_static! {
    static ref STATION_SETS_COMMA_SEPARATED: String = StationSet::iter().join(", ");
}

impl StationSet {
    /// Parse a set name, reporting the valid names on failure.
    pub fn parse(s: &str) -> Result<StationSet, StationError> {
        StationSet::from_str(s).map_err(|_| StationError::InvalidStationSet { set: s.to_string() })
    }

    /// The stations in this set, in no particular order.
    pub fn stations(self) -> Vec<&'static str> {
        match self {
            StationSet::Superterp => SUPERTERP.to_vec(),
            StationSet::Core => [SUPERTERP, CORE_OUTSIDE_SUPERTERP].concat(),
            StationSet::Remote => REMOTE.to_vec(),
            StationSet::Nl => [SUPERTERP, CORE_OUTSIDE_SUPERTERP, REMOTE].concat(),
            StationSet::Europe => EUROPE.to_vec(),
            StationSet::All => [SUPERTERP, CORE_OUTSIDE_SUPERTERP, REMOTE, EUROPE].concat(),
            StationSet::Empty => vec![],
        }
    }
}

/// The sorted, duplicate-free union of `station_set` and `include`, minus
/// `exclude`.
pub fn station_list<S: AsRef<str>>(
    station_set: StationSet,
    include: &[S],
    exclude: &[S],
) -> Vec<String> {
    let excluded: BTreeSet<&str> = exclude.iter().map(AsRef::as_ref).collect();
    let stations: Vec<String> = station_set
        .stations()
        .into_iter()
        .chain(include.iter().map(AsRef::as_ref))
        .filter(|s| !excluded.contains(s))
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    debug!(
        "Station set '{station_set}' (+{} -{}) resolved to {} stations",
        include.len(),
        exclude.len(),
        stations.len()
    );
    stations
}

/// Like [`station_list`], but with the set given by name.
pub fn station_list_by_name<S: AsRef<str>>(
    station_set: &str,
    include: &[S],
    exclude: &[S],
) -> Result<Vec<String>, StationError> {
    Ok(station_list(StationSet::parse(station_set)?, include, exclude))
}

/// Drop the international stations that share an HBA ear's compute node with
/// a core station in `stations`.
pub fn exclude_conflicting_eu_stations<S: AsRef<str>>(stations: &[S]) -> Vec<String> {
    exclude_conflicts(stations, |(core, eu)| (core, eu))
}

/// Drop the core stations that share an HBA ear's compute node with an
/// international station in `stations`.
pub fn exclude_conflicting_nl_stations<S: AsRef<str>>(stations: &[S]) -> Vec<String> {
    exclude_conflicts(stations, |(core, eu)| (eu, core))
}

fn exclude_conflicts<S, F>(stations: &[S], orient: F) -> Vec<String>
where
    S: AsRef<str>,
    F: Fn((&'static str, &'static str)) -> (&'static str, &'static str),
{
    let present: BTreeSet<&str> = stations.iter().map(AsRef::as_ref).collect();
    let dropped: BTreeSet<&str> = EAR_CONFLICTS
        .iter()
        .map(|&pair| orient(pair))
        .filter(|(keep, _)| present.contains(keep))
        .map(|(_, drop)| drop)
        .collect();
    if !dropped.is_empty() {
        debug!("Excluding conflicting stations: {}", dropped.iter().join(", "));
    }
    stations
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !dropped.contains(s))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_sorted_and_unique(stations: &[String]) -> bool {
        stations.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn test_sets_are_sorted_and_unique() {
        for set in StationSet::iter() {
            let stations = station_list::<&str>(set, &[], &[]);
            assert!(is_sorted_and_unique(&stations), "{set}");
        }
        let stations = station_list(StationSet::Superterp, &["CS002", "RS106", "RS106"], &[]);
        assert!(is_sorted_and_unique(&stations));
        assert_eq!(stations.len(), 7);
    }

    #[test]
    fn test_set_arithmetic() {
        let remote = station_list::<&str>(StationSet::Remote, &[], &[]);
        let core = station_list::<&str>(StationSet::Core, &[], &[]);
        assert_eq!(station_list(StationSet::Nl, &[], &remote), core);

        let europe = station_list::<&str>(StationSet::Europe, &[], &[]);
        let nl = station_list::<&str>(StationSet::Nl, &[], &[]);
        assert_eq!(station_list(StationSet::All, &[], &europe), nl);

        assert_eq!(core.len(), 24);
        assert_eq!(remote.len(), 14);
        assert_eq!(europe.len(), 13);
        assert!(station_list::<&str>(StationSet::Empty, &[], &[]).is_empty());
        assert_eq!(
            station_list(StationSet::Empty, &["DE601", "CS001"], &[]),
            vec!["CS001", "DE601"]
        );
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(StationSet::parse("superterp"), Ok(StationSet::Superterp));
        assert_eq!(StationSet::parse("none"), Ok(StationSet::Empty));
        assert_eq!(StationSet::Nl.to_string(), "nl");

        let err = StationSet::parse("mars").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'mars'"), "{message}");
        assert!(message.contains("superterp, core, remote, nl, europe, all, none"), "{message}");

        assert!(station_list_by_name::<&str>("europe", &[], &[]).is_ok());
        assert!(station_list_by_name::<&str>("Europe ", &[], &[]).is_err());
    }

    #[test]
    fn test_exclude_conflicts() {
        let stations = ["CS001", "CS002", "DE601", "DE602", "UK608"];
        assert_eq!(
            exclude_conflicting_eu_stations(&stations),
            vec!["CS001", "CS002", "DE602", "UK608"]
        );
        assert_eq!(
            exclude_conflicting_nl_stations(&stations),
            vec!["CS002", "DE601", "DE602", "UK608"]
        );

        let all = station_list::<&str>(StationSet::All, &[], &[]);
        let without_eu = exclude_conflicting_eu_stations(&all);
        assert_eq!(without_eu, station_list::<&str>(StationSet::Nl, &[], &[]));
        let without_nl = exclude_conflicting_nl_stations(&all);
        assert_eq!(without_nl.len(), all.len() - EAR_CONFLICTS.len());
    }
}
