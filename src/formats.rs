//! Text formats understood by MoM.

use std::borrow::Cow;

use hifitime::{Duration, Epoch};

use crate::spec::FrequencyRange;

/// `YYYY-MM-DDTHH:MM:SS` in UTC, rounded to the nearest second.
pub fn mom_timestamp(epoch: Epoch) -> String {
    let (_, _, _, _, _, _, nanos) = epoch.to_gregorian_utc();
    let epoch = if nanos >= 500_000_000 {
        epoch + Duration::from_seconds(1.0)
    } else {
        epoch
    };
    let (y, mo, d, h, mi, s, _) = epoch.to_gregorian_utc();
    format!("{y:4}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}")
}

/// ISO-8601-ish durations, e.g. `PT01H30M`. Only the given fields are
/// written; MoM doesn't normalise them, so `PT3600S` is fine.
pub fn mom_duration(hours: Option<u64>, minutes: Option<u64>, seconds: Option<u64>) -> String {
    let mut duration = String::from("PT");
    if let Some(h) = hours {
        duration.push_str(&format!("{h:02}H"));
    }
    if let Some(m) = minutes {
        duration.push_str(&format!("{m:02}M"));
    }
    if let Some(s) = seconds {
        duration.push_str(&format!("{s:02}S"));
    }
    duration
}

/// `HBA_DUAL_INNER` -> `HBA Dual Inner`.
pub fn mom_antenna_name(mac_name: &str) -> String {
    let mut words = mac_name.split('_');
    let first = words.next().unwrap_or_default().to_string();
    std::iter::once(first)
        .chain(words.map(capitalize))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn mom_frequency_range(range: FrequencyRange) -> &'static str {
    match range {
        FrequencyRange::LbaLow => "10-90 MHz",
        FrequencyRange::LbaHigh => "30-90 MHz",
        FrequencyRange::HbaLow => "110-190 MHz",
        FrequencyRange::HbaMid => "170-230 MHz",
        FrequencyRange::HbaHigh => "210-250 MHz",
    }
}

/// Indent every line of `s` by `amount` spaces. A negative amount removes that
/// many leading characters from every line instead.
pub fn indent(s: &str, amount: isize) -> String {
    let mut out = String::with_capacity(s.len());
    let pad = " ".repeat(amount.max(0) as usize);
    for (i, line) in s.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if amount < 0 {
            out.extend(line.chars().skip(amount.unsigned_abs()));
        } else {
            out.push_str(&pad);
            out.push_str(line);
        }
    }
    out
}

pub fn lower_case(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Escape `&`, `<`, `>`, `'` and `"` for use in element text and attributes.
pub fn xml_escape(s: &str) -> Cow<str> {
    quick_xml::escape::escape(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mom_timestamp_rounds_to_seconds() {
        let epoch = Epoch::from_gregorian_utc(2013, 3, 4, 5, 6, 7, 499_000_000);
        assert_eq!(mom_timestamp(epoch), "2013-03-04T05:06:07");
        let epoch = Epoch::from_gregorian_utc(2013, 12, 31, 23, 59, 59, 600_000_000);
        assert_eq!(mom_timestamp(epoch), "2014-01-01T00:00:00");
    }

    #[test]
    fn test_mom_duration() {
        assert_eq!(mom_duration(None, None, Some(3600)), "PT3600S");
        assert_eq!(mom_duration(None, None, Some(0)), "PT00S");
        assert_eq!(mom_duration(Some(1), Some(5), None), "PT01H05M");
        assert_eq!(mom_duration(None, None, None), "PT");
    }

    #[test]
    fn test_mom_antenna_name() {
        assert_eq!(mom_antenna_name("HBA_DUAL_INNER"), "HBA Dual Inner");
        assert_eq!(mom_antenna_name("LBA_SPARSE_EVEN"), "LBA Sparse Even");
        assert_eq!(mom_antenna_name("HBA_ONE"), "HBA One");
        assert_eq!(mom_antenna_name("HBA"), "HBA");
    }

    #[test]
    fn test_mom_frequency_range() {
        assert_eq!(mom_frequency_range(FrequencyRange::HbaLow), "110-190 MHz");
        assert_eq!(mom_frequency_range(FrequencyRange::LbaLow), "10-90 MHz");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("Hi\nThere", 2), "  Hi\n  There");
        assert_eq!(indent("Hi\nThere\n\n", -1), "i\nhere\n\n");
        assert_eq!(indent("\n<a/>", 4), "    \n    <a/>");
        assert_eq!(indent("x", 0), "x");
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("3C 196"), "3C 196");
        assert_eq!(xml_escape("A&B <x>"), "A&amp;B &lt;x&gt;");
    }
}
