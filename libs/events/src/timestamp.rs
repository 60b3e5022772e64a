//! Wire format for the zone-less event timestamps.
//!
//! Accepts `YYYY-MM-DDTHH:MM`, with optional seconds and fractional seconds.
//! Serialization is left to chrono, which always writes seconds.

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer};

const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a timestamp in any accepted form.
pub fn parse(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

fn from_str<E: de::Error>(s: &str) -> Result<NaiveDateTime, E> {
    parse(s).ok_or_else(|| {
        E::custom(format!(
            "invalid timestamp '{s}', expected YYYY-MM-DDTHH:MM[:SS]"
        ))
    })
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    from_str(&s)
}

pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .as_deref()
        .map(from_str)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expected(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 3, 27)
            .unwrap()
            .and_hms_opt(11, 30, s)
            .unwrap()
    }

    #[test]
    fn test_minute_precision() {
        assert_eq!(parse("2022-03-27T11:30"), Some(expected(0)));
    }

    #[test]
    fn test_second_precision() {
        assert_eq!(parse("2022-03-27T11:30:15"), Some(expected(15)));
        assert_eq!(parse("2022-03-27T11:30:00.000"), Some(expected(0)));
    }

    #[test]
    fn test_rejects_other_forms() {
        for s in ["2022-03-27", "2022-03-27 11:30", "2022-03-27T11", "11:30", ""] {
            assert_eq!(parse(s), None, "{s:?}");
        }
    }
}
