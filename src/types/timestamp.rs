//! Timestamps arrive either as RFC 3339 or as offset-less local strings from
//! `datetime-local` inputs. The latter are taken as UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, de::Error};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Years outside 0000..=9999 are refused; storage relies on four-digit years.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_any(raw.trim()).filter(|dt| (0..=9999).contains(&dt.year()))
}

fn parse_any(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
}

pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accepts_rfc3339_and_local_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 11, 1, 6, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-11-01T06:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-11-01T07:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-11-01T06:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-11-01T06:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-11-01"),
            Some(Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_nonsense() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01"), None);
    }

    #[test]
    fn rejects_years_beyond_four_digits() {
        assert_eq!(parse_timestamp("+10000-01-01T00:00:00"), None);
        assert_eq!(parse_timestamp("-0001-06-01T00:00:00"), None);
        assert_eq!(parse_timestamp("+10000-01-01"), None);
        // shifts past 9999 once normalised to UTC
        assert_eq!(parse_timestamp("9999-12-31T23:00:00-05:00"), None);
        assert!(parse_timestamp("9999-12-31T23:59:59Z").is_some());
        assert!(parse_timestamp("0001-01-01T00:00:00Z").is_some());
    }
}
