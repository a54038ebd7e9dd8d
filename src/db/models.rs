use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::PresenterError;

/// Timestamps are stored as fixed-width RFC 3339 text so that string order
/// equals chronological order in range filters and MIN/MAX aggregates.
pub fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn decode_ts(raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub(crate) fn decode_opt_ts(raw: Option<String>) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    raw.as_deref().map(decode_ts).transpose()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbSeries {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub min_value: f64,
    pub max_value: f64,
    pub unit: String,
    pub color: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl DbSeries {
    /// Bounds are inclusive on both ends.
    pub fn accepts(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min_value && value <= self.max_value
    }

    pub fn check_value(&self, value: f64) -> Result<(), PresenterError> {
        if self.accepts(value) {
            return Ok(());
        }
        Err(PresenterError::Validation(format!(
            "Measurement value ({}) is out of range for this series ({} - {} {})",
            value, self.min_value, self.max_value, self.unit
        )))
    }
}

/// Fields shared by series create and update.
#[derive(Debug, Clone)]
pub struct SeriesFields {
    pub name: String,
    pub description: Option<String>,
    pub min_value: f64,
    pub max_value: f64,
    pub unit: String,
    pub color: String,
    pub icon: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct SeriesSummary {
    pub series: DbSeries,
    pub measurement_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbSensor {
    pub id: i64,
    pub name: String,
    pub api_key: String,
    pub series_id: i64,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_data_received: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewSensor {
    pub name: String,
    pub api_key: String,
    pub series_id: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SensorChanges {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct SensorSummary {
    pub sensor: DbSensor,
    pub series_name: String,
    pub measurement_count: i64,
}

#[derive(Debug, Clone)]
pub struct SensorStats {
    pub sensor: DbSensor,
    pub series_name: String,
    pub total_measurements: i64,
    pub first_measurement: Option<DateTime<Utc>>,
    pub last_measurement: Option<DateTime<Utc>>,
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbMeasurement {
    pub id: i64,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub series_id: i64,
    pub user_id: Option<i64>,
    pub sensor_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMeasurement {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub series_id: i64,
    pub user_id: Option<i64>,
    pub sensor_id: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MeasurementChanges {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A measurement joined with the series/sensor columns the API exposes.
#[derive(Debug, Clone)]
pub struct MeasurementView {
    pub measurement: DbMeasurement,
    pub series_name: String,
    pub series_unit: String,
    pub series_color: String,
    pub sensor_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub series_ids: Option<Vec<i64>>,
    pub limit: Option<i64>,
    pub descending: bool,
}

#[derive(Debug, Clone)]
pub struct SeriesStats {
    pub series_id: i64,
    pub series_name: String,
    pub count: i64,
    pub min_value: f64,
    pub max_value: f64,
    pub avg_value: f64,
    pub first_measurement: Option<DateTime<Utc>>,
    pub last_measurement: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn humidity() -> DbSeries {
        DbSeries {
            id: 2,
            name: "Humidity".into(),
            description: None,
            min_value: 0.0,
            max_value: 100.0,
            unit: "%".into(),
            color: "#3B82F6".into(),
            icon: None,
            created_at: Utc::now(),
            is_active: true,
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let s = humidity();
        assert!(s.accepts(0.0));
        assert!(s.accepts(100.0));
        assert!(s.accepts(55.2));
        assert!(!s.accepts(-0.1));
        assert!(!s.accepts(100.01));
        assert!(!s.accepts(f64::NAN));
    }

    #[test]
    fn out_of_range_message_names_bounds_and_unit() {
        let err = humidity().check_value(120.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("(120)"), "{msg}");
        assert!(msg.contains("0 - 100 %"), "{msg}");
    }

    #[test]
    fn encoded_timestamps_sort_chronologically() {
        let early = Utc.with_ymd_and_hms(2024, 11, 1, 6, 0, 0).unwrap();
        let late = early + chrono::Duration::milliseconds(1500);
        let (a, b) = (encode_ts(&early), encode_ts(&late));
        assert_eq!(a, "2024-11-01T06:00:00.000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(decode_ts(&b).unwrap(), late);
    }
}
