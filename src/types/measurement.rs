use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::db::models::{MeasurementChanges, MeasurementFilter, MeasurementView, SeriesStats};
use crate::error::PresenterError;
use crate::types::timestamp::{self, parse_timestamp};

/// Upper bound for `limit` on listing queries.
pub const MAX_LIMIT: i64 = 10_000;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeasurementRequest {
    #[garde(skip)]
    pub value: f64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    #[garde(skip)]
    pub timestamp: DateTime<Utc>,
    #[garde(range(min = 1))]
    pub series_id: i64,
    #[garde(length(chars, max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeasurementRequest {
    #[garde(skip)]
    pub value: f64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    #[garde(skip)]
    pub timestamp: DateTime<Utc>,
    #[garde(length(chars, max = 500))]
    pub notes: Option<String>,
}

impl From<UpdateMeasurementRequest> for MeasurementChanges {
    fn from(req: UpdateMeasurementRequest) -> Self {
        Self {
            value: req.value,
            timestamp: req.timestamp,
            notes: req.notes,
        }
    }
}

/// Body posted by sensors; `timestamp` falls back to the time of receipt.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SensorMeasurementRequest {
    #[garde(skip)]
    pub value: f64,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    #[garde(skip)]
    pub timestamp: Option<DateTime<Utc>>,
    #[garde(length(chars, max = 500))]
    pub notes: Option<String>,
}

/// Query string of `GET /api/measurements` and `GET /api/measurements/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub series_ids: Option<String>,
    pub limit: Option<i64>,
    pub sort_order: Option<String>,
}

impl MeasurementQuery {
    pub fn into_filter(self) -> Result<MeasurementFilter, PresenterError> {
        let start = parse_bound(self.start_date.as_deref(), "startDate")?;
        let end = parse_bound(self.end_date.as_deref(), "endDate")?;

        let series_ids = match self.series_ids.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.split(',')
                    .map(|part| part.trim().parse::<i64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| {
                        PresenterError::validation(format!(
                            "seriesIds must be a comma-separated list of integers, got `{raw}`"
                        ))
                    })?,
            ),
        };

        let descending = match self.sort_order.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(order) if order.eq_ignore_ascii_case("asc") => false,
            Some(order) if order.eq_ignore_ascii_case("desc") => true,
            Some(other) => {
                return Err(PresenterError::validation(format!(
                    "sortOrder must be `asc` or `desc`, got `{other}`"
                )));
            }
        };

        Ok(MeasurementFilter {
            start,
            end,
            series_ids,
            limit: self.limit.filter(|l| *l > 0).map(|l| l.min(MAX_LIMIT)),
            descending,
        })
    }
}

fn parse_bound(raw: Option<&str>, name: &str) -> Result<Option<DateTime<Utc>>, PresenterError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(value)
            .map(Some)
            .ok_or_else(|| PresenterError::validation(format!("{name} is not a valid date: `{value}`"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementDto {
    pub id: i64,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub series_id: i64,
    pub series_name: String,
    pub series_unit: Option<String>,
    pub series_color: Option<String>,
    pub notes: Option<String>,
    pub sensor_name: Option<String>,
    pub sensor_id: Option<i64>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<MeasurementView> for MeasurementDto {
    fn from(view: MeasurementView) -> Self {
        let m = view.measurement;
        Self {
            id: m.id,
            value: m.value,
            timestamp: m.timestamp,
            series_id: m.series_id,
            series_name: view.series_name,
            series_unit: Some(view.series_unit),
            series_color: Some(view.series_color),
            notes: m.notes,
            sensor_name: view.sensor_name,
            sensor_id: m.sensor_id,
            user_id: m.user_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementStatsDto {
    pub series_id: i64,
    pub series_name: String,
    pub count: i64,
    pub min_value: f64,
    pub max_value: f64,
    pub avg_value: f64,
    pub first_measurement: Option<DateTime<Utc>>,
    pub last_measurement: Option<DateTime<Utc>>,
}

impl From<SeriesStats> for MeasurementStatsDto {
    fn from(s: SeriesStats) -> Self {
        Self {
            series_id: s.series_id,
            series_name: s.series_name,
            count: s.count,
            min_value: s.min_value,
            max_value: s.max_value,
            avg_value: s.avg_value,
            first_measurement: s.first_measurement,
            last_measurement: s.last_measurement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_means_no_filter() {
        let filter = MeasurementQuery::default().into_filter().unwrap();
        assert!(filter.start.is_none() && filter.end.is_none());
        assert!(filter.series_ids.is_none());
        assert!(filter.limit.is_none());
        assert!(!filter.descending);
    }

    #[test]
    fn parses_ids_limit_and_order() {
        let filter = MeasurementQuery {
            series_ids: Some("1, 3,5".into()),
            limit: Some(50_000),
            sort_order: Some("DESC".into()),
            start_date: Some("2024-11-01".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.series_ids, Some(vec![1, 3, 5]));
        assert_eq!(filter.limit, Some(MAX_LIMIT));
        assert!(filter.descending);
        assert!(filter.start.is_some());
    }

    #[test]
    fn non_positive_limit_is_ignored() {
        let filter = MeasurementQuery {
            limit: Some(0),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert!(filter.limit.is_none());
    }

    #[test]
    fn malformed_inputs_are_client_errors() {
        for query in [
            MeasurementQuery {
                series_ids: Some("1,two".into()),
                ..Default::default()
            },
            MeasurementQuery {
                sort_order: Some("sideways".into()),
                ..Default::default()
            },
            MeasurementQuery {
                end_date: Some("tomorrow".into()),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                query.into_filter(),
                Err(PresenterError::Validation(_))
            ));
        }
    }

    #[test]
    fn sensor_payload_timestamp_is_optional() {
        let req: SensorMeasurementRequest =
            serde_json::from_value(serde_json::json!({ "value": 21.5 })).unwrap();
        assert!(req.timestamp.is_none());
        assert!(req.notes.is_none());
    }
}
