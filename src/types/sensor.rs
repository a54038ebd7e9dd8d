use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::db::models::{DbSensor, NewSensor, SensorChanges, SensorStats, SensorSummary};
use crate::service::api_key::mask_api_key;

pub const SENSOR_CREATED_MESSAGE: &str =
    "Sensor has been created. Save the API key, it cannot be retrieved later!";
pub const KEY_REGENERATED_MESSAGE: &str =
    "A new API key has been generated. Save it, it cannot be recovered later!";

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSensorRequest {
    #[garde(length(chars, min = 3, max = 200))]
    pub name: String,
    #[garde(range(min = 1))]
    pub series_id: i64,
    #[garde(length(chars, max = 500))]
    pub description: Option<String>,
}

impl CreateSensorRequest {
    pub fn into_new(self, api_key: String) -> NewSensor {
        NewSensor {
            name: self.name,
            api_key,
            series_id: self.series_id,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSensorRequest {
    #[garde(length(chars, min = 3, max = 200))]
    pub name: String,
    #[garde(length(chars, max = 500))]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    #[garde(skip)]
    pub is_active: bool,
}

impl From<UpdateSensorRequest> for SensorChanges {
    fn from(req: UpdateSensorRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            is_active: req.is_active,
        }
    }
}

/// Listing view; the key is always masked here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDto {
    pub id: i64,
    pub name: String,
    pub api_key: String,
    pub series_id: i64,
    pub series_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_data_received: Option<DateTime<Utc>>,
    pub measurement_count: i64,
}

impl From<SensorSummary> for SensorDto {
    fn from(summary: SensorSummary) -> Self {
        let s = summary.sensor;
        Self {
            id: s.id,
            name: s.name,
            api_key: mask_api_key(&s.api_key),
            series_id: s.series_id,
            series_name: summary.series_name,
            description: s.description,
            is_active: s.is_active,
            created_at: s.created_at,
            last_data_received: s.last_data_received,
            measurement_count: summary.measurement_count,
        }
    }
}

/// The only payload that carries the unmasked key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorCreatedDto {
    pub id: i64,
    pub name: String,
    pub api_key: String,
    pub series_id: i64,
    pub message: String,
}

impl SensorCreatedDto {
    pub fn new(sensor: &DbSensor, api_key: String, message: &str) -> Self {
        Self {
            id: sensor.id,
            name: sensor.name.clone(),
            api_key,
            series_id: sensor.series_id,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorStatsDto {
    pub id: i64,
    pub name: String,
    pub series_id: i64,
    pub series_name: String,
    pub total_measurements: i64,
    pub first_measurement: Option<DateTime<Utc>>,
    pub last_measurement: Option<DateTime<Utc>>,
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub last_data_received: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl From<SensorStats> for SensorStatsDto {
    fn from(stats: SensorStats) -> Self {
        Self {
            id: stats.sensor.id,
            name: stats.sensor.name,
            series_id: stats.sensor.series_id,
            series_name: stats.series_name,
            total_measurements: stats.total_measurements,
            first_measurement: stats.first_measurement,
            last_measurement: stats.last_measurement,
            average_value: stats.average_value,
            min_value: stats.min_value,
            max_value: stats.max_value,
            last_data_received: stats.sensor.last_data_received,
            is_active: stats.sensor.is_active,
        }
    }
}
