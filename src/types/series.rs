use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::db::models::{SeriesFields, SeriesSummary};
use crate::error::PresenterError;

fn default_color() -> String {
    "#f8b4aa".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeriesRequest {
    #[garde(length(chars, min = 3, max = 200))]
    pub name: String,
    #[garde(length(chars, max = 500))]
    pub description: Option<String>,
    #[garde(skip)]
    pub min_value: f64,
    #[garde(skip)]
    pub max_value: f64,
    #[garde(length(chars, min = 1, max = 50))]
    pub unit: String,
    #[serde(default = "default_color")]
    #[garde(pattern(r"^#[0-9A-Fa-f]{6}$"))]
    pub color: String,
    #[garde(length(chars, max = 50))]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeriesRequest {
    #[garde(length(chars, min = 3, max = 200))]
    pub name: String,
    #[garde(length(chars, max = 500))]
    pub description: Option<String>,
    #[garde(skip)]
    pub min_value: f64,
    #[garde(skip)]
    pub max_value: f64,
    #[garde(length(chars, min = 1, max = 50))]
    pub unit: String,
    #[serde(default = "default_color")]
    #[garde(pattern(r"^#[0-9A-Fa-f]{6}$"))]
    pub color: String,
    #[garde(length(chars, max = 50))]
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    #[garde(skip)]
    pub is_active: bool,
}

fn check_bounds(min_value: f64, max_value: f64) -> Result<(), PresenterError> {
    if !min_value.is_finite() || !max_value.is_finite() || min_value >= max_value {
        return Err(PresenterError::validation(
            "MinValue must be less than MaxValue",
        ));
    }
    Ok(())
}

impl CreateSeriesRequest {
    pub fn into_fields(self) -> Result<SeriesFields, PresenterError> {
        check_bounds(self.min_value, self.max_value)?;
        Ok(SeriesFields {
            name: self.name,
            description: self.description,
            min_value: self.min_value,
            max_value: self.max_value,
            unit: self.unit,
            color: self.color,
            icon: self.icon,
            is_active: true,
        })
    }
}

impl UpdateSeriesRequest {
    pub fn into_fields(self) -> Result<SeriesFields, PresenterError> {
        check_bounds(self.min_value, self.max_value)?;
        Ok(SeriesFields {
            name: self.name,
            description: self.description,
            min_value: self.min_value,
            max_value: self.max_value,
            unit: self.unit,
            color: self.color,
            icon: self.icon,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub min_value: f64,
    pub max_value: f64,
    pub unit: String,
    pub color: String,
    pub icon: Option<String>,
    pub is_active: bool,
    pub measurement_count: i64,
}

impl From<SeriesSummary> for SeriesDto {
    fn from(summary: SeriesSummary) -> Self {
        let s = summary.series;
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            min_value: s.min_value,
            max_value: s.max_value,
            unit: s.unit,
            color: s.color,
            icon: s.icon,
            is_active: s.is_active,
            measurement_count: summary.measurement_count,
        }
    }
}
