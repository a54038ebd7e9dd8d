use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use tracing::{debug, info};

use crate::PresenterError;
use crate::db::models::{MeasurementFilter, NewMeasurement};
use crate::handlers::created;
use crate::middleware::{AuthUser, PathId, SensorAuth, ValidJson};
use crate::router::PresenterState;
use crate::types::measurement::{
    CreateMeasurementRequest, MeasurementDto, MeasurementQuery, MeasurementStatsDto,
    SensorMeasurementRequest, UpdateMeasurementRequest,
};

fn measurement_not_found(id: i64) -> PresenterError {
    PresenterError::not_found(format!("Measurement {id} not found"))
}

fn parse_filter(
    query: Result<Query<MeasurementQuery>, QueryRejection>,
) -> Result<MeasurementFilter, PresenterError> {
    let Query(query) = query.map_err(|e| PresenterError::Validation(e.body_text()))?;
    query.into_filter()
}

async fn load_dto(state: &PresenterState, id: i64) -> Result<MeasurementDto, PresenterError> {
    state
        .storage
        .get_measurement(id)
        .await?
        .map(MeasurementDto::from)
        .ok_or_else(|| measurement_not_found(id))
}

/// GET /api/measurements?startDate&endDate&seriesIds&limit&sortOrder
pub async fn list_measurements(
    State(state): State<PresenterState>,
    query: Result<Query<MeasurementQuery>, QueryRejection>,
) -> Result<Json<Vec<MeasurementDto>>, PresenterError> {
    let filter = parse_filter(query)?;
    let rows = state.storage.list_measurements(&filter).await?;
    debug!(count = rows.len(), "listed measurements");
    Ok(Json(rows.into_iter().map(MeasurementDto::from).collect()))
}

/// GET /api/measurements/stats
pub async fn measurement_stats(
    State(state): State<PresenterState>,
    query: Result<Query<MeasurementQuery>, QueryRejection>,
) -> Result<Json<Vec<MeasurementStatsDto>>, PresenterError> {
    let filter = parse_filter(query)?;
    let stats = state.storage.measurement_stats(&filter).await?;
    Ok(Json(stats.into_iter().map(MeasurementStatsDto::from).collect()))
}

/// GET /api/measurements/{id}
pub async fn get_measurement(
    State(state): State<PresenterState>,
    PathId(id): PathId,
) -> Result<Json<MeasurementDto>, PresenterError> {
    Ok(Json(load_dto(&state, id).await?))
}

/// POST /api/measurements
pub async fn create_measurement(
    State(state): State<PresenterState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateMeasurementRequest>,
) -> Result<Response, PresenterError> {
    let series = state
        .storage
        .find_series(req.series_id)
        .await?
        .ok_or_else(|| PresenterError::validation("Series not found"))?;
    series.check_value(req.value)?;

    let id = state
        .storage
        .insert_measurement(NewMeasurement {
            value: req.value,
            timestamp: req.timestamp,
            series_id: series.id,
            user_id: Some(auth.id),
            sensor_id: None,
            notes: req.notes,
        })
        .await?;
    debug!(measurement_id = id, series_id = series.id, user_id = auth.id, "measurement created");

    let dto = load_dto(&state, id).await?;
    Ok(created(format!("/api/measurements/{id}"), Json(dto)))
}

/// PUT /api/measurements/{id}
pub async fn update_measurement(
    State(state): State<PresenterState>,
    _auth: AuthUser,
    PathId(id): PathId,
    ValidJson(req): ValidJson<UpdateMeasurementRequest>,
) -> Result<StatusCode, PresenterError> {
    let existing = state
        .storage
        .find_measurement(id)
        .await?
        .ok_or_else(|| measurement_not_found(id))?;

    let series = state
        .storage
        .find_series(existing.series_id)
        .await?
        .ok_or_else(|| PresenterError::validation("Series not found"))?;
    series.check_value(req.value)?;

    if !state.storage.update_measurement(id, req.into()).await? {
        return Err(measurement_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/measurements/{id}
pub async fn delete_measurement(
    State(state): State<PresenterState>,
    auth: AuthUser,
    PathId(id): PathId,
) -> Result<StatusCode, PresenterError> {
    if !state.storage.delete_measurement(id).await? {
        return Err(measurement_not_found(id));
    }
    info!(measurement_id = id, user_id = auth.id, "measurement deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/measurements/sensor, authenticated by `X-API-Key`.
pub async fn create_sensor_measurement(
    State(state): State<PresenterState>,
    SensorAuth { sensor, series }: SensorAuth,
    ValidJson(req): ValidJson<SensorMeasurementRequest>,
) -> Result<Response, PresenterError> {
    series.check_value(req.value)?;

    let received_at = Utc::now();
    let id = state
        .storage
        .insert_sensor_measurement(
            sensor.id,
            NewMeasurement {
                value: req.value,
                timestamp: req.timestamp.unwrap_or(received_at),
                series_id: series.id,
                user_id: None,
                sensor_id: Some(sensor.id),
                notes: req.notes,
            },
            received_at,
        )
        .await?;
    debug!(measurement_id = id, sensor_id = sensor.id, "sensor reading stored");

    let dto = load_dto(&state, id).await?;
    Ok(created(format!("/api/measurements/{id}"), Json(dto)))
}
