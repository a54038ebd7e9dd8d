use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use tracing::info;

use crate::PresenterError;
use crate::handlers::created;
use crate::middleware::{AuthUser, PathId, ValidJson};
use crate::router::PresenterState;
use crate::service::api_key::generate_api_key;
use crate::types::sensor::{
    CreateSensorRequest, KEY_REGENERATED_MESSAGE, SENSOR_CREATED_MESSAGE, SensorCreatedDto,
    SensorDto, SensorStatsDto, UpdateSensorRequest,
};

fn sensor_not_found(id: i64) -> PresenterError {
    PresenterError::not_found(format!("Sensor {id} not found"))
}

/// GET /api/sensors
pub async fn list_sensors(
    State(state): State<PresenterState>,
    _auth: AuthUser,
) -> Result<Json<Vec<SensorDto>>, PresenterError> {
    let sensors = state.storage.list_sensors().await?;
    Ok(Json(sensors.into_iter().map(SensorDto::from).collect()))
}

/// GET /api/sensors/{id}
pub async fn get_sensor(
    State(state): State<PresenterState>,
    _auth: AuthUser,
    PathId(id): PathId,
) -> Result<Json<SensorDto>, PresenterError> {
    let summary = state
        .storage
        .get_sensor_summary(id)
        .await?
        .ok_or_else(|| sensor_not_found(id))?;
    Ok(Json(summary.into()))
}

/// POST /api/sensors
///
/// The unmasked key is only ever returned here and by `regenerate_api_key`.
pub async fn create_sensor(
    State(state): State<PresenterState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateSensorRequest>,
) -> Result<Response, PresenterError> {
    if state.storage.find_series(req.series_id).await?.is_none() {
        return Err(PresenterError::validation("Series not found"));
    }

    let api_key = generate_api_key();
    let sensor = state.storage.insert_sensor(req.into_new(api_key.clone())).await?;
    info!(
        sensor_id = sensor.id,
        series_id = sensor.series_id,
        user_id = auth.id,
        "sensor created"
    );

    let location = format!("/api/sensors/{}", sensor.id);
    let dto = SensorCreatedDto::new(&sensor, api_key, SENSOR_CREATED_MESSAGE);
    Ok(created(location, Json(dto)))
}

/// PUT /api/sensors/{id}
pub async fn update_sensor(
    State(state): State<PresenterState>,
    _auth: AuthUser,
    PathId(id): PathId,
    ValidJson(req): ValidJson<UpdateSensorRequest>,
) -> Result<StatusCode, PresenterError> {
    if !state.storage.update_sensor(id, req.into()).await? {
        return Err(sensor_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sensors/{id}/regenerate-key
pub async fn regenerate_api_key(
    State(state): State<PresenterState>,
    auth: AuthUser,
    PathId(id): PathId,
) -> Result<Json<SensorCreatedDto>, PresenterError> {
    let mut sensor = state
        .storage
        .find_sensor(id)
        .await?
        .ok_or_else(|| sensor_not_found(id))?;

    let api_key = generate_api_key();
    if !state.storage.set_sensor_api_key(id, &api_key).await? {
        return Err(sensor_not_found(id));
    }
    sensor.api_key = api_key.clone();
    info!(sensor_id = id, user_id = auth.id, "sensor api key regenerated");

    Ok(Json(SensorCreatedDto::new(
        &sensor,
        api_key,
        KEY_REGENERATED_MESSAGE,
    )))
}

/// DELETE /api/sensors/{id}
pub async fn delete_sensor(
    State(state): State<PresenterState>,
    auth: AuthUser,
    PathId(id): PathId,
) -> Result<StatusCode, PresenterError> {
    if !state.storage.delete_sensor(id).await? {
        return Err(sensor_not_found(id));
    }
    info!(sensor_id = id, user_id = auth.id, "sensor deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sensors/{id}/stats
pub async fn sensor_stats(
    State(state): State<PresenterState>,
    _auth: AuthUser,
    PathId(id): PathId,
) -> Result<Json<SensorStatsDto>, PresenterError> {
    let stats = state
        .storage
        .sensor_stats(id)
        .await?
        .ok_or_else(|| sensor_not_found(id))?;
    Ok(Json(stats.into()))
}
