use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use tracing::info;

use crate::PresenterError;
use crate::db::models::SeriesSummary;
use crate::handlers::created;
use crate::middleware::{AuthUser, PathId, ValidJson};
use crate::router::PresenterState;
use crate::types::series::{CreateSeriesRequest, SeriesDto, UpdateSeriesRequest};

fn series_not_found(id: i64) -> PresenterError {
    PresenterError::not_found(format!("Series {id} not found"))
}

/// GET /api/series
pub async fn list_series(
    State(state): State<PresenterState>,
) -> Result<Json<Vec<SeriesDto>>, PresenterError> {
    let series = state.storage.list_series().await?;
    Ok(Json(series.into_iter().map(SeriesDto::from).collect()))
}

/// GET /api/series/{id}
pub async fn get_series(
    State(state): State<PresenterState>,
    PathId(id): PathId,
) -> Result<Json<SeriesDto>, PresenterError> {
    let summary = state
        .storage
        .get_series_summary(id)
        .await?
        .ok_or_else(|| series_not_found(id))?;
    Ok(Json(summary.into()))
}

/// POST /api/series
pub async fn create_series(
    State(state): State<PresenterState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateSeriesRequest>,
) -> Result<Response, PresenterError> {
    let series = state.storage.insert_series(req.into_fields()?).await?;
    info!(series_id = series.id, user_id = auth.id, name = %series.name, "series created");

    let location = format!("/api/series/{}", series.id);
    let dto = SeriesDto::from(SeriesSummary {
        series,
        measurement_count: 0,
    });
    Ok(created(location, Json(dto)))
}

/// PUT /api/series/{id}
pub async fn update_series(
    State(state): State<PresenterState>,
    _auth: AuthUser,
    PathId(id): PathId,
    ValidJson(req): ValidJson<UpdateSeriesRequest>,
) -> Result<StatusCode, PresenterError> {
    if state.storage.find_series(id).await?.is_none() {
        return Err(series_not_found(id));
    }
    let fields = req.into_fields()?;
    if !state.storage.update_series(id, fields).await? {
        return Err(series_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/series/{id}
pub async fn delete_series(
    State(state): State<PresenterState>,
    auth: AuthUser,
    PathId(id): PathId,
) -> Result<StatusCode, PresenterError> {
    if state.storage.find_series(id).await?.is_none() {
        return Err(series_not_found(id));
    }
    if state.storage.count_series_measurements(id).await? > 0 {
        return Err(PresenterError::validation(
            "Cannot delete a series that contains measurements",
        ));
    }
    if !state.storage.delete_series(id).await? {
        return Err(series_not_found(id));
    }
    info!(series_id = id, user_id = auth.id, "series deleted");
    Ok(StatusCode::NO_CONTENT)
}
