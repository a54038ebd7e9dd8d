use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::PresenterStorage;
use crate::handlers::{auth, measurements, sensors, series};
use crate::service::{PasswordHasher, TokenService};

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct PresenterState {
    pub storage: PresenterStorage,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
}

impl PresenterState {
    pub fn new(storage: PresenterStorage, cfg: &Config) -> Self {
        Self {
            storage,
            tokens: Arc::new(TokenService::new(&cfg.jwt)),
            passwords: PasswordHasher::new(cfg.auth.bcrypt_cost),
        }
    }
}

pub fn presenter_router(state: PresenterState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/series",
            get(series::list_series).post(series::create_series),
        )
        .route(
            "/api/series/{id}",
            get(series::get_series)
                .put(series::update_series)
                .delete(series::delete_series),
        )
        .route(
            "/api/sensors",
            get(sensors::list_sensors).post(sensors::create_sensor),
        )
        .route(
            "/api/sensors/{id}",
            get(sensors::get_sensor)
                .put(sensors::update_sensor)
                .delete(sensors::delete_sensor),
        )
        .route(
            "/api/sensors/{id}/regenerate-key",
            post(sensors::regenerate_api_key),
        )
        .route("/api/sensors/{id}/stats", get(sensors::sensor_stats))
        .route(
            "/api/measurements",
            get(measurements::list_measurements).post(measurements::create_measurement),
        )
        .route("/api/measurements/stats", get(measurements::measurement_stats))
        .route(
            "/api/measurements/sensor",
            post(measurements::create_sensor_measurement),
        )
        .route(
            "/api/measurements/{id}",
            get(measurements::get_measurement)
                .put(measurements::update_measurement)
                .delete(measurements::delete_measurement),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
