//! HTTP handlers, one module per resource under `/api`.

pub mod auth;
pub mod measurements;
pub mod sensors;
pub mod series;

use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};

/// `201 Created` with a `Location` header pointing at the new resource.
pub(crate) fn created<T: IntoResponse>(location: String, body: T) -> Response {
    let mut resp = (axum::http::StatusCode::CREATED, body).into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        resp.headers_mut().insert(header::LOCATION, value);
    }
    resp
}
