use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue};
use headers::{Header, HeaderMapExt};
use tracing::debug;

use crate::db::models::{DbSensor, DbSeries};
use crate::error::PresenterError;
use crate::router::PresenterState;

static X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// `X-API-Key: <key>`; blank values do not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XApiKey(pub String);

impl Header for XApiKey {
    fn name() -> &'static HeaderName {
        &X_API_KEY
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let key = value.to_str().map_err(|_| headers::Error::invalid())?.trim();
        if key.is_empty() {
            return Err(headers::Error::invalid());
        }
        Ok(Self(key.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

/// An active sensor resolved from its ingestion key, with the series it feeds.
#[derive(Debug, Clone)]
pub struct SensorAuth {
    pub sensor: DbSensor,
    pub series: DbSeries,
}

impl FromRequestParts<PresenterState> for SensorAuth {
    type Rejection = PresenterError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PresenterState,
    ) -> Result<Self, Self::Rejection> {
        let Some(XApiKey(key)) = parts.headers.typed_get::<XApiKey>() else {
            return Err(PresenterError::unauthorized("API key is required"));
        };

        match state.storage.find_active_sensor_by_key(&key).await? {
            Some((sensor, series)) => Ok(Self { sensor, series }),
            None => {
                debug!("rejected unknown or inactive sensor key");
                Err(PresenterError::unauthorized("Invalid or inactive API key"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn decodes_trimmed_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("  TEMP_SALON_KEY "));
        assert_eq!(
            headers.typed_get::<XApiKey>(),
            Some(XApiKey("TEMP_SALON_KEY".into()))
        );
    }

    #[test]
    fn blank_or_missing_key_is_absent() {
        let mut headers = HeaderMap::new();
        assert_eq!(headers.typed_get::<XApiKey>(), None);
        headers.insert("x-api-key", HeaderValue::from_static("   "));
        assert_eq!(headers.typed_get::<XApiKey>(), None);
    }
}
