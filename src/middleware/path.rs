use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::PresenterError;

/// Numeric `{id}` path segment; anything else is a 400 in the API error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = PresenterError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| PresenterError::Validation(rejection.body_text()))?;
        Ok(Self(id))
    }
}
