use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::error::PresenterError;
use crate::router::PresenterState;

/// The user behind a verified `Authorization: Bearer <jwt>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Verify a bearer token against the state's signing key.
pub fn authorize_bearer(state: &PresenterState, token: &str) -> Result<AuthUser, PresenterError> {
    let claims = state.tokens.verify(token)?;
    let id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| PresenterError::unauthorized("invalid or expired token"))?;
    Ok(AuthUser {
        id,
        username: claims.username,
        email: claims.email,
    })
}

impl FromRequestParts<PresenterState> for AuthUser {
    type Rejection = PresenterError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PresenterState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| PresenterError::unauthorized("missing bearer token"))?;
        authorize_bearer(state, bearer.token())
    }
}
