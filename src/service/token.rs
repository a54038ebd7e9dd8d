use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::db::models::DbUser;
use crate::error::PresenterError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User id as a decimal string.
    pub sub: String,
    pub username: String,
    pub email: String,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[cfg.issuer.as_str()]);
        validation.set_audience(&[cfg.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(cfg.key.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.key.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::days(cfg.ttl_days),
        }
    }

    pub fn issue(&self, user: &DbUser) -> Result<String, PresenterError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Any signature, issuer, audience or expiry problem is reported as 401.
    pub fn verify(&self, token: &str) -> Result<Claims, PresenterError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "rejected bearer token");
                PresenterError::unauthorized("invalid or expired token")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> DbUser {
        DbUser {
            id: 42,
            username: "measurement_admin".into(),
            email: "admin@example.com".into(),
            password_hash: String::new(),
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn issued_token_carries_user_claims() {
        let svc = TokenService::new(&JwtConfig::default());
        let token = svc.issue(&user()).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "measurement_admin");
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.iss, "MeasurementApp");
        assert!(claims.exp - claims.iat >= 7 * 24 * 3600 - 1);
    }

    #[test]
    fn rejects_foreign_signature_and_audience() {
        let ours = TokenService::new(&JwtConfig::default());
        let other_key = TokenService::new(&JwtConfig {
            key: "a-completely-different-signing-key-0123".into(),
            ..JwtConfig::default()
        });
        let other_audience = TokenService::new(&JwtConfig {
            audience: "SomeoneElse".into(),
            ..JwtConfig::default()
        });

        let token = other_key.issue(&user()).unwrap();
        assert!(matches!(ours.verify(&token), Err(PresenterError::Unauthorized(_))));

        let token = other_audience.issue(&user()).unwrap();
        assert!(matches!(ours.verify(&token), Err(PresenterError::Unauthorized(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let expired = TokenService::new(&JwtConfig {
            ttl_days: -1,
            ..JwtConfig::default()
        });
        let token = expired.issue(&user()).unwrap();
        assert!(matches!(expired.verify(&token), Err(PresenterError::Unauthorized(_))));
    }

    #[test]
    fn rejects_garbage() {
        let svc = TokenService::new(&JwtConfig::default());
        assert!(svc.verify("not.a.jwt").is_err());
    }
}
