use garde::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[garde(length(min = 1))]
    pub username: String,
    #[garde(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[garde(length(chars, min = 10, max = 100))]
    pub username: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(chars, min = 12, max = 100))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[garde(length(min = 1))]
    pub current_password: String,
    #[garde(length(chars, min = 6, max = 100))]
    pub new_password: String,
}

/// Returned by login/register; `/me` sends an empty token.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rules() {
        let ok = RegisterRequest {
            username: "measurement_fan".into(),
            email: "fan@example.com".into(),
            password: "long enough password".into(),
        };
        assert!(ok.validate().is_ok());

        let short_name = RegisterRequest {
            username: "shorty".into(),
            ..ok.clone()
        };
        assert!(short_name.validate().is_err());

        let bad_email = RegisterRequest {
            email: "not-an-email".into(),
            ..ok.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".into(),
            ..ok.clone()
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn change_password_requires_six_chars() {
        let req = ChangePasswordRequest {
            current_password: "whatever".into(),
            new_password: "12345".into(),
        };
        assert!(req.validate().is_err());
    }
}
