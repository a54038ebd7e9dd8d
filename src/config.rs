use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::PresenterError;

/// Signing key used when nothing else is configured. Fine for local runs only.
pub const DEV_JWT_KEY: &str = "YourSuperSecretKeyHereThatIsAtLeast32CharactersLong!";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    /// Insert the demo users/series/sensors/measurements into an empty database.
    pub seed_demo_data: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:datapresenter.db".to_string(),
            loglevel: "info".to_string(),
            seed_demo_data: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub key: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key: DEV_JWT_KEY.to_string(),
            issuer: "MeasurementApp".to_string(),
            audience: "MeasurementAppUsers".to_string(),
            ttl_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { bcrypt_cost: 11 }
    }
}

impl Config {
    /// Defaults, then `config.toml` (if present), then `DATAPRESENTER_*` env vars.
    /// Nested keys use `__`, e.g. `DATAPRESENTER_JWT__KEY`.
    pub fn load() -> Result<Self, PresenterError> {
        Self::figment().extract().map_err(Into::into)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("DATAPRESENTER_").split("__"))
    }

    pub fn uses_dev_jwt_key(&self) -> bool {
        self.jwt.key == DEV_JWT_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_deployment() {
        let cfg = Config::default();
        assert_eq!(cfg.jwt.issuer, "MeasurementApp");
        assert_eq!(cfg.jwt.audience, "MeasurementAppUsers");
        assert_eq!(cfg.jwt.ttl_days, 7);
        assert_eq!(cfg.auth.bcrypt_cost, 11);
        assert!(cfg.basic.seed_demo_data);
        assert!(cfg.uses_dev_jwt_key());
    }

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DATAPRESENTER_JWT__KEY", "another-signing-key-of-some-length");
            jail.set_env("DATAPRESENTER_BASIC__SEED_DEMO_DATA", "false");
            jail.create_file("config.toml", "[auth]\nbcrypt_cost = 5\n")?;

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.jwt.key, "another-signing-key-of-some-length");
            assert!(!cfg.basic.seed_demo_data);
            assert_eq!(cfg.auth.bcrypt_cost, 5);
            assert!(!cfg.uses_dev_jwt_key());
            Ok(())
        });
    }
}
