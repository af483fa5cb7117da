//! Server configuration read from the environment

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use health_guard_domain::auth::token::{DEFAULT_ACCESS_TOKEN_HOURS, DEFAULT_ISSUER};
use health_guard_domain::auth::TokenConfig;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODELS_DIR: &str = "ml_models";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Settings for the HTTP server and the services behind it
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_hours: i64,
    pub models_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub environment: String,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// `JWT_SECRET` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        Ok(Self {
            port: parse_var("PORT", DEFAULT_PORT)?,
            jwt_secret,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string()),
            access_token_hours: parse_var("ACCESS_TOKEN_EXPIRATION_HOURS", DEFAULT_ACCESS_TOKEN_HOURS)?,
            models_dir: env::var("MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODELS_DIR)),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        })
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.jwt_secret.clone())
            .with_issuer(self.jwt_issuer.clone())
            .with_ttl_hours(self.access_token_hours)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}
