//! Environment-driven configuration.

use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres connection string. Without one the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub razorpay: Option<RazorpayConfig>,
    pub google_client_id: Option<String>,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = optional("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let port = match optional("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => 5000,
        };
        let razorpay = match (optional("RAZORPAY_KEY_ID"), optional("RAZORPAY_KEY_SECRET")) {
            (Some(key_id), Some(key_secret)) => Some(RazorpayConfig { key_id, key_secret }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("RAZORPAY_KEY_SECRET")),
            (None, Some(_)) => return Err(ConfigError::Missing("RAZORPAY_KEY_ID")),
        };
        Ok(Self {
            database_url: optional("DATABASE_URL"),
            jwt_secret,
            token_ttl_days: 7,
            razorpay,
            google_client_id: optional("GOOGLE_CLIENT_ID"),
            port,
        })
    }

    /// Configuration for tests and local tooling.
    pub fn for_tests(jwt_secret: &str, razorpay_secret: &str) -> Self {
        Self {
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            token_ttl_days: 7,
            razorpay: Some(RazorpayConfig { key_id: "rzp_test_key".into(), key_secret: razorpay_secret.to_string() }),
            google_client_id: Some("test-client.apps.googleusercontent.com".into()),
            port: 0,
        }
    }
}
