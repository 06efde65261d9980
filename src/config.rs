// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth application configuration loaded from environment variables.
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file. The configuration is immutable for the life of the process.

use std::env;
use std::path::Path;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_FITNESS_API_URL: &str = "https://www.googleapis.com/fitness/v1";

/// Read-only Google Fit scopes requested at authorization time.
pub const FITNESS_READ_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/fitness.activity.read",
    "https://www.googleapis.com/auth/fitness.blood_glucose.read",
    "https://www.googleapis.com/auth/fitness.blood_pressure.read",
    "https://www.googleapis.com/auth/fitness.body.read",
    "https://www.googleapis.com/auth/fitness.heart_rate.read",
    "https://www.googleapis.com/auth/fitness.body_temperature.read",
    "https://www.googleapis.com/auth/fitness.location.read",
    "https://www.googleapis.com/auth/fitness.nutrition.read",
    "https://www.googleapis.com/auth/fitness.oxygen_saturation.read",
    "https://www.googleapis.com/auth/fitness.reproductive_health.read",
    "https://www.googleapis.com/auth/fitness.sleep.read",
];

/// OAuth app configuration plus the remote endpoints it talks to.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URL registered with the provider
    pub redirect_url: String,
    /// Requested scopes
    pub scopes: Vec<String>,
    /// Provider authorization endpoint
    pub auth_url: String,
    /// Provider token endpoint (code exchange and refresh)
    pub token_url: String,
    /// Fitness REST API base URL
    pub fitness_api_url: String,
}

impl Config {
    /// Config for testing only.
    pub fn test_default() -> Self {
        Self {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            redirect_url: "http://localhost:8080/callback".to_string(),
            scopes: default_scopes(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            fitness_api_url: DEFAULT_FITNESS_API_URL.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_process_env()
    }

    /// Load configuration, seeding the environment from `path` first.
    ///
    /// Unlike [`Config::from_env`], a missing file is an error here.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::from_path(path)
            .map_err(|e| ConfigError::EnvFile(format!("{}: {}", path.display(), e)))?;
        Self::from_process_env()
    }

    fn from_process_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: env::var("CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("CLIENT_ID"))?,
            client_secret: env::var("CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("CLIENT_SECRET"))?,
            redirect_url: env::var("REDIRECT_URL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("REDIRECT_URL"))?,
            scopes: default_scopes(),
            auth_url: env::var("AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            token_url: env::var("TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            fitness_api_url: env::var("FITNESS_API_URL")
                .unwrap_or_else(|_| DEFAULT_FITNESS_API_URL.to_string()),
        })
    }
}

fn default_scopes() -> Vec<String> {
    FITNESS_READ_SCOPES.iter().map(|s| s.to_string()).collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Failed to load env file {0}")]
    EnvFile(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("CLIENT_ID", "test_id");
        env::set_var("CLIENT_SECRET", " test_secret\n");
        env::set_var("REDIRECT_URL", "http://localhost/cb");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.client_id, "test_id");
        assert_eq!(config.client_secret, "test_secret");
        assert_eq!(config.redirect_url, "http://localhost/cb");
        assert_eq!(config.scopes.len(), FITNESS_READ_SCOPES.len());
    }

    #[test]
    fn test_missing_env_file_is_error() {
        let err = Config::from_env_file("/nonexistent/fit-daily/.env").unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
    }

    #[test]
    fn test_scopes_are_read_only() {
        assert!(FITNESS_READ_SCOPES.iter().all(|s| s.ends_with(".read")));
    }
}
