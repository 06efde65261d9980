// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth2 provider client.
//!
//! Handles:
//! - Authorization URL construction (offline access, fixed state)
//! - Authorization code exchange
//! - Access token refresh

use crate::config::Config;
use crate::models::credential::EXPIRY_DELTA_SECS;
use serde::Deserialize;

/// Fixed `state` parameter sent with every authorization request.
pub const AUTH_STATE: &str = "state";

/// Build the provider authorization URL for `config`.
///
/// Deterministic: the same configuration always yields the same URL.
/// Parameters are emitted in key order.
pub fn build_authorization_url(config: &Config) -> String {
    let scope = config.scopes.join(" ");
    let params = [
        ("access_type", "offline"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_url.as_str()),
        ("response_type", "code"),
        ("scope", scope.as_str()),
        ("state", AUTH_STATE),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if config.auth_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", config.auth_url, separator, query)
}

/// Token endpoint failure.
#[derive(Debug, thiserror::Error)]
pub enum TokenEndpointError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {error}")]
    Rejected { status: u16, error: String },

    #[error("invalid token response: {0}")]
    Parse(String),
}

/// Token endpoint response (code exchange and refresh share this shape).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
}

/// Error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth2 provider client.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    config: Config,
}

impl OAuthClient {
    pub fn new(config: Config) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    pub fn with_http(http: reqwest::Client, config: Config) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn authorization_url(&self) -> String {
        build_authorization_url(&self.config)
    }

    /// Exchange a one-time authorization code for a token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, TokenEndpointError> {
        self.post_token_form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ])
        .await
    }

    /// Request a new access token with a refresh token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, TokenEndpointError> {
        self.post_token_form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ])
        .await
    }

    async fn post_token_form(
        &self,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, TokenEndpointError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = match serde_json::from_str::<TokenErrorBody>(&body) {
                Ok(e) => match e.error_description {
                    Some(desc) => format!("{}: {}", e.error, desc),
                    None => e.error,
                },
                Err(_) => body,
            };
            tracing::warn!(status = %status, error = %error, "Token endpoint rejected request");
            return Err(TokenEndpointError::Rejected {
                status: status.as_u16(),
                error,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TokenEndpointError::Parse(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(TokenEndpointError::Parse("empty access_token".to_string()));
        }

        // A token that would already count as expired is useless to the caller.
        if token.expires_in <= EXPIRY_DELTA_SECS {
            return Err(TokenEndpointError::Parse(format!(
                "expires_in {} is not longer than the {}s expiry margin",
                token.expires_in, EXPIRY_DELTA_SECS
            )));
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            scopes: vec![
                "https://www.googleapis.com/auth/fitness.activity.read".to_string(),
                "https://www.googleapis.com/auth/fitness.sleep.read".to_string(),
            ],
            ..Config::test_default()
        }
    }

    #[test]
    fn test_authorization_url_is_deterministic() {
        assert_eq!(
            build_authorization_url(&config()),
            build_authorization_url(&config())
        );
    }

    #[test]
    fn test_authorization_url_parameters() {
        let url = build_authorization_url(&config());
        let parsed = url::Url::parse(&url).unwrap();
        let query: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert_eq!(query["access_type"], "offline");
        assert_eq!(query["client_id"], "test_client_id");
        assert_eq!(query["redirect_uri"], "http://localhost:8080/callback");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["state"], AUTH_STATE);
        assert_eq!(
            query["scope"],
            "https://www.googleapis.com/auth/fitness.activity.read \
             https://www.googleapis.com/auth/fitness.sleep.read"
        );
    }

    #[test]
    fn test_authorization_url_keeps_existing_query() {
        let config = Config {
            auth_url: "https://idp.example/auth?prompt=consent".to_string(),
            ..config()
        };
        let url = build_authorization_url(&config);
        assert!(url.starts_with("https://idp.example/auth?prompt=consent&access_type=offline"));
    }

    #[test]
    fn test_token_response_defaults() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":3599}"#).unwrap();
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.token_type, None);
        assert_eq!(token.expires_in, 3599);
    }
}
