// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential lifecycle: restore, acquire, refresh, persist.
//!
//! ```text
//! [none] --restore--> [valid | expired]
//! [none] --acquire--> [valid]
//! [expired, refresh rejected] --acquire--> [valid]
//! [expired] --refresh_if_needed--> [valid] | RefreshFailed
//! [valid] --persist--> [saved]
//! ```
//!
//! Refresh failures are fatal; there is no automatic fallback to
//! re-authorization, but the error carries the authorization URL.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Credential;
use crate::services::oauth::{OAuthClient, TokenEndpointError, TokenResponse};
use crate::store::KeyValueStore;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use tokio::sync::Mutex;

const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Read a complete credential from `store`.
pub fn restore_credential<S: KeyValueStore>(store: &S) -> Result<Credential> {
    let entries = store
        .load()
        .map_err(|e| AppError::StoreUnreadable(e.to_string()))?;
    let credential = Credential::from_entries(&entries)?;

    tracing::info!(
        expires_at = %credential.expiry,
        expired = credential.is_expired(),
        "Credential restored"
    );
    Ok(credential)
}

/// Write `credential` to `store`, replacing whatever was there.
pub fn persist_credential<S: KeyValueStore>(store: &S, credential: &Credential) -> Result<()> {
    if credential.refresh_token.is_none() {
        tracing::warn!("Persisting credential without a refresh token; it will not restore");
    }

    store
        .save(&credential.to_entries())
        .map_err(|e| AppError::StoreWriteFailed(e.to_string()))?;

    tracing::info!(expires_at = %credential.expiry, "Credential persisted");
    Ok(())
}

/// Result of [`CredentialManager::obtain`].
pub enum Startup {
    /// A valid credential, ready for API calls.
    Ready(AuthenticatedClient),
    /// No usable credential and no redirect URL; the user must visit `url`.
    NeedsAuthorization { url: String },
}

/// Owns the OAuth client and every credential state transition.
#[derive(Clone)]
pub struct CredentialManager {
    oauth: OAuthClient,
}

impl CredentialManager {
    pub fn new(config: Config) -> Self {
        Self {
            oauth: OAuthClient::new(config),
        }
    }

    pub fn with_oauth_client(oauth: OAuthClient) -> Self {
        Self { oauth }
    }

    pub fn config(&self) -> &Config {
        self.oauth.config()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        self.oauth.http()
    }

    /// Authorization URL the user must visit to grant access.
    pub fn authorization_url(&self) -> String {
        self.oauth.authorization_url()
    }

    /// Restore a credential from `store` and wrap it in a refreshing client.
    pub fn restore<S: KeyValueStore>(&self, store: &S) -> Result<AuthenticatedClient> {
        let credential = restore_credential(store)?;
        Ok(self.authenticate(credential))
    }

    /// Produce a valid credential for this run.
    ///
    /// The stored credential is used when it restores and refreshes. A
    /// `redirect_url` is exchanged when the store has no usable credential
    /// or its refresh token was rejected. Without one, an empty store yields
    /// [`Startup::NeedsAuthorization`] and a rejected refresh yields
    /// `RefreshFailed`, which also carries the URL. Nothing is written to
    /// `store`.
    pub async fn obtain<S: KeyValueStore>(
        &self,
        store: &S,
        redirect_url: Option<&str>,
    ) -> Result<Startup> {
        let reason = match self.restore(store) {
            Ok(auth) => match auth.refresh_if_needed().await {
                Ok(_) => return Ok(Startup::Ready(auth)),
                Err(e @ AppError::RefreshFailed { .. }) if redirect_url.is_some() => e,
                Err(e) => return Err(e),
            },
            Err(e) => e,
        };

        match redirect_url {
            Some(redirect_url) => {
                tracing::warn!(error = %reason, "Stored credential unusable, using redirect URL");
                let auth = self.acquire_from_authorization_response(redirect_url).await?;
                Ok(Startup::Ready(auth))
            }
            None => {
                tracing::warn!(error = %reason, "No usable stored credential");
                Ok(Startup::NeedsAuthorization {
                    url: self.authorization_url(),
                })
            }
        }
    }

    /// Acquire a credential from the URL the provider redirected the user to.
    ///
    /// Both failure kinds carry a fresh authorization URL for the next attempt.
    pub async fn acquire_from_authorization_response(
        &self,
        redirect_url: &str,
    ) -> Result<AuthenticatedClient> {
        let code = authorization_code(redirect_url).ok_or_else(|| {
            AppError::MissingAuthorizationCode {
                auth_url: self.authorization_url(),
            }
        })?;

        let credential = self.exchange_code(&code).await?;
        Ok(self.authenticate(credential))
    }

    /// Exchange an authorization code for a new credential.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential> {
        tracing::info!("Exchanging authorization code for tokens");

        let token = self
            .oauth
            .exchange_code(code)
            .await
            .map_err(|e| AppError::ExchangeFailed {
                reason: e.to_string(),
                auth_url: self.authorization_url(),
            })?;

        if token.refresh_token.is_none() {
            tracing::warn!("Provider issued no refresh token; offline access may not be granted");
        }

        let credential = credential_from_token(token, Utc::now());
        tracing::info!(expires_at = %credential.expiry, "Authorization code exchanged");
        Ok(credential)
    }

    /// Return `credential` unchanged if still valid, otherwise refresh it.
    ///
    /// Refresh replaces the access token and expiry only.
    pub async fn refresh_if_needed(&self, credential: Credential) -> Result<Credential> {
        let now = Utc::now();
        if !credential.is_expired_at(now) {
            return Ok(credential);
        }

        tracing::info!(expired_at = %credential.expiry, "Access token expired, refreshing");

        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| self.refresh_failed("no refresh token available".to_string()))?;

        let token = self
            .oauth
            .refresh_token(refresh_token)
            .await
            .map_err(|e| match e {
                TokenEndpointError::Rejected { status, error } => {
                    self.refresh_failed(format!("HTTP {}: {}", status, error))
                }
                other => self.refresh_failed(other.to_string()),
            })?;

        let refreshed = Credential {
            access_token: token.access_token,
            expiry: expiry_from_now(now, token.expires_in),
            ..credential
        };

        tracing::info!(expires_at = %refreshed.expiry, "Access token refreshed");
        Ok(refreshed)
    }

    fn refresh_failed(&self, reason: String) -> AppError {
        AppError::RefreshFailed {
            reason,
            auth_url: self.authorization_url(),
        }
    }

    /// Wrap `credential` so that reads through it refresh transparently.
    pub fn authenticate(&self, credential: Credential) -> AuthenticatedClient {
        AuthenticatedClient {
            manager: self.clone(),
            credential: Mutex::new(credential),
        }
    }
}

/// Credential plus the means to refresh it, used to authorize API calls.
pub struct AuthenticatedClient {
    manager: CredentialManager,
    credential: Mutex<Credential>,
}

impl AuthenticatedClient {
    pub fn http(&self) -> &reqwest::Client {
        self.manager.http()
    }

    /// Refresh the held credential in place if expired; returns a snapshot.
    pub async fn refresh_if_needed(&self) -> Result<Credential> {
        let mut guard = self.credential.lock().await;
        let refreshed = self.manager.refresh_if_needed(guard.clone()).await?;
        *guard = refreshed.clone();
        Ok(refreshed)
    }

    /// A currently valid access token.
    pub async fn bearer_token(&self) -> Result<String> {
        Ok(self.refresh_if_needed().await?.access_token)
    }

    /// Snapshot of the held credential, without refreshing.
    pub async fn credential(&self) -> Credential {
        self.credential.lock().await.clone()
    }

    pub fn into_credential(self) -> Credential {
        self.credential.into_inner()
    }
}

/// Extract a non-empty `code` query parameter from a redirect URL.
fn authorization_code(redirect_url: &str) -> Option<String> {
    let parsed = match url::Url::parse(redirect_url.trim()) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(error = %e, "Redirect URL does not parse");
            return None;
        }
    };

    parsed
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
        .filter(|code| !code.is_empty())
}

fn expiry_from_now(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    now.trunc_subsecs(0) + Duration::seconds(expires_in)
}

fn credential_from_token(token: TokenResponse, now: DateTime<Utc>) -> Credential {
    Credential {
        access_token: token.access_token,
        refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
        token_type: token
            .token_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
        expiry: expiry_from_now(now, token.expires_in),
    }
}
