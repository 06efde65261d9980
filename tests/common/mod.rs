// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Duration, SubsecRound, Utc};
use fit_daily::config::Config;
use fit_daily::models::Credential;
use fit_daily::services::CredentialManager;
use fit_daily::store::{Entries, KeyValueStore, MemoryStore, StoreError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config whose OAuth and Fitness endpoints point at `server`.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> Config {
    Config {
        auth_url: format!("{}/o/oauth2/auth", server.uri()),
        token_url: format!("{}/token", server.uri()),
        fitness_api_url: format!("{}/fitness/v1", server.uri()),
        ..Config::test_default()
    }
}

#[allow(dead_code)]
pub fn test_manager(server: &MockServer) -> CredentialManager {
    CredentialManager::new(test_config(server))
}

/// Complete credential expiring at `expiry`.
#[allow(dead_code)]
pub fn credential(access_token: &str, expiry: DateTime<Utc>) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh-token".to_string()),
        token_type: "Bearer".to_string(),
        expiry: expiry.trunc_subsecs(0),
    }
}

#[allow(dead_code)]
pub fn valid_credential(access_token: &str) -> Credential {
    credential(access_token, Utc::now() + Duration::hours(1))
}

#[allow(dead_code)]
pub fn expired_credential(access_token: &str) -> Credential {
    credential(access_token, Utc::now() - Duration::hours(1))
}

/// Mount a token endpoint that accepts one refresh and issues `access_token`.
#[allow(dead_code)]
pub async fn mount_refresh(server: &MockServer, access_token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "expires_in": 3599,
            "token_type": "Bearer",
            "scope": "https://www.googleapis.com/auth/fitness.activity.read"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// [`MemoryStore`] that counts how many times it was saved.
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    saves: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for CountingStore {
    fn load(&self) -> Result<Entries, StoreError> {
        self.inner.load()
    }

    fn save(&self, entries: &Entries) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(entries)
    }
}
