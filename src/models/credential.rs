// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth2 credential model and its flat key-value form.

use crate::error::AppError;
use crate::store::{keys, Entries};
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Tokens this close to expiry are treated as already expired.
pub const EXPIRY_DELTA_SECS: i64 = 10;

/// OAuth2 access/refresh token bundle.
///
/// Expiry is kept at whole-second resolution, matching what the store can
/// represent.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Short-lived bearer token
    pub access_token: String,
    /// Long-lived refresh token (absent if the provider did not issue one)
    pub refresh_token: Option<String>,
    /// Token type, normally "Bearer"
    pub token_type: String,
    /// When the access token expires
    pub expiry: DateTime<Utc>,
}

impl Credential {
    /// Whether the access token is expired (or about to be) at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_DELTA_SECS) >= self.expiry
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Rebuild a credential from store entries.
    ///
    /// All four keys must be present and non-empty and the expiry must be a
    /// non-zero integer; anything else is treated as no credential at all.
    pub fn from_entries(entries: &Entries) -> Result<Self, AppError> {
        let access_token = required(entries, keys::ACCESS_TOKEN)?;
        let refresh_token = required(entries, keys::REFRESH_TOKEN)?;
        let token_type = required(entries, keys::TOKEN_TYPE)?;
        let expiry_secs: i64 = required(entries, keys::EXPIRY)?.parse().map_err(|e| {
            AppError::IncompleteCredential(format!("{} is not an integer: {}", keys::EXPIRY, e))
        })?;

        if expiry_secs == 0 {
            return Err(AppError::IncompleteCredential(format!(
                "{} is zero",
                keys::EXPIRY
            )));
        }

        let expiry = DateTime::from_timestamp(expiry_secs, 0).ok_or_else(|| {
            AppError::IncompleteCredential(format!("{} out of range: {}", keys::EXPIRY, expiry_secs))
        })?;

        Ok(Self {
            access_token: access_token.to_string(),
            refresh_token: Some(refresh_token.to_string()),
            token_type: token_type.to_string(),
            expiry,
        })
    }

    /// Flatten into store entries, expiry as Unix seconds.
    pub fn to_entries(&self) -> Entries {
        let mut entries = Entries::new();
        entries.insert(keys::ACCESS_TOKEN.to_string(), self.access_token.clone());
        entries.insert(
            keys::REFRESH_TOKEN.to_string(),
            self.refresh_token.clone().unwrap_or_default(),
        );
        entries.insert(keys::TOKEN_TYPE.to_string(), self.token_type.clone());
        entries.insert(keys::EXPIRY.to_string(), self.expiry.timestamp().to_string());
        entries
    }
}

fn required<'a>(entries: &'a Entries, key: &'static str) -> Result<&'a str, AppError> {
    match entries.get(key).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::IncompleteCredential(format!(
            "{} is missing or empty",
            key
        ))),
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("expiry", &self.expiry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Entries {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete() -> Entries {
        entries(&[
            (keys::ACCESS_TOKEN, "access"),
            (keys::REFRESH_TOKEN, "refresh"),
            (keys::TOKEN_TYPE, "Bearer"),
            (keys::EXPIRY, "1646492400"),
        ])
    }

    #[test]
    fn test_from_entries_complete() {
        let cred = Credential::from_entries(&complete()).unwrap();
        assert_eq!(cred.access_token, "access");
        assert_eq!(cred.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(cred.token_type, "Bearer");
        assert_eq!(cred.expiry.timestamp(), 1_646_492_400);
    }

    #[test]
    fn test_each_missing_key_is_incomplete() {
        for key in [
            keys::ACCESS_TOKEN,
            keys::REFRESH_TOKEN,
            keys::TOKEN_TYPE,
            keys::EXPIRY,
        ] {
            let mut e = complete();
            e.remove(key);
            let err = Credential::from_entries(&e).unwrap_err();
            assert!(
                matches!(err, AppError::IncompleteCredential(_)),
                "removing {} gave {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_empty_value_and_zero_expiry_are_incomplete() {
        let mut e = complete();
        e.insert(keys::TOKEN_TYPE.to_string(), String::new());
        assert!(matches!(
            Credential::from_entries(&e),
            Err(AppError::IncompleteCredential(_))
        ));

        let mut e = complete();
        e.insert(keys::EXPIRY.to_string(), "0".to_string());
        assert!(matches!(
            Credential::from_entries(&e),
            Err(AppError::IncompleteCredential(_))
        ));

        let mut e = complete();
        e.insert(keys::EXPIRY.to_string(), "soon".to_string());
        assert!(matches!(
            Credential::from_entries(&e),
            Err(AppError::IncompleteCredential(_))
        ));
    }

    #[test]
    fn test_expiry_delta() {
        let now = Utc::now();
        let mut cred = Credential::from_entries(&complete()).unwrap();

        cred.expiry = now + Duration::seconds(EXPIRY_DELTA_SECS - 1);
        assert!(cred.is_expired_at(now));

        cred.expiry = now + Duration::seconds(EXPIRY_DELTA_SECS + 60);
        assert!(!cred.is_expired_at(now));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let cred = Credential::from_entries(&complete()).unwrap();
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("access\""));
        assert!(!debug.contains("refresh\""));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_to_entries_matches_store_layout() {
        let cred = Credential::from_entries(&complete()).unwrap();
        assert_eq!(cred.to_entries(), complete());
    }
}
