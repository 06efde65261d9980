// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Every error is fatal to a run. Errors that the user can recover from by
//! re-authorizing carry the authorization URL, exposed as a typed
//! [`NextAction`] so callers can branch without parsing messages.

use crate::config::ConfigError;
use std::fmt;

/// Half-open query window `[start, end)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start_millis: i64,
    pub end_millis: i64,
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}ms, {}ms)", self.start_millis, self.end_millis)
    }
}

/// What a caller should do to recover from an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    /// Send the user to `url`, then re-run with the resulting redirect URL.
    Reauthorize { url: String },
}

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Credential store unreadable: {0}")]
    StoreUnreadable(String),

    #[error("Incomplete credential in store: {0}")]
    IncompleteCredential(String),

    #[error("Authorization code missing from redirect URL; authorize at {auth_url}")]
    MissingAuthorizationCode { auth_url: String },

    #[error("Authorization code exchange failed: {reason}; authorize again at {auth_url}")]
    ExchangeFailed { reason: String, auth_url: String },

    #[error("Token refresh failed: {reason}; authorize again at {auth_url}")]
    RefreshFailed { reason: String, auth_url: String },

    #[error("Credential store write failed: {0}")]
    StoreWriteFailed(String),

    #[error("Query for {metric} over {window} failed: {reason}")]
    RemoteQueryFailed {
        metric: &'static str,
        window: QueryWindow,
        reason: String,
    },

    #[error("No {metric} data in window {window}")]
    NoDataInWindow {
        metric: &'static str,
        window: QueryWindow,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Recovery action attached to this error, if any.
    pub fn next_action(&self) -> Option<NextAction> {
        match self {
            AppError::MissingAuthorizationCode { auth_url }
            | AppError::ExchangeFailed { auth_url, .. }
            | AppError::RefreshFailed { auth_url, .. } => Some(NextAction::Reauthorize {
                url: auth_url.clone(),
            }),
            _ => None,
        }
    }

    /// True when the run ended because a metric simply had no measurements.
    pub fn is_no_data(&self) -> bool {
        matches!(self, AppError::NoDataInWindow { .. })
    }
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, AppError>;
