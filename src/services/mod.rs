// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - OAuth, credential lifecycle and fitness queries.

pub mod credentials;
pub mod daily;
pub mod fitness;
pub mod oauth;

pub use credentials::{
    persist_credential, restore_credential, AuthenticatedClient, CredentialManager, Startup,
};
pub use daily::{run_daily, RunOutcome};
pub use fitness::{FitnessClient, ZonedDate};
pub use oauth::{build_authorization_url, OAuthClient};
