// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One run of the daily fetch: obtain a credential, query the five
//! metrics, persist the credential.

use crate::error::Result;
use crate::models::DailyMetrics;
use crate::services::credentials::{persist_credential, CredentialManager, Startup};
use crate::services::fitness::{FitnessClient, ZonedDate};
use crate::store::KeyValueStore;

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No usable credential and no redirect URL; send the user to `url`.
    NeedsAuthorization { url: String },
    Fetched(DailyMetrics),
}

/// Fetch the metrics for `day`, authorizing with the credential in `store`
/// or the one obtained from `redirect_url`.
///
/// Once a credential is valid it is saved exactly once, after every query
/// has settled, even if a query failed. The query error takes precedence
/// over a save error.
pub async fn run_daily<S: KeyValueStore>(
    manager: &CredentialManager,
    fitness: &FitnessClient,
    store: &S,
    redirect_url: Option<&str>,
    day: ZonedDate,
) -> Result<RunOutcome> {
    let auth = match manager.obtain(store, redirect_url).await? {
        Startup::Ready(auth) => auth,
        Startup::NeedsAuthorization { url } => {
            return Ok(RunOutcome::NeedsAuthorization { url });
        }
    };

    tracing::info!(date = %day.date, tz = %day.tz, "Fetching daily metrics");
    let fetched = fitness.fetch_daily_metrics(&auth, day).await;

    let persisted = persist_credential(store, &auth.credential().await);

    match (fetched, persisted) {
        (Ok(metrics), Ok(())) => Ok(RunOutcome::Fetched(metrics)),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), persisted) => {
            if let Err(pe) = persisted {
                tracing::error!(error = %pe, "Credential not persisted");
            }
            Err(e)
        }
    }
}
