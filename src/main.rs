// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! fit-daily CLI
//!
//! Prints one day of Google Fit metrics. On first use (or when the stored
//! credential is unusable) it prints an authorization URL; re-run with
//! `--redirect-url` set to the URL the browser was redirected to.

use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::Parser;
use fit_daily::{
    config::Config,
    error::{AppError, NextAction},
    models::{metrics::format_hms, DailyMetrics},
    services::{run_daily, CredentialManager, FitnessClient, RunOutcome, ZonedDate},
    store::{file::DEFAULT_CACHE_FILE, FileStore},
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "fit-daily", version, about = "Fetch a day of Google Fit health metrics")]
struct Args {
    /// URL the provider redirected to after consent (contains `code`)
    #[arg(long = "redirect-url", alias = "redirect_url")]
    redirect_url: Option<String>,

    /// Calendar date to query, YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// IANA time zone the date is interpreted in
    #[arg(long, default_value = "Asia/Tokyo")]
    timezone: Tz,

    /// Credential cache file
    #[arg(long, default_value = DEFAULT_CACHE_FILE)]
    cache_file: PathBuf,

    /// OAuth app configuration file
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(NextAction::Reauthorize { url }) = e.next_action() {
                println!("Require authenticate.\nAuthCodeURL: {}", url);
            }
            tracing::error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, AppError> {
    let config = load_config(&args.env_file)?;
    let fitness = FitnessClient::new(config.fitness_api_url.clone());
    let manager = CredentialManager::new(config);
    let store = FileStore::new(&args.cache_file);

    let day = match args.date {
        Some(date) => ZonedDate::new(date, args.timezone),
        None => ZonedDate::today(args.timezone),
    };

    let outcome = run_daily(
        &manager,
        &fitness,
        &store,
        args.redirect_url.as_deref(),
        day,
    )
    .await?;

    match outcome {
        RunOutcome::Fetched(metrics) => print_metrics(&metrics),
        RunOutcome::NeedsAuthorization { url } => {
            tracing::info!(path = %store.path().display(), "Authorization required");
            println!("redirect_url is empty.\nRequire authenticate.\nAuthCodeURL: {}", url);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn load_config(env_file: &Path) -> Result<Config, AppError> {
    if env_file.exists() {
        Ok(Config::from_env_file(env_file)?)
    } else {
        tracing::debug!(path = %env_file.display(), "Env file not found, using process environment");
        Ok(Config::from_env()?)
    }
}

fn print_metrics(metrics: &DailyMetrics) {
    println!("Date: {}", metrics.date);
    println!("Step: {}", metrics.steps);
    match metrics.sleep {
        Some(sleep) => println!("Sleep: {}", format_hms(sleep)),
        None => println!("Sleep: no data"),
    }
    print_measurement("Weight", metrics.weight_kg);
    print_measurement("Heart Rate", metrics.heart_rate_bpm);
    print_measurement("Body Temperature", metrics.body_temperature_c);
}

fn print_measurement(label: &str, value: Option<f64>) {
    match value {
        Some(v) => println!("{}: {:.2}", label, v),
        None => println!("{}: no data", label),
    }
}

/// Initialize logging to stderr; `LOG_FORMAT=json` selects structured JSON.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fit_daily=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }
}
