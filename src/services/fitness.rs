// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Fit client and daily metrics fetcher.
//!
//! Every metric is one read-only query over a window starting at local
//! midnight of the requested date. Steps and sleep look at that day only;
//! weight, heart rate and body temperature look ahead five days because
//! they are measured sporadically.

use crate::error::{AppError, QueryWindow, Result};
use crate::models::fitness::{AggregateRequest, AggregateResponse, ListSessionsResponse};
use crate::models::DailyMetrics;
use crate::services::credentials::AuthenticatedClient;
use crate::time_utils::{day_window, format_utc_rfc3339, millis_to_utc};
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use serde::Deserialize;

/// Activity type code for sleep sessions.
pub const ACTIVITY_TYPE_SLEEP: i64 = 72;

const DAILY_WINDOW_DAYS: u64 = 1;
const SPARSE_WINDOW_DAYS: u64 = 5;

/// Display name used for sleep in errors and logs.
pub const SLEEP_METRIC: &str = "sleep";

/// An aggregated metric: display name, data type, and window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    pub name: &'static str,
    pub data_type_name: &'static str,
    pub window_days: u64,
}

pub const STEP_COUNT: Metric = Metric {
    name: "step count",
    data_type_name: "com.google.step_count.delta",
    window_days: DAILY_WINDOW_DAYS,
};

pub const WEIGHT: Metric = Metric {
    name: "weight",
    data_type_name: "com.google.weight",
    window_days: SPARSE_WINDOW_DAYS,
};

pub const HEART_RATE: Metric = Metric {
    name: "heart rate",
    data_type_name: "com.google.heart_rate.bpm",
    window_days: SPARSE_WINDOW_DAYS,
};

pub const BODY_TEMPERATURE: Metric = Metric {
    name: "body temperature",
    data_type_name: "com.google.body.temperature",
    window_days: SPARSE_WINDOW_DAYS,
};

/// A calendar date in a specific time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedDate {
    pub date: NaiveDate,
    pub tz: Tz,
}

impl ZonedDate {
    pub fn new(date: NaiveDate, tz: Tz) -> Self {
        Self { date, tz }
    }

    /// Today's date in `tz`.
    pub fn today(tz: Tz) -> Self {
        Self::new(chrono::Utc::now().with_timezone(&tz).date_naive(), tz)
    }

    fn window(&self, days: u64) -> Result<QueryWindow> {
        day_window(self.date, &self.tz, days)
    }
}

/// Error body from Google APIs.
#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Google Fit REST client.
#[derive(Debug, Clone)]
pub struct FitnessClient {
    base_url: String,
}

impl FitnessClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Run an aggregate query for `metric` over `window`.
    pub async fn aggregate(
        &self,
        auth: &AuthenticatedClient,
        metric: &Metric,
        window: QueryWindow,
    ) -> Result<AggregateResponse> {
        let url = format!("{}/users/me/dataset:aggregate", self.base_url);
        let body = AggregateRequest::new(
            metric.data_type_name,
            window.start_millis,
            window.end_millis,
        );

        tracing::debug!(metric = metric.name, %window, "Aggregate query");

        let access_token = auth.bearer_token().await?;
        let response = auth
            .http()
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| query_failed(metric.name, window, e.to_string()))?;

        check_response_json(response, metric.name, window).await
    }

    /// List sleep sessions overlapping `window`.
    pub async fn list_sleep_sessions(
        &self,
        auth: &AuthenticatedClient,
        window: QueryWindow,
    ) -> Result<ListSessionsResponse> {
        let url = format!("{}/users/me/sessions", self.base_url);
        let start = rfc3339_millis(window.start_millis, SLEEP_METRIC, window)?;
        let end = rfc3339_millis(window.end_millis, SLEEP_METRIC, window)?;

        tracing::debug!(metric = SLEEP_METRIC, %window, "Session list query");

        let access_token = auth.bearer_token().await?;
        let response = auth
            .http()
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("startTime", start),
                ("endTime", end),
                ("activityType", ACTIVITY_TYPE_SLEEP.to_string()),
            ])
            .send()
            .await
            .map_err(|e| query_failed(SLEEP_METRIC, window, e.to_string()))?;

        check_response_json(response, SLEEP_METRIC, window).await
    }

    /// Total steps on the date.
    ///
    /// A day with no step data yields zero rather than an error.
    pub async fn step_count(&self, auth: &AuthenticatedClient, day: ZonedDate) -> Result<i64> {
        let window = day.window(STEP_COUNT.window_days)?;
        let response = self.aggregate(auth, &STEP_COUNT, window).await?;
        Ok(response.sum_int_values())
    }

    /// Length of the first sleep session on the date.
    pub async fn sleep_duration(
        &self,
        auth: &AuthenticatedClient,
        day: ZonedDate,
    ) -> Result<Duration> {
        let window = day.window(DAILY_WINDOW_DAYS)?;
        let response = self.list_sleep_sessions(auth, window).await?;
        response.first_session_duration().ok_or(AppError::NoDataInWindow {
            metric: SLEEP_METRIC,
            window,
        })
    }

    /// First weight measurement (kg) in the five days from the date.
    pub async fn weight(&self, auth: &AuthenticatedClient, day: ZonedDate) -> Result<f64> {
        self.first_measurement(auth, &WEIGHT, day).await
    }

    /// First heart rate measurement (bpm) in the five days from the date.
    pub async fn heart_rate(&self, auth: &AuthenticatedClient, day: ZonedDate) -> Result<f64> {
        self.first_measurement(auth, &HEART_RATE, day).await
    }

    /// First body temperature measurement (°C) in the five days from the date.
    pub async fn body_temperature(
        &self,
        auth: &AuthenticatedClient,
        day: ZonedDate,
    ) -> Result<f64> {
        self.first_measurement(auth, &BODY_TEMPERATURE, day).await
    }

    async fn first_measurement(
        &self,
        auth: &AuthenticatedClient,
        metric: &Metric,
        day: ZonedDate,
    ) -> Result<f64> {
        let window = day.window(metric.window_days)?;
        let response = self.aggregate(auth, metric, window).await?;
        response.first_fp_value().ok_or(AppError::NoDataInWindow {
            metric: metric.name,
            window,
        })
    }

    /// Fetch all five metrics in order.
    ///
    /// A metric without data in its window is reported as `None`; any other
    /// error aborts the remaining queries.
    pub async fn fetch_daily_metrics(
        &self,
        auth: &AuthenticatedClient,
        day: ZonedDate,
    ) -> Result<DailyMetrics> {
        let steps = self.step_count(auth, day).await?;
        let sleep = optional(self.sleep_duration(auth, day).await)?;
        let weight_kg = optional(self.weight(auth, day).await)?;
        let heart_rate_bpm = optional(self.heart_rate(auth, day).await)?;
        let body_temperature_c = optional(self.body_temperature(auth, day).await)?;

        tracing::info!(date = %day.date, tz = %day.tz, steps, "Daily metrics fetched");

        Ok(DailyMetrics {
            date: day.date,
            steps,
            sleep,
            weight_kg,
            heart_rate_bpm,
            body_temperature_c,
        })
    }
}

fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_no_data() => {
            tracing::info!(error = %e, "No data for metric");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn query_failed(metric: &'static str, window: QueryWindow, reason: String) -> AppError {
    AppError::RemoteQueryFailed {
        metric,
        window,
        reason,
    }
}

fn rfc3339_millis(millis: i64, metric: &'static str, window: QueryWindow) -> Result<String> {
    millis_to_utc(millis)
        .map(format_utc_rfc3339)
        .ok_or_else(|| query_failed(metric, window, format!("timestamp out of range: {}", millis)))
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    metric: &'static str,
    window: QueryWindow,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .map(|e| match e.error.code {
                Some(code) => format!("{} ({})", e.error.message, code),
                None => e.error.message,
            })
            .unwrap_or(body);

        if status.as_u16() == 401 {
            tracing::warn!(metric, "Fitness API rejected access token (401)");
        }

        return Err(query_failed(
            metric,
            window,
            format!("HTTP {}: {}", status, message),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| query_failed(metric, window, format!("JSON parse error: {}", e)))
}
