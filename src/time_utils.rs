// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and query windows.

use crate::error::{AppError, QueryWindow};
use chrono::{DateTime, Days, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Local midnight of `date` in `tz`, normalized to UTC.
///
/// When midnight falls in a DST gap the earliest valid instant is used.
pub fn local_midnight_utc<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>, AppError> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            // Skip forward past the gap.
            tz.from_local_datetime(&(midnight + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("No valid local midnight for {}", date))
        })
}

/// Window from local midnight of `date` to local midnight `days` calendar
/// days later, in epoch milliseconds.
pub fn day_window<Tz: TimeZone>(date: NaiveDate, tz: &Tz, days: u64) -> Result<QueryWindow, AppError> {
    let end_date = date
        .checked_add_days(Days::new(days))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Date overflow: {} + {}d", date, days)))?;

    Ok(QueryWindow {
        start_millis: local_midnight_utc(date, tz)?.timestamp_millis(),
        end_millis: local_midnight_utc(end_date, tz)?.timestamp_millis(),
    })
}

/// Convert epoch milliseconds to a UTC timestamp.
pub fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
