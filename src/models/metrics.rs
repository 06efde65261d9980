// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily health metrics summary.

use chrono::{Duration, NaiveDate};

/// The five metrics for one calendar date.
///
/// `None` means the metric had no measurement in its query window.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    /// Total steps; a day without step data counts as zero
    pub steps: i64,
    /// Time between start and end of the first sleep session
    pub sleep: Option<Duration>,
    /// Body weight in kilograms
    pub weight_kg: Option<f64>,
    /// Heart rate in beats per minute
    pub heart_rate_bpm: Option<f64>,
    /// Body temperature in degrees Celsius
    pub body_temperature_c: Option<f64>,
}

/// Format a duration as `HH:MM:SS`.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(Duration::hours(7) + Duration::minutes(45)), "07:45:00");
        assert_eq!(format_hms(Duration::seconds(59)), "00:00:59");
        assert_eq!(format_hms(Duration::hours(26)), "26:00:00");
    }
}
