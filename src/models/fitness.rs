// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Fit REST wire types and value extraction.
//!
//! The API encodes 64-bit integers as JSON strings; [`int64`] accepts either
//! form on input and writes strings on output.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Aggregate request body for `users/me/dataset:aggregate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub aggregate_by: Vec<AggregateBy>,
    #[serde(with = "int64")]
    pub start_time_millis: i64,
    #[serde(with = "int64")]
    pub end_time_millis: i64,
}

impl AggregateRequest {
    pub fn new(data_type_name: &str, start_time_millis: i64, end_time_millis: i64) -> Self {
        Self {
            aggregate_by: vec![AggregateBy {
                data_type_name: data_type_name.to_string(),
            }],
            start_time_millis,
            end_time_millis,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBy {
    pub data_type_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregateResponse {
    #[serde(default)]
    pub bucket: Vec<AggregateBucket>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregateBucket {
    #[serde(default)]
    pub dataset: Vec<Dataset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub point: Vec<DataPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    #[serde(default)]
    pub value: Vec<Value>,
}

/// One field of a data point; which member is set depends on the data type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(default)]
    pub int_val: Option<i64>,
    #[serde(default)]
    pub fp_val: Option<f64>,
}

impl AggregateResponse {
    /// Points of the first dataset in the first bucket, empty when absent.
    pub fn first_dataset_points(&self) -> &[DataPoint] {
        self.bucket
            .first()
            .and_then(|b| b.dataset.first())
            .map(|d| d.point.as_slice())
            .unwrap_or(&[])
    }

    /// Sum of the integer value of every point in the first dataset,
    /// saturating at the `i64` bounds.
    pub fn sum_int_values(&self) -> i64 {
        self.first_dataset_points()
            .iter()
            .filter_map(|p| p.value.first().and_then(|v| v.int_val))
            .fold(0i64, |total, v| total.saturating_add(v))
    }

    /// Floating-point value of the first point in the first dataset.
    pub fn first_fp_value(&self) -> Option<f64> {
        self.first_dataset_points()
            .first()
            .and_then(|p| p.value.first())
            .and_then(|v| v.fp_val)
    }
}

/// Response of `users/me/sessions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsResponse {
    #[serde(default)]
    pub session: Vec<Session>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(with = "int64")]
    pub start_time_millis: i64,
    #[serde(with = "int64")]
    pub end_time_millis: i64,
}

impl Session {
    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.end_time_millis - self.start_time_millis)
    }
}

impl ListSessionsResponse {
    /// Duration of the first returned session.
    pub fn first_session_duration(&self) -> Option<Duration> {
        self.session.first().map(Session::duration)
    }
}

/// Serde adapter for int64 fields sent as strings but sometimes as numbers.
pub mod int64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        Int(i64),
        String(String),
    }

    impl StringOrInt {
        fn into_i64<E: de::Error>(self) -> Result<i64, E> {
            match self {
                StringOrInt::Int(n) => Ok(n),
                StringOrInt::String(s) => s.trim().parse().map_err(E::custom),
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        StringOrInt::deserialize(deserializer)?.into_i64()
    }
}
