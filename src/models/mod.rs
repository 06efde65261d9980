// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod credential;
pub mod fitness;
pub mod metrics;

pub use credential::Credential;
pub use fitness::{AggregateRequest, AggregateResponse, ListSessionsResponse};
pub use metrics::DailyMetrics;
