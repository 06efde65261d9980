// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! fit-daily: read one day of health metrics from Google Fit.
//!
//! This crate manages the OAuth2 credential (authorization code exchange,
//! persistence across runs, transparent refresh) and queries steps, sleep,
//! weight, heart rate and body temperature for a given date.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;
