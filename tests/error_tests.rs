// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fit_daily::error::{AppError, NextAction, QueryWindow};

#[test]
fn test_next_action_for_authorization_errors() {
    let err = AppError::MissingAuthorizationCode {
        auth_url: "https://idp.example/auth?state=state".to_string(),
    };
    assert_eq!(
        err.next_action(),
        Some(NextAction::Reauthorize {
            url: "https://idp.example/auth?state=state".to_string()
        })
    );

    let err = AppError::ExchangeFailed {
        reason: "HTTP 400: invalid_grant".to_string(),
        auth_url: "https://idp.example/auth".to_string(),
    };
    assert!(matches!(
        err.next_action(),
        Some(NextAction::Reauthorize { url }) if url == "https://idp.example/auth"
    ));

    let err = AppError::RefreshFailed {
        reason: "HTTP 400: invalid_grant".to_string(),
        auth_url: "https://idp.example/auth".to_string(),
    };
    assert_eq!(
        err.next_action(),
        Some(NextAction::Reauthorize {
            url: "https://idp.example/auth".to_string()
        })
    );
    assert!(err.to_string().contains("https://idp.example/auth"));
}

#[test]
fn test_no_next_action_for_other_errors() {
    assert_eq!(AppError::StoreUnreadable("gone".to_string()).next_action(), None);
    assert_eq!(
        AppError::IncompleteCredential("KEY_EXPIRY is zero".to_string()).next_action(),
        None
    );
}

#[test]
fn test_query_errors_describe_metric_and_window() {
    let window = QueryWindow {
        start_millis: 1_646_492_400_000,
        end_millis: 1_646_578_800_000,
    };

    let err = AppError::NoDataInWindow {
        metric: "weight",
        window,
    };
    assert!(err.is_no_data());
    assert_eq!(
        err.to_string(),
        "No weight data in window [1646492400000ms, 1646578800000ms)"
    );

    let err = AppError::RemoteQueryFailed {
        metric: "step count",
        window,
        reason: "HTTP 500".to_string(),
    };
    assert!(!err.is_no_data());
    assert!(err.to_string().starts_with("Query for step count over [1646492400000ms"));
}
