// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `http_errors.rs`

use super::*;

#[test]
fn test_map_http_400() {
    let (reason, message) = map_http_error_to_reason(400);
    assert_eq!(reason, REASON_BAD_REQUEST);
    assert!(message.contains("400"));
}

#[test]
fn test_map_http_auth() {
    for code in [401, 403] {
        let (reason, message) = map_http_error_to_reason(code);
        assert_eq!(reason, REASON_AUTH_FAILED);
        assert!(message.contains(&code.to_string()));
    }
}

#[test]
fn test_map_http_404() {
    let (reason, message) = map_http_error_to_reason(404);
    assert_eq!(reason, REASON_NOT_FOUND);
    assert!(message.contains("not found"));
}

#[test]
fn test_map_http_429() {
    let (reason, _) = map_http_error_to_reason(429);
    assert_eq!(reason, REASON_THROTTLED);
}

#[test]
fn test_map_http_500() {
    let (reason, message) = map_http_error_to_reason(500);
    assert_eq!(reason, REASON_UPSTREAM_INTERNAL_ERROR);
    assert!(message.contains("500"));
}

#[test]
fn test_map_http_gateway_errors() {
    for code in [502, 503, 504] {
        let (reason, message) = map_http_error_to_reason(code);
        assert_eq!(reason, REASON_GATEWAY_ERROR);
        assert!(message.contains(&code.to_string()));
    }
}

#[test]
fn test_map_http_unknown() {
    let (reason, message) = map_http_error_to_reason(418);
    assert_eq!(reason, REASON_UNEXPECTED_STATUS);
    assert!(message.contains("418"));
}

#[test]
fn test_store_error_404_is_zone_not_found() {
    let error = store_error_from_status("Z1", "http://dns/zones/Z1", 404, "");
    assert_eq!(
        error,
        StoreError::ZoneNotFound {
            zone_id: "Z1".to_string()
        }
    );
}

#[test]
fn test_store_error_400_keeps_body() {
    let error = store_error_from_status(
        "Z1",
        "http://dns/zones/Z1/rrsets/changes",
        400,
        "values provided do not match",
    );
    assert_eq!(
        error,
        StoreError::InvalidChangeBatch {
            zone_id: "Z1".to_string(),
            reason: "values provided do not match".to_string(),
        }
    );
}

#[test]
fn test_store_error_other_status_is_http() {
    let error = store_error_from_status("Z1", "http://dns/zones/Z1", 503, "");
    match error {
        StoreError::Http {
            status_code,
            reason,
            ..
        } => {
            assert_eq!(status_code, 503);
            assert!(reason.contains("503"));
        }
        other => panic!("expected Http, got {other:?}"),
    }
    assert!(store_error_from_status("Z1", "e", 503, "").is_transient());
    assert!(!store_error_from_status("Z1", "e", 403, "").is_transient());
}
