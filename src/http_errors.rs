// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP status code mapping for the remote services fleet-dns talks to.
//!
//! Both the DNS store client and the fleet API client turn non-success HTTP
//! responses into typed errors through this module, so the reason codes
//! reported in logs and metrics stay consistent.
//!
//! # Usage
//!
//! ```rust
//! use fleet_dns::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(404);
//! assert_eq!(reason, "NotFound");
//!
//! let (reason, message) = map_http_error_to_reason(500);
//! assert_eq!(reason, "UpstreamInternalError");
//! ```

use crate::dns_errors::StoreError;

/// Request was malformed or rejected as invalid
pub const REASON_BAD_REQUEST: &str = "BadRequest";

/// Credentials missing or insufficient
pub const REASON_AUTH_FAILED: &str = "AuthFailed";

/// Addressed resource does not exist
pub const REASON_NOT_FOUND: &str = "NotFound";

/// Upstream is rate limiting
pub const REASON_THROTTLED: &str = "Throttled";

/// Upstream failed internally
pub const REASON_UPSTREAM_INTERNAL_ERROR: &str = "UpstreamInternalError";

/// A proxy or gateway in front of the upstream failed
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// Anything else
pub const REASON_UNEXPECTED_STATUS: &str = "UnexpectedStatus";

/// Map HTTP status code to a reason code and message.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `BadRequest` | Invalid request or rejected change batch |
/// | 401 | `AuthFailed` | Authentication required |
/// | 403 | `AuthFailed` | Insufficient permissions |
/// | 404 | `NotFound` | Zone or instance not found |
/// | 429 | `Throttled` | Rate limited |
/// | 500 | `UpstreamInternalError` | Internal server error |
/// | 502-504 | `GatewayError` | Bad gateway, unavailable, timeout |
/// | Other | `UnexpectedStatus` | Unexpected error |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (REASON_BAD_REQUEST, "Invalid request (400)".into()),
        401 => (REASON_AUTH_FAILED, "Authentication required (401)".into()),
        403 => (REASON_AUTH_FAILED, "Authorization failed (403)".into()),
        404 => (REASON_NOT_FOUND, "Resource not found (404)".into()),
        429 => (REASON_THROTTLED, "Request rate exceeded (429)".into()),
        500 => (
            REASON_UPSTREAM_INTERNAL_ERROR,
            "Upstream internal error (500)".into(),
        ),
        502 => (REASON_GATEWAY_ERROR, "Bad gateway (502)".into()),
        503 => (REASON_GATEWAY_ERROR, "Service unavailable (503)".into()),
        504 => (REASON_GATEWAY_ERROR, "Gateway timeout (504)".into()),
        _ => (
            REASON_UNEXPECTED_STATUS,
            format!("Unexpected HTTP error ({status_code})"),
        ),
    }
}

/// Convert a non-success DNS store response into a [`StoreError`].
///
/// 404 means the zone is gone and 400 means the change batch was rejected;
/// everything else keeps the status code for [`StoreError::is_transient`].
#[must_use]
pub fn store_error_from_status(
    zone_id: &str,
    endpoint: &str,
    status_code: u16,
    body: &str,
) -> StoreError {
    match status_code {
        404 => StoreError::ZoneNotFound {
            zone_id: zone_id.to_string(),
        },
        400 => StoreError::InvalidChangeBatch {
            zone_id: zone_id.to_string(),
            reason: if body.is_empty() {
                map_http_error_to_reason(status_code).1
            } else {
                body.to_string()
            },
        },
        _ => {
            let (_, message) = map_http_error_to_reason(status_code);
            StoreError::Http {
                endpoint: endpoint.to_string(),
                status_code,
                reason: if body.is_empty() {
                    message
                } else {
                    format!("{message}: {body}")
                },
            }
        }
    }
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
