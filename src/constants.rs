// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for fleet-dns.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Record Constants
// ============================================================================

/// TTL applied to every A and TXT record managed for a fleet member (seconds)
pub const RECORD_TTL_SECS: i64 = 10;

/// Record type of the address half of a record pair
pub const RECORD_TYPE_A: &str = "A";

/// Record type of the ownership marker half of a record pair
pub const RECORD_TYPE_TXT: &str = "TXT";

// ============================================================================
// Instance Tag Constants
// ============================================================================

/// Default prefix for the instance tags that carry DNS configuration
pub const DEFAULT_TAG_PREFIX: &str = "fleet-dns";

/// Tag key suffix for the hosted zone identifier
pub const TAG_SUFFIX_HOSTED_ZONE_ID: &str = "hosted-zone-id";

/// Tag key suffix for the comma separated record names
pub const TAG_SUFFIX_DNS_RECORDS: &str = "dns-records";

/// Tag key suffix for the set identifier shared by multi-value members
pub const TAG_SUFFIX_SET_IDENTIFIER: &str = "set-identifier";

/// Separator between record names in the record list tag
pub const DNS_RECORDS_SEPARATOR: char = ',';

// ============================================================================
// Lifecycle Constants
// ============================================================================

/// Lifecycle transition sent when an instance is joining the fleet
pub const TRANSITION_LAUNCHING: &str = "autoscaling:EC2_INSTANCE_LAUNCHING";

/// Lifecycle transition sent when an instance is leaving the fleet
pub const TRANSITION_TERMINATING: &str = "autoscaling:EC2_INSTANCE_TERMINATING";

/// Lifecycle action result that lets the transition proceed
pub const LIFECYCLE_RESULT_CONTINUE: &str = "CONTINUE";

/// Lifecycle action result that aborts the transition
pub const LIFECYCLE_RESULT_ABANDON: &str = "ABANDON";

/// SNS envelope type for a regular notification
pub const SNS_TYPE_NOTIFICATION: &str = "Notification";

/// SNS envelope type for a subscription handshake
pub const SNS_TYPE_SUBSCRIPTION_CONFIRMATION: &str = "SubscriptionConfirmation";

// ============================================================================
// HTTP Server Constants
// ============================================================================

/// Default bind address for the notification server
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Path receiving lifecycle notifications
pub const EVENTS_SERVER_PATH: &str = "/events";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for liveness probes
pub const HEALTH_SERVER_PATH: &str = "/healthz";

/// Query parameter carrying the events token when the publisher cannot set headers
pub const EVENTS_TOKEN_QUERY_PARAM: &str = "token";

/// Host label every SNS endpoint starts with (`sns.<region>.amazonaws.com`)
pub const SNS_HOST_PREFIX: &str = "sns.";

/// Domains SNS subscription URLs may live under
pub const SNS_HOST_SUFFIXES: &[&str] = &[".amazonaws.com", ".amazonaws.com.cn"];

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Default log level when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";
