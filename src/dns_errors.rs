// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for fleet DNS reconciliation.
//!
//! This module provides specialized error types for:
//! - Zone configuration derived from instance tags
//! - Record set reads and change batches against the authoritative DNS store
//! - Instance metadata lookups
//! - Lifecycle action completion and notification parsing
//!
//! No error is swallowed inside the resolver or the ledger: the first failure
//! is returned unchanged and the caller decides what to do with it.

use crate::zone_config::Visibility;
use thiserror::Error;

/// Errors raised by a [`crate::store::DnsStore`] implementation.
///
/// These represent failures reported by (or while talking to) the
/// authoritative DNS store. Resolver and ledger wrap them without altering them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Hosted zone does not exist
    #[error("Hosted zone '{zone_id}' not found")]
    ZoneNotFound {
        /// The zone identifier that was requested
        zone_id: String,
    },

    /// The store rejected a change batch (non-matching delete, malformed record)
    ///
    /// Batches are atomic: when this is returned, none of the changes were applied.
    #[error("Change batch for zone '{zone_id}' rejected: {reason}")]
    InvalidChangeBatch {
        /// The zone the batch targeted
        zone_id: String,
        /// Explanation from the store
        reason: String,
    },

    /// Store returned an unexpected HTTP status
    #[error("DNS store at {endpoint} returned HTTP {status_code}: {reason}")]
    Http {
        /// The URL that was called
        endpoint: String,
        /// HTTP status code
        status_code: u16,
        /// Response body or mapped message
        reason: String,
    },

    /// Store could not be reached
    #[error("Connection to DNS store at {endpoint} failed: {reason}")]
    Connection {
        /// The URL that was called
        endpoint: String,
        /// Reason for the connection failure
        reason: String,
    },

    /// Store response could not be decoded
    #[error("Invalid response from DNS store at {endpoint}: {reason}")]
    Decode {
        /// The URL that was called
        endpoint: String,
        /// Decoder error
        reason: String,
    },
}

/// Errors that can occur while deriving a [`crate::zone_config::ZoneConfig`] from tags.
///
/// Configuration errors are always fatal to the scope being reconciled; partial
/// configuration is never defaulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Only one of the zone identifier and record list tags is present
    #[error("both {zone_id_key} and {records_key} should be specified")]
    Incomplete {
        /// Tag key carrying the hosted zone identifier
        zone_id_key: String,
        /// Tag key carrying the record names
        records_key: String,
    },

    /// The zone named by the tags could not be verified
    #[error("Failed to look up hosted zone '{zone_id}': {source}")]
    ZoneLookupFailed {
        /// The zone identifier read from the tags
        zone_id: String,
        /// Underlying store error, unchanged
        #[source]
        source: StoreError,
    },
}

/// Errors that can occur while applying record pairs for an instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    /// No existing A record matches the name and set identifier
    #[error("Could not find A record or SetIdentifier did not match: {name} (zone '{zone_id}')")]
    RecordNotFound {
        /// The record name that was looked up
        name: String,
        /// The zone that was searched
        zone_id: String,
    },

    /// The instance has no address for the requested visibility
    #[error("Instance '{instance_id}' has no {visibility} IP address")]
    AddressUnavailable {
        /// The instance being registered
        instance_id: String,
        /// Scope whose address was required
        visibility: Visibility,
    },

    /// Listing existing record sets failed
    #[error("Failed to list record sets for '{name}' in zone '{zone_id}': {source}")]
    ListFailed {
        /// The record name that was looked up
        name: String,
        /// The zone that was searched
        zone_id: String,
        /// Underlying store error, unchanged
        #[source]
        source: StoreError,
    },

    /// The change batch was rejected or could not be sent
    #[error("Failed to change record sets in zone '{zone_id}': {source}")]
    MutationFailed {
        /// The zone the batch targeted
        zone_id: String,
        /// Underlying store error, unchanged
        #[source]
        source: StoreError,
    },
}

/// Errors returned by an [`crate::instance::InstanceLookup`].
///
/// A lookup failure is fatal to the whole reconciliation of that instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The instance does not exist (or is no longer visible)
    #[error("failed to find an EC2 instance: {instance_id}")]
    InstanceNotFound {
        /// The instance identifier from the lifecycle event
        instance_id: String,
    },

    /// The metadata service failed or returned garbage
    #[error("Failed to describe instance '{instance_id}': {reason}")]
    RequestFailed {
        /// The instance identifier from the lifecycle event
        instance_id: String,
        /// Reason for the failure
        reason: String,
    },
}

/// Errors around lifecycle notifications and their acknowledgement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Completing the lifecycle action failed
    #[error("Failed completing lifecycle action {result} for instance '{instance_id}': {reason}")]
    CompletionFailed {
        /// Instance the action was completed for
        instance_id: String,
        /// The result that was being signalled (CONTINUE or ABANDON)
        result: String,
        /// Reason for the failure
        reason: String,
    },

    /// The notification body could not be parsed
    #[error("Invalid lifecycle notification: {0}")]
    InvalidNotification(String),
}

/// Composite error type returned by the lifecycle handler.
///
/// This is the primary error type surfaced at the orchestration boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Tag derived configuration is malformed or unverifiable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Record read or change failed
    #[error(transparent)]
    Dns(#[from] DnsError),

    /// Instance metadata unavailable
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Lifecycle notification or completion failure
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl StoreError {
    /// Returns true if the store itself is unavailable rather than rejecting the request.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Http { status_code, .. } => *status_code == 429 || *status_code >= 500,
            Self::ZoneNotFound { .. } | Self::InvalidChangeBatch { .. } | Self::Decode { .. } => {
                false
            }
        }
    }
}

impl ReconcileError {
    /// Returns true if this error is transient and a higher level retry could succeed.
    ///
    /// Nothing in this crate retries; the flag is exposed for callers and metrics.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Config(ConfigError::ZoneLookupFailed { source, .. })
            | Self::Dns(DnsError::ListFailed { source, .. } | DnsError::MutationFailed { source, .. }) => {
                source.is_transient()
            }
            Self::Lookup(LookupError::RequestFailed { .. })
            | Self::Lifecycle(LifecycleError::CompletionFailed { .. }) => true,
            Self::Config(ConfigError::Incomplete { .. })
            | Self::Dns(DnsError::RecordNotFound { .. } | DnsError::AddressUnavailable { .. })
            | Self::Lookup(LookupError::InstanceNotFound { .. })
            | Self::Lifecycle(LifecycleError::InvalidNotification(_)) => false,
        }
    }

    /// Returns a stable reason code for this error, used as a metrics label.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::Incomplete { .. }) => "ConfigIncomplete",
            Self::Config(ConfigError::ZoneLookupFailed { .. }) => "ZoneLookupFailed",

            Self::Dns(DnsError::RecordNotFound { .. }) => "RecordNotFound",
            Self::Dns(DnsError::AddressUnavailable { .. }) => "AddressUnavailable",
            Self::Dns(DnsError::ListFailed { .. }) => "RecordListFailed",
            Self::Dns(DnsError::MutationFailed { .. }) => "MutationFailed",

            Self::Lookup(LookupError::InstanceNotFound { .. }) => "InstanceNotFound",
            Self::Lookup(LookupError::RequestFailed { .. }) => "InstanceLookupFailed",

            Self::Lifecycle(LifecycleError::CompletionFailed { .. }) => "LifecycleCompletionFailed",
            Self::Lifecycle(LifecycleError::InvalidNotification(_)) => "InvalidNotification",
        }
    }
}

#[cfg(test)]
#[path = "dns_errors_tests.rs"]
mod dns_errors_tests;
