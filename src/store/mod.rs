// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Authoritative DNS store access.
//!
//! The [`DnsStore`] trait is the capability both the zone configuration
//! resolver and the record set ledger are built with. There is no ambient
//! client: callers construct a store once and hand an `Arc<dyn DnsStore>` to
//! each component.
//!
//! Implementations:
//! - [`http::HttpDnsStore`] - JSON hosted-zone API over HTTP
//! - [`memory::InMemoryStore`] - in-process store with the same batch semantics,
//!   used for dry runs and tests

pub mod http;
pub mod memory;

use crate::dns_errors::StoreError;
use crate::record_set::{Change, RecordType, ResourceRecordSet};
use async_trait::async_trait;

/// Read and change access to hosted zones.
#[async_trait]
pub trait DnsStore: Send + Sync {
    /// Succeeds if `zone_id` names an existing hosted zone.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ZoneNotFound`] for unknown zones, or a transport error.
    async fn zone_exists(&self, zone_id: &str) -> Result<(), StoreError>;

    /// List record sets in `zone_id`, starting at `start_name`/`start_type`.
    ///
    /// The listing is ordered and may include record sets with other names
    /// following the start position; callers filter for the exact name.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the zone is unknown or the store fails.
    async fn list_record_sets(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: RecordType,
    ) -> Result<Vec<ResourceRecordSet>, StoreError>;

    /// Apply `changes` to `zone_id` as one atomic batch.
    ///
    /// Either every change is applied or none is.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidChangeBatch`] if any change is rejected, or a
    /// transport error.
    async fn change_record_sets(&self, zone_id: &str, changes: Vec<Change>)
        -> Result<(), StoreError>;
}
