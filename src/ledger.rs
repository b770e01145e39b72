// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record pair registration and removal for fleet members.
//!
//! For every name in a [`ZoneConfig`] an instance owns one [`RecordPair`]:
//! an A record with its address and a TXT record with its quoted instance
//! identifier. Members sharing a name are told apart by the set identifier of
//! a [`Scope::Grouped`] configuration, so removing one member never touches
//! another member's records.
//!
//! # Architecture
//!
//! 1. `upsert` builds the desired pair for every name and submits all of them
//!    as one `UPSERT` batch (all-or-nothing per call)
//! 2. `delete` reads the current A record for every name, because the store
//!    only deletes on an exact content match, then submits one `DELETE` batch
//! 3. Any store failure is returned unchanged; nothing is retried or rolled back
//!
//! [`Scope::Grouped`]: crate::zone_config::Scope::Grouped
//! [`Scope`]: crate::zone_config::Scope

use crate::dns_errors::DnsError;
use crate::instance::Instance;
use crate::metrics;
use crate::record_set::{Change, ChangeAction, RecordPair, RecordType, ResourceRecordSet};
use crate::store::DnsStore;
use crate::zone_config::ZoneConfig;
use std::sync::Arc;
use tracing::{debug, info};

/// Applies record pair changes to the authoritative store.
#[derive(Clone)]
pub struct RecordSetLedger {
    store: Arc<dyn DnsStore>,
}

impl RecordSetLedger {
    pub fn new(store: Arc<dyn DnsStore>) -> Self {
        Self { store }
    }

    /// Register `instance` under every name of `config`.
    ///
    /// # Errors
    ///
    /// - [`DnsError::AddressUnavailable`] if the instance has no address for the
    ///   configured visibility (nothing is sent)
    /// - [`DnsError::MutationFailed`] if the store rejects or fails the batch
    pub async fn upsert(&self, config: &ZoneConfig, instance: &Instance) -> Result<(), DnsError> {
        let address = instance.address_for(config.visibility).ok_or_else(|| {
            DnsError::AddressUnavailable {
                instance_id: instance.instance_id.clone(),
                visibility: config.visibility,
            }
        })?;

        let changes: Vec<Change> = config
            .record_names
            .iter()
            .flat_map(|name| {
                RecordPair::desired(name, &config.scope, &instance.instance_id, address)
                    .into_changes(ChangeAction::Upsert)
            })
            .collect();

        self.submit(config, changes).await?;

        info!(
            zone_id = %config.zone_id,
            instance_id = %instance.instance_id,
            address,
            records = ?config.record_names,
            set_identifier = ?config.scope.set_identifier(),
            "Upserted record sets"
        );
        Ok(())
    }

    /// Remove `instance`'s record pairs under every name of `config`.
    ///
    /// The TXT half is rebuilt from `instance`'s identifier without checking the
    /// stored marker; if another instance's identifier is stored the store
    /// rejects the batch and the error is returned.
    ///
    /// # Errors
    ///
    /// - [`DnsError::RecordNotFound`] if a name has no A record in this scope
    ///   (nothing is sent)
    /// - [`DnsError::ListFailed`] if reading the current records fails
    /// - [`DnsError::MutationFailed`] if the store rejects or fails the batch
    pub async fn delete(&self, config: &ZoneConfig, instance: &Instance) -> Result<(), DnsError> {
        let mut changes = Vec::with_capacity(config.record_names.len() * 2);
        for name in &config.record_names {
            let existing = self.find_address_record_set(config, name).await?;
            changes.extend(
                RecordPair::existing(existing, &config.scope, &instance.instance_id)
                    .into_changes(ChangeAction::Delete),
            );
        }

        self.submit(config, changes).await?;

        info!(
            zone_id = %config.zone_id,
            instance_id = %instance.instance_id,
            records = ?config.record_names,
            set_identifier = ?config.scope.set_identifier(),
            "Deleted record sets"
        );
        Ok(())
    }

    /// Find the A record set stored under `name` that belongs to `config`'s scope.
    ///
    /// A single-owner scope matches the record without a set identifier; a
    /// grouped scope matches the record with exactly its set identifier.
    async fn find_address_record_set(
        &self,
        config: &ZoneConfig,
        name: &str,
    ) -> Result<ResourceRecordSet, DnsError> {
        let record_sets = self
            .store
            .list_record_sets(&config.zone_id, name, RecordType::A)
            .await
            .map_err(|source| DnsError::ListFailed {
                name: name.to_string(),
                zone_id: config.zone_id.clone(),
                source,
            })?;

        debug!(
            zone_id = %config.zone_id,
            name,
            candidates = record_sets.len(),
            "Listed existing record sets"
        );

        record_sets
            .into_iter()
            .find(|record_set| {
                record_set.record_type == RecordType::A
                    && record_set.has_name(name)
                    && config.scope.matches(record_set.set_identifier.as_deref())
            })
            .ok_or_else(|| DnsError::RecordNotFound {
                name: name.to_string(),
                zone_id: config.zone_id.clone(),
            })
    }

    async fn submit(&self, config: &ZoneConfig, changes: Vec<Change>) -> Result<(), DnsError> {
        let applied: Vec<_> = changes
            .iter()
            .map(|change| (change.action, change.resource_record_set.record_type))
            .collect();

        self.store
            .change_record_sets(&config.zone_id, changes)
            .await
            .map_err(|source| DnsError::MutationFailed {
                zone_id: config.zone_id.clone(),
                source,
            })?;

        for (action, record_type) in applied {
            metrics::record_change(action, record_type);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod ledger_tests;
