// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-process hosted-zone store.
//!
//! Mirrors the batch semantics of the authoritative store:
//! - record sets are keyed by name, type and set identifier
//! - `UPSERT` inserts or replaces the keyed record set
//! - `DELETE` must submit exactly the stored content, otherwise the batch is rejected
//! - a batch is validated in full before anything is committed
//!
//! Faults can be injected per operation, and every call is counted, so tests
//! can assert both outcomes and the absence of remote calls.

use super::DnsStore;
use crate::dns_errors::StoreError;
use crate::record_set::{normalize_name, Change, ChangeAction, RecordType, ResourceRecordSet};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

type RecordKey = (String, RecordType, Option<String>);
type Zone = BTreeMap<RecordKey, ResourceRecordSet>;

/// Number of calls made against an [`InMemoryStore`], by operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub zone_lookups: usize,
    pub listings: usize,
    pub change_batches: usize,
}

#[derive(Debug, Default)]
struct Faults {
    zone_lookup: Option<StoreError>,
    listing: Option<StoreError>,
    change: Option<StoreError>,
}

#[derive(Debug, Default)]
struct State {
    zones: BTreeMap<String, Zone>,
    calls: CallCounts,
    faults: Faults,
}

/// Hosted zones held in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with empty hosted zones for each of `zone_ids`.
    pub fn with_zones<I, S>(zone_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for zone_id in zone_ids {
            store.create_zone(zone_id);
        }
        store
    }

    pub fn create_zone(&self, zone_id: impl Into<String>) {
        self.lock().zones.entry(zone_id.into()).or_default();
    }

    /// Seed a record set directly, bypassing batch validation.
    pub fn insert_record_set(&self, zone_id: &str, record_set: ResourceRecordSet) {
        self.lock()
            .zones
            .entry(zone_id.to_string())
            .or_default()
            .insert(key_of(&record_set), record_set);
    }

    /// Snapshot of every record set in `zone_id`, in listing order.
    #[must_use]
    pub fn record_sets(&self, zone_id: &str) -> Vec<ResourceRecordSet> {
        self.lock()
            .zones
            .get(zone_id)
            .map(|zone| zone.values().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Make every subsequent zone existence check fail with `error`.
    pub fn fail_zone_lookups(&self, error: StoreError) {
        self.lock().faults.zone_lookup = Some(error);
    }

    /// Make every subsequent listing fail with `error`.
    pub fn fail_listings(&self, error: StoreError) {
        self.lock().faults.listing = Some(error);
    }

    /// Make every subsequent change batch fail with `error`.
    pub fn fail_changes(&self, error: StoreError) {
        self.lock().faults.change = Some(error);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn key_of(record_set: &ResourceRecordSet) -> RecordKey {
    (
        normalize_name(&record_set.name),
        record_set.record_type,
        record_set.set_identifier.clone(),
    )
}

fn same_content(stored: &ResourceRecordSet, submitted: &ResourceRecordSet) -> bool {
    let mut stored_values = stored.resource_records.clone();
    let mut submitted_values = submitted.resource_records.clone();
    stored_values.sort();
    submitted_values.sort();

    stored.ttl == submitted.ttl
        && stored.multi_value_answer == submitted.multi_value_answer
        && stored_values == submitted_values
}

fn describe(record_set: &ResourceRecordSet) -> String {
    format!(
        "[name='{}', type='{}', set-identifier='{}']",
        record_set.name,
        record_set.record_type,
        record_set.set_identifier.as_deref().unwrap_or("")
    )
}

fn apply(zone_id: &str, zone: &mut Zone, change: Change) -> Result<(), StoreError> {
    let record_set = change.resource_record_set;
    let key = key_of(&record_set);
    let reject = |reason: String| StoreError::InvalidChangeBatch {
        zone_id: zone_id.to_string(),
        reason,
    };

    match change.action {
        ChangeAction::Upsert => {
            if record_set.resource_records.is_empty() {
                return Err(reject(format!(
                    "Resource record set {} has no values",
                    describe(&record_set)
                )));
            }
            zone.insert(key, record_set);
        }
        ChangeAction::Delete => match zone.get(&key) {
            Some(stored) if same_content(stored, &record_set) => {
                zone.remove(&key);
            }
            Some(_) => {
                return Err(reject(format!(
                    "Tried to delete resource record set {} but the values provided do not match the current values",
                    describe(&record_set)
                )));
            }
            None => {
                return Err(reject(format!(
                    "Tried to delete resource record set {} but it was not found",
                    describe(&record_set)
                )));
            }
        },
    }

    Ok(())
}

#[async_trait]
impl DnsStore for InMemoryStore {
    async fn zone_exists(&self, zone_id: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.zone_lookups += 1;

        if let Some(error) = &state.faults.zone_lookup {
            return Err(error.clone());
        }
        if state.zones.contains_key(zone_id) {
            Ok(())
        } else {
            Err(StoreError::ZoneNotFound {
                zone_id: zone_id.to_string(),
            })
        }
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: RecordType,
    ) -> Result<Vec<ResourceRecordSet>, StoreError> {
        let mut state = self.lock();
        state.calls.listings += 1;

        if let Some(error) = &state.faults.listing {
            return Err(error.clone());
        }
        let zone = state
            .zones
            .get(zone_id)
            .ok_or_else(|| StoreError::ZoneNotFound {
                zone_id: zone_id.to_string(),
            })?;

        let start = (normalize_name(start_name), start_type);
        Ok(zone
            .iter()
            .filter(|((name, record_type, _), _)| (name.clone(), *record_type) >= start)
            .map(|(_, record_set)| record_set.clone())
            .collect())
    }

    async fn change_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<Change>,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.change_batches += 1;

        if let Some(error) = &state.faults.change {
            return Err(error.clone());
        }
        let zone = state
            .zones
            .get_mut(zone_id)
            .ok_or_else(|| StoreError::ZoneNotFound {
                zone_id: zone_id.to_string(),
            })?;

        let change_count = changes.len();
        let mut staged = zone.clone();
        for change in changes {
            apply(zone_id, &mut staged, change)?;
        }
        *zone = staged;

        debug!(zone_id, change_count, "Applied change batch");
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
