// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record set model shared by the ledger and the DNS stores.
//!
//! The wire shape mirrors a hosted-zone API: record sets are identified by
//! name, type and optional set identifier, and are changed in atomic batches
//! of `UPSERT`/`DELETE` actions.

use crate::constants::{RECORD_TTL_SECS, RECORD_TYPE_A, RECORD_TYPE_TXT};
use crate::zone_config::Scope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record types managed by fleet-dns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    A,
    #[serde(rename = "TXT")]
    Txt,
}

impl RecordType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => RECORD_TYPE_A,
            Self::Txt => RECORD_TYPE_TXT,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value of a record set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRecord {
    pub value: String,
}

impl ResourceRecord {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// A record set as stored in a hosted zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRecordSet {
    pub name: String,

    #[serde(rename = "Type")]
    pub record_type: RecordType,

    #[serde(rename = "TTL")]
    pub ttl: i64,

    #[serde(default)]
    pub resource_records: Vec<ResourceRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_value_answer: Option<bool>,
}

impl ResourceRecordSet {
    /// Whether this set is named `name`, ignoring a trailing root dot and ASCII case.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(name)
    }
}

/// Canonical form of a record name used for comparisons.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// Action applied to a record set within a change batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Insert the record set, or replace the one with the same name/type/set identifier
    Upsert,
    /// Remove the record set; the submitted content must match the stored one exactly
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upsert => "UPSERT",
            Self::Delete => "DELETE",
        })
    }
}

/// One entry of a change batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Change {
    pub action: ChangeAction,
    pub resource_record_set: ResourceRecordSet,
}

/// TXT value recording which instance owns a record pair.
#[must_use]
pub fn owner_marker(instance_id: &str) -> String {
    format!("\"{instance_id}\"")
}

/// The A record and its TXT ownership marker for one name.
///
/// The two halves share name, TTL, set identifier and multi-value flag, and
/// are only ever submitted together through [`RecordPair::into_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPair {
    address: ResourceRecordSet,
    marker: ResourceRecordSet,
}

impl RecordPair {
    /// Pair for registering `address` under `name` on behalf of `instance_id`.
    #[must_use]
    pub fn desired(name: &str, scope: &Scope, instance_id: &str, address: &str) -> Self {
        Self {
            address: scoped_record_set(
                name,
                RecordType::A,
                scope,
                vec![ResourceRecord::new(address)],
            ),
            marker: Self::marker_for(name, scope, instance_id),
        }
    }

    /// Pair matching what is currently stored: the existing A record set as
    /// read from the store, plus the marker this instance would have written.
    #[must_use]
    pub fn existing(address: ResourceRecordSet, scope: &Scope, instance_id: &str) -> Self {
        let marker = Self::marker_for(&address.name, scope, instance_id);
        Self { address, marker }
    }

    fn marker_for(name: &str, scope: &Scope, instance_id: &str) -> ResourceRecordSet {
        scoped_record_set(
            name,
            RecordType::Txt,
            scope,
            vec![ResourceRecord::new(owner_marker(instance_id))],
        )
    }

    #[must_use]
    pub fn address(&self) -> &ResourceRecordSet {
        &self.address
    }

    #[must_use]
    pub fn marker(&self) -> &ResourceRecordSet {
        &self.marker
    }

    /// Both halves as changes with the same `action`, marker first.
    #[must_use]
    pub fn into_changes(self, action: ChangeAction) -> [Change; 2] {
        [
            Change {
                action,
                resource_record_set: self.marker,
            },
            Change {
                action,
                resource_record_set: self.address,
            },
        ]
    }
}

fn scoped_record_set(
    name: &str,
    record_type: RecordType,
    scope: &Scope,
    resource_records: Vec<ResourceRecord>,
) -> ResourceRecordSet {
    ResourceRecordSet {
        name: name.to_string(),
        record_type,
        ttl: RECORD_TTL_SECS,
        resource_records,
        set_identifier: scope.set_identifier().map(str::to_string),
        multi_value_answer: scope.multi_value_answer(),
    }
}

#[cfg(test)]
#[path = "record_set_tests.rs"]
mod record_set_tests;
