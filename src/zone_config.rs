// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone configuration derived from instance tags.
//!
//! Each instance may carry DNS configuration for two visibility scopes,
//! private and public, each in its own tag namespace:
//!
//! | Tag key                               | Meaning                              |
//! |---------------------------------------|--------------------------------------|
//! | `<prefix>:private-hosted-zone-id`     | zone to register the private address |
//! | `<prefix>:private-dns-records`        | comma separated record names         |
//! | `<prefix>:private-set-identifier`     | optional multi-value set identifier  |
//! | `<prefix>:public-…`                   | same keys for the public address     |
//!
//! [`ZoneConfigResolver::load`] turns those tags into a [`ZoneConfig`], or
//! nothing when the scope is not configured at all.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fleet_dns::instance::Tag;
//! use fleet_dns::store::memory::InMemoryStore;
//! use fleet_dns::zone_config::{TagKeys, Visibility, ZoneConfigResolver};
//!
//! # async fn example() {
//! let store = Arc::new(InMemoryStore::with_zones(["Z1"]));
//! let resolver = ZoneConfigResolver::new(store, TagKeys::default());
//! let tags = vec![
//!     Tag::new("fleet-dns:private-hosted-zone-id", "Z1"),
//!     Tag::new("fleet-dns:private-dns-records", "svc.internal.example.com"),
//! ];
//! let config = resolver.load(&tags, Visibility::Private).await.unwrap();
//! assert!(config.is_some());
//! # }
//! ```

use crate::constants::{
    DEFAULT_TAG_PREFIX, DNS_RECORDS_SEPARATOR, TAG_SUFFIX_DNS_RECORDS, TAG_SUFFIX_HOSTED_ZONE_ID,
    TAG_SUFFIX_SET_IDENTIFIER,
};
use crate::dns_errors::ConfigError;
use crate::instance::{find_tag_value, Tag};
use crate::store::DnsStore;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which address of an instance is published, and which tag namespace is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

impl Visibility {
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership model of the records under each name.
///
/// `Single` records have no set identifier and are owned by one instance.
/// `Grouped` records carry a set identifier and the multi-value answer flag,
/// so several instances can each own one record under the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "set_identifier", rename_all = "lowercase")]
pub enum Scope {
    Single,
    Grouped(String),
}

impl Scope {
    #[must_use]
    pub fn from_set_identifier(set_identifier: Option<&str>) -> Self {
        match set_identifier {
            Some(id) => Self::Grouped(id.to_string()),
            None => Self::Single,
        }
    }

    #[must_use]
    pub fn set_identifier(&self) -> Option<&str> {
        match self {
            Self::Single => None,
            Self::Grouped(id) => Some(id),
        }
    }

    /// Multi-value answer flag to put on records: `Some(true)` for grouped
    /// records, unset otherwise.
    #[must_use]
    pub fn multi_value_answer(&self) -> Option<bool> {
        match self {
            Self::Single => None,
            Self::Grouped(_) => Some(true),
        }
    }

    /// Whether an existing record with `set_identifier` belongs to this scope.
    #[must_use]
    pub fn matches(&self, set_identifier: Option<&str>) -> bool {
        match (self, set_identifier) {
            (Self::Single, None) => true,
            (Self::Grouped(wanted), Some(found)) => wanted == found,
            _ => false,
        }
    }
}

/// Desired DNS posture of one instance in one visibility scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneConfig {
    pub zone_id: String,
    pub record_names: Vec<String>,
    pub scope: Scope,
    pub visibility: Visibility,
}

impl ZoneConfig {
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }
}

/// Tag keys for one visibility scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeKeys {
    pub zone_id: String,
    pub records: String,
    pub set_identifier: String,
}

impl ScopeKeys {
    fn new(prefix: &str, visibility: Visibility) -> Self {
        let key = |suffix: &str| format!("{prefix}:{visibility}-{suffix}");
        Self {
            zone_id: key(TAG_SUFFIX_HOSTED_ZONE_ID),
            records: key(TAG_SUFFIX_DNS_RECORDS),
            set_identifier: key(TAG_SUFFIX_SET_IDENTIFIER),
        }
    }
}

/// Tag keys for both visibility scopes, built from a common prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagKeys {
    private: ScopeKeys,
    public: ScopeKeys,
}

impl TagKeys {
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            private: ScopeKeys::new(prefix, Visibility::Private),
            public: ScopeKeys::new(prefix, Visibility::Public),
        }
    }

    #[must_use]
    pub fn for_visibility(&self, visibility: Visibility) -> &ScopeKeys {
        match visibility {
            Visibility::Private => &self.private,
            Visibility::Public => &self.public,
        }
    }
}

impl Default for TagKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_TAG_PREFIX)
    }
}

/// Loads [`ZoneConfig`]s from instance tags.
///
/// Holds the store capability used for the zone existence check; it never
/// mutates the store.
#[derive(Clone)]
pub struct ZoneConfigResolver {
    store: Arc<dyn DnsStore>,
    keys: TagKeys,
}

impl ZoneConfigResolver {
    pub fn new(store: Arc<dyn DnsStore>, keys: TagKeys) -> Self {
        Self { store, keys }
    }

    #[must_use]
    pub fn keys(&self) -> &TagKeys {
        &self.keys
    }

    /// Load the zone configuration for `visibility` from `tags`.
    ///
    /// Returns `Ok(None)` when neither the zone identifier nor the record list
    /// tag is present. The record list is split on `,` as is: no trimming, and
    /// empty segments are kept.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Incomplete`] if only one of the two tags is present, or
    ///   the zone identifier is empty
    /// - [`ConfigError::ZoneLookupFailed`] if the zone existence check fails
    pub async fn load(
        &self,
        tags: &[Tag],
        visibility: Visibility,
    ) -> Result<Option<ZoneConfig>, ConfigError> {
        let keys = self.keys.for_visibility(visibility);

        let zone_id = find_tag_value(tags, &keys.zone_id);
        let records = find_tag_value(tags, &keys.records);
        let set_identifier = find_tag_value(tags, &keys.set_identifier);

        let (zone_id, records) = match (zone_id, records) {
            (None, None) => {
                debug!(%visibility, "No zone configuration tags present");
                return Ok(None);
            }
            (Some(zone_id), Some(records)) if !zone_id.is_empty() => (zone_id, records),
            _ => {
                return Err(ConfigError::Incomplete {
                    zone_id_key: keys.zone_id.clone(),
                    records_key: keys.records.clone(),
                });
            }
        };

        self.store
            .zone_exists(zone_id)
            .await
            .map_err(|source| ConfigError::ZoneLookupFailed {
                zone_id: zone_id.to_string(),
                source,
            })?;

        let config = ZoneConfig {
            zone_id: zone_id.to_string(),
            record_names: records
                .split(DNS_RECORDS_SEPARATOR)
                .map(str::to_string)
                .collect(),
            scope: Scope::from_set_identifier(set_identifier),
            visibility,
        };
        debug!(
            zone_id = %config.zone_id,
            records = ?config.record_names,
            set_identifier = ?config.scope.set_identifier(),
            %visibility,
            "Loaded zone configuration"
        );

        Ok(Some(config))
    }
}

#[cfg(test)]
#[path = "zone_config_tests.rs"]
mod zone_config_tests;
