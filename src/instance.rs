// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fleet instance metadata as consumed by the reconciler.
//!
//! Instances are owned by the fleet; this crate only reads them. The
//! [`InstanceLookup`] trait is the seam to whatever metadata service
//! describes an instance (see [`crate::fleet_api`] for the HTTP client).

use crate::dns_errors::LookupError;
use crate::zone_config::Visibility;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single key/value tag attached to an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A fleet member as described by the metadata service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub instance_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<String>,

    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Instance {
    /// Returns the value of the first tag with `key`, if any.
    #[must_use]
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        find_tag_value(&self.tags, key)
    }

    /// Returns the address to publish for `visibility`.
    #[must_use]
    pub fn address_for(&self, visibility: Visibility) -> Option<&str> {
        match visibility {
            Visibility::Private => self.private_ip_address.as_deref(),
            Visibility::Public => self.public_ip_address.as_deref(),
        }
    }
}

/// Returns the value of the first tag in `tags` whose key equals `key`.
#[must_use]
pub fn find_tag_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.key == key)
        .map(|tag| tag.value.as_str())
}

/// Describes fleet instances by identifier.
#[async_trait]
pub trait InstanceLookup: Send + Sync {
    /// Fetch the current metadata of `instance_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InstanceNotFound`] when the instance is unknown and
    /// [`LookupError::RequestFailed`] when the metadata service fails.
    async fn describe(&self, instance_id: &str) -> Result<Instance, LookupError>;
}
