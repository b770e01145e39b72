// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # fleet-dns - DNS records for auto scaling fleets
//!
//! fleet-dns keeps DNS records in sync with fleet membership. When an instance
//! launches it registers its address under the names configured in its tags;
//! when it terminates those records are removed again, without disturbing
//! other members sharing the same name.
//!
//! ## Modules
//!
//! - [`zone_config`] - derive per-scope zone configuration from instance tags
//! - [`ledger`] - apply A/TXT record pairs to the authoritative store
//! - [`record_set`] - record set and change batch model
//! - [`store`] - DNS store trait plus HTTP and in-memory implementations
//! - [`handler`] - lifecycle event orchestration
//! - [`lifecycle`] - lifecycle events and notification envelopes
//! - [`fleet_api`] - instance lookup and lifecycle completion over HTTP
//! - [`server`] - HTTP endpoint for notifications and metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fleet_dns::instance::{Instance, Tag};
//! use fleet_dns::ledger::RecordSetLedger;
//! use fleet_dns::store::memory::InMemoryStore;
//! use fleet_dns::zone_config::{TagKeys, Visibility, ZoneConfigResolver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::with_zones(["Z1"]));
//! let resolver = ZoneConfigResolver::new(store.clone(), TagKeys::default());
//! let ledger = RecordSetLedger::new(store);
//!
//! let instance = Instance {
//!     instance_id: "i-001".to_string(),
//!     private_ip_address: Some("10.0.0.5".to_string()),
//!     public_ip_address: None,
//!     tags: vec![
//!         Tag::new("fleet-dns:private-hosted-zone-id", "Z1"),
//!         Tag::new("fleet-dns:private-dns-records", "svc.internal.example.com"),
//!         Tag::new("fleet-dns:private-set-identifier", "g1"),
//!     ],
//! };
//!
//! if let Some(config) = resolver.load(&instance.tags, Visibility::Private).await? {
//!     ledger.upsert(&config, &instance).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod dns_errors;
pub mod fleet_api;
pub mod handler;
pub mod http_errors;
pub mod instance;
pub mod ledger;
pub mod lifecycle;
pub mod metrics;
pub mod record_set;
pub mod server;
pub mod store;
pub mod zone_config;
