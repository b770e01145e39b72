// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lifecycle event handling.
//!
//! Ties the pieces together for one lifecycle event:
//! 1. Describe the instance named by the event
//! 2. Resolve its private and public [`ZoneConfig`]s from its tags
//! 3. Upsert (launching) or delete (terminating) its record pairs in each zone
//! 4. Complete the lifecycle action
//!
//! A failed launch is completed with `ABANDON` so the instance never joins
//! the fleet without its records. A failed termination is still completed
//! with `CONTINUE`, so removal from the fleet is never blocked, and the
//! error is returned afterwards.

use crate::dns_errors::{ConfigError, ReconcileError};
use crate::instance::{Instance, InstanceLookup};
use crate::ledger::RecordSetLedger;
use crate::lifecycle::{
    LifecycleActionResult, LifecycleCompleter, LifecycleEvent, LifecycleTransition,
};
use crate::metrics;
use crate::store::DnsStore;
use crate::zone_config::{TagKeys, Visibility, ZoneConfig, ZoneConfigResolver};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// What happened to a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The transition is not one fleet-dns handles; nothing was done
    Ignored { transition: String },
    /// Records were reconciled and the action completed with this result
    Completed(LifecycleActionResult),
}

/// Reconciles DNS records for lifecycle events.
#[derive(Clone)]
pub struct LifecycleHandler {
    lookup: Arc<dyn InstanceLookup>,
    completer: Arc<dyn LifecycleCompleter>,
    resolver: ZoneConfigResolver,
    ledger: RecordSetLedger,
}

impl LifecycleHandler {
    pub fn new(
        store: Arc<dyn DnsStore>,
        lookup: Arc<dyn InstanceLookup>,
        completer: Arc<dyn LifecycleCompleter>,
        keys: TagKeys,
    ) -> Self {
        Self {
            lookup,
            completer,
            resolver: ZoneConfigResolver::new(store.clone(), keys),
            ledger: RecordSetLedger::new(store),
        }
    }

    /// Handle one lifecycle event end to end.
    ///
    /// # Errors
    ///
    /// Returns the reconciliation error for failed launches (after abandoning)
    /// and failed terminations (after continuing), or the completion error if
    /// the lifecycle action could not be completed.
    pub async fn handle(&self, event: &LifecycleEvent) -> Result<HandleOutcome, ReconcileError> {
        let Some(transition) = event.transition() else {
            info!(
                transition = %event.lifecycle_transition,
                "The event does not contain supported LifecycleTransition, ignoring"
            );
            metrics::record_lifecycle_event("unsupported", "ignored");
            return Ok(HandleOutcome::Ignored {
                transition: event.lifecycle_transition.clone(),
            });
        };

        info!(
            instance_id = %event.ec2_instance_id,
            group = %event.auto_scaling_group_name,
            hook = %event.lifecycle_hook_name,
            transition = %transition,
            "Handling lifecycle event"
        );

        let start = Instant::now();
        let result = self.reconcile(event, transition).await;
        metrics::record_reconciliation(transition.label(), start.elapsed(), result.is_ok());

        if let Err(e) = &result {
            metrics::record_error(e.status_reason());
        }

        if transition == LifecycleTransition::Launching {
            if let Err(e) = result {
                error!(
                    instance_id = %event.ec2_instance_id,
                    error = %e,
                    "Launch reconciliation failed, abandoning lifecycle action"
                );
                if let Err(completion) = self
                    .completer
                    .complete(event, LifecycleActionResult::Abandon)
                    .await
                {
                    error!(error = %completion, "Failed to abandon lifecycle action");
                }
                metrics::record_lifecycle_event(transition.label(), "abandon");
                return Err(e);
            }
        }

        self.completer
            .complete(event, LifecycleActionResult::Continue)
            .await?;
        metrics::record_lifecycle_event(transition.label(), "continue");

        match result {
            Ok(()) => Ok(HandleOutcome::Completed(LifecycleActionResult::Continue)),
            Err(e) => {
                warn!(
                    instance_id = %event.ec2_instance_id,
                    error = %e,
                    "Termination reconciliation failed; lifecycle action was continued"
                );
                Err(e)
            }
        }
    }

    /// Reconcile the records of the event's instance without completing the action.
    ///
    /// Configurations are applied in order (private, then public) and the first
    /// error stops the run; zones already changed stay changed.
    ///
    /// # Errors
    ///
    /// Returns the first lookup, configuration or DNS error encountered.
    pub async fn reconcile(
        &self,
        event: &LifecycleEvent,
        transition: LifecycleTransition,
    ) -> Result<(), ReconcileError> {
        let instance = self.lookup.describe(&event.ec2_instance_id).await?;
        let zone_configs = self.resolve_zone_configs(&instance).await?;

        info!(
            instance_id = %instance.instance_id,
            zone_configs = %serde_json::to_string(&zone_configs).unwrap_or_default(),
            "Resolved zone configurations"
        );

        for zone_config in &zone_configs {
            match transition {
                LifecycleTransition::Launching => {
                    debug!(zone_id = %zone_config.zone_id, "Running upsert");
                    self.ledger.upsert(zone_config, &instance).await?;
                }
                LifecycleTransition::Terminating => {
                    debug!(zone_id = %zone_config.zone_id, "Running delete");
                    self.ledger.delete(zone_config, &instance).await?;
                }
            }
        }

        Ok(())
    }

    /// Resolve the private and public configurations of `instance`, skipping
    /// scopes that are not configured.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] of either scope.
    pub async fn resolve_zone_configs(
        &self,
        instance: &Instance,
    ) -> Result<Vec<ZoneConfig>, ConfigError> {
        let mut zone_configs = Vec::with_capacity(2);
        for visibility in [Visibility::Private, Visibility::Public] {
            if let Some(zone_config) = self.resolver.load(&instance.tags, visibility).await? {
                zone_configs.push(zone_config);
            }
        }
        Ok(zone_configs)
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod handler_tests;
