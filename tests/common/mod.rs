// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use fleet_dns::dns_errors::{LifecycleError, LookupError};
use fleet_dns::instance::{Instance, InstanceLookup, Tag};
use fleet_dns::lifecycle::{LifecycleActionResult, LifecycleCompleter, LifecycleEvent};
use std::collections::HashMap;
use std::sync::Mutex;

/// Instance lookup over a fixed set of instances
#[derive(Default)]
pub struct FixedFleet {
    instances: Mutex<HashMap<String, Instance>>,
}

impl FixedFleet {
    pub fn add(&self, instance: Instance) {
        self.instances
            .lock()
            .unwrap()
            .insert(instance.instance_id.clone(), instance);
    }
}

#[async_trait]
impl InstanceLookup for FixedFleet {
    async fn describe(&self, instance_id: &str) -> Result<Instance, LookupError> {
        self.instances
            .lock()
            .unwrap()
            .get(instance_id)
            .cloned()
            .ok_or_else(|| LookupError::InstanceNotFound {
                instance_id: instance_id.to_string(),
            })
    }
}

/// Completer remembering every completion it was asked for
#[derive(Default)]
pub struct CompletionLog {
    entries: Mutex<Vec<(String, LifecycleActionResult)>>,
}

impl CompletionLog {
    pub fn entries(&self) -> Vec<(String, LifecycleActionResult)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LifecycleCompleter for CompletionLog {
    async fn complete(
        &self,
        event: &LifecycleEvent,
        result: LifecycleActionResult,
    ) -> Result<(), LifecycleError> {
        self.entries
            .lock()
            .unwrap()
            .push((event.ec2_instance_id.clone(), result));
        Ok(())
    }
}

/// Instance in a grouped private record set
pub fn grouped_member(instance_id: &str, address: &str, zone_id: &str, name: &str, set_id: &str) -> Instance {
    Instance {
        instance_id: instance_id.to_string(),
        private_ip_address: Some(address.to_string()),
        public_ip_address: None,
        tags: vec![
            Tag::new("fleet-dns:private-hosted-zone-id", zone_id),
            Tag::new("fleet-dns:private-dns-records", name),
            Tag::new("fleet-dns:private-set-identifier", set_id),
        ],
    }
}

/// Lifecycle event body as published by the lifecycle hook
pub fn event_body(instance_id: &str, transition: &str) -> String {
    serde_json::json!({
        "LifecycleHookName": "dns-hook",
        "AutoScalingGroupName": "web-asg",
        "LifecycleActionToken": format!("token-{instance_id}"),
        "LifecycleTransition": transition,
        "EC2InstanceId": instance_id,
        "Time": "2024-05-01T12:00:00Z",
    })
    .to_string()
}

/// Same event wrapped in an SNS HTTP delivery
pub fn sns_delivery(instance_id: &str, transition: &str) -> String {
    serde_json::json!({
        "Type": "Notification",
        "MessageId": format!("msg-{instance_id}"),
        "Message": event_body(instance_id, transition),
    })
    .to_string()
}
