// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fleet lifecycle notifications.
//!
//! A lifecycle hook publishes a JSON event when an instance is launching or
//! terminating. The event reaches fleet-dns in one of three envelopes, all
//! accepted by [`parse_notification`]:
//!
//! - the bare event
//! - an SNS HTTP delivery (`{"Type": "Notification", "Message": "<event json>"}`)
//! - a function-style SNS batch (`{"Records": [{"Sns": {"Message": "<event json>"}}]}`)
//!
//! After reconciling, the hook is completed through a [`LifecycleCompleter`].

use crate::constants::{
    LIFECYCLE_RESULT_ABANDON, LIFECYCLE_RESULT_CONTINUE, SNS_TYPE_NOTIFICATION,
    SNS_TYPE_SUBSCRIPTION_CONFIRMATION, TRANSITION_LAUNCHING, TRANSITION_TERMINATING,
};
use crate::dns_errors::LifecycleError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle transitions fleet-dns reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleTransition {
    Launching,
    Terminating,
}

impl LifecycleTransition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Launching => TRANSITION_LAUNCHING,
            Self::Terminating => TRANSITION_TERMINATING,
        }
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Launching => "launching",
            Self::Terminating => "terminating",
        }
    }
}

impl FromStr for LifecycleTransition {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TRANSITION_LAUNCHING => Ok(Self::Launching),
            TRANSITION_TERMINATING => Ok(Self::Terminating),
            other => Err(LifecycleError::InvalidNotification(format!(
                "unsupported lifecycle transition: {other}"
            ))),
        }
    }
}

impl fmt::Display for LifecycleTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result signalled back when completing a lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleActionResult {
    Continue,
    Abandon,
}

impl LifecycleActionResult {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continue => LIFECYCLE_RESULT_CONTINUE,
            Self::Abandon => LIFECYCLE_RESULT_ABANDON,
        }
    }
}

impl fmt::Display for LifecycleActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle hook event.
///
/// Every field defaults to empty so that test notifications, which carry none
/// of them, still parse and are then ignored for their transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    #[serde(default)]
    pub lifecycle_action_token: String,

    #[serde(default)]
    pub auto_scaling_group_name: String,

    #[serde(default)]
    pub lifecycle_hook_name: String,

    #[serde(default, rename = "EC2InstanceId", alias = "EC2InstanceID")]
    pub ec2_instance_id: String,

    #[serde(default)]
    pub lifecycle_transition: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl LifecycleEvent {
    /// The transition of this event, or `None` if fleet-dns does not handle it.
    #[must_use]
    pub fn transition(&self) -> Option<LifecycleTransition> {
        self.lifecycle_transition.parse().ok()
    }
}

/// A parsed notification body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A lifecycle event to reconcile
    Event(LifecycleEvent),
    /// SNS subscription handshake; the URL must be fetched to confirm
    SubscriptionConfirmation { subscribe_url: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SnsEnvelope {
    #[serde(rename = "Type")]
    message_type: String,
    #[serde(default)]
    message: String,
    #[serde(default, rename = "SubscribeURL")]
    subscribe_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnsBatch {
    #[serde(rename = "Records")]
    records: Vec<SnsBatchRecord>,
}

#[derive(Debug, Deserialize)]
struct SnsBatchRecord {
    #[serde(rename = "Sns")]
    sns: SnsMessage,
}

#[derive(Debug, Deserialize)]
struct SnsMessage {
    #[serde(rename = "Message")]
    message: String,
}

fn invalid(reason: impl fmt::Display) -> LifecycleError {
    LifecycleError::InvalidNotification(reason.to_string())
}

fn parse_event(message: &str) -> Result<LifecycleEvent, LifecycleError> {
    serde_json::from_str(message).map_err(invalid)
}

/// Parse a notification body in any of the supported envelopes.
///
/// Only the first record of a function-style SNS batch is used.
///
/// # Errors
///
/// Returns [`LifecycleError::InvalidNotification`] if the body is not JSON, the
/// envelope is malformed, or the SNS message type is not handled.
pub fn parse_notification(body: &str) -> Result<Notification, LifecycleError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(invalid)?;

    if value.get("Records").is_some() {
        let batch: SnsBatch = serde_json::from_value(value).map_err(invalid)?;
        let record = batch
            .records
            .into_iter()
            .next()
            .ok_or_else(|| invalid("SNS batch contains no records"))?;
        return parse_event(&record.sns.message).map(Notification::Event);
    }

    if value.get("Type").is_some() {
        let envelope: SnsEnvelope = serde_json::from_value(value).map_err(invalid)?;
        return match envelope.message_type.as_str() {
            SNS_TYPE_NOTIFICATION => parse_event(&envelope.message).map(Notification::Event),
            SNS_TYPE_SUBSCRIPTION_CONFIRMATION => envelope
                .subscribe_url
                .map(|subscribe_url| Notification::SubscriptionConfirmation { subscribe_url })
                .ok_or_else(|| invalid("subscription confirmation without SubscribeURL")),
            other => Err(invalid(format!("unsupported SNS message type: {other}"))),
        };
    }

    serde_json::from_value(value)
        .map(Notification::Event)
        .map_err(invalid)
}

/// Completes lifecycle actions with the fleet orchestrator.
#[async_trait]
pub trait LifecycleCompleter: Send + Sync {
    /// Signal `result` for the lifecycle action described by `event`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::CompletionFailed`] if the orchestrator call fails.
    async fn complete(
        &self,
        event: &LifecycleEvent,
        result: LifecycleActionResult,
    ) -> Result<(), LifecycleError>;
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;
