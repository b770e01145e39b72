// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP client for the fleet orchestrator API.
//!
//! Implements both collaborators the lifecycle handler needs from the fleet:
//! - [`InstanceLookup`] via `GET /instances/{id}`
//! - [`LifecycleCompleter`] via `POST /lifecycle-actions/complete`

use crate::dns_errors::{LifecycleError, LookupError};
use crate::http_errors::map_http_error_to_reason;
use crate::instance::{Instance, InstanceLookup};
use crate::lifecycle::{LifecycleActionResult, LifecycleCompleter, LifecycleEvent};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info};
use url::Url;

/// Body of a lifecycle completion request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CompleteLifecycleActionRequest<'a> {
    instance_id: &'a str,
    lifecycle_hook_name: &'a str,
    lifecycle_action_token: &'a str,
    auto_scaling_group_name: &'a str,
    lifecycle_action_result: LifecycleActionResult,
}

/// Fleet orchestrator API client.
#[derive(Debug, Clone)]
pub struct FleetApiClient {
    client: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl FleetApiClient {
    pub fn new(client: HttpClient, base_url: Url, token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            token,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Option<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
        Some(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl InstanceLookup for FleetApiClient {
    async fn describe(&self, instance_id: &str) -> Result<Instance, LookupError> {
        let failed = |reason: String| LookupError::RequestFailed {
            instance_id: instance_id.to_string(),
            reason,
        };

        let url = self
            .endpoint(&["instances", instance_id])
            .ok_or_else(|| failed(format!("invalid fleet API URL: {}", self.base_url)))?;
        debug!(url = %url, "Describing instance");

        let response = self
            .authorize(self.client.get(url.clone()))
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::InstanceNotFound {
                instance_id: instance_id.to_string(),
            });
        }
        if !status.is_success() {
            let (reason, message) = map_http_error_to_reason(status.as_u16());
            error!(url = %url, status = %status, reason, "Instance lookup failed");
            return Err(failed(message));
        }

        response
            .json::<Instance>()
            .await
            .map_err(|e| failed(format!("invalid instance document: {e}")))
    }
}

#[async_trait]
impl LifecycleCompleter for FleetApiClient {
    async fn complete(
        &self,
        event: &LifecycleEvent,
        result: LifecycleActionResult,
    ) -> Result<(), LifecycleError> {
        let failed = |reason: String| LifecycleError::CompletionFailed {
            instance_id: event.ec2_instance_id.clone(),
            result: result.to_string(),
            reason,
        };

        let url = self
            .endpoint(&["lifecycle-actions", "complete"])
            .ok_or_else(|| failed(format!("invalid fleet API URL: {}", self.base_url)))?;
        let body = CompleteLifecycleActionRequest {
            instance_id: &event.ec2_instance_id,
            lifecycle_hook_name: &event.lifecycle_hook_name,
            lifecycle_action_token: &event.lifecycle_action_token,
            auto_scaling_group_name: &event.auto_scaling_group_name,
            lifecycle_action_result: result,
        };

        let response = self
            .authorize(self.client.post(url.clone()).json(&body))
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let (reason, message) = map_http_error_to_reason(status.as_u16());
            error!(url = %url, status = %status, reason, %result, "Failed completing lifecycle action");
            return Err(failed(message));
        }

        info!(
            instance_id = %event.ec2_instance_id,
            %result,
            "Completed lifecycle action"
        );
        Ok(())
    }
}
