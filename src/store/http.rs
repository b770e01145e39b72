// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hosted-zone API client over HTTP.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Method | Path                               | Purpose                     |
//! |--------|------------------------------------|-----------------------------|
//! | GET    | `/zones/{id}`                      | zone existence check        |
//! | GET    | `/zones/{id}/rrsets?name=&type=`   | list record sets from name  |
//! | POST   | `/zones/{id}/rrsets/changes`       | apply an atomic change batch |
//!
//! Bodies use the same PascalCase shape as [`crate::record_set`]. Requests are
//! sent once; failures are returned to the caller without retrying.

use super::DnsStore;
use crate::dns_errors::StoreError;
use crate::http_errors::store_error_from_status;
use crate::record_set::{Change, RecordType, ResourceRecordSet};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListResourceRecordSetsResponse {
    #[serde(default)]
    resource_record_sets: Vec<ResourceRecordSet>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ChangeBatch<'a> {
    changes: &'a [Change],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ChangeResourceRecordSetsRequest<'a> {
    change_batch: ChangeBatch<'a>,
}

/// [`DnsStore`] backed by a hosted-zone HTTP API.
#[derive(Debug, Clone)]
pub struct HttpDnsStore {
    client: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl HttpDnsStore {
    pub fn new(client: HttpClient, base_url: Url, token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            token,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Connection {
                endpoint: self.base_url.to_string(),
                reason: "base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        zone_id: &str,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<Response, StoreError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Connection {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            url = %url,
            status = %status,
            body = %body,
            "DNS store request failed"
        );
        Err(store_error_from_status(
            zone_id,
            url.as_str(),
            status.as_u16(),
            &body,
        ))
    }
}

#[async_trait]
impl DnsStore for HttpDnsStore {
    async fn zone_exists(&self, zone_id: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&["zones", zone_id])?;
        debug!(url = %url, "Checking hosted zone");

        self.send(zone_id, &url, self.client.get(url.clone()))
            .await?;
        Ok(())
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: RecordType,
    ) -> Result<Vec<ResourceRecordSet>, StoreError> {
        let mut url = self.endpoint(&["zones", zone_id, "rrsets"])?;
        url.query_pairs_mut()
            .append_pair("name", start_name)
            .append_pair("type", start_type.as_str());
        debug!(url = %url, "Listing record sets");

        let response = self
            .send(zone_id, &url, self.client.get(url.clone()))
            .await?;
        let listing: ListResourceRecordSetsResponse =
            response.json().await.map_err(|e| StoreError::Decode {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(listing.resource_record_sets)
    }

    async fn change_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<Change>,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(&["zones", zone_id, "rrsets", "changes"])?;
        let body = ChangeResourceRecordSetsRequest {
            change_batch: ChangeBatch { changes: &changes },
        };
        info!(
            url = %url,
            change_count = changes.len(),
            "Submitting change batch"
        );

        self.send(zone_id, &url, self.client.post(url.clone()).json(&body))
            .await?;
        Ok(())
    }
}
