// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP endpoint receiving lifecycle notifications.
//!
//! Routes:
//! - `POST /events` - SNS HTTP deliveries (or bare lifecycle events)
//! - `GET /metrics` - Prometheus metrics
//! - `GET /healthz` - liveness
//!
//! `POST /events` requires the shared events token, either as
//! `Authorization: Bearer <token>` or as the `token` query parameter (for
//! publishers that can only be given a URL). Subscription confirmations are
//! only fetched from `https://sns.<region>.amazonaws.com`.
//!
//! Each request is handled independently. A failed notification is answered
//! with a 5xx status for visibility only: the lifecycle action has normally
//! been completed already, so a redelivery cannot repair it.

use crate::constants::{
    EVENTS_SERVER_PATH, EVENTS_TOKEN_QUERY_PARAM, HEALTH_SERVER_PATH, METRICS_SERVER_PATH,
    SNS_HOST_PREFIX, SNS_HOST_SUFFIXES,
};
use crate::handler::{HandleOutcome, LifecycleHandler};
use crate::lifecycle::{parse_notification, Notification};
use crate::metrics;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use url::Url;

/// Shared state of the notification server.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<LifecycleHandler>,
    /// Client used to confirm SNS subscriptions
    pub http_client: reqwest::Client,
    /// Shared secret every `POST /events` request must present
    pub events_token: String,
}

/// Build the notification server router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(EVENTS_SERVER_PATH, post(receive_notification))
        .route(METRICS_SERVER_PATH, get(metrics_endpoint))
        .route(HEALTH_SERVER_PATH, get(|| async { "ok" }))
        .with_state(state)
}

/// Serve until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening for lifecycle notifications");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("Shutdown signal received");
}

/// Whether the request carries `expected` as bearer token or `token` query parameter.
fn is_authorized(headers: &HeaderMap, query: Option<&str>, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if bearer == Some(expected) {
        return true;
    }

    query.is_some_and(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .any(|(key, value)| key == EVENTS_TOKEN_QUERY_PARAM && value == expected)
    })
}

/// Accept only `https://sns.<region>.amazonaws.com/...` subscription URLs.
///
/// # Errors
///
/// Returns the reason the URL is refused.
pub fn trusted_subscribe_url(subscribe_url: &str) -> Result<Url, String> {
    let url = Url::parse(subscribe_url).map_err(|e| format!("invalid SubscribeURL: {e}"))?;
    if url.scheme() != "https" {
        return Err(format!("SubscribeURL must use https, got {}", url.scheme()));
    }
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let is_sns = SNS_HOST_SUFFIXES.iter().any(|suffix| {
        host.strip_suffix(suffix)
            .and_then(|rest| rest.strip_prefix(SNS_HOST_PREFIX))
            .is_some_and(|region| {
                !region.is_empty() && region.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            })
    });
    if !is_sns || url.port().is_some() || !url.username().is_empty() {
        return Err(format!("SubscribeURL host is not an SNS endpoint: {host}"));
    }
    Ok(url)
}

async fn receive_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: String,
) -> (StatusCode, String) {
    if !is_authorized(&headers, query.as_deref(), &state.events_token) {
        warn!("Rejecting unauthenticated notification");
        metrics::record_error("Unauthorized");
        return (StatusCode::UNAUTHORIZED, "missing or invalid events token".to_string());
    }

    let notification = match parse_notification(&body) {
        Ok(notification) => notification,
        Err(e) => {
            warn!(error = %e, "Rejecting notification");
            metrics::record_error("InvalidNotification");
            return (StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    match notification {
        Notification::SubscriptionConfirmation { subscribe_url } => {
            match trusted_subscribe_url(&subscribe_url) {
                Ok(url) => confirm_subscription(&state.http_client, url).await,
                Err(reason) => {
                    warn!(subscribe_url, %reason, "Refusing subscription confirmation");
                    metrics::record_error("UntrustedSubscribeUrl");
                    (StatusCode::BAD_REQUEST, reason)
                }
            }
        }
        Notification::Event(event) => match state.handler.handle(&event).await {
            Ok(HandleOutcome::Ignored { transition }) => {
                (StatusCode::OK, format!("ignored {transition}"))
            }
            Ok(HandleOutcome::Completed(result)) => (StatusCode::OK, result.to_string()),
            Err(e) => {
                error!(
                    instance_id = %event.ec2_instance_id,
                    reason = e.status_reason(),
                    error = %e,
                    "Lifecycle notification failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        },
    }
}

async fn confirm_subscription(client: &reqwest::Client, subscribe_url: Url) -> (StatusCode, String) {
    info!(subscribe_url = %subscribe_url, "Confirming SNS subscription");
    match client.get(subscribe_url).send().await {
        Ok(response) if response.status().is_success() => {
            (StatusCode::OK, "subscription confirmed".to_string())
        }
        Ok(response) => {
            let status = response.status();
            error!(%status, "Subscription confirmation rejected");
            (
                StatusCode::BAD_GATEWAY,
                format!("subscription confirmation returned HTTP {status}"),
            )
        }
        Err(e) => {
            error!(error = %e, "Subscription confirmation failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

async fn metrics_endpoint() -> (StatusCode, String) {
    match metrics::gather_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
