// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `server.rs`

use super::*;
use crate::dns_errors::{LifecycleError, LookupError};
use crate::instance::{Instance, InstanceLookup, Tag};
use crate::lifecycle::{LifecycleActionResult, LifecycleCompleter, LifecycleEvent};
use crate::store::memory::InMemoryStore;
use crate::zone_config::TagKeys;
use async_trait::async_trait;
use std::net::SocketAddr;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENTS_TOKEN: &str = "events-secret";

struct OneInstance(Instance);

#[async_trait]
impl InstanceLookup for OneInstance {
    async fn describe(&self, instance_id: &str) -> Result<Instance, LookupError> {
        if instance_id == self.0.instance_id {
            Ok(self.0.clone())
        } else {
            Err(LookupError::InstanceNotFound {
                instance_id: instance_id.to_string(),
            })
        }
    }
}

struct AlwaysComplete;

#[async_trait]
impl LifecycleCompleter for AlwaysComplete {
    async fn complete(
        &self,
        _event: &LifecycleEvent,
        _result: LifecycleActionResult,
    ) -> Result<(), LifecycleError> {
        Ok(())
    }
}

async fn spawn_server(store: Arc<InMemoryStore>) -> SocketAddr {
    let instance = Instance {
        instance_id: "i-001".to_string(),
        private_ip_address: Some("10.0.0.5".to_string()),
        public_ip_address: None,
        tags: vec![
            Tag::new("fleet-dns:private-hosted-zone-id", "Z1"),
            Tag::new("fleet-dns:private-dns-records", "svc.internal.example.com"),
        ],
    };
    let handler = LifecycleHandler::new(
        store,
        Arc::new(OneInstance(instance)),
        Arc::new(AlwaysComplete),
        TagKeys::default(),
    );
    let state = AppState {
        handler: Arc::new(handler),
        http_client: reqwest::Client::new(),
        events_token: EVENTS_TOKEN.to_string(),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    addr
}

fn launch_event(instance_id: &str) -> String {
    serde_json::json!({
        "LifecycleHookName": "dns-hook",
        "AutoScalingGroupName": "web-asg",
        "LifecycleActionToken": "token-123",
        "LifecycleTransition": "autoscaling:EC2_INSTANCE_LAUNCHING",
        "EC2InstanceId": instance_id,
    })
    .to_string()
}

#[tokio::test]
async fn test_healthz() {
    let addr = spawn_server(Arc::new(InMemoryStore::new())).await;

    let response = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let addr = spawn_server(Arc::new(InMemoryStore::new())).await;
    metrics::record_error("ServerTest");

    let response = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.text().await.unwrap().contains("fleet_dns_errors_total"));
}

#[tokio::test]
async fn test_invalid_notification_is_bad_request() {
    let addr = spawn_server(Arc::new(InMemoryStore::new())).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/events"))
        .bearer_auth(EVENTS_TOKEN)
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_launch_event_is_reconciled() {
    let store = Arc::new(InMemoryStore::with_zones(["Z1"]));
    let addr = spawn_server(store.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/events"))
        .bearer_auth(EVENTS_TOKEN)
        .body(launch_event("i-001"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "CONTINUE");
    assert_eq!(store.record_sets("Z1").len(), 2);
}

#[tokio::test]
async fn test_failed_event_is_server_error() {
    let store = Arc::new(InMemoryStore::with_zones(["Z1"]));
    let addr = spawn_server(store.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/events"))
        .bearer_auth(EVENTS_TOKEN)
        .body(launch_event("i-unknown"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().await.unwrap().contains("i-unknown"));
    assert!(store.record_sets("Z1").is_empty());
}

#[tokio::test]
async fn test_test_notification_is_ignored() {
    let addr = spawn_server(Arc::new(InMemoryStore::new())).await;
    let body = serde_json::json!({
        "Type": "Notification",
        "Message": r#"{"Event": "autoscaling:TEST_NOTIFICATION", "LifecycleTransition": "autoscaling:TEST_NOTIFICATION"}"#,
    })
    .to_string();

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/events"))
        .bearer_auth(EVENTS_TOKEN)
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.text().await.unwrap(),
        "ignored autoscaling:TEST_NOTIFICATION"
    );
}

#[tokio::test]
async fn test_event_without_token_is_rejected() {
    let store = Arc::new(InMemoryStore::with_zones(["Z1"]));
    let addr = spawn_server(store.clone()).await;

    for token in [None, Some("wrong")] {
        let mut request = reqwest::Client::new()
            .post(format!("http://{addr}/events"))
            .body(launch_event("i-001"));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    }
    assert_eq!(store.calls(), Default::default());
}

#[tokio::test]
async fn test_token_accepted_as_query_parameter() {
    let store = Arc::new(InMemoryStore::with_zones(["Z1"]));
    let addr = spawn_server(store.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/events?token={EVENTS_TOKEN}"))
        .body(launch_event("i-001"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(store.record_sets("Z1").len(), 2);
}

#[tokio::test]
async fn test_foreign_subscribe_url_is_not_fetched() {
    let internal = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&internal)
        .await;
    let addr = spawn_server(Arc::new(InMemoryStore::new())).await;

    let body = serde_json::json!({
        "Type": "SubscriptionConfirmation",
        "Token": "abc",
        "SubscribeURL": format!("{}/latest/meta-data/iam", internal.uri()),
    })
    .to_string();
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/events"))
        .bearer_auth(EVENTS_TOKEN)
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(internal.received_requests().await.unwrap().is_empty());
}

#[test]
fn test_trusted_subscribe_url() {
    assert!(trusted_subscribe_url(
        "https://sns.us-east-1.amazonaws.com/?Action=ConfirmSubscription&Token=abc"
    )
    .is_ok());
    assert!(trusted_subscribe_url("https://sns.cn-north-1.amazonaws.com.cn/?Token=abc").is_ok());

    for url in [
        "http://sns.us-east-1.amazonaws.com/?Token=abc",
        "https://169.254.169.254/latest/meta-data/iam",
        "https://sns.evil.example.com.amazonaws.com/",
        "https://sns.amazonaws.com/",
        "https://evil.example.com/sns.us-east-1.amazonaws.com",
        "https://sns.us-east-1.amazonaws.com.evil.example.com/",
        "https://sns.us-east-1.amazonaws.com:8443/",
        "not a url",
    ] {
        assert!(trusted_subscribe_url(url).is_err(), "{url} should be refused");
    }
}
