// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `store/memory.rs`

use super::*;
use crate::record_set::ResourceRecord;

fn record_set(name: &str, record_type: RecordType, set_id: Option<&str>, value: &str) -> ResourceRecordSet {
    ResourceRecordSet {
        name: name.to_string(),
        record_type,
        ttl: 10,
        resource_records: vec![ResourceRecord::new(value)],
        set_identifier: set_id.map(str::to_string),
        multi_value_answer: set_id.map(|_| true),
    }
}

fn change(action: ChangeAction, resource_record_set: ResourceRecordSet) -> Change {
    Change {
        action,
        resource_record_set,
    }
}

#[tokio::test]
async fn test_zone_exists() {
    let store = InMemoryStore::with_zones(["Z1"]);
    assert!(store.zone_exists("Z1").await.is_ok());
    assert_eq!(
        store.zone_exists("Z2").await,
        Err(StoreError::ZoneNotFound {
            zone_id: "Z2".to_string()
        })
    );
    assert_eq!(store.calls().zone_lookups, 2);
}

#[tokio::test]
async fn test_upsert_replaces_same_key() {
    let store = InMemoryStore::with_zones(["Z1"]);
    store
        .change_record_sets(
            "Z1",
            vec![change(
                ChangeAction::Upsert,
                record_set("a.example.com", RecordType::A, None, "10.0.0.1"),
            )],
        )
        .await
        .unwrap();
    store
        .change_record_sets(
            "Z1",
            vec![change(
                ChangeAction::Upsert,
                record_set("a.example.com.", RecordType::A, None, "10.0.0.2"),
            )],
        )
        .await
        .unwrap();

    let stored = store.record_sets("Z1");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].resource_records[0].value, "10.0.0.2");
}

#[tokio::test]
async fn test_set_identifiers_are_separate_keys() {
    let store = InMemoryStore::with_zones(["Z1"]);
    store
        .change_record_sets(
            "Z1",
            vec![
                change(
                    ChangeAction::Upsert,
                    record_set("svc.example.com", RecordType::A, Some("g1"), "10.0.0.1"),
                ),
                change(
                    ChangeAction::Upsert,
                    record_set("svc.example.com", RecordType::A, Some("g2"), "10.0.0.2"),
                ),
            ],
        )
        .await
        .unwrap();

    assert_eq!(store.record_sets("Z1").len(), 2);
}

#[tokio::test]
async fn test_upsert_without_values_rejected() {
    let store = InMemoryStore::with_zones(["Z1"]);
    let mut empty = record_set("a.example.com", RecordType::A, None, "10.0.0.1");
    empty.resource_records.clear();

    let err = store
        .change_record_sets("Z1", vec![change(ChangeAction::Upsert, empty)])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidChangeBatch { .. }));
}

#[tokio::test]
async fn test_delete_requires_exact_content() {
    let store = InMemoryStore::with_zones(["Z1"]);
    store.insert_record_set("Z1", record_set("a.example.com", RecordType::A, None, "10.0.0.1"));

    let err = store
        .change_record_sets(
            "Z1",
            vec![change(
                ChangeAction::Delete,
                record_set("a.example.com", RecordType::A, None, "10.0.0.9"),
            )],
        )
        .await
        .unwrap_err();
    match err {
        StoreError::InvalidChangeBatch { zone_id, reason } => {
            assert_eq!(zone_id, "Z1");
            assert!(reason.contains("do not match"), "{reason}");
        }
        other => panic!("expected InvalidChangeBatch, got {other:?}"),
    }

    store
        .change_record_sets(
            "Z1",
            vec![change(
                ChangeAction::Delete,
                record_set("a.example.com", RecordType::A, None, "10.0.0.1"),
            )],
        )
        .await
        .unwrap();
    assert!(store.record_sets("Z1").is_empty());
}

#[tokio::test]
async fn test_delete_missing_record_rejected() {
    let store = InMemoryStore::with_zones(["Z1"]);
    let err = store
        .change_record_sets(
            "Z1",
            vec![change(
                ChangeAction::Delete,
                record_set("a.example.com", RecordType::Txt, None, "\"i-1\""),
            )],
        )
        .await
        .unwrap_err();
    match err {
        StoreError::InvalidChangeBatch { reason, .. } => assert!(reason.contains("not found")),
        other => panic!("expected InvalidChangeBatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_batch_applies_nothing() {
    let store = InMemoryStore::with_zones(["Z1"]);
    let marker = record_set("a.example.com", RecordType::Txt, None, "\"i-1\"");
    store.insert_record_set("Z1", marker.clone());

    let err = store
        .change_record_sets(
            "Z1",
            vec![
                change(ChangeAction::Delete, marker.clone()),
                change(
                    ChangeAction::Upsert,
                    record_set("b.example.com", RecordType::A, None, "10.0.0.2"),
                ),
                change(
                    ChangeAction::Delete,
                    record_set("a.example.com", RecordType::A, None, "10.0.0.1"),
                ),
            ],
        )
        .await;

    assert!(err.is_err());
    assert_eq!(store.record_sets("Z1"), vec![marker]);
}

#[tokio::test]
async fn test_changes_to_unknown_zone() {
    let store = InMemoryStore::new();
    let err = store
        .change_record_sets(
            "Z404",
            vec![change(
                ChangeAction::Upsert,
                record_set("a.example.com", RecordType::A, None, "10.0.0.1"),
            )],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ZoneNotFound { .. }));
}

#[tokio::test]
async fn test_listing_starts_at_name_and_type() {
    let store = InMemoryStore::with_zones(["Z1"]);
    store.insert_record_set("Z1", record_set("a.example.com", RecordType::A, None, "10.0.0.1"));
    store.insert_record_set("Z1", record_set("b.example.com", RecordType::Txt, None, "\"i-2\""));
    store.insert_record_set("Z1", record_set("b.example.com", RecordType::A, None, "10.0.0.2"));
    store.insert_record_set("Z1", record_set("c.example.com", RecordType::A, None, "10.0.0.3"));

    let listed = store
        .list_record_sets("Z1", "B.example.com.", RecordType::A)
        .await
        .unwrap();

    let keys: Vec<_> = listed
        .iter()
        .map(|record_set| (record_set.name.as_str(), record_set.record_type))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("b.example.com", RecordType::A),
            ("b.example.com", RecordType::Txt),
            ("c.example.com", RecordType::A),
        ]
    );
}

#[tokio::test]
async fn test_injected_faults_are_returned() {
    let store = InMemoryStore::with_zones(["Z1"]);
    let fault = StoreError::Connection {
        endpoint: "memory".to_string(),
        reason: "injected".to_string(),
    };
    store.fail_zone_lookups(fault.clone());
    store.fail_listings(fault.clone());
    store.fail_changes(fault.clone());

    assert_eq!(store.zone_exists("Z1").await, Err(fault.clone()));
    assert_eq!(
        store.list_record_sets("Z1", "a", RecordType::A).await,
        Err(fault.clone())
    );
    assert_eq!(store.change_record_sets("Z1", Vec::new()).await, Err(fault));
    assert_eq!(
        store.calls(),
        CallCounts {
            zone_lookups: 1,
            listings: 1,
            change_batches: 1,
        }
    );
}
