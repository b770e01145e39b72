// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for fleet-dns.
//!
//! All metrics share the namespace prefix `fleet_dns_` and are registered in
//! [`METRICS_REGISTRY`], which the server exposes at `/metrics`.
//!
//! # Metrics Categories
//!
//! - **Lifecycle Metrics** - lifecycle events by transition and completion result
//! - **Reconciliation Metrics** - reconciliation outcomes and duration
//! - **Record Metrics** - record set changes applied, by action and type
//! - **Error Metrics** - failures by reason code
//!
//! # Example
//!
//! ```rust,no_run
//! use fleet_dns::metrics::{gather_metrics, record_reconciliation};
//!
//! record_reconciliation("launching", std::time::Duration::from_millis(120), true);
//! let text = gather_metrics().unwrap();
//! ```

use crate::record_set::{ChangeAction, RecordType};
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all fleet-dns metrics
const METRICS_NAMESPACE: &str = "fleet_dns";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

fn register_counter(name: &str, help: &str, labels: &[&str]) -> CounterVec {
    let counter = CounterVec::new(Opts::new(format!("{METRICS_NAMESPACE}_{name}"), help), labels)
        .expect("metric options are static and valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric is registered once");
    counter
}

// ============================================================================
// Lifecycle Metrics
// ============================================================================

/// Lifecycle events handled
///
/// Labels:
/// - `transition`: `launching`, `terminating` or `unsupported`
/// - `result`: `continue`, `abandon` or `ignored`
pub static LIFECYCLE_EVENTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "lifecycle_events_total",
        "Total number of lifecycle events by transition and completion result",
        &["transition", "result"],
    )
});

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Reconciliations by transition and status (`success`, `error`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "reconciliations_total",
        "Total number of reconciliations by transition and status",
        &["transition", "status"],
    )
});

/// Duration of reconciliations in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by transition",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram =
        HistogramVec::new(opts, &["transition"]).expect("metric options are static and valid");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric is registered once");
    histogram
});

// ============================================================================
// Record Metrics
// ============================================================================

/// Record set changes applied by action (`UPSERT`, `DELETE`) and record type
pub static RECORD_CHANGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "record_changes_total",
        "Total number of record set changes applied by action and record type",
        &["action", "record_type"],
    )
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Errors by reason code (see `ReconcileError::status_reason`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "errors_total",
        "Total number of errors by reason",
        &["reason"],
    )
});

// ============================================================================
// Recording Helpers
// ============================================================================

/// Record a handled lifecycle event
pub fn record_lifecycle_event(transition: &str, result: &str) {
    LIFECYCLE_EVENTS_TOTAL
        .with_label_values(&[transition, result])
        .inc();
}

/// Record the outcome and duration of a reconciliation
pub fn record_reconciliation(transition: &str, duration: Duration, success: bool) {
    let status = if success { "success" } else { "error" };
    RECONCILIATION_TOTAL
        .with_label_values(&[transition, status])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[transition])
        .observe(duration.as_secs_f64());
}

/// Record one applied record set change
pub fn record_change(action: ChangeAction, record_type: RecordType) {
    let action = action.to_string();
    RECORD_CHANGES_TOTAL
        .with_label_values(&[action.as_str(), record_type.as_str()])
        .inc();
}

/// Record an error
pub fn record_error(reason: &str) {
    ERRORS_TOTAL.with_label_values(&[reason]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
