// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::FlockError;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() -> Result<(), FlockError> {
    // 1. Initialize Tracing (Logs)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "flock_node=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| FlockError::Internal(format!("failed to install tracing subscriber: {e}")))?;

    // 2. Initialize Metrics (Prometheus)
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| FlockError::Internal(format!("failed to install Prometheus recorder: {e}")))?;

    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
    }

    metrics::describe_counter!("flock_rpc_requests_total", "Remote operations received, by op");
    metrics::describe_counter!("flock_mutations_total", "Mutations applied, by op");
    metrics::describe_counter!("flock_mutation_errors_total", "Mutations rejected, by op");
    metrics::describe_counter!("flock_monitor_evictions_total", "Members removed after missed pings");
    metrics::describe_gauge!("flock_view_members", "Members in the most recently published view, by provider");
    metrics::describe_gauge!("flock_view_version", "Version of the most recently published view, by provider");

    metrics::gauge!("flock_node_up", 1.0);
    Ok(())
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
