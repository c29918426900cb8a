// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() {
    // 1. Tracing
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "consumption_node=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    // 2. Prometheus recorder
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
            }
        }
        Err(e) => {
            tracing::warn!("Metrics recorder not installed: {}", e);
            return;
        }
    }

    metrics::describe_counter!("consumption_events_total", "Dispense events accepted");
    metrics::describe_counter!("consumption_events_rejected_total", "Dispense reports rejected as malformed");
    metrics::describe_counter!("consumption_sync_success_total", "Aggregates confirmed by the collector");
    metrics::describe_counter!("consumption_sync_failure_total", "Sync attempts that exhausted their send budget");
    metrics::describe_counter!("consumption_flush_total", "State blobs written to storage");
    metrics::describe_counter!("consumption_faults_total", "Vendor fault codes reported by the host");
    metrics::describe_gauge!("consumption_buffered_events", "Events currently held in the ring");
}

/// Prometheus text exposition of the current metrics.
pub fn render_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
