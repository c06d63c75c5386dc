//! Prometheus metrics for the portal server.
//!
//! The `/metrics` endpoint is unauthenticated. Counters carry no stockist
//! codes, emails or file names, only aggregate activity. Restrict it to the
//! scraper at the network level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Sign-in metrics
pub static LOGINS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("portal_logins_total", "Login attempts by kind and outcome"),
        &["kind", "outcome"],
    )
    .expect("metric creation failed")
});

// Submission metrics
pub static UPLOADS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("portal_uploads_total", "Documents stored by kind"),
        &["kind"],
    )
    .expect("metric creation failed")
});

pub static UPLOAD_BYTES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("portal_upload_bytes_total", "Total bytes of stored documents")
        .expect("metric creation failed")
});

// Table metrics
pub static TABLE_SAVES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "portal_table_saves_total",
        "Total successful rewrites of the stockist table",
    )
    .expect("metric creation failed")
});

pub static TABLE_SAVE_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "portal_table_save_failures_total",
        "Total failed rewrites of the stockist table",
    )
    .expect("metric creation failed")
});

pub static TABLE_SAVE_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "portal_table_save_duration_seconds",
            "Time taken to load, update and rewrite the stockist table",
        )
        .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
    )
    .expect("metric creation failed")
});

pub static TABLE_EXPORTS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("portal_table_exports_total", "Total stockist master exports")
        .expect("metric creation failed")
});

// Archive metrics
pub static ARCHIVES_BUILT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("portal_archives_built_total", "Zip archives built by scope"),
        &["scope"],
    )
    .expect("metric creation failed")
});

pub static ARCHIVED_FILES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "portal_archived_files_total",
        "Total files written into zip archives",
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent; later calls are no-ops so tests can build many routers.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(LOGINS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOADS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_BYTES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(TABLE_SAVES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(TABLE_SAVE_FAILURES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(TABLE_SAVE_DURATION.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(TABLE_EXPORTS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ARCHIVES_BUILT.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ARCHIVED_FILES.clone()))
            .expect("metric registration failed");
    });
}

/// Handler for the `/metrics` endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Count a login attempt.
pub fn record_login(kind: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    LOGINS.with_label_values(&[kind, outcome]).inc();
}
