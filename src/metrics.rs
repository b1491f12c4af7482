// Prometheus metrics definitions for the admin console.

use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Calls to the remote game API, by endpoint and outcome.
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("game_admin_upstream_requests_total", "Calls to the game API"),
        &["endpoint", "outcome"],
    )
    .unwrap();

    /// Form submissions rejected locally before any call was made, by form.
    pub static ref VALIDATION_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "game_admin_validation_failures_total",
            "Form submissions rejected by local validation",
        ),
        &["form"],
    )
    .unwrap();

    /// Submissions rejected because an identical one was still in flight.
    pub static ref DUPLICATE_SUBMISSIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "game_admin_duplicate_submissions_total",
            "Submissions rejected while an identical one was in flight",
        ),
        &["form"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Game API call latency in seconds, by endpoint.
    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "game_admin_upstream_request_duration_seconds",
            "Game API call latency in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["endpoint"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(UPSTREAM_REQUESTS_TOTAL.clone()),
        Box::new(VALIDATION_FAILURES_TOTAL.clone()),
        Box::new(DUPLICATE_SUBMISSIONS_TOTAL.clone()),
        Box::new(UPSTREAM_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        if let Err(e) = REGISTRY.register(c) {
            tracing::warn!("metric registration skipped: {e}");
        }
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_metrics_after_register() {
        register_metrics();
        // Registering twice must not panic.
        register_metrics();
        VALIDATION_FAILURES_TOTAL.with_label_values(&["score"]).inc();
        let output = gather_metrics();
        assert!(output.contains("game_admin_validation_failures_total"));
    }

    #[test]
    fn test_metric_increments() {
        let before = UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&["find_user", "ok"])
            .get();
        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&["find_user", "ok"])
            .inc();
        assert_eq!(
            UPSTREAM_REQUESTS_TOTAL
                .with_label_values(&["find_user", "ok"])
                .get(),
            before + 1
        );

        DUPLICATE_SUBMISSIONS_TOTAL
            .with_label_values(&["register"])
            .inc();
        UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&["register"])
            .observe(0.05);
    }
}
