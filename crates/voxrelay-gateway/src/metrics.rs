//! Prometheus metrics recording and endpoint.

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::warn;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder on first use and return its render handle.
pub fn prometheus_handle() -> &'static PrometheusHandle {
    HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        if metrics::set_global_recorder(recorder).is_err() {
            warn!("A global metrics recorder was already installed");
        }
        handle
    })
}

/// Record an HTTP request with its duration.
pub fn record_request(endpoint: &str, duration_secs: f64) {
    let labels = [("endpoint", endpoint.to_string())];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(duration_secs);
}

/// Record a pipeline stage that fell back or failed.
///
/// `kind` is an error kind for `/generate-voice` and `/echo`, and a turn
/// outcome for `/agent/chat`; the `endpoint` label keeps the two apart.
pub fn record_stage_failure(endpoint: &str, kind: &str) {
    let labels = [
        ("endpoint", endpoint.to_string()),
        ("kind", kind.to_string()),
    ];
    metrics::counter!("stage_failures_total", &labels).increment(1);
}

/// `GET /metrics`
pub async fn metrics_handler() -> String {
    prometheus_handle().render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_after_recording() {
        let handle = prometheus_handle();
        record_request("/generate-voice", 0.25);
        record_stage_failure("/agent/chat", "synthesis_failed");
        record_stage_failure("/echo", "synthesis");
        let output = handle.render();
        assert!(output.contains("http_requests_total"));
        assert!(output.contains("stage_failures_total"));
        assert!(output.contains(r#"endpoint="/agent/chat""#));
        assert!(output.contains(r#"endpoint="/echo""#));
    }

    #[test]
    fn test_handle_is_shared() {
        assert!(std::ptr::eq(prometheus_handle(), prometheus_handle()));
    }
}
