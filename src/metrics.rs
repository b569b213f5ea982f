use axum::{routing::get, Router};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process and describe our series.
    /// Later calls reuse the same handle.
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(h) => h,
                Err(e) => {
                    // Someone else owns the global recorder; render an empty one.
                    tracing::warn!(error = %e, "prometheus recorder not installed");
                    PrometheusBuilder::new().build_recorder().handle()
                }
            })
            .clone();
        ensure_metrics_described();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics with help text).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("classifications_total", "Messages classified.");
        describe_counter!(
            "classifications_phishing_total",
            "Messages classified as phishing."
        );
        describe_counter!(
            "classification_failures_total",
            "Classifications that ended in a failure result."
        );
        describe_counter!(
            "dedup_skipped_total",
            "Candidates skipped because their id was already analyzed."
        );
        describe_counter!(
            "history_evictions_total",
            "Analysis records evicted past the history cap."
        );
        describe_counter!(
            "history_write_errors_total",
            "Analysis records that could not be persisted."
        );
    });
}
