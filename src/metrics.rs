use anyhow::{Context, Result};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe_digest_metrics();
        Ok(Self { handle })
    }

    /// Recorder that is not installed globally; renders an empty exposition.
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self {
            handle: recorder.handle(),
        }
    }

    /// `/metrics` in the Prometheus exposition format.
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

/// Router used when no recorder is installed.
pub fn disabled_router() -> Router {
    Router::new().route(
        "/metrics",
        get(|| async { (StatusCode::NOT_FOUND, "metrics disabled").into_response() }),
    )
}

fn describe_digest_metrics() {
    describe_counter!("digest_runs_total", "Completed digest runs.");
    describe_gauge!("digest_last_run_ts", "Unix ts of the last completed digest.");
    describe_histogram!("digest_run_ms", "Digest run time in milliseconds.");
    describe_counter!("ai_requests_total", "Model calls made (cache misses within limit).");
    describe_counter!("ai_cache_hits_total", "Model answers served from the file cache.");
    describe_counter!("ai_limit_hits_total", "Model calls refused by the daily limit.");
}
