use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("novelty_admitted_total", "Candidates admitted by the novelty gate.");
        describe_counter!(
            "novelty_rejected_total",
            "Candidates rejected by the novelty gate, by reason."
        );
        describe_counter!(
            "retry_exhausted_total",
            "Lesson runs that spent every generation attempt."
        );
        describe_counter!("digest_items_total", "Articles picked into a digest.");
        describe_counter!(
            "publish_failures_total",
            "Messages that failed both the rich and the plain send."
        );
        describe_counter!("feed_items_total", "Items parsed from feeds.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("last_run_ts", "Unix ts when a lesson or digest run last finished.");
    });
}

pub fn mark_run_finished() {
    gauge!("last_run_ts").set(chrono::Utc::now().timestamp() as f64);
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Fails if a recorder is already set.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
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
