use std::sync::Arc;

use shuttle_axum::axum::{extract::State, http::StatusCode, routing::get, Router};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::runner::Runner;

/// Shared state. The mutex serialises runs inside this process; a second
/// trigger waits for the first to finish.
#[derive(Clone)]
pub struct AppState {
    runner: Arc<Mutex<Runner>>,
}

impl AppState {
    pub fn new(runner: Runner) -> Self {
        Self {
            runner: Arc::new(Mutex::new(runner)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Bot is alive." }))
        .route("/health", get(|| async { "ok" }))
        .route("/run", get(run_digest))
        .route("/lesson", get(run_lesson))
        .with_state(state)
}

async fn run_digest(State(state): State<AppState>) -> (StatusCode, String) {
    info!(target: "digest", "/run triggered");
    let mut runner = state.runner.lock().await;
    let status = runner.run_digest().await;
    (StatusCode::OK, status.to_string())
}

async fn run_lesson(State(state): State<AppState>) -> (StatusCode, String) {
    info!(target: "rotation", "/lesson triggered");
    let mut runner = state.runner.lock().await;
    match runner.run_lesson().await {
        Ok(status) => (StatusCode::OK, status.to_string()),
        Err(e) => {
            warn!(target: "rotation", error = %format!("{e:#}"), "lesson run failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Run failed: {e:#}"))
        }
    }
}
