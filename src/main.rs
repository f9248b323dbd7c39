//! Web trigger: Shuttle + Axum server whose routes start lesson and digest
//! runs (`/lesson`, `/run`), plus `/health` and `/metrics`.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use fresh_digest::metrics::Metrics;
use fresh_digest::{create_router, init_tracing, AppState, BotConfig, NoveltyConfig, Runner};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = Metrics::init()?;

    let cfg = NoveltyConfig::load_default().context("loading novelty config")?;
    let bot = BotConfig::from_env(None);
    bot.log_summary();
    tracing::info!(
        rotation = ?cfg.rotation,
        feeds = cfg.feeds.len(),
        state_dir = %cfg.state_dir.display(),
        "novelty config loaded"
    );

    let runner = Runner::from_config(&cfg, &bot)?;
    let router = create_router(AppState::new(runner)).merge(metrics.router());

    Ok(router.into())
}
