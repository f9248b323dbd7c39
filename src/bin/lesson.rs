//! One-shot lesson run for cron-style schedulers.
//!
//! Exits 0 for every normal outcome (sent, nothing left, no novel item,
//! publish failure); only broken configuration or state exits non-zero.

use anyhow::Context;
use fresh_digest::{init_tracing, BotConfig, NoveltyConfig, Runner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    fresh_digest::metrics::ensure_metrics_described();

    let cfg = NoveltyConfig::load_default().context("loading novelty config")?;
    let bot = BotConfig::from_env(Some("UX"));
    bot.log_summary();

    let mut runner = Runner::from_config(&cfg, &bot)?;
    let status = runner.run_lesson().await?;
    println!("{status}");
    Ok(())
}
