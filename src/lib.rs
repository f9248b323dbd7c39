// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod digest;
pub mod gate;
pub mod generate;
pub mod history;
pub mod item;
pub mod metrics;
pub mod penalty;
pub mod publish;
pub mod retry;
pub mod rotation;
pub mod runner;
pub mod similarity;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::{BotConfig, NoveltyConfig, RotationMode};
pub use crate::gate::{NoveltyGate, Rejection, Verdict};
pub use crate::history::{FileHistory, HistoryKind, HistoryStore, MemoryHistory, UsedSetStore};
pub use crate::item::ContentItem;
pub use crate::retry::{produce_novel, Production};
pub use crate::runner::{RunStatus, Runner};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Our own targets at info, everything else at warn.
pub const DEFAULT_LOG_FILTER: &str =
    "fresh_digest=info,novelty=info,rotation=info,retry=info,digest=info,publish=info,feed=info,history=info,warn";

/// Install compact tracing logs (`RUST_LOG` overrides the default filter).
/// A subscriber installed by the host is left alone.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
