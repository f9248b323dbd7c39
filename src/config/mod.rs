// src/config/mod.rs
pub mod bot;
pub mod novelty;

pub use bot::BotConfig;
pub use novelty::{NoveltyConfig, RotationMode};
