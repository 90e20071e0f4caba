//! Configuration module
//!
//! Handles bot settings, the fixed button layout, and JSON battle recipes.

pub mod buttons;
pub mod recipe;
pub mod settings;

use std::path::PathBuf;

use thiserror::Error;

pub use buttons::{ButtonLayout, Swipe};
pub use recipe::{Action, Recipe, StagePlan};
pub use settings::{
    BotSettings, DeviceSettings, PollBudgets, QuestSettings, RecognitionSettings,
    SupportSettings, TimingSettings,
};

/// Errors raised while loading settings or recipes
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
