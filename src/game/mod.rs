//! Game domain module
//!
//! Pure data and rules with no device access: card choices, AP items,
//! support classes, stage handlers and per-battle progress.

pub mod battle;
pub mod cards;
pub mod handlers;
pub mod items;
pub mod servant;
pub mod state;

use thiserror::Error;

pub use battle::{BattlePhase, RunSummary, StopReason};
pub use cards::{validate_cards, CardChoice, CardSlots};
pub use handlers::{ActionTable, BattleCommands, StageHandler, DEFAULT_ENEMY};
pub use items::ApItem;
pub use servant::SupportClass;
pub use state::{BattleProgress, Dispatch};

/// A battle action that cannot be carried out as written
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("attack takes exactly 3 cards, got {0}")]
    CardCount(usize),

    #[error("card {0} is out of range (1-5 normal, 6-8 noble phantasm)")]
    CardOutOfRange(u8),

    #[error("card {0} chosen more than once")]
    DuplicateCard(u8),

    #[error("no unselected normal card left")]
    CardsExhausted,

    #[error("servant {servant} skill {skill} is out of range")]
    SkillOutOfRange { servant: u8, skill: u8 },

    #[error("master skill {0} is out of range")]
    MasterSkillOutOfRange(u8),

    #[error("enemy {0} is out of range (1-3)")]
    EnemyOutOfRange(u8),

    #[error("timed out waiting for {0}")]
    Timeout(String),
}

/// A battle script that cannot be installed
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("stage {0} already has a handler")]
    DuplicatePrimary(u32),

    #[error("stage {0} already has a fallback")]
    DuplicateFallback(u32),

    #[error("stage {stage} is out of range (1-{stage_count})")]
    StageOutOfRange { stage: u32, stage_count: u32 },
}
