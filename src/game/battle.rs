//! Battle phases and run results

use std::fmt;

use serde::Serialize;

/// Where the orchestrator is in one battle loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BattlePhase {
    /// Looking for the quest in the quest list
    SelectQuest,
    /// Tapped the quest, waiting to learn which dialog opened
    QuestEntry,
    /// Restoring AP with an item
    ApRecovery,
    /// Choosing a support from the list
    SelectSupport,
    /// Party confirmation, waiting for the battle to load
    TeamConfirm,
    /// Playing stages
    InBattle,
    /// Result screens
    EndBattle,
    /// Run is over
    Finished,
}

impl fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BattlePhase::SelectQuest => "quest selection",
            BattlePhase::QuestEntry => "quest entry",
            BattlePhase::ApRecovery => "AP recovery",
            BattlePhase::SelectSupport => "support selection",
            BattlePhase::TeamConfirm => "team confirmation",
            BattlePhase::InBattle => "battle",
            BattlePhase::EndBattle => "result screens",
            BattlePhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Why a run ended without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// The loop budget was used up
    Completed,
    /// Out of AP and no recovery item left
    ApExhausted,
    /// The result screen offered no "continue" button
    ContinueUnavailable,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            StopReason::Completed => "all battles played",
            StopReason::ApExhausted => "AP ran out",
            StopReason::ContinueUnavailable => "continue unavailable",
        };
        f.write_str(reason)
    }
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Rounds played in each completed battle
    pub rounds: Vec<u32>,
    pub stop_reason: StopReason,
}

impl RunSummary {
    pub fn battles(&self) -> usize {
        self.rounds.len()
    }

    pub fn total_rounds(&self) -> u32 {
        self.rounds.iter().sum()
    }
}
