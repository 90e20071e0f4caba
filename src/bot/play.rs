//! Play loop
//!
//! Each round reads the wave indicator, runs the stage's primary handler
//! (or its fallback when the stage did not advance), then waits for either
//! the bond screen or the next command phase.

use super::{BattleBot, BotError};
use crate::android::Controller;
use crate::game::{BattlePhase, BattleProgress, Dispatch};
use crate::vision::{markers, Recognizer, ScreenMatcher};

/// A stage marker must score strictly above this to count
pub const STAGE_CONFIDENCE_FLOOR: f32 = 0.70;

/// What the screen showed after a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnEnd {
    Won,
    NextRound,
}

/// Classify the current stage from the wave indicator markers.
///
/// Picks the highest-scoring stage above the floor; on a tie the lower
/// stage wins. `None` when nothing clears the floor.
pub fn classify_stage<C, M>(recognizer: &mut Recognizer<C, M>, stage_count: u32) -> Option<u32>
where
    C: Controller,
    M: ScreenMatcher,
{
    let mut best_confidence = STAGE_CONFIDENCE_FLOOR;
    let mut best_stage = None;
    for stage in 1..=stage_count {
        let confidence = recognizer.probability(&markers::stage(stage, stage_count));
        if confidence > best_confidence {
            best_confidence = confidence;
            best_stage = Some(stage);
        }
    }

    match best_stage {
        Some(stage) => log::debug!("Got current stage: {}", stage),
        None => log::error!("Failed to get current stage"),
    }
    best_stage
}

impl<C: Controller, M: ScreenMatcher> BattleBot<C, M> {
    /// Play one battle to the bond screen. Returns the number of rounds.
    pub(crate) fn play_battle(&mut self) -> Result<u32, BotError> {
        self.set_phase(BattlePhase::InBattle);
        let stage_count = self.settings.quest.stage_count;
        let mut progress = BattleProgress::new();

        loop {
            let stage = classify_stage(&mut self.commander.recognizer, stage_count)
                .ok_or(BotError::StageUnrecognized)?;
            let dispatch = progress.begin_round(stage);

            let handler = match dispatch {
                Dispatch::Primary => {
                    log::info!(
                        "At stage {}/{}, round {}, calling handler",
                        stage,
                        stage_count,
                        progress.rounds()
                    );
                    self.table.primary_mut(stage)
                }
                Dispatch::Fallback => {
                    log::info!(
                        "At stage {}/{}, round {}, stage not cleared, calling fallback",
                        stage,
                        stage_count,
                        progress.rounds()
                    );
                    self.table.fallback_mut(stage)
                }
            }
            .ok_or(BotError::MissingHandler(stage))?;
            handler(&mut self.commander)?;

            if self.wait_turn_end()? == TurnEnd::Won {
                log::info!("Bond screen detected, leaving battle");
                return Ok(progress.rounds());
            }
            log::debug!("Attack detected, continuing");
        }
    }

    fn wait_turn_end(&mut self) -> Result<TurnEnd, BotError> {
        let interval = self.commander.timings.short() * 2;
        let limit = self.commander.budgets.turn_end;

        let mut outcome = None;
        self.commander.recognizer.poll(interval, limit, |r| {
            if r.refresh_and_exists(markers::BOND, None) {
                outcome = Some(TurnEnd::Won);
            } else if r.exists(markers::ATTACK, None) {
                outcome = Some(TurnEnd::NextRound);
            }
            outcome.is_some()
        });

        outcome.ok_or_else(|| BotError::Timeout {
            marker: format!("{} or {}", markers::BOND, markers::ATTACK),
            phase: BattlePhase::InBattle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_recognizer, ScriptedMatcher};

    fn stages(confidences: &[f32]) -> ScriptedMatcher {
        let count = confidences.len() as u32;
        let mut matcher = ScriptedMatcher::new();
        for (i, confidence) in confidences.iter().enumerate() {
            matcher.set(&markers::stage(i as u32 + 1, count), *confidence);
        }
        matcher
    }

    #[test]
    fn test_highest_stage_wins() {
        let mut recognizer = test_recognizer(stages(&[0.3, 0.9, 0.2]));
        assert_eq!(classify_stage(&mut recognizer, 3), Some(2));
    }

    #[test]
    fn test_floor_is_exclusive() {
        let mut recognizer = test_recognizer(stages(&[0.7, 0.5, 0.69]));
        assert_eq!(classify_stage(&mut recognizer, 3), None);
    }

    #[test]
    fn test_tie_goes_to_lower_stage() {
        let mut recognizer = test_recognizer(stages(&[0.2, 0.88, 0.88]));
        assert_eq!(classify_stage(&mut recognizer, 3), Some(2));
    }

    #[test]
    fn test_unknown_stage_markers_read_as_missing() {
        let mut recognizer = test_recognizer(ScriptedMatcher::new());
        assert_eq!(classify_stage(&mut recognizer, 2), None);
    }
}
