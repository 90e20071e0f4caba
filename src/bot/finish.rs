//! Result screens

use super::{BattleBot, BotError};
use crate::android::Controller;
use crate::game::{BattlePhase, StopReason};
use crate::vision::{markers, ScreenMatcher};

/// What follows the result screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterBattle {
    /// "Continue" was tapped; the next battle starts at the support list
    Continue,
    /// Back on the quest map; the next battle starts at quest selection
    Reselect,
    /// The run is over
    Stop(StopReason),
}

impl<C: Controller, M: ScreenMatcher> BattleBot<C, M> {
    /// Click through the result screens after battle `played` of the run
    pub(crate) fn end_battle(&mut self, played: u32) -> Result<AfterBattle, BotError> {
        self.set_phase(BattlePhase::EndBattle);
        let short = self.commander.timings.short();
        let center = self.settings.buttons.center;
        let limit = self.commander.budgets.result_screens;

        let recognizer = &mut self.commander.recognizer;
        let reached = recognizer.poll(short, limit, |r| {
            if r.refresh_and_exists(markers::NEXT_STEP, None) {
                return true;
            }
            r.tap(center);
            false
        });
        if !reached {
            return Err(BotError::Timeout {
                marker: markers::NEXT_STEP.to_string(),
                phase: BattlePhase::EndBattle,
            });
        }

        recognizer.tap(self.settings.buttons.next_step);
        recognizer.wait_and_refresh(short * 2);

        if recognizer.find_and_tap(markers::DECLINE_FRIEND, None) {
            log::debug!("Declined friend request");
            recognizer.wait_and_refresh(short);
        }

        let more = played < self.settings.max_loops;
        if more && !self.settings.reselect_each_loop {
            if recognizer.find_and_tap(markers::CONTINUE, None) {
                recognizer.wait_and_refresh(short * 2);
                return Ok(AfterBattle::Continue);
            }
            log::error!("Continue button not found, stopping");
            return Ok(AfterBattle::Stop(StopReason::ContinueUnavailable));
        }

        recognizer.find_and_tap(markers::CLOSE, None);
        log::info!("wait...");
        recognizer.wait(self.commander.timings.long());
        if !recognizer.wait_until(markers::MENU, short, self.commander.budgets.menu) {
            return Err(BotError::Timeout {
                marker: markers::MENU.to_string(),
                phase: BattlePhase::EndBattle,
            });
        }

        Ok(if more {
            AfterBattle::Reselect
        } else {
            AfterBattle::Stop(StopReason::Completed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BotSettings, ButtonLayout, PollBudgets, TimingSettings};
    use crate::testing::{FakeController, Input, ScriptedMatcher};

    fn bot(matcher: ScriptedMatcher, reselect: bool) -> BattleBot<FakeController, ScriptedMatcher> {
        let settings = BotSettings {
            timings: TimingSettings::instant(),
            budgets: PollBudgets::bounded(5),
            max_loops: 2,
            reselect_each_loop: reselect,
            ..BotSettings::default()
        };
        BattleBot::new(FakeController::default(), matcher, settings).unwrap()
    }

    fn result_screens() -> ScriptedMatcher {
        let mut matcher = ScriptedMatcher::new();
        matcher.sequence(markers::NEXT_STEP, &[0.1, 0.1, 0.9]);
        matcher.set(markers::DECLINE_FRIEND, 0.9);
        matcher.set(markers::CONTINUE, 0.9);
        matcher.set(markers::CLOSE, 0.9);
        matcher.set(markers::MENU, 0.9);
        matcher
    }

    #[test]
    fn test_continue_while_loops_remain() {
        let buttons = ButtonLayout::default();
        let mut bot = bot(result_screens(), false);

        assert_eq!(bot.end_battle(1).unwrap(), AfterBattle::Continue);
        let taps = bot.commander.recognizer.controller().taps();
        // two taps to skip the rewards, "next", decline, continue
        assert_eq!(taps[0], Input::Tap(buttons.center));
        assert_eq!(taps[1], Input::Tap(buttons.center));
        assert_eq!(taps[2], Input::Tap(buttons.next_step));
        assert_eq!(taps.len(), 5);
        assert_eq!(bot.commander.recognizer.matcher().calls_to(markers::CLOSE), 0);
    }

    #[test]
    fn test_close_after_last_battle() {
        let mut bot = bot(result_screens(), false);

        assert_eq!(
            bot.end_battle(2).unwrap(),
            AfterBattle::Stop(StopReason::Completed)
        );
        let matcher = bot.commander.recognizer.matcher();
        assert_eq!(matcher.calls_to(markers::CONTINUE), 0);
        assert_eq!(matcher.calls_to(markers::MENU), 1);
    }

    #[test]
    fn test_missing_continue_stops_run() {
        let mut matcher = result_screens();
        matcher.set(markers::CONTINUE, 0.2);
        let mut bot = bot(matcher, false);

        assert_eq!(
            bot.end_battle(1).unwrap(),
            AfterBattle::Stop(StopReason::ContinueUnavailable)
        );
    }

    #[test]
    fn test_reselect_closes_between_battles() {
        let mut bot = bot(result_screens(), true);

        assert_eq!(bot.end_battle(1).unwrap(), AfterBattle::Reselect);
        assert_eq!(bot.commander.recognizer.matcher().calls_to(markers::CONTINUE), 0);
    }

    #[test]
    fn test_result_screens_budget() {
        let mut matcher = result_screens();
        matcher.set(markers::NEXT_STEP, 0.1);
        let mut bot = bot(matcher, false);

        assert!(matches!(
            bot.end_battle(1),
            Err(BotError::Timeout { phase: BattlePhase::EndBattle, .. })
        ));
    }
}
