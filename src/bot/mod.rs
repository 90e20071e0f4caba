//! Battle orchestrator
//!
//! `BattleBot` runs a bounded number of battles: quest selection, support
//! selection (with AP recovery when the quest cannot be entered), the
//! per-stage play loop driven by the installed `ActionTable`, and the
//! result screens.
//!
//! Recognition misses are not errors; they lead to retries, swipes,
//! refreshes or fallbacks. Only states the bot cannot make sense of
//! (unrecognized quest entry, no stage marker, an exhausted wait budget)
//! abort the run with a `BotError`. Running out of AP ends it cleanly.

pub mod ap;
pub mod commands;
pub mod entry;
pub mod finish;
pub mod play;
pub mod support;

use thiserror::Error;

pub use commands::Commander;
pub use entry::{EntryKind, SupportList};
pub use finish::AfterBattle;
pub use play::{classify_stage, STAGE_CONFIDENCE_FLOOR};

use crate::android::Controller;
use crate::config::{BotSettings, ConfigError};
use crate::game::{
    ActionError, ActionTable, BattleCommands, BattlePhase, RunSummary, ScriptError, StopReason,
};
use crate::vision::{markers, Recognizer, ScreenMatcher, TemplateRole, VisionError};

/// Faults that abort a run
#[derive(Debug, Error)]
pub enum BotError {
    #[error("quest entry screen not recognized")]
    UnrecognizedEntry,

    #[error("no stage marker recognized")]
    StageUnrecognized,

    #[error("stage {0} has no handler")]
    MissingHandler(u32),

    #[error("timed out waiting for {marker} during {phase}")]
    Timeout { marker: String, phase: BattlePhase },

    #[error("quest not found in the quest list")]
    QuestNotFound,

    #[error("no acceptable support found")]
    SupportNotFound,

    #[error("cannot load template: {0}")]
    Template(#[from] VisionError),

    #[error("battle action failed: {0}")]
    Action(#[from] ActionError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub struct BattleBot<C: Controller, M: ScreenMatcher> {
    settings: BotSettings,
    table: ActionTable,
    commander: Commander<C, M>,
    phase: BattlePhase,
}

impl<C: Controller, M: ScreenMatcher> BattleBot<C, M> {
    /// Create a bot and register the quest and support templates
    pub fn new(controller: C, matcher: M, settings: BotSettings) -> Result<Self, BotError> {
        log::info!("Battle bot loading...");
        settings.validate()?;

        let recognizer = Recognizer::new(
            controller,
            matcher,
            &settings.recognition,
            settings.stealth.clone(),
        );
        let commander = Commander::new(
            recognizer,
            settings.buttons.clone(),
            settings.timings,
            settings.budgets,
            settings.recognition.card_template_dir.clone(),
        );

        let mut bot = Self {
            table: ActionTable::new(settings.quest.stage_count),
            settings,
            commander,
            phase: BattlePhase::SelectQuest,
        };
        bot.register_templates()?;

        log::info!("Stage count set to {}", bot.settings.quest.stage_count);
        log::info!("AP strategy is {:?}", bot.settings.ap_strategy);
        Ok(bot)
    }

    fn register_templates(&mut self) -> Result<(), BotError> {
        let recognizer = &mut self.commander.recognizer;
        recognizer.register_template(markers::QUEST, &self.settings.quest.image, TemplateRole::Quest)?;
        for (index, path) in self.settings.support.images.iter().enumerate() {
            recognizer.register_template(&markers::support(index), path, TemplateRole::Support)?;
        }
        log::info!("Support count is {}", self.settings.support.images.len());
        Ok(())
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn commander(&self) -> &Commander<C, M> {
        &self.commander
    }

    /// The handler table, for installing a battle script
    pub fn actions_mut(&mut self) -> &mut ActionTable {
        &mut self.table
    }

    /// Register the handler run the first time `stage` is seen
    pub fn at_stage<F>(&mut self, stage: u32, handler: F) -> Result<&mut Self, ScriptError>
    where
        F: FnMut(&mut dyn BattleCommands) -> Result<(), ActionError> + 'static,
    {
        self.table.register_primary(stage, handler)?;
        Ok(self)
    }

    /// Register the handler run when `stage` did not clear
    pub fn fallback<F>(&mut self, stage: u32, handler: F) -> Result<&mut Self, ScriptError>
    where
        F: FnMut(&mut dyn BattleCommands) -> Result<(), ActionError> + 'static,
    {
        self.table.register_fallback(stage, handler)?;
        Ok(self)
    }

    fn set_phase(&mut self, phase: BattlePhase) {
        if self.phase != phase {
            log::debug!("Phase: {}", phase);
            self.phase = phase;
        }
    }

    /// Check the handler table before the first battle
    fn prepare(&mut self) -> Result<(), BotError> {
        if let Some(&stage) = self.table.missing_primaries().first() {
            log::error!("Stage {} has no handler", stage);
            return Err(BotError::MissingHandler(stage));
        }

        let filled = self.table.fill_missing_fallbacks();
        if !filled.is_empty() {
            log::warn!("No fallback for stages {:?}, attacking with any cards there", filled);
        }
        log::info!("Handlers filled");
        Ok(())
    }

    /// Enter a battle and wait for its first command phase.
    ///
    /// `from_quest` starts at the quest list; otherwise the bot is already
    /// past the result screen's "continue". Returns `false` when AP ran out.
    fn enter_battle(&mut self, from_quest: bool) -> Result<bool, BotError> {
        if from_quest {
            self.select_quest()?;
        }

        let kind = self.classify_entry()?;
        let Some(list) = self.enter_quest(kind)? else {
            return Ok(false);
        };

        if from_quest {
            self.select_class();
        }
        self.select_support(list)?;

        self.set_phase(BattlePhase::TeamConfirm);
        let short = self.commander.timings.short();
        let budget = self.commander.budgets.battle_start;
        let recognizer = &mut self.commander.recognizer;
        if from_quest {
            log::info!("Select team");
            if !recognizer.wait_until_tap(markers::START_QUEST, short, budget) {
                return Err(BotError::Timeout {
                    marker: markers::START_QUEST.to_string(),
                    phase: BattlePhase::TeamConfirm,
                });
            }
        }

        log::info!("wait...");
        recognizer.wait(self.commander.timings.long());
        if !recognizer.wait_until(markers::ATTACK, short, budget) {
            return Err(BotError::Timeout {
                marker: markers::ATTACK.to_string(),
                phase: BattlePhase::TeamConfirm,
            });
        }
        log::info!("Entered battle");
        Ok(true)
    }

    /// Play up to `max_loops` battles.
    ///
    /// Running out of AP or the "continue" button ends the run with `Ok`;
    /// unrecognizable screens, exhausted wait budgets and failing handlers
    /// end it with an error.
    pub fn run(&mut self) -> Result<RunSummary, BotError> {
        self.prepare()?;

        let mut rounds = Vec::new();
        let mut stop_reason = StopReason::Completed;
        let mut from_quest = true;

        for _ in 0..self.settings.max_loops {
            log::info!("Entering battle...");
            if !self.enter_battle(from_quest)? {
                log::info!("Quitting...");
                stop_reason = StopReason::ApExhausted;
                break;
            }

            let played = match self.play_battle() {
                Ok(played) => played,
                Err(e) => {
                    log::error!(
                        "Battle {} interrupted: {}",
                        rounds.len() + 1,
                        e
                    );
                    return Err(e);
                }
            };
            rounds.push(played);
            log::info!("Battle {} complete, {} rounds played", rounds.len(), played);

            match self.end_battle(rounds.len() as u32)? {
                AfterBattle::Continue => from_quest = false,
                AfterBattle::Reselect => from_quest = true,
                AfterBattle::Stop(reason) => {
                    stop_reason = reason;
                    break;
                }
            }
        }

        self.set_phase(BattlePhase::Finished);
        log::info!("{} battles played in total ({})", rounds.len(), stop_reason);
        Ok(RunSummary {
            rounds,
            stop_reason,
        })
    }
}
