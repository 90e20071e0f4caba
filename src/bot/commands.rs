//! In-battle action primitives
//!
//! `Commander` turns skill, master skill, spell and attack requests into
//! taps on the fixed button grid, using the recognition facade only to
//! notice prompts (target selection, order change) and to wait for the
//! command phase to come back.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::android::{Controller, Point};
use crate::config::{ButtonLayout, PollBudgets, TimingSettings};
use crate::game::{ActionError, BattleCommands, CardChoice, CardSlots};
use crate::vision::{markers, Recognizer, ScreenMatcher, TemplateRole};

pub struct Commander<C: Controller, M: ScreenMatcher> {
    pub(crate) recognizer: Recognizer<C, M>,
    pub(crate) buttons: ButtonLayout,
    pub(crate) timings: TimingSettings,
    pub(crate) budgets: PollBudgets,
    /// Preferred-card templates are `<name>.png` in here
    card_template_dir: PathBuf,
    /// Preferred cards whose template could not be loaded
    missing_cards: HashSet<String>,
}

impl<C: Controller, M: ScreenMatcher> Commander<C, M> {
    pub fn new(
        recognizer: Recognizer<C, M>,
        buttons: ButtonLayout,
        timings: TimingSettings,
        budgets: PollBudgets,
        card_template_dir: PathBuf,
    ) -> Self {
        Self {
            recognizer,
            buttons,
            timings,
            budgets,
            card_template_dir,
            missing_cards: HashSet::new(),
        }
    }

    pub fn recognizer(&self) -> &Recognizer<C, M> {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut Recognizer<C, M> {
        &mut self.recognizer
    }

    fn tap_and_wait(&mut self, point: Point, wait: Duration) {
        self.recognizer.tap(point);
        self.recognizer.wait(wait);
    }

    fn wait_for_marker(&mut self, marker: &str, interval: Duration) -> Result<(), ActionError> {
        if self
            .recognizer
            .wait_until(marker, interval, self.budgets.marker)
        {
            Ok(())
        } else {
            Err(ActionError::Timeout(marker.to_string()))
        }
    }

    /// Tap to speed up the skill animation, then wait for the command phase
    fn finish_skill(&mut self) -> Result<(), ActionError> {
        let short = self.timings.short();
        self.tap_and_wait(self.buttons.center, short);
        self.wait_for_marker(markers::ATTACK, short)
    }

    /// Let the player resolve a prompt by hand; resumes once `marker` is gone
    fn wait_manual(&mut self, marker: &str) -> Result<(), ActionError> {
        log::info!("Finish this action by hand, the bot resumes once it is done");
        let interval = self.timings.short() * 2;
        if self
            .recognizer
            .wait_while(marker, interval, self.budgets.manual)
        {
            log::info!("Resume battle");
            Ok(())
        } else {
            Err(ActionError::Timeout(marker.to_string()))
        }
    }

    fn choose_enemy(&mut self, enemy: u8) -> Result<(), ActionError> {
        if !(1..=3).contains(&enemy) {
            return Err(ActionError::EnemyOutOfRange(enemy));
        }
        self.recognizer.tap(self.buttons.enemy(enemy));
        Ok(())
    }

    /// Tap a servant as skill target, or hand over when none usable is given
    fn choose_servant(&mut self, target: Option<u8>, what: &str) -> Result<(), ActionError> {
        match target {
            Some(target) if (1..=3).contains(&target) => {
                log::info!("Chose {} target {}", what, target);
                self.recognizer.tap(self.buttons.skill_target(target));
                Ok(())
            }
            Some(target) => {
                log::warn!("Target {} of {} is not a servant on the field", target, what);
                self.wait_manual(markers::CHOOSE_TARGET)
            }
            None => {
                log::warn!("Specify a target for {}", what);
                self.wait_manual(markers::CHOOSE_TARGET)
            }
        }
    }

    fn skill(
        &mut self,
        servant: u8,
        skill: u8,
        target: Option<u8>,
        reinforce: Option<bool>,
    ) -> Result<(), ActionError> {
        if !(1..=3).contains(&servant) || !(1..=3).contains(&skill) {
            return Err(ActionError::SkillOutOfRange { servant, skill });
        }

        let short = self.timings.short();
        log::info!("Used skill ({}, {})", servant, skill);
        self.tap_and_wait(self.buttons.skill(servant, skill), short);

        if let Some(reinforce) = reinforce {
            let button = if reinforce {
                self.buttons.skill_reinforce_yes
            } else {
                self.buttons.skill_reinforce_no
            };
            self.tap_and_wait(button, short / 2);
        }

        if self
            .recognizer
            .refresh_and_exists(markers::CHOOSE_TARGET, None)
        {
            let what = format!("servant {} skill {}", servant, skill);
            self.choose_servant(target, &what)?;
        }

        self.finish_skill()
    }

    /// Order change: swap front member `front` (1-3) with back member `back` (4-6)
    fn order_change(&mut self, front: Option<u8>, back: Option<u8>) -> Result<(), ActionError> {
        match (front, back) {
            (Some(front), Some(back)) if (1..=3).contains(&front) && (4..=6).contains(&back) => {
                self.recognizer.tap(self.buttons.order_change(front));
                self.tap_and_wait(self.buttons.order_change(back), self.timings.short());
                log::info!("Chose order change members ({}, {})", front, back);

                self.recognizer.refresh();
                self.recognizer
                    .find_and_tap(markers::ORDER_CHANGE_CONFIRM, None);
                log::info!("Order change");
                Ok(())
            }
            (Some(front), Some(back)) => {
                log::warn!("Order change members ({}, {}) are not valid", front, back);
                self.wait_manual(markers::ORDER_CHANGE)
            }
            _ => {
                log::warn!("Specify both members for order change");
                self.wait_manual(markers::ORDER_CHANGE)
            }
        }
    }

    /// Tap the leftmost unselected normal card
    fn pick_any(&mut self, slots: &mut CardSlots) -> Result<(), ActionError> {
        let index = slots.take_leftmost()?;
        log::info!("Choose card {}", index + 1);
        self.recognizer.tap_in_rect(self.buttons.normal_card(index));
        Ok(())
    }

    /// Load a preferred-card template on first use
    fn ensure_card_template(&mut self, name: &str) -> bool {
        if self.recognizer.has_template(name) {
            return true;
        }
        if self.missing_cards.contains(name) {
            return false;
        }

        let path = self.card_template_dir.join(format!("{}.png", name));
        match self
            .recognizer
            .register_template(name, &path, TemplateRole::PreferredCard)
        {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Cannot load preferred card {}: {}", name, e);
                self.missing_cards.insert(name.to_string());
                false
            }
        }
    }

    /// Tap the card matching `name`, or any card when it is not in hand
    fn pick_preferred(&mut self, name: &str, slots: &mut CardSlots) -> Result<(), ActionError> {
        if self.ensure_card_template(name) {
            if let Some(found) = self.recognizer.locate(name, None) {
                match self.buttons.normal_card_at(found.rect.center().x) {
                    Some(index) if slots.take(index) => {
                        log::info!("Choose {} (card {})", name, index + 1);
                        self.recognizer.tap_in_rect(found.rect);
                        return Ok(());
                    }
                    _ => log::debug!("{} matched an unavailable card", name),
                }
            }
        }

        log::info!("No preferred card {} found, select at random", name);
        self.pick_any(slots)
    }
}

impl<C: Controller, M: ScreenMatcher> BattleCommands for Commander<C, M> {
    fn use_skill(&mut self, servant: u8, skill: u8, target: Option<u8>) -> Result<(), ActionError> {
        self.skill(servant, skill, target, None)
    }

    fn use_reinforced_skill(
        &mut self,
        servant: u8,
        skill: u8,
        target: Option<u8>,
        reinforce: bool,
    ) -> Result<(), ActionError> {
        self.skill(servant, skill, target, Some(reinforce))
    }

    fn use_skill_on_enemy(&mut self, servant: u8, skill: u8, enemy: u8) -> Result<(), ActionError> {
        log::info!("Servant {} skill {} on enemy {}", servant, skill, enemy);
        self.choose_enemy(enemy)?;
        self.skill(servant, skill, None, None)
    }

    fn use_master_skill(
        &mut self,
        skill: u8,
        target: Option<u8>,
        target2: Option<u8>,
    ) -> Result<(), ActionError> {
        if !(1..=3).contains(&skill) {
            return Err(ActionError::MasterSkillOutOfRange(skill));
        }

        let short = self.timings.short();
        self.tap_and_wait(self.buttons.master_skill_menu, short);
        self.tap_and_wait(self.buttons.master_skill(skill), short);
        log::info!("Used master skill {}", skill);

        if self
            .recognizer
            .refresh_and_exists(markers::CHOOSE_TARGET, None)
        {
            self.choose_servant(target, &format!("master skill {}", skill))?;
        } else if self.recognizer.exists(markers::ORDER_CHANGE, None) {
            self.order_change(target, target2)?;
        }

        self.finish_skill()
    }

    fn use_master_skill_on_enemy(&mut self, skill: u8, enemy: u8) -> Result<(), ActionError> {
        log::info!("Master skill {} on enemy {}", skill, enemy);
        self.choose_enemy(enemy)?;
        self.use_master_skill(skill, None, None)
    }

    fn use_spell(&mut self, servant: u8) -> Result<(), ActionError> {
        let half = self.timings.short() / 2;
        for button in [
            self.buttons.spell,
            self.buttons.spell_np,
            self.buttons.spell_confirm,
        ] {
            self.tap_and_wait(button, half);
        }

        if (1..=3).contains(&servant) {
            log::info!("Spell used on servant {}", servant);
            self.recognizer.tap(self.buttons.skill_target(servant));
        } else {
            log::warn!("Spell target {} should be 1, 2 or 3", servant);
            self.wait_manual(markers::CHOOSE_TARGET)?;
        }

        self.recognizer.tap(self.buttons.center);
        self.wait_for_marker(markers::ATTACK, self.timings.short() * 2)
    }

    fn attack(&mut self, cards: &[CardChoice], enemy: u8) -> Result<(), ActionError> {
        let mut slots = CardSlots::for_attack(cards)?;
        self.choose_enemy(enemy)?;

        self.recognizer.tap(self.buttons.attack);
        self.wait_for_marker(markers::CARD_SELECTION, self.timings.short())?;

        let half = self.timings.short() / 2;
        for card in cards {
            match card {
                CardChoice::Normal(n) => {
                    log::info!("Choose card {}", n);
                    self.recognizer
                        .tap_in_rect(self.buttons.normal_card(usize::from(*n) - 1));
                }
                CardChoice::Noble(n) => {
                    log::info!("Choose noble phantasm {}", n - 5);
                    self.recognizer
                        .tap_in_rect(self.buttons.noble_card(usize::from(*n) - 6));
                }
                CardChoice::Wildcard => self.pick_any(&mut slots)?,
                CardChoice::Preferred(name) => self.pick_preferred(name, &mut slots)?,
            }
            self.recognizer.wait_and_refresh(half);
        }

        log::info!("wait...");
        self.recognizer.wait(self.timings.long());
        Ok(())
    }
}
