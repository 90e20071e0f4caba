//! Support selection

use super::entry::SupportList;
use super::{BattleBot, BotError};
use crate::android::Controller;
use crate::game::BattlePhase;
use crate::vision::{markers, ScreenMatcher};

impl<C: Controller, M: ScreenMatcher> BattleBot<C, M> {
    /// Tap the class filter of the support list
    pub(crate) fn select_class(&mut self) {
        let class = self.settings.support.class;
        log::info!("Select support class {}", class);
        let button = self.settings.buttons.support_class(class);
        let recognizer = &mut self.commander.recognizer;
        recognizer.tap(button);
        recognizer.wait_and_refresh(self.commander.timings.short() / 2);
    }

    /// Scan the list for an acceptable support and tap it.
    ///
    /// Swipes down the list up to `max_swipes` times, then re-rolls it and
    /// starts over.
    pub(crate) fn select_support(&mut self, list: SupportList) -> Result<(), BotError> {
        self.set_phase(BattlePhase::SelectSupport);
        log::info!("Trying to select support");

        let mut refreshes = 0u32;
        if list == SupportList::Empty {
            self.refresh_support_list(&mut refreshes)?;
        }

        let threshold = Some(self.settings.support.threshold);
        let candidates = self.settings.support.images.len();
        let max_swipes = self.settings.support.max_swipes;
        let swipe = self.settings.buttons.support_swipe;
        let short = self.commander.timings.short();

        let mut swipes = 0u32;
        loop {
            let recognizer = &mut self.commander.recognizer;
            for index in 0..candidates {
                if recognizer.find_and_tap(&markers::support(index), threshold) {
                    log::info!("Support {} selected", index);
                    recognizer.wait(short);
                    return Ok(());
                }
            }

            if swipes < max_swipes {
                swipes += 1;
                log::debug!("No support found, swipe {}/{}", swipes, max_swipes);
                recognizer.swipe(swipe.from, swipe.to, swipe.duration());
                recognizer.wait_and_refresh(short);
            } else {
                swipes = 0;
                self.refresh_support_list(&mut refreshes)?;
            }
        }
    }

    /// Re-roll the support list until it shows up again
    fn refresh_support_list(&mut self, refreshes: &mut u32) -> Result<(), BotError> {
        let short = self.commander.timings.short();
        let limit = self.commander.budgets.support_refresh;
        let refresh = self.settings.buttons.refresh_supports;
        let confirm = self.settings.buttons.refresh_supports_confirm;

        loop {
            if self
                .settings
                .support
                .max_refreshes
                .is_some_and(|max| *refreshes >= max)
            {
                log::error!("No acceptable support after {} refreshes", refreshes);
                return Err(BotError::SupportNotFound);
            }
            *refreshes += 1;
            log::info!("Refreshing support list");

            let recognizer = &mut self.commander.recognizer;
            recognizer.tap(refresh);
            recognizer.wait(short);
            recognizer.tap(confirm);
            if recognizer.wait_until(markers::SUPPORT_LIST, short, limit) {
                return Ok(());
            }
        }
    }
}
