//! Quest entry
//!
//! Finds the quest in the quest list, works out which dialog opened after
//! tapping it, restores AP when needed, and waits for the support list.

use super::{ap, BattleBot, BotError};
use crate::android::Controller;
use crate::game::BattlePhase;
use crate::vision::{markers, ScreenMatcher};

/// The dialog shown after tapping a quest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Enough AP, standard quest: the support list opens
    Standard,
    /// Enough AP, storm-call quest: one more confirmation first
    Storm,
    /// Not enough AP, standard quest
    RecoverStandard,
    /// Not enough AP, storm-call quest
    RecoverStorm,
}

impl EntryKind {
    /// Probe order
    pub const PRIORITY: [EntryKind; 4] = [
        EntryKind::Standard,
        EntryKind::Storm,
        EntryKind::RecoverStandard,
        EntryKind::RecoverStorm,
    ];

    pub fn marker(&self) -> &'static str {
        match self {
            EntryKind::Standard => markers::ENTRY_SUPPORT,
            EntryKind::Storm => markers::ENTRY_CONFIRM,
            EntryKind::RecoverStandard => markers::ENTRY_AP_STANDARD,
            EntryKind::RecoverStorm => markers::ENTRY_AP_STORM,
        }
    }

    pub fn needs_ap(&self) -> bool {
        matches!(self, EntryKind::RecoverStandard | EntryKind::RecoverStorm)
    }
}

/// State of the support list once it has loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportList {
    Loaded,
    Empty,
}

impl<C: Controller, M: ScreenMatcher> BattleBot<C, M> {
    /// Scroll the quest list until the quest shows up, then tap it
    pub(crate) fn select_quest(&mut self) -> Result<(), BotError> {
        self.set_phase(BattlePhase::SelectQuest);
        log::info!("Trying to select quest");

        let threshold = Some(self.settings.quest.threshold);
        let swipe = self.settings.buttons.quest_swipe;
        let short = self.commander.timings.short();
        let budget = self.commander.budgets.quest_search;

        let recognizer = &mut self.commander.recognizer;
        recognizer.refresh();
        let mut swipes = 0u32;
        while !recognizer.find_and_tap(markers::QUEST, threshold) {
            if budget.is_some_and(|limit| swipes >= limit) {
                log::error!("Quest not found after {} swipes", swipes);
                return Err(BotError::QuestNotFound);
            }
            swipes += 1;
            recognizer.swipe(swipe.from, swipe.to, swipe.duration());
            recognizer.wait_and_refresh(short);
        }

        recognizer.wait_and_refresh(self.commander.timings.mid());
        Ok(())
    }

    /// Probe the entry markers in priority order, tapping the first found
    pub(crate) fn classify_entry(&mut self) -> Result<EntryKind, BotError> {
        self.set_phase(BattlePhase::QuestEntry);
        let interval = self.commander.timings.short();
        let limit = self.commander.budgets.entry_check;

        let mut found = None;
        self.commander.recognizer.poll(interval, limit, |r| {
            r.refresh();
            found = EntryKind::PRIORITY
                .into_iter()
                .find(|kind| r.find_and_tap(kind.marker(), None));
            found.is_some()
        });

        match found {
            Some(kind) => {
                log::debug!("Quest entry: {:?}", kind);
                Ok(kind)
            }
            None => {
                log::error!(
                    "Quest entry not recognized, adjust the wait timings or check the entry templates"
                );
                Err(BotError::UnrecognizedEntry)
            }
        }
    }

    /// Get from the tapped entry dialog to a loaded support list.
    ///
    /// `None` when AP ran out and could not be restored.
    pub(crate) fn enter_quest(&mut self, kind: EntryKind) -> Result<Option<SupportList>, BotError> {
        if kind.needs_ap() {
            self.set_phase(BattlePhase::ApRecovery);
            let interval = self.commander.timings.short();
            if !ap::recover_ap(
                &mut self.commander.recognizer,
                &self.settings.ap_strategy,
                interval,
            ) {
                return Ok(None);
            }

            if kind == EntryKind::RecoverStorm {
                let recognizer = &mut self.commander.recognizer;
                recognizer.wait_and_refresh(interval * 2);
                recognizer.find_and_tap(markers::ENTRY_CONFIRM, None);
            }
        }

        self.wait_support_list().map(Some)
    }

    /// Wait for the support list to finish loading
    pub(crate) fn wait_support_list(&mut self) -> Result<SupportList, BotError> {
        self.set_phase(BattlePhase::SelectSupport);
        let interval = self.commander.timings.short() * 2;
        let limit = self.commander.budgets.support_loading;

        let mut list = None;
        self.commander.recognizer.poll(interval, limit, |r| {
            r.refresh();
            if r.exists(markers::SUPPORT_LIST, None) {
                list = Some(SupportList::Loaded);
            } else if r.exists(markers::NO_SUPPORT, None) {
                list = Some(SupportList::Empty);
            }
            list.is_some()
        });

        list.ok_or_else(|| BotError::Timeout {
            marker: markers::SUPPORT_LIST.to_string(),
            phase: BattlePhase::SelectSupport,
        })
    }
}
