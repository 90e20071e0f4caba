//! Stage handlers
//!
//! A battle script is a table of callbacks keyed by stage: one primary
//! handler that runs the first time a stage is seen, and one fallback that
//! runs whenever the stage is seen again. Handlers drive the game through
//! `BattleCommands`.

use std::collections::BTreeMap;
use std::fmt;

use super::cards::CardChoice;
use super::{ActionError, ScriptError};

/// Enemy targeted when a script does not name one (rightmost)
pub const DEFAULT_ENEMY: u8 = 3;

/// In-battle actions available to a stage handler.
///
/// Servants, skills and targets are 1-based as shown on screen.
pub trait BattleCommands {
    /// Use a servant skill. A skill that asks for a target without one
    /// given waits for the player to pick it by hand.
    fn use_skill(&mut self, servant: u8, skill: u8, target: Option<u8>) -> Result<(), ActionError>;

    /// Use a skill that asks whether to reinforce it
    fn use_reinforced_skill(
        &mut self,
        servant: u8,
        skill: u8,
        target: Option<u8>,
        reinforce: bool,
    ) -> Result<(), ActionError>;

    /// Target an enemy (1-3, left to right), then use a servant skill
    fn use_skill_on_enemy(&mut self, servant: u8, skill: u8, enemy: u8) -> Result<(), ActionError>;

    /// Use a master skill. Order change takes a front member (1-3) in
    /// `target` and a back member (4-6) in `target2`.
    fn use_master_skill(
        &mut self,
        skill: u8,
        target: Option<u8>,
        target2: Option<u8>,
    ) -> Result<(), ActionError>;

    /// Target an enemy, then use a master skill
    fn use_master_skill_on_enemy(&mut self, skill: u8, enemy: u8) -> Result<(), ActionError>;

    /// Spend a command spell to charge a servant's NP
    fn use_spell(&mut self, servant: u8) -> Result<(), ActionError>;

    /// Target an enemy, open the card selection and pick three cards
    fn attack(&mut self, cards: &[CardChoice], enemy: u8) -> Result<(), ActionError>;
}

pub type StageHandler = Box<dyn FnMut(&mut dyn BattleCommands) -> Result<(), ActionError>>;

fn attack_any(commands: &mut dyn BattleCommands) -> Result<(), ActionError> {
    let any = [CardChoice::Wildcard, CardChoice::Wildcard, CardChoice::Wildcard];
    commands.attack(&any, DEFAULT_ENEMY)
}

/// Fallback used for stages the script leaves without one: any three cards
pub fn default_fallback() -> StageHandler {
    Box::new(attack_any)
}

/// Primary and fallback handlers per stage
pub struct ActionTable {
    stage_count: u32,
    primary: BTreeMap<u32, StageHandler>,
    fallback: BTreeMap<u32, StageHandler>,
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTable")
            .field("stage_count", &self.stage_count)
            .field("primary", &self.primary.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionTable {
    pub fn new(stage_count: u32) -> Self {
        Self {
            stage_count,
            primary: BTreeMap::new(),
            fallback: BTreeMap::new(),
        }
    }

    pub fn stage_count(&self) -> u32 {
        self.stage_count
    }

    fn check_stage(&self, stage: u32) -> Result<(), ScriptError> {
        if (1..=self.stage_count).contains(&stage) {
            Ok(())
        } else {
            Err(ScriptError::StageOutOfRange {
                stage,
                stage_count: self.stage_count,
            })
        }
    }

    /// Register the handler run the first time `stage` is seen
    pub fn register_primary<F>(&mut self, stage: u32, handler: F) -> Result<&mut Self, ScriptError>
    where
        F: FnMut(&mut dyn BattleCommands) -> Result<(), ActionError> + 'static,
    {
        self.check_stage(stage)?;
        if self.primary.contains_key(&stage) {
            return Err(ScriptError::DuplicatePrimary(stage));
        }
        log::debug!("Handler registered to stage {}", stage);
        self.primary.insert(stage, Box::new(handler));
        Ok(self)
    }

    /// Register the handler run when `stage` did not clear
    pub fn register_fallback<F>(&mut self, stage: u32, handler: F) -> Result<&mut Self, ScriptError>
    where
        F: FnMut(&mut dyn BattleCommands) -> Result<(), ActionError> + 'static,
    {
        self.check_stage(stage)?;
        if self.fallback.contains_key(&stage) {
            return Err(ScriptError::DuplicateFallback(stage));
        }
        log::debug!("Fallback registered to stage {}", stage);
        self.fallback.insert(stage, Box::new(handler));
        Ok(self)
    }

    /// Give every stage without a fallback the default one.
    ///
    /// Returns the stages that were filled.
    pub fn fill_missing_fallbacks(&mut self) -> Vec<u32> {
        let missing: Vec<u32> = (1..=self.stage_count)
            .filter(|stage| !self.fallback.contains_key(stage))
            .collect();
        for &stage in &missing {
            log::debug!("Default fallback registered to stage {}", stage);
            self.fallback.insert(stage, default_fallback());
        }
        missing
    }

    /// Stages without a primary handler
    pub fn missing_primaries(&self) -> Vec<u32> {
        (1..=self.stage_count)
            .filter(|stage| !self.primary.contains_key(stage))
            .collect()
    }

    pub fn has_primary(&self, stage: u32) -> bool {
        self.primary.contains_key(&stage)
    }

    pub fn has_fallback(&self, stage: u32) -> bool {
        self.fallback.contains_key(&stage)
    }

    pub fn primary_mut(&mut self, stage: u32) -> Option<&mut StageHandler> {
        self.primary.get_mut(&stage)
    }

    pub fn fallback_mut(&mut self, stage: u32) -> Option<&mut StageHandler> {
        self.fallback.get_mut(&stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Command, CommandLog};

    #[test]
    fn test_duplicate_primary_rejected() {
        let mut table = ActionTable::new(3);
        table.register_primary(1, |c| c.use_skill(1, 1, None)).unwrap();
        assert!(matches!(
            table.register_primary(1, |c| c.use_skill(1, 2, None)),
            Err(ScriptError::DuplicatePrimary(1))
        ));

        // the first registration is kept
        let mut log = CommandLog::default();
        (table.primary_mut(1).unwrap())(&mut log).unwrap();
        assert_eq!(log.commands, vec![Command::Skill(1, 1, None)]);
    }

    #[test]
    fn test_duplicate_fallback_rejected() {
        let mut table = ActionTable::new(3);
        table.register_fallback(2, |_| Ok(())).unwrap();
        assert!(matches!(
            table.register_fallback(2, |_| Ok(())),
            Err(ScriptError::DuplicateFallback(2))
        ));
    }

    #[test]
    fn test_stage_out_of_range() {
        let mut table = ActionTable::new(3);
        assert!(matches!(
            table.register_primary(0, |_| Ok(())),
            Err(ScriptError::StageOutOfRange { stage: 0, .. })
        ));
        assert!(matches!(
            table.register_fallback(4, |_| Ok(())),
            Err(ScriptError::StageOutOfRange { stage: 4, stage_count: 3 })
        ));
    }

    #[test]
    fn test_missing_fallback_gets_default() {
        let mut table = ActionTable::new(3);
        table
            .register_fallback(1, |c| c.use_skill(2, 2, None))
            .unwrap()
            .register_fallback(3, |c| c.use_skill(3, 3, None))
            .unwrap();

        assert_eq!(table.fill_missing_fallbacks(), vec![2]);
        assert!((1..=3).all(|stage| table.has_fallback(stage)));

        let mut log = CommandLog::default();
        (table.fallback_mut(2).unwrap())(&mut log).unwrap();
        assert_eq!(
            log.commands,
            vec![Command::Attack(vec![CardChoice::Wildcard; 3], DEFAULT_ENEMY)]
        );

        // registered fallbacks are untouched
        (table.fallback_mut(1).unwrap())(&mut log).unwrap();
        assert_eq!(log.commands[1], Command::Skill(2, 2, None));
        assert_eq!(table.fill_missing_fallbacks(), Vec::<u32>::new());
    }

    #[test]
    fn test_missing_primaries() {
        let mut table = ActionTable::new(3);
        table.register_primary(2, |_| Ok(())).unwrap();
        assert_eq!(table.missing_primaries(), vec![1, 3]);
    }
}
