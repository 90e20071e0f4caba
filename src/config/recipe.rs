//! Battle recipes
//!
//! A recipe is the JSON form of a battle script: for each stage, the
//! actions to run the first time it is seen and, optionally, the actions
//! to run when it did not clear.
//!
//! ```json
//! {
//!   "stages": [
//!     {
//!       "stage": 1,
//!       "actions": [
//!         { "type": "skill", "servant": 1, "skill": 2 },
//!         { "type": "skill", "servant": 1, "skill": 3, "target": 2 },
//!         { "type": "attack", "cards": [6, "artsAlcas", "any"] }
//!       ],
//!       "fallback": [{ "type": "attack", "cards": ["any", "any", "any"], "enemy": 1 }]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;
use crate::game::{ActionError, ActionTable, BattleCommands, CardChoice, ScriptError, DEFAULT_ENEMY};

/// A battle script
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recipe {
    pub stages: Vec<StagePlan>,
}

/// Actions for one stage
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StagePlan {
    pub stage: u32,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub fallback: Option<Vec<Action>>,
}

fn default_enemy() -> u8 {
    DEFAULT_ENEMY
}

/// One scripted battle action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Skill {
        servant: u8,
        skill: u8,
        target: Option<u8>,
        /// Answer to the reinforce prompt, for skills that ask
        reinforce: Option<bool>,
    },
    SkillOnEnemy {
        servant: u8,
        skill: u8,
        #[serde(default = "default_enemy")]
        enemy: u8,
    },
    MasterSkill {
        skill: u8,
        target: Option<u8>,
        target2: Option<u8>,
    },
    MasterSkillOnEnemy {
        skill: u8,
        #[serde(default = "default_enemy")]
        enemy: u8,
    },
    Spell {
        servant: u8,
    },
    Attack {
        cards: Vec<CardChoice>,
        #[serde(default = "default_enemy")]
        enemy: u8,
    },
}

impl Action {
    pub fn perform(&self, commands: &mut dyn BattleCommands) -> Result<(), ActionError> {
        match self {
            Action::Skill {
                servant,
                skill,
                target,
                reinforce: None,
            } => commands.use_skill(*servant, *skill, *target),
            Action::Skill {
                servant,
                skill,
                target,
                reinforce: Some(reinforce),
            } => commands.use_reinforced_skill(*servant, *skill, *target, *reinforce),
            Action::SkillOnEnemy {
                servant,
                skill,
                enemy,
            } => commands.use_skill_on_enemy(*servant, *skill, *enemy),
            Action::MasterSkill {
                skill,
                target,
                target2,
            } => commands.use_master_skill(*skill, *target, *target2),
            Action::MasterSkillOnEnemy { skill, enemy } => {
                commands.use_master_skill_on_enemy(*skill, *enemy)
            }
            Action::Spell { servant } => commands.use_spell(*servant),
            Action::Attack { cards, enemy } => commands.attack(cards, *enemy),
        }
    }
}

fn perform_all(actions: &[Action], commands: &mut dyn BattleCommands) -> Result<(), ActionError> {
    for action in actions {
        action.perform(commands)?;
    }
    Ok(())
}

impl Recipe {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let recipe = Self::from_json(&text)?;
        log::debug!(
            "Loaded recipe with {} stages from {}",
            recipe.stages.len(),
            path.display()
        );
        Ok(recipe)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Register every stage's actions (and fallback) in `table`
    pub fn install(&self, table: &mut ActionTable) -> Result<(), ScriptError> {
        for plan in &self.stages {
            let actions = plan.actions.clone();
            table.register_primary(plan.stage, move |commands| perform_all(&actions, commands))?;

            if let Some(fallback) = &plan.fallback {
                let actions = fallback.clone();
                table.register_fallback(plan.stage, move |commands| {
                    perform_all(&actions, commands)
                })?;
            }
        }
        Ok(())
    }
}
