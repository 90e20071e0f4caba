//! Servant classes
//!
//! Only the class filter of the support screen is needed here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Class filter buttons on the support screen, left to right
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportClass {
    #[default]
    All,
    Saber,
    Archer,
    Lancer,
    Rider,
    Caster,
    Assassin,
    Berserker,
    /// Ruler, Avenger, Moon Cancer, Alter Ego, Foreigner, ...
    Extra,
}

impl SupportClass {
    /// Position of the filter button, 0 for "all"
    pub fn filter_index(&self) -> i32 {
        match self {
            SupportClass::All => 0,
            SupportClass::Saber => 1,
            SupportClass::Archer => 2,
            SupportClass::Lancer => 3,
            SupportClass::Rider => 4,
            SupportClass::Caster => 5,
            SupportClass::Assassin => 6,
            SupportClass::Berserker => 7,
            SupportClass::Extra => 8,
        }
    }
}

impl fmt::Display for SupportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SupportClass::All => "all",
            SupportClass::Saber => "saber",
            SupportClass::Archer => "archer",
            SupportClass::Lancer => "lancer",
            SupportClass::Rider => "rider",
            SupportClass::Caster => "caster",
            SupportClass::Assassin => "assassin",
            SupportClass::Berserker => "berserker",
            SupportClass::Extra => "extra",
        };
        f.write_str(name)
    }
}
