//! Command card choices
//!
//! An attack picks exactly three cards. Each pick is a fixed normal slot
//! (1-5), a noble phantasm (6-8), "any unselected normal card", or a
//! preferred card found on screen by template name.

use std::fmt;

use serde::Deserialize;

use super::ActionError;

/// Number of normal command cards dealt each turn
pub const NORMAL_CARDS: usize = 5;
/// Cards picked per attack
pub const CARDS_PER_ATTACK: usize = 3;

/// One pick in an attack
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawCard")]
pub enum CardChoice {
    /// Normal card in slot 1-5, left to right
    Normal(u8),
    /// Noble phantasm card 6-8, for servants 1-3
    Noble(u8),
    /// Leftmost normal card not selected yet
    Wildcard,
    /// Normal card matching this template; a wildcard when not on screen
    Preferred(String),
}

impl CardChoice {
    /// Fixed card by number: 1-5 normal, 6-8 noble phantasm
    pub fn slot(number: u8) -> Result<Self, ActionError> {
        match number {
            1..=5 => Ok(CardChoice::Normal(number)),
            6..=8 => Ok(CardChoice::Noble(number)),
            _ => Err(ActionError::CardOutOfRange(number)),
        }
    }

    pub fn preferred(name: impl Into<String>) -> Self {
        CardChoice::Preferred(name.into())
    }

    /// Card number for fixed choices
    pub fn number(&self) -> Option<u8> {
        match self {
            CardChoice::Normal(n) | CardChoice::Noble(n) => Some(*n),
            _ => None,
        }
    }

    /// 0-based normal slot for `Normal` choices
    pub fn normal_index(&self) -> Option<usize> {
        match self {
            CardChoice::Normal(n) => usize::from(*n).checked_sub(1),
            _ => None,
        }
    }
}

impl fmt::Display for CardChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardChoice::Normal(n) => write!(f, "card {}", n),
            CardChoice::Noble(n) => write!(f, "noble phantasm {}", n - 5),
            CardChoice::Wildcard => write!(f, "any card"),
            CardChoice::Preferred(name) => write!(f, "preferred card {}", name),
        }
    }
}

/// Recipe form of a card: a number or a name
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCard {
    Number(u8),
    Name(String),
}

impl TryFrom<RawCard> for CardChoice {
    type Error = ActionError;

    fn try_from(raw: RawCard) -> Result<Self, Self::Error> {
        match raw {
            RawCard::Number(n) => CardChoice::slot(n),
            RawCard::Name(name) if name == "any" => Ok(CardChoice::Wildcard),
            RawCard::Name(name) => Ok(CardChoice::Preferred(name)),
        }
    }
}

/// Check an attack's card list: exactly three picks, fixed cards in
/// range and not repeated.
pub fn validate_cards(cards: &[CardChoice]) -> Result<(), ActionError> {
    if cards.len() != CARDS_PER_ATTACK {
        return Err(ActionError::CardCount(cards.len()));
    }

    let mut seen = Vec::with_capacity(CARDS_PER_ATTACK);
    for card in cards {
        match card {
            CardChoice::Normal(n) if !(1..=5).contains(n) => {
                return Err(ActionError::CardOutOfRange(*n))
            }
            CardChoice::Noble(n) if !(6..=8).contains(n) => {
                return Err(ActionError::CardOutOfRange(*n))
            }
            _ => {}
        }
        if let Some(n) = card.number() {
            if seen.contains(&n) {
                return Err(ActionError::DuplicateCard(n));
            }
            seen.push(n);
        }
    }
    Ok(())
}

/// Unselected normal cards of the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSlots {
    free: [bool; NORMAL_CARDS],
}

impl Default for CardSlots {
    fn default() -> Self {
        Self {
            free: [true; NORMAL_CARDS],
        }
    }
}

impl CardSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `cards` and reserve every fixed normal slot up front, so
    /// wildcards and preferred cards only see what is left.
    pub fn for_attack(cards: &[CardChoice]) -> Result<Self, ActionError> {
        validate_cards(cards)?;
        let mut slots = Self::new();
        for index in cards.iter().filter_map(CardChoice::normal_index) {
            slots.take(index);
        }
        Ok(slots)
    }

    pub fn is_free(&self, index: usize) -> bool {
        self.free.get(index).copied().unwrap_or(false)
    }

    /// Mark `index` selected; returns whether it was free
    pub fn take(&mut self, index: usize) -> bool {
        match self.free.get_mut(index) {
            Some(free) if *free => {
                *free = false;
                true
            }
            _ => false,
        }
    }

    /// Select the leftmost free slot
    pub fn take_leftmost(&mut self) -> Result<usize, ActionError> {
        let index = self
            .free
            .iter()
            .position(|free| *free)
            .ok_or(ActionError::CardsExhausted)?;
        self.free[index] = false;
        Ok(index)
    }

    pub fn remaining(&self) -> usize {
        self.free.iter().filter(|free| **free).count()
    }
}
