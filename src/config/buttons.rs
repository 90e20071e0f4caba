//! Fixed button coordinates
//!
//! Positions of every button the bot taps without recognizing it first,
//! for a 1280x720 screen. Grids (skills, cards, targets) are a base
//! position plus a per-step distance.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::android::{Point, Rect};
use crate::game::SupportClass;

/// A swipe gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swipe {
    pub from: Point,
    pub to: Point,
    /// Gesture length (ms)
    #[serde(default = "default_swipe_ms")]
    pub duration: u64,
}

fn default_swipe_ms() -> u64 {
    500
}

impl Swipe {
    pub fn new(from: Point, to: Point) -> Self {
        Self {
            from,
            to,
            duration: default_swipe_ms(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration)
    }
}

/// Button layout of the game UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonLayout {
    /// Neutral spot used to skip animations and dismiss result screens
    pub center: Point,
    /// Scrolls the quest list
    pub quest_swipe: Swipe,
    /// Scrolls the support list
    pub support_swipe: Swipe,

    /// "All" class filter on the support screen
    pub support_class_all: Point,
    pub support_class_distance: i32,
    pub refresh_supports: Point,
    pub refresh_supports_confirm: Point,

    /// "Next" on the result screen
    pub next_step: Point,

    /// Skill 1 of servant 1
    pub skill: Point,
    pub servant_distance: i32,
    pub skill_distance: i32,
    pub skill_reinforce_yes: Point,
    pub skill_reinforce_no: Point,

    /// Target servant 1 of a skill
    pub skill_target: Point,
    pub skill_target_distance: i32,

    pub master_skill_menu: Point,
    /// Master skill 1
    pub master_skill: Point,
    pub master_skill_distance: i32,

    /// Party member 1 in the order-change dialog
    pub order_change: Point,
    pub order_change_distance: i32,

    /// Enemy 1 (leftmost)
    pub enemy: Point,
    pub enemy_distance: i32,

    pub spell: Point,
    pub spell_np: Point,
    pub spell_confirm: Point,

    pub attack: Point,
    /// Normal command card 1
    pub normal_card: Rect,
    pub normal_card_distance: i32,
    /// Noble phantasm card 1
    pub noble_card: Rect,
    pub noble_card_distance: i32,
}

impl Default for ButtonLayout {
    fn default() -> Self {
        Self {
            center: Point::new(590, 230),
            quest_swipe: Swipe::new(Point::new(1000, 600), Point::new(1000, 250)),
            support_swipe: Swipe::new(Point::new(640, 600), Point::new(640, 250)),
            support_class_all: Point::new(80, 170),
            support_class_distance: 64,
            refresh_supports: Point::new(835, 125),
            refresh_supports_confirm: Point::new(830, 565),
            next_step: Point::new(1100, 670),
            skill: Point::new(60, 580),
            servant_distance: 318,
            skill_distance: 88,
            skill_reinforce_yes: Point::new(850, 450),
            skill_reinforce_no: Point::new(430, 450),
            skill_target: Point::new(330, 430),
            skill_target_distance: 310,
            master_skill_menu: Point::new(1200, 320),
            master_skill: Point::new(910, 320),
            master_skill_distance: 88,
            order_change: Point::new(130, 360),
            order_change_distance: 200,
            enemy: Point::new(80, 50),
            enemy_distance: 240,
            spell: Point::new(1225, 520),
            spell_np: Point::new(640, 300),
            spell_confirm: Point::new(840, 540),
            attack: Point::new(1150, 610),
            normal_card: Rect::new(70, 430, 170, 210),
            normal_card_distance: 256,
            noble_card: Rect::new(330, 130, 140, 200),
            noble_card_distance: 230,
        }
    }
}

impl ButtonLayout {
    /// Class filter button on the support screen
    pub fn support_class(&self, class: SupportClass) -> Point {
        self.support_class_all
            .offset_x(self.support_class_distance, class.filter_index())
    }

    /// Skill button; servant and skill are 1-based
    pub fn skill(&self, servant: u8, skill: u8) -> Point {
        self.skill
            .offset_x(self.servant_distance, i32::from(servant) - 1)
            .offset_x(self.skill_distance, i32::from(skill) - 1)
    }

    /// Target servant of a skill; 1-based
    pub fn skill_target(&self, target: u8) -> Point {
        self.skill_target
            .offset_x(self.skill_target_distance, i32::from(target) - 1)
    }

    /// Master skill button; 1-based
    pub fn master_skill(&self, skill: u8) -> Point {
        self.master_skill
            .offset_x(self.master_skill_distance, i32::from(skill) - 1)
    }

    /// Party member in the order-change dialog; 1-based, 1-6
    pub fn order_change(&self, member: u8) -> Point {
        self.order_change
            .offset_x(self.order_change_distance, i32::from(member) - 1)
    }

    /// Enemy target; 1-based, left to right
    pub fn enemy(&self, enemy: u8) -> Point {
        self.enemy.offset_x(self.enemy_distance, i32::from(enemy) - 1)
    }

    /// Normal card area; `index` is 0-based
    pub fn normal_card(&self, index: usize) -> Rect {
        self.normal_card
            .offset_x(self.normal_card_distance, index as i32)
    }

    /// Noble phantasm card area; `index` is 0-based
    pub fn noble_card(&self, index: usize) -> Rect {
        self.noble_card
            .offset_x(self.noble_card_distance, index as i32)
    }

    /// 0-based normal card slot under screen column `x`
    pub fn normal_card_at(&self, x: i32) -> Option<usize> {
        if x < self.normal_card.x || self.normal_card_distance <= 0 {
            return None;
        }
        let index = ((x - self.normal_card.x) / self.normal_card_distance) as usize;
        (index < 5).then_some(index)
    }
}
