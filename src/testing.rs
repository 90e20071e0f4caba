//! Test doubles for the device and matcher seams

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::time::Duration;

use image::RgbImage;

use crate::android::{Controller, Point, Rect};
use crate::config::RecognitionSettings;
use crate::game::{ActionError, BattleCommands, CardChoice};
use crate::stealth::StealthConfig;
use crate::vision::{MatchResult, Recognizer, ScreenMatcher, TemplateRole, VisionError};

/// Input recorded by `FakeController`
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Tap(Point),
    TapInRect(Rect),
    Swipe(Point, Point),
}

/// Controller that records input and returns a blank screen
#[derive(Debug, Default)]
pub struct FakeController {
    pub inputs: Vec<Input>,
    pub captures: u32,
    pub fail_capture: bool,
}

impl FakeController {
    /// Recorded taps (exact or in-rect), in order
    pub fn taps(&self) -> Vec<Input> {
        self.inputs
            .iter()
            .filter(|i| !matches!(i, Input::Swipe(..)))
            .cloned()
            .collect()
    }

    pub fn swipes(&self) -> usize {
        self.inputs
            .iter()
            .filter(|i| matches!(i, Input::Swipe(..)))
            .count()
    }
}

impl Controller for FakeController {
    fn tap(&mut self, point: Point) -> bool {
        self.inputs.push(Input::Tap(point));
        true
    }

    fn tap_in_rect(&mut self, rect: Rect) -> bool {
        self.inputs.push(Input::TapInRect(rect));
        true
    }

    fn swipe(&mut self, from: Point, to: Point, _duration: Duration) -> bool {
        self.inputs.push(Input::Swipe(from, to));
        true
    }

    fn capture_screen(&mut self) -> Option<RgbImage> {
        if self.fail_capture {
            return None;
        }
        self.captures += 1;
        Some(RgbImage::new(1, 1))
    }
}

/// Default bounding box reported for a match
pub const DEFAULT_MATCH_RECT: Rect = Rect::new(100, 100, 40, 40);

/// Matcher that replays scripted confidences.
///
/// Each call to `match_template` consumes the next confidence for that name;
/// the last value repeats forever. Registered names without a script read 0.
/// Anything else is an unknown template.
#[derive(Debug, Default)]
pub struct ScriptedMatcher {
    scores: RefCell<HashMap<String, VecDeque<f32>>>,
    rects: HashMap<String, Rect>,
    registered: HashMap<String, TemplateRole>,
    reject: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, confidence: f32) {
        self.sequence(name, &[confidence]);
    }

    pub fn sequence(&mut self, name: &str, confidences: &[f32]) {
        self.scores
            .borrow_mut()
            .insert(name.to_string(), confidences.iter().copied().collect());
    }

    pub fn place(&mut self, name: &str, rect: Rect) {
        self.rects.insert(name.to_string(), rect);
    }

    /// Make `register` fail for this name
    pub fn reject(&mut self, name: &str) {
        self.reject.insert(name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == name).count()
    }

    pub fn role(&self, name: &str) -> Option<TemplateRole> {
        self.registered.get(name).copied()
    }
}

impl ScreenMatcher for ScriptedMatcher {
    fn match_template(&self, _screen: &RgbImage, name: &str) -> Result<MatchResult, VisionError> {
        self.calls.borrow_mut().push(name.to_string());

        let mut scores = self.scores.borrow_mut();
        let confidence = match scores.get_mut(name) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(0.0),
            Some(queue) => queue.front().copied().unwrap_or(0.0),
            None if self.registered.contains_key(name) => 0.0,
            None => return Err(VisionError::UnknownTemplate(name.to_string())),
        };

        Ok(MatchResult {
            confidence,
            rect: self.rects.get(name).copied().unwrap_or(DEFAULT_MATCH_RECT),
        })
    }

    fn register(&mut self, name: &str, path: &Path, role: TemplateRole) -> Result<(), VisionError> {
        if self.reject.contains(name) {
            return Err(VisionError::NotFound(path.to_path_buf()));
        }
        self.registered.insert(name.to_string(), role);
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.scores.borrow().contains_key(name) || self.registered.contains_key(name)
    }
}

/// Recognizer over the fakes with default thresholds and exact timings
pub fn test_recognizer(matcher: ScriptedMatcher) -> Recognizer<FakeController, ScriptedMatcher> {
    Recognizer::new(
        FakeController::default(),
        matcher,
        &RecognitionSettings::default(),
        StealthConfig::disabled(),
    )
}

/// Command recorded by `CommandLog`
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Skill(u8, u8, Option<u8>),
    ReinforcedSkill(u8, u8, Option<u8>, bool),
    SkillOnEnemy(u8, u8, u8),
    MasterSkill(u8, Option<u8>, Option<u8>),
    MasterSkillOnEnemy(u8, u8),
    Spell(u8),
    Attack(Vec<CardChoice>, u8),
}

/// `BattleCommands` that only records what it was asked to do
#[derive(Debug, Default)]
pub struct CommandLog {
    pub commands: Vec<Command>,
}

impl BattleCommands for CommandLog {
    fn use_skill(&mut self, servant: u8, skill: u8, target: Option<u8>) -> Result<(), ActionError> {
        self.commands.push(Command::Skill(servant, skill, target));
        Ok(())
    }

    fn use_reinforced_skill(
        &mut self,
        servant: u8,
        skill: u8,
        target: Option<u8>,
        reinforce: bool,
    ) -> Result<(), ActionError> {
        self.commands
            .push(Command::ReinforcedSkill(servant, skill, target, reinforce));
        Ok(())
    }

    fn use_skill_on_enemy(&mut self, servant: u8, skill: u8, enemy: u8) -> Result<(), ActionError> {
        self.commands.push(Command::SkillOnEnemy(servant, skill, enemy));
        Ok(())
    }

    fn use_master_skill(
        &mut self,
        skill: u8,
        target: Option<u8>,
        target2: Option<u8>,
    ) -> Result<(), ActionError> {
        self.commands.push(Command::MasterSkill(skill, target, target2));
        Ok(())
    }

    fn use_master_skill_on_enemy(&mut self, skill: u8, enemy: u8) -> Result<(), ActionError> {
        self.commands.push(Command::MasterSkillOnEnemy(skill, enemy));
        Ok(())
    }

    fn use_spell(&mut self, servant: u8) -> Result<(), ActionError> {
        self.commands.push(Command::Spell(servant));
        Ok(())
    }

    fn attack(&mut self, cards: &[CardChoice], enemy: u8) -> Result<(), ActionError> {
        self.commands.push(Command::Attack(cards.to_vec(), enemy));
        Ok(())
    }
}
