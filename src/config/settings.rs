//! Bot settings
//!
//! Everything the orchestrator needs at construction time. Loaded from a
//! JSON file; every section falls back to its defaults when omitted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ButtonLayout, ConfigError};
use crate::android::CaptureMethod;
use crate::game::{ApItem, SupportClass};
use crate::stealth::StealthConfig;

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub quest: QuestSettings,
    pub support: SupportSettings,
    /// AP recovery items, tried in order. Empty means stop when AP runs out.
    pub ap_strategy: Vec<ApItem>,
    /// Maximum number of battles in one run
    pub max_loops: u32,
    /// Re-enter from quest selection on every battle instead of using
    /// the result screen's "continue" button
    pub reselect_each_loop: bool,
    pub recognition: RecognitionSettings,
    pub device: DeviceSettings,
    pub timings: TimingSettings,
    pub budgets: PollBudgets,
    pub buttons: ButtonLayout,
    pub stealth: StealthConfig,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            quest: QuestSettings::default(),
            support: SupportSettings::default(),
            ap_strategy: Vec::new(),
            max_loops: 3,
            reselect_each_loop: false,
            recognition: RecognitionSettings::default(),
            device: DeviceSettings::default(),
            timings: TimingSettings::default(),
            budgets: PollBudgets::default(),
            buttons: ButtonLayout::default(),
            stealth: StealthConfig::default(),
        }
    }
}

impl BotSettings {
    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quest.stage_count == 0 {
            return Err(ConfigError::Invalid("stage_count must be at least 1".into()));
        }
        if self.max_loops == 0 {
            return Err(ConfigError::Invalid("max_loops must be at least 1".into()));
        }
        if self.support.images.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one support image is required".into(),
            ));
        }

        check_threshold("quest.threshold", self.quest.threshold)?;
        check_threshold("support.threshold", self.support.threshold)?;
        check_threshold(
            "recognition.default_threshold",
            self.recognition.default_threshold,
        )?;
        for (name, threshold) in &self.recognition.thresholds {
            check_threshold(name, *threshold)?;
        }
        if let Some((name, _)) = self.budgets.all().into_iter().find(|(_, b)| *b == Some(0)) {
            return Err(ConfigError::Invalid(format!(
                "budgets.{} must be at least 1 when set",
                name
            )));
        }
        let unbounded = self.budgets.unbounded();
        if !unbounded.is_empty() {
            log::warn!("Waits without a poll budget: {}", unbounded.join(", "));
        }
        if !(self.recognition.match_scale > 0.0 && self.recognition.match_scale <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "recognition.match_scale must be in (0, 1], got {}",
                self.recognition.match_scale
            )));
        }
        Ok(())
    }
}

fn check_threshold(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "threshold {} must be in (0, 1], got {}",
            name, value
        )))
    }
}

/// Target quest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestSettings {
    /// Screenshot of the quest in the quest list
    pub image: PathBuf,
    pub threshold: f32,
    /// Number of stages (waves) in the quest
    pub stage_count: u32,
}

impl Default for QuestSettings {
    fn default() -> Self {
        Self {
            image: PathBuf::from("quest.png"),
            threshold: 0.97,
            stage_count: 3,
        }
    }
}

/// Support selection criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportSettings {
    pub class: SupportClass,
    /// Acceptable support thumbnails, in preference order
    pub images: Vec<PathBuf>,
    pub threshold: f32,
    /// Swipes down the list before refreshing it
    pub max_swipes: u32,
    /// Refreshes before giving up; `None` keeps refreshing
    pub max_refreshes: Option<u32>,
}

impl Default for SupportSettings {
    fn default() -> Self {
        Self {
            class: SupportClass::All,
            images: vec![PathBuf::from("support.png")],
            threshold: 0.97,
            max_swipes: 5,
            max_refreshes: None,
        }
    }
}

/// Recognition facade settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    pub default_threshold: f32,
    /// Per-template threshold overrides
    pub thresholds: HashMap<String, f32>,
    /// Built-in marker and button templates
    pub template_dir: PathBuf,
    /// Where preferred-card templates are looked up by name
    pub card_template_dir: PathBuf,
    /// Screens and templates are downscaled by this factor before matching
    pub match_scale: f32,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            default_threshold: 0.85,
            thresholds: HashMap::new(),
            template_dir: PathBuf::from("images"),
            card_template_dir: PathBuf::from("."),
            match_scale: 1.0,
        }
    }
}

/// Device connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// adb executable
    pub adb: PathBuf,
    /// Address to `adb connect` to, e.g. an emulator port
    pub address: Option<String>,
    pub capture: CaptureMethod,
    /// Timeout of a single adb command (ms)
    pub command_timeout: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            adb: PathBuf::from("adb"),
            address: None,
            capture: CaptureMethod::Shell,
            command_timeout: 15_000,
        }
    }
}

impl DeviceSettings {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout)
    }
}

/// Wait intervals (ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Pop-up windows and most other waits
    pub short_wait: u64,
    /// Loading the support list
    pub mid_wait: u64,
    /// Loading a battle, attack animations
    pub long_wait: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            short_wait: 1000,
            mid_wait: 4000,
            long_wait: 20_000,
        }
    }
}

impl TimingSettings {
    /// No waiting at all
    pub fn instant() -> Self {
        Self {
            short_wait: 0,
            mid_wait: 0,
            long_wait: 0,
        }
    }

    pub fn short(&self) -> Duration {
        Duration::from_millis(self.short_wait)
    }

    pub fn mid(&self) -> Duration {
        Duration::from_millis(self.mid_wait)
    }

    pub fn long(&self) -> Duration {
        Duration::from_millis(self.long_wait)
    }
}

/// Poll-count budgets for the orchestrator's waits.
///
/// Every wait is bounded by default, sized for the default timings: about
/// one to three minutes of polling, ten for a manual operation. Setting a
/// budget to `null` polls until the marker shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollBudgets {
    /// Swipes through the quest list
    pub quest_search: Option<u32>,
    /// Probes for the quest entry sub-state
    pub entry_check: Option<u32>,
    /// Checks while the support list loads
    pub support_loading: Option<u32>,
    /// Checks for the list marker after one refresh
    pub support_refresh: Option<u32>,
    /// Checks for "attack" after the battle loads
    pub battle_start: Option<u32>,
    /// Checks for "bond" or "attack" after a handler ran
    pub turn_end: Option<u32>,
    /// Checks for in-battle markers (attack, card selection)
    pub marker: Option<u32>,
    /// Taps through the result screens
    pub result_screens: Option<u32>,
    /// Checks for the main menu after closing the result screen
    pub menu: Option<u32>,
    /// Checks while waiting for a manual operation
    pub manual: Option<u32>,
}

impl Default for PollBudgets {
    fn default() -> Self {
        Self {
            // 20 swipes at the short interval
            quest_search: Some(20),
            entry_check: Some(3),
            // 2 min at twice the short interval
            support_loading: Some(60),
            support_refresh: Some(10),
            // 2 min at the short interval, after the long wait
            battle_start: Some(120),
            // 3 min of attack and NP animations at twice the short interval
            turn_end: Some(90),
            marker: Some(60),
            result_screens: Some(60),
            menu: Some(60),
            // 10 min at twice the short interval
            manual: Some(300),
        }
    }
}

impl PollBudgets {
    fn all(&self) -> [(&'static str, Option<u32>); 10] {
        [
            ("quest_search", self.quest_search),
            ("entry_check", self.entry_check),
            ("support_loading", self.support_loading),
            ("support_refresh", self.support_refresh),
            ("battle_start", self.battle_start),
            ("turn_end", self.turn_end),
            ("marker", self.marker),
            ("result_screens", self.result_screens),
            ("menu", self.menu),
            ("manual", self.manual),
        ]
    }

    /// Names of the waits that poll without a limit
    pub fn unbounded(&self) -> Vec<&'static str> {
        self.all()
            .into_iter()
            .filter(|(_, budget)| budget.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    /// Every wait bounded by `limit` checks
    pub fn bounded(limit: u32) -> Self {
        Self {
            quest_search: Some(limit),
            entry_check: Some(limit),
            support_loading: Some(limit),
            support_refresh: Some(limit),
            battle_start: Some(limit),
            turn_end: Some(limit),
            marker: Some(limit),
            result_screens: Some(limit),
            menu: Some(limit),
            manual: Some(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = BotSettings::default();
        assert_eq!(settings.quest.threshold, 0.97);
        assert_eq!(settings.quest.stage_count, 3);
        assert_eq!(settings.support.max_swipes, 5);
        assert_eq!(settings.max_loops, 3);
        assert!(!settings.reselect_each_loop);
        assert_eq!(settings.recognition.default_threshold, 0.85);
        assert_eq!(settings.timings.long(), Duration::from_secs(20));
        assert!(settings.ap_strategy.is_empty());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "quest": {{ "image": "wg.png", "threshold": 0.9 }},
                "support": {{ "class": "assassin", "images": ["a.png", "b.png"] }},
                "ap_strategy": ["silver_apple", "gold_apple"],
                "recognition": {{ "thresholds": {{ "bond": 0.8 }} }},
                "device": {{ "address": "127.0.0.1:16384", "capture": "sdcard_pull" }}
            }}"#
        )
        .unwrap();

        let settings = BotSettings::load(file.path()).unwrap();
        assert_eq!(settings.quest.image, PathBuf::from("wg.png"));
        assert_eq!(settings.quest.stage_count, 3);
        assert_eq!(settings.support.class, SupportClass::Assassin);
        assert_eq!(settings.support.images.len(), 2);
        assert_eq!(settings.ap_strategy, vec![ApItem::SilverApple, ApItem::GoldApple]);
        assert_eq!(settings.recognition.thresholds.get("bond"), Some(&0.8));
        assert_eq!(settings.device.capture, CaptureMethod::SdcardPull);
        assert_eq!(settings.device.address.as_deref(), Some("127.0.0.1:16384"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut settings = BotSettings::default();
        settings.quest.stage_count = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));

        let mut settings = BotSettings::default();
        settings.support.threshold = 1.5;
        assert!(settings.validate().is_err());

        let mut settings = BotSettings::default();
        settings.support.images.clear();
        assert!(settings.validate().is_err());

        let mut settings = BotSettings::default();
        settings.recognition.thresholds.insert("attack".into(), 0.0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_every_wait_bounded_by_default() {
        let budgets = PollBudgets::default();
        assert!(budgets.unbounded().is_empty());
        assert!(budgets.all().iter().all(|(_, b)| b.is_some_and(|b| b > 0)));
    }

    #[test]
    fn test_null_budget_opts_out() {
        let settings: BotSettings =
            serde_json::from_str(r#"{ "budgets": { "manual": null, "menu": 5 } }"#).unwrap();
        assert_eq!(settings.budgets.manual, None);
        assert_eq!(settings.budgets.menu, Some(5));
        assert_eq!(settings.budgets.turn_end, PollBudgets::default().turn_end);
        assert_eq!(settings.budgets.unbounded(), vec!["manual"]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut settings = BotSettings::default();
        settings.budgets.turn_end = Some(0);
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            BotSettings::load(file.path()),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            BotSettings::load(Path::new("/nonexistent/settings.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
