//! FGO Battlebot - scripted Fate/Grand Order battle automation over adb
//!
//! This library drives an Android device through adb, reads the game screen
//! with template matching, and plays battles from a per-stage script of
//! skills and card choices.
//!
//! ## Layout
//!
//! - `android`: adb transport and the device controller (taps, swipes, screenshots)
//! - `vision`: screenshot decoding, the template catalog, matching and the
//!   recognition facade
//! - `game`: card choices, AP items, stage handlers and battle progress
//! - `bot`: the battle orchestrator and the in-battle action primitives
//! - `config`: settings, the button layout and JSON recipes
//!
//! ## Anti-Detection
//!
//! The `stealth` module randomizes tap positions inside their target and
//! can add variance to every wait.
//!
//! ## Example
//!
//! ```no_run
//! use fgo_battlebot::android::{AdbDevice, AdbTransport, CaptureMethod};
//! use fgo_battlebot::bot::BattleBot;
//! use fgo_battlebot::config::BotSettings;
//! use fgo_battlebot::game::CardChoice;
//! use fgo_battlebot::vision::{TemplateCatalog, TemplateMatcher};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = BotSettings::default();
//! let device = AdbDevice::new(AdbTransport::default(), CaptureMethod::Shell);
//! let catalog = TemplateCatalog::load_dir(&settings.recognition.template_dir, 1.0)?;
//! let mut bot = BattleBot::new(device, TemplateMatcher::new(catalog), settings)?;
//!
//! bot.at_stage(1, |c| {
//!     c.use_skill(1, 2, None)?;
//!     c.attack(&[CardChoice::Noble(6), CardChoice::Wildcard, CardChoice::Wildcard], 3)
//! })?;
//! bot.at_stage(2, |c| c.attack(&[CardChoice::Noble(7), CardChoice::Normal(1), CardChoice::Wildcard], 3))?;
//! bot.at_stage(3, |c| c.attack(&[CardChoice::Noble(8), CardChoice::Wildcard, CardChoice::Wildcard], 3))?;
//!
//! let summary = bot.run()?;
//! println!("{} battles played", summary.battles());
//! # Ok(())
//! # }
//! ```

pub mod android;
pub mod bot;
pub mod config;
pub mod game;
pub mod stealth;
pub mod vision;

#[cfg(test)]
mod testing;

pub use bot::{BattleBot, BotError};
pub use config::BotSettings;
pub use game::{BattleCommands, CardChoice, RunSummary, StopReason};
