//! battlebot - play a scripted FGO battle on an Android device
//!
//! Loads the settings and a JSON recipe, attaches to the device over adb,
//! and runs the configured number of battles.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fgo_battlebot::android::{AdbDevice, AdbTransport};
use fgo_battlebot::bot::BattleBot;
use fgo_battlebot::config::{BotSettings, Recipe};
use fgo_battlebot::vision::{TemplateCatalog, TemplateMatcher};

#[derive(Parser)]
#[command(name = "battlebot")]
#[command(version, about = "Play scripted FGO battles over adb")]
struct Cli {
    /// Settings file (JSON)
    #[arg(short, long, default_value = "settings.json")]
    settings: PathBuf,

    /// Battle recipe (JSON)
    #[arg(short, long)]
    recipe: PathBuf,

    /// Device address to `adb connect` to, e.g. 127.0.0.1:16384
    #[arg(short, long, env = "BATTLEBOT_DEVICE")]
    connect: Option<String>,

    /// Number of battles to play
    #[arg(short, long)]
    loops: Option<u32>,

    /// Debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut settings = BotSettings::load(&cli.settings)
        .with_context(|| format!("loading settings from {}", cli.settings.display()))?;
    if let Some(loops) = cli.loops {
        settings.max_loops = loops;
    }
    if cli.connect.is_some() {
        settings.device.address = cli.connect;
    }
    settings.validate()?;

    let recipe = Recipe::load(&cli.recipe)
        .with_context(|| format!("loading recipe from {}", cli.recipe.display()))?;

    let transport = AdbTransport::new(&settings.device.adb, settings.device.command_timeout());
    let mut device = AdbDevice::new(transport, settings.device.capture);
    if device.device_count()? != 1 {
        if let Some(address) = &settings.device.address {
            device
                .connect(address, false)
                .with_context(|| format!("connecting to {}", address))?;
        }
    }
    device.ensure_single_device()?;
    match device.screen_size() {
        Ok((w, h)) => log::info!("Device screen is {}x{}", w, h),
        Err(e) => log::warn!("Cannot read screen size: {}", e),
    }

    let recognition = &settings.recognition;
    let catalog = TemplateCatalog::load_dir(&recognition.template_dir, recognition.match_scale)
        .with_context(|| format!("loading templates from {}", recognition.template_dir.display()))?;
    log::info!("Loaded {} templates", catalog.len());
    let matcher = TemplateMatcher::new(catalog);

    let mut bot = BattleBot::new(device, matcher, settings)?;
    recipe.install(bot.actions_mut())?;

    let summary = bot.run()?;
    println!(
        "{} battles played, {} rounds in total ({})",
        summary.battles(),
        summary.total_rounds(),
        summary.stop_reason
    );
    Ok(())
}
