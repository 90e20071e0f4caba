//! Recognition facade
//!
//! Combines a `Controller` and a `ScreenMatcher` into the primitives the
//! orchestrator reads the game through: "does X appear", "find and tap X",
//! and "wait until X appears". Every read is a confidence check against a
//! threshold. Faults never escape: they are logged and read as "not there".

use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::Duration;

use image::RgbImage;

use super::{MatchResult, ScreenMatcher, TemplateRole, VisionError};
use crate::android::{Controller, Point, Rect};
use crate::config::RecognitionSettings;
use crate::stealth::{Humanizer, StealthConfig};

pub struct Recognizer<C: Controller, M: ScreenMatcher> {
    controller: C,
    matcher: M,
    /// Most recently captured (prepared) screen
    screen: Option<RgbImage>,
    default_threshold: f32,
    /// Per-template threshold overrides
    thresholds: HashMap<String, f32>,
    stealth: StealthConfig,
    humanizer: Humanizer,
}

impl<C: Controller, M: ScreenMatcher> Recognizer<C, M> {
    pub fn new(
        controller: C,
        matcher: M,
        settings: &RecognitionSettings,
        stealth: StealthConfig,
    ) -> Self {
        Self {
            controller,
            matcher,
            screen: None,
            default_threshold: settings.default_threshold,
            thresholds: settings.thresholds.clone(),
            stealth,
            humanizer: Humanizer::new(),
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Capture a new screen. On failure the previous screen is kept.
    pub fn refresh(&mut self) -> bool {
        match self.controller.capture_screen() {
            Some(screen) => {
                self.screen = Some(self.matcher.prepare(screen));
                log::trace!("Screen updated");
                true
            }
            None => {
                log::warn!("Screen capture failed, keeping previous screen");
                false
            }
        }
    }

    /// Threshold for `name`: per-call override, then per-template, then default
    pub fn threshold_for(&self, name: &str, threshold: Option<f32>) -> f32 {
        threshold
            .or_else(|| self.thresholds.get(name).copied())
            .unwrap_or(self.default_threshold)
    }

    fn best_match(&mut self, name: &str) -> Option<MatchResult> {
        if self.screen.is_none() && !self.refresh() {
            return None;
        }
        let screen = self.screen.as_ref()?;

        match self.matcher.match_template(screen, name) {
            Ok(result) => Some(result),
            Err(e @ VisionError::UnknownTemplate(_)) => {
                log::error!("Unexpected image name: {}", e);
                None
            }
            Err(e) => {
                log::error!("Matching {} failed: {}", name, e);
                None
            }
        }
    }

    /// Raw best-match confidence of `name` against the current screen.
    ///
    /// Unknown templates and matching faults read as 0.
    pub fn probability(&mut self, name: &str) -> f32 {
        self.best_match(name).map_or(0.0, |m| m.confidence)
    }

    /// Whether `name` is on the current screen with confidence >= threshold
    pub fn exists(&mut self, name: &str, threshold: Option<f32>) -> bool {
        let threshold = self.threshold_for(name, threshold);
        self.probability(name) >= threshold
    }

    /// Capture a new screen, then check `exists`
    pub fn refresh_and_exists(&mut self, name: &str, threshold: Option<f32>) -> bool {
        self.refresh();
        self.exists(name, threshold)
    }

    /// Best match of `name` if it clears the threshold
    pub fn locate(&mut self, name: &str, threshold: Option<f32>) -> Option<MatchResult> {
        let threshold = self.threshold_for(name, threshold);
        self.best_match(name)
            .filter(|m| m.confidence >= threshold)
    }

    /// Tap a random point inside the best match of `name`.
    ///
    /// Performs no input and returns `false` when below threshold.
    pub fn find_and_tap(&mut self, name: &str, threshold: Option<f32>) -> bool {
        match self.locate(name, threshold) {
            Some(m) => {
                log::debug!("Found {} ({:.3}), tapping", name, m.confidence);
                self.controller.tap_in_rect(m.rect)
            }
            None => {
                log::debug!("{} not found on screen", name);
                false
            }
        }
    }

    pub fn tap(&mut self, point: Point) -> bool {
        self.controller.tap(point)
    }

    pub fn tap_in_rect(&mut self, rect: Rect) -> bool {
        self.controller.tap_in_rect(rect)
    }

    pub fn swipe(&mut self, from: Point, to: Point, duration: Duration) -> bool {
        self.controller.swipe(from, to, duration)
    }

    /// Sleep the control flow, with jitter when timing humanization is on
    pub fn wait(&mut self, duration: Duration) {
        let duration = if self.stealth.humanize_timing {
            self.humanizer
                .humanize_delay(duration, self.stealth.timing_variance_percent)
        } else {
            duration
        };
        if !duration.is_zero() {
            log::trace!("Sleep {:?}", duration);
            thread::sleep(duration);
        }
    }

    /// Sleep, then capture a new screen
    pub fn wait_and_refresh(&mut self, duration: Duration) {
        self.wait(duration);
        self.refresh();
    }

    /// Poll until `name` appears.
    ///
    /// Re-captures before every check and sleeps `interval` between checks.
    /// With a `limit`, gives up (returns `false`) after that many checks;
    /// without one, blocks until found.
    pub fn wait_until(&mut self, name: &str, interval: Duration, limit: Option<u32>) -> bool {
        log::debug!("Wait until {} appears", name);
        self.poll(interval, limit, |r| r.refresh_and_exists(name, None))
    }

    /// Poll until `name` appears, then tap it
    pub fn wait_until_tap(&mut self, name: &str, interval: Duration, limit: Option<u32>) -> bool {
        log::debug!("Wait until {} appears, then tap", name);
        self.poll(interval, limit, |r| {
            r.refresh();
            r.find_and_tap(name, None)
        })
    }

    /// Poll until `name` disappears
    pub fn wait_while(&mut self, name: &str, interval: Duration, limit: Option<u32>) -> bool {
        log::debug!("Wait while {} is shown", name);
        self.poll(interval, limit, |r| !r.refresh_and_exists(name, None))
    }

    /// Run `check` until it returns `true`, sleeping `interval` between
    /// attempts. `limit` caps the number of attempts.
    pub fn poll<F>(&mut self, interval: Duration, limit: Option<u32>, mut check: F) -> bool
    where
        F: FnMut(&mut Self) -> bool,
    {
        let mut attempts = 0u32;
        loop {
            if check(self) {
                return true;
            }
            attempts += 1;
            if limit.is_some_and(|limit| attempts >= limit) {
                return false;
            }
            self.wait(interval);
        }
    }

    /// Register an extra template by path under a logical name
    pub fn register_template(
        &mut self,
        name: &str,
        path: &Path,
        role: TemplateRole,
    ) -> Result<(), VisionError> {
        self.matcher.register(name, path, role)?;
        log::debug!("Registered {:?} template {} from {}", role, name, path.display());
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.matcher.contains(name)
    }
}
