//! Stealth and anti-detection module
//!
//! Tap positions are always randomized inside the target rectangle; wait
//! intervals can additionally be jittered.

pub mod humanize;

use serde::{Deserialize, Serialize};

pub use humanize::Humanizer;

/// Configuration for stealth behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealthConfig {
    /// Jitter every wait interval
    pub humanize_timing: bool,
    /// Delay variance percentage (0-100)
    pub timing_variance_percent: u32,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            humanize_timing: true,
            timing_variance_percent: 20,
        }
    }
}

impl StealthConfig {
    /// Exact timings (for testing)
    pub fn disabled() -> Self {
        Self {
            humanize_timing: false,
            timing_variance_percent: 0,
        }
    }
}
