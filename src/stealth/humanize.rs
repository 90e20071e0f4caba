//! Human behavior simulation for anti-detection
//!
//! Adds variance to tap positions and wait intervals so the input stream
//! never repeats the exact same pixel or the exact same timing.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::android::{Point, Rect};

/// Shortest delay a humanized wait is allowed to shrink to
const MIN_DELAY: Duration = Duration::from_millis(50);

/// How many times to re-roll a tap position that equals the previous one
const MAX_REROLLS: usize = 8;

/// Humanizer for generating varied timing and positions
pub struct Humanizer {
    rng: StdRng,
    last_tap: Option<Point>,
}

impl Default for Humanizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Humanizer {
    /// Create a new humanizer seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            last_tap: None,
        }
    }

    /// Create a reproducible humanizer
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last_tap: None,
        }
    }

    /// Pick a random point inside `rect`.
    ///
    /// Re-rolls when the pick equals the previous tap, so consecutive taps
    /// never land on the same pixel unless the rect is a single pixel.
    pub fn point_in_rect(&mut self, rect: Rect) -> Point {
        let w = rect.w.max(1);
        let h = rect.h.max(1);

        let mut point = self.roll(rect.x, rect.y, w, h);
        if w * h > 1 {
            for _ in 0..MAX_REROLLS {
                if Some(point) != self.last_tap {
                    break;
                }
                point = self.roll(rect.x, rect.y, w, h);
            }
            if Some(point) == self.last_tap {
                // Still unlucky: step to the neighbouring pixel.
                point = if point.x + 1 < rect.x + w {
                    Point::new(point.x + 1, point.y)
                } else if point.x > rect.x {
                    Point::new(point.x - 1, point.y)
                } else if point.y + 1 < rect.y + h {
                    Point::new(point.x, point.y + 1)
                } else {
                    Point::new(point.x, point.y - 1)
                };
            }
        }

        self.last_tap = Some(point);
        point
    }

    fn roll(&mut self, x: i32, y: i32, w: i32, h: i32) -> Point {
        Point::new(
            self.rng.gen_range(x..x + w),
            self.rng.gen_range(y..y + h),
        )
    }

    /// Humanize a delay with +/- `variance_percent` jitter
    pub fn humanize_delay(&mut self, base: Duration, variance_percent: u32) -> Duration {
        if variance_percent == 0 || base.is_zero() {
            return base;
        }

        let base_ms = base.as_millis() as i64;
        let variance = base_ms * i64::from(variance_percent) / 100;
        if variance == 0 {
            return base;
        }
        let offset = self.rng.gen_range(-variance..=variance);

        let jittered = Duration::from_millis((base_ms + offset).max(0) as u64);
        jittered.max(MIN_DELAY.min(base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_stays_in_rect() {
        let mut humanizer = Humanizer::seeded(1);
        let rect = Rect::new(50, 60, 20, 15);

        for _ in 0..500 {
            let p = humanizer.point_in_rect(rect);
            assert!(rect.contains(p), "{:?} outside {:?}", p, rect);
        }
    }

    #[test]
    fn test_consecutive_taps_never_repeat() {
        let mut humanizer = Humanizer::seeded(2);
        // A tiny rect makes collisions likely
        let rect = Rect::new(0, 0, 2, 1);

        let mut last = humanizer.point_in_rect(rect);
        for _ in 0..200 {
            let p = humanizer.point_in_rect(rect);
            assert_ne!(p, last);
            assert!(rect.contains(p));
            last = p;
        }
    }

    #[test]
    fn test_single_pixel_rect() {
        let mut humanizer = Humanizer::seeded(3);
        let rect = Rect::new(5, 5, 1, 1);
        assert_eq!(humanizer.point_in_rect(rect), Point::new(5, 5));
        assert_eq!(humanizer.point_in_rect(rect), Point::new(5, 5));
    }

    #[test]
    fn test_humanize_delay_variance() {
        let mut humanizer = Humanizer::seeded(4);
        let base = Duration::from_millis(1000);

        let mut min_seen = base;
        let mut max_seen = base;
        for _ in 0..1000 {
            let delay = humanizer.humanize_delay(base, 30);
            assert!(delay >= Duration::from_millis(700));
            assert!(delay <= Duration::from_millis(1300));
            min_seen = min_seen.min(delay);
            max_seen = max_seen.max(delay);
        }

        // Should see variance in both directions
        assert!(min_seen < base);
        assert!(max_seen > base);
    }

    #[test]
    fn test_zero_variance_returns_base() {
        let mut humanizer = Humanizer::seeded(5);
        for _ in 0..10 {
            assert_eq!(
                humanizer.humanize_delay(Duration::from_millis(500), 0),
                Duration::from_millis(500)
            );
        }
        assert_eq!(
            humanizer.humanize_delay(Duration::ZERO, 40),
            Duration::ZERO
        );
    }
}
