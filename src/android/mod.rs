//! Android device control over adb
//!
//! Provides the command channel to the device (`adb`), the device controller
//! that turns taps, swipes and screenshots into adb shell commands, and the
//! `Controller` seam the rest of the crate drives.

pub mod adb;
pub mod device;

use std::time::Duration;

use image::RgbImage;
use serde::{Deserialize, Serialize};

pub use adb::{AdbTransport, Transport};
pub use device::{AdbDevice, CaptureMethod};

/// A point on the device screen, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift horizontally by `steps` times `distance`
    pub fn offset_x(self, distance: i32, steps: i32) -> Self {
        Self::new(self.x + distance * steps, self.y)
    }
}

/// An axis-aligned rectangle on the device screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.w
            && point.y >= self.y
            && point.y < self.y + self.h
    }

    /// Shift horizontally by `steps` times `distance`
    pub fn offset_x(self, distance: i32, steps: i32) -> Self {
        Self::new(self.x + distance * steps, self.y, self.w, self.h)
    }
}

/// Input and capture primitives for one exclusively-owned device.
///
/// Every operation is synchronous. Transport failures are logged by the
/// implementation and surfaced as `false` / `None`, leaving retry policy
/// to the caller.
pub trait Controller {
    /// Tap at an exact position
    fn tap(&mut self, point: Point) -> bool;

    /// Tap at a random position inside `rect`, never the same pixel twice in a row
    fn tap_in_rect(&mut self, rect: Rect) -> bool;

    /// Swipe from `from` to `to` over `duration`
    fn swipe(&mut self, from: Point, to: Point, duration: Duration) -> bool;

    /// Capture the current screen as an RGB image
    fn capture_screen(&mut self) -> Option<RgbImage>;
}

/// Device and transport errors
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command `{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("command `{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("failed to connect to {address}: {output}")]
    ConnectFailed { address: String, output: String },
    #[error("no device connected")]
    NoDevice,
    #[error("more than one device connected ({0})")]
    MultipleDevices(usize),
    #[error("unexpected output from `{command}`: {output}")]
    UnexpectedOutput { command: String, output: String },
    #[error("screen capture failed: {0}")]
    Capture(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_center_and_contains() {
        let rect = Rect::new(10, 20, 30, 40);
        assert_eq!(rect.center(), Point::new(25, 40));
        assert!(rect.contains(Point::new(10, 20)));
        assert!(rect.contains(Point::new(39, 59)));
        assert!(!rect.contains(Point::new(40, 59)));
        assert!(!rect.contains(Point::new(39, 60)));
    }

    #[test]
    fn test_offsets() {
        assert_eq!(Point::new(100, 50).offset_x(25, 2), Point::new(150, 50));
        assert_eq!(
            Rect::new(0, 0, 10, 10).offset_x(-5, 3),
            Rect::new(-15, 0, 10, 10)
        );
    }
}
