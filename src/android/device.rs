//! Device controller
//!
//! Turns taps, swipes and screenshots into adb shell commands and handles
//! the setup-time concerns of attaching to exactly one device.

use std::path::PathBuf;
use std::time::Duration;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::{Controller, DeviceError, Point, Rect, Transport};
use crate::stealth::Humanizer;
use crate::vision::capture;

/// How screenshots are pulled off the device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMethod {
    /// `adb shell screencap -p`, repairing line endings mangled by the shell
    #[default]
    Shell,
    /// Write the screenshot to the sdcard, then `adb pull` it
    SdcardPull,
}

/// Remote path used by `CaptureMethod::SdcardPull`
const SDCARD_SCREENSHOT: &str = "/sdcard/battlebot_screen.png";

/// Controller for one Android device reached through a `Transport`
pub struct AdbDevice<T: Transport> {
    transport: T,
    capture: CaptureMethod,
    humanizer: Humanizer,
    /// Physical screen size, if queried
    size: Option<(u32, u32)>,
}

impl<T: Transport> AdbDevice<T> {
    /// Create a controller over the given transport
    pub fn new(transport: T, capture: CaptureMethod) -> Self {
        Self {
            transport,
            capture,
            humanizer: Humanizer::new(),
            size: None,
        }
    }

    /// Replace the humanizer (used to get reproducible tap positions)
    pub fn with_humanizer(mut self, humanizer: Humanizer) -> Self {
        self.humanizer = humanizer;
        self
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Connect to a device over tcp/ip, optionally restarting the adb server first.
    ///
    /// Not needed for USB devices or emulators that ship their own adb.
    pub fn connect(&self, address: &str, restart: bool) -> Result<(), DeviceError> {
        if restart {
            self.transport.run_lines(&["kill-server"])?;
        }

        let output = self.transport.run_lines(&["connect", address])?;
        if output.iter().any(|line| line.starts_with("connected")) {
            log::info!("Connected to device at {}", address);
            Ok(())
        } else {
            let output = output.join("\n");
            log::error!("Failed to connect to device at {}: {}", address, output);
            Err(DeviceError::ConnectFailed {
                address: address.to_string(),
                output,
            })
        }
    }

    /// Count the devices adb reports as attached and ready
    pub fn device_count(&self) -> Result<usize, DeviceError> {
        let output = self.transport.run_lines(&["devices"])?;
        Ok(output
            .iter()
            .filter(|line| line.trim_end().ends_with("device"))
            .count())
    }

    /// Succeed only when exactly one device is attached
    pub fn ensure_single_device(&self) -> Result<(), DeviceError> {
        match self.device_count()? {
            0 => {
                log::error!("No device connected");
                Err(DeviceError::NoDevice)
            }
            1 => {
                log::info!("Device connected");
                Ok(())
            }
            n => {
                log::error!("More than one device connected ({})", n);
                Err(DeviceError::MultipleDevices(n))
            }
        }
    }

    /// Query the physical screen size via `wm size`
    pub fn screen_size(&mut self) -> Result<(u32, u32), DeviceError> {
        let output = self.transport.run_lines(&["shell", "wm", "size"])?;
        let size = output
            .iter()
            .find(|line| line.starts_with("Physical size"))
            .and_then(|line| parse_size(line))
            .ok_or_else(|| DeviceError::UnexpectedOutput {
                command: "wm size".to_string(),
                output: output.join("\n"),
            })?;

        log::info!("Got screen size {} x {}", size.0, size.1);
        self.size = Some(size);
        Ok(size)
    }

    /// Last queried screen size
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Run an `input` shell command; `false` on transport failure or an `error` line
    fn input(&self, command: String) -> bool {
        match self.transport.run_lines(&["shell", &command]) {
            Ok(output) => {
                if output.iter().any(|line| line.starts_with("error")) {
                    log::error!("`{}` failed: {}", command, output.join("\n"));
                    false
                } else {
                    log::debug!("{}", command);
                    true
                }
            }
            Err(e) => {
                log::error!("`{}` failed: {}", command, e);
                false
            }
        }
    }

    fn try_capture(&self) -> Result<RgbImage, DeviceError> {
        match self.capture {
            CaptureMethod::Shell => {
                log::debug!("Capturing screen from shell");
                let raw = self.transport.run(&["shell", "screencap -p"])?;
                let png = capture::repair_line_endings(&raw);
                capture::decode_screen(&png).map_err(|e| DeviceError::Capture(e.to_string()))
            }
            CaptureMethod::SdcardPull => {
                log::debug!("Capturing screen via sdcard pull");
                let local = local_screenshot_path();
                let local_str = local.display().to_string();
                self.transport
                    .run(&["shell", "screencap", "-p", SDCARD_SCREENSHOT])?;
                self.transport.run(&["pull", SDCARD_SCREENSHOT, &local_str])?;
                let bytes = std::fs::read(&local)
                    .map_err(|e| DeviceError::Capture(format!("{}: {}", local_str, e)))?;
                capture::decode_screen(&bytes).map_err(|e| DeviceError::Capture(e.to_string()))
            }
        }
    }
}

impl<T: Transport> Controller for AdbDevice<T> {
    fn tap(&mut self, point: Point) -> bool {
        self.input(format!("input tap {} {}", point.x, point.y))
    }

    fn tap_in_rect(&mut self, rect: Rect) -> bool {
        let point = self.humanizer.point_in_rect(rect);
        self.tap(point)
    }

    fn swipe(&mut self, from: Point, to: Point, duration: Duration) -> bool {
        self.input(format!(
            "input swipe {} {} {} {} {}",
            from.x,
            from.y,
            to.x,
            to.y,
            duration.as_millis()
        ))
    }

    fn capture_screen(&mut self) -> Option<RgbImage> {
        match self.try_capture() {
            Ok(screen) => Some(screen),
            Err(e) => {
                log::error!("Failed to capture screen: {}", e);
                None
            }
        }
    }
}

fn local_screenshot_path() -> PathBuf {
    std::env::temp_dir().join("battlebot_screen.png")
}

/// Parse `Physical size: 1280x720`
fn parse_size(line: &str) -> Option<(u32, u32)> {
    let (_, dims) = line.split_once(':')?;
    let (w, h) = dims.trim().split_once('x')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}
