//! adb command channel
//!
//! Every device interaction is an `adb` invocation. The `Transport` trait is
//! the seam tests replace with a recording fake.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::DeviceError;

/// Poll interval while waiting for an adb child process
const CHILD_POLL: Duration = Duration::from_millis(10);

/// A command-execution channel to the device
pub trait Transport {
    /// Run `adb <args>` and return its raw standard output
    fn run(&self, args: &[&str]) -> Result<Vec<u8>, DeviceError>;

    /// Run `adb <args>` and return standard output split into lines
    fn run_lines(&self, args: &[&str]) -> Result<Vec<String>, DeviceError> {
        let output = self.run(args)?;
        Ok(String::from_utf8_lossy(&output)
            .lines()
            .map(str::to_string)
            .collect())
    }
}

/// Runs the `adb` executable as a child process
#[derive(Debug, Clone)]
pub struct AdbTransport {
    /// Path to the adb executable
    program: PathBuf,
    /// Kill the child if it runs longer than this
    timeout: Duration,
}

impl AdbTransport {
    /// Create a transport using the given adb executable
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.program.display(), args.join(" "))
    }
}

impl Default for AdbTransport {
    fn default() -> Self {
        Self::new("adb", Duration::from_secs(15))
    }
}

impl Transport for AdbTransport {
    fn run(&self, args: &[&str]) -> Result<Vec<u8>, DeviceError> {
        let command = self.describe(args);
        log::debug!("Executing command: {}", command);

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DeviceError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        // Drain the pipes on their own threads so a full pipe buffer (screencap
        // output is large) never stalls the child while we poll it.
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(DeviceError::Timeout {
                        command,
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(CHILD_POLL),
                Err(source) => {
                    return Err(DeviceError::Spawn {
                        program: self.program.display().to_string(),
                        source,
                    })
                }
            }
        };

        let stdout = stdout.map(join_reader).unwrap_or_default();
        let stderr = stderr.map(join_reader).unwrap_or_default();

        if !status.success() {
            return Err(DeviceError::CommandFailed {
                command,
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_is_spawn_error() {
        let transport = AdbTransport::new(
            "/nonexistent/definitely-not-adb",
            Duration::from_secs(1),
        );
        let result = transport.run(&["devices"]);
        assert!(matches!(result, Err(DeviceError::Spawn { .. })));
    }

    #[test]
    fn test_describe_joins_arguments() {
        let transport = AdbTransport::default();
        assert_eq!(
            transport.describe(&["shell", "input tap 1 2"]),
            "adb shell input tap 1 2"
        );
    }
}
