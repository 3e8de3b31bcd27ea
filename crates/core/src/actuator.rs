//! Desktop actuation.
//!
//! The `Actuator` trait is the capability boundary between the dispatcher and
//! the operating system. `DesktopActuator` implements it for an X11 GNOME
//! session by invoking the usual command-line tools directly (no shell).

use crate::turn::Attachment;
use async_trait::async_trait;
use std::process::Stdio;
use std::str::FromStr;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("unknown window action '{0}'")]
    UnknownWindowAction(String),
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("'{0}' exited without producing an image")]
    EmptyCapture(String),
}

pub type ActuatorResult<T> = Result<T, ActuatorError>;

/// Operations on the focused window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Maximize,
    Minimize,
    Close,
}

impl FromStr for WindowAction {
    type Err = ActuatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maximize" => Ok(Self::Maximize),
            "minimize" => Ok(Self::Minimize),
            "close" => Ok(Self::Close),
            other => Err(ActuatorError::UnknownWindowAction(other.to_string())),
        }
    }
}

/// One method per action family. Every call reports success or failure; the
/// dispatcher decides what a failure means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Actuator: Send + Sync {
    async fn open_terminal(&self) -> ActuatorResult<()>;
    async fn launch_app(&self, name: &str) -> ActuatorResult<()>;
    async fn type_text(&self, text: &str) -> ActuatorResult<()>;
    async fn capture(&self) -> ActuatorResult<Attachment>;
    async fn read_clipboard(&self) -> ActuatorResult<String>;
    async fn notify(&self, message: &str) -> ActuatorResult<()>;
    async fn open_url(&self, url: &str) -> ActuatorResult<()>;
    async fn open_file(&self, path: &str) -> ActuatorResult<()>;
    async fn send_keys(&self, keys: &str) -> ActuatorResult<()>;
    async fn control_window(&self, action: WindowAction) -> ActuatorResult<()>;
}

/// Drives a GNOME/X11 desktop through `xdotool`, `xdg-open`, `notify-send`,
/// `flameshot` and `xclip`.
#[derive(Debug, Clone)]
pub struct DesktopActuator {
    terminal_program: String,
    capture_program: String,
}

impl Default for DesktopActuator {
    fn default() -> Self {
        Self::new("gnome-terminal")
    }
}

impl DesktopActuator {
    pub fn new(terminal_program: impl Into<String>) -> Self {
        Self {
            terminal_program: terminal_program.into(),
            capture_program: "flameshot".to_string(),
        }
    }

    /// Replaces the screen capture program. It is run as `<program> full --raw`
    /// and must write the PNG to stdout.
    pub fn with_capture_program(mut self, program: impl Into<String>) -> Self {
        self.capture_program = program.into();
        self
    }

    /// Starts a program without waiting for it to exit.
    fn spawn_detached(program: &str, args: &[&str]) -> ActuatorResult<()> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|source| ActuatorError::Spawn {
                program: program.to_string(),
                source,
            })
    }

    /// Runs a program to completion and returns its stdout.
    async fn run(program: &str, args: &[&str]) -> ActuatorResult<Vec<u8>> {
        debug!(program, ?args, "Running actuator command");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ActuatorError::Spawn {
                program: program.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(ActuatorError::Failed {
                program: program.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

fn required<'a>(value: &'a str, name: &'static str) -> ActuatorResult<&'a str> {
    if value.trim().is_empty() {
        Err(ActuatorError::MissingArgument(name))
    } else {
        Ok(value)
    }
}

#[async_trait]
impl Actuator for DesktopActuator {
    async fn open_terminal(&self) -> ActuatorResult<()> {
        Self::spawn_detached(&self.terminal_program, &[])
    }

    async fn launch_app(&self, name: &str) -> ActuatorResult<()> {
        Self::spawn_detached(required(name, "application name")?, &[])
    }

    async fn type_text(&self, text: &str) -> ActuatorResult<()> {
        Self::run("xdotool", &["type", "--", text]).await.map(drop)
    }

    async fn capture(&self) -> ActuatorResult<Attachment> {
        // The image comes straight off stdout; a cancelled capture exits 0 with nothing.
        let data = Self::run(&self.capture_program, &["full", "--raw"]).await?;
        if data.is_empty() {
            return Err(ActuatorError::EmptyCapture(self.capture_program.clone()));
        }
        Ok(Attachment::new("image/png", data))
    }

    async fn read_clipboard(&self) -> ActuatorResult<String> {
        let stdout = Self::run("xclip", &["-o", "-selection", "clipboard"]).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    async fn notify(&self, message: &str) -> ActuatorResult<()> {
        Self::run("notify-send", &["--", message]).await.map(drop)
    }

    async fn open_url(&self, url: &str) -> ActuatorResult<()> {
        Self::spawn_detached("xdg-open", &[required(url, "url")?])
    }

    async fn open_file(&self, path: &str) -> ActuatorResult<()> {
        Self::run("xdg-open", &[required(path, "path")?]).await.map(drop)
    }

    async fn send_keys(&self, keys: &str) -> ActuatorResult<()> {
        Self::run("xdotool", &["key", required(keys, "keys")?])
            .await
            .map(drop)
    }

    async fn control_window(&self, action: WindowAction) -> ActuatorResult<()> {
        let command = match action {
            WindowAction::Maximize => "windowmaximize",
            WindowAction::Minimize => "windowminimize",
            WindowAction::Close => "windowclose",
        };
        Self::run("xdotool", &["getactivewindow", command])
            .await
            .map(drop)
    }
}
