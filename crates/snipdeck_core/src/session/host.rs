//! Host collaborator boundary.
//!
//! The launcher never reaches a global host object; it is handed a
//! `HostBridge` and calls it only to deliver a committed payload.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Host-side failure while delivering a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    Clipboard(String),
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clipboard(message) => write!(f, "clipboard write failed: {message}"),
        }
    }
}

impl Error for HostError {}

/// Capabilities the surrounding window host provides.
///
/// Session lifecycle runs the other way: the host calls
/// `Launcher::enter` / `Launcher::exit` on its enter and exit events.
pub trait HostBridge {
    fn copy_text(&mut self, text: &str) -> Result<(), HostError>;
    fn hide_window(&mut self);
    fn exit_plugin(&mut self);
}

/// Side effect requested from the host, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    CopyText(String),
    HideWindow,
    ExitPlugin,
}

/// Host that records commands for a remote UI to drain and execute.
#[derive(Debug, Default)]
pub struct QueuedHost {
    commands: Vec<HostCommand>,
}

impl QueuedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Takes every pending command, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl HostBridge for QueuedHost {
    fn copy_text(&mut self, text: &str) -> Result<(), HostError> {
        self.commands.push(HostCommand::CopyText(text.to_string()));
        Ok(())
    }

    fn hide_window(&mut self) {
        self.commands.push(HostCommand::HideWindow);
    }

    fn exit_plugin(&mut self) {
        self.commands.push(HostCommand::ExitPlugin);
    }
}
