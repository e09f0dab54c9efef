//! Actuators - the OS side effects behind each command
//!
//! The stabilizer only ever talks to the [`Actuator`] trait. Which
//! implementation sits behind it is decided by the host at startup.

use crate::error::{ActuatorError, ConfigError};
use crate::types::Command;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod background;
mod shell;

pub use background::{BackgroundActuator, DispatchReport, REPORT_BACKLOG};
pub use shell::ShellActuator;

/// Performs the real-world effect of a command
pub trait Actuator {
    fn execute(&mut self, command: &Command) -> Result<(), ActuatorError>;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn execute(&mut self, command: &Command) -> Result<(), ActuatorError> {
        (**self).execute(command)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Desktop platforms with a known media-control backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// The platform this binary was built for, if it has a backend
    pub fn detect() -> Option<Self> {
        std::env::consts::OS.parse().ok()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::MacOs => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" => Ok(Platform::MacOs),
            "windows" => Ok(Platform::Windows),
            _ => Err(ConfigError::UnknownPlatform(s.to_string())),
        }
    }
}

/// Logs each command instead of running it
#[derive(Debug, Default)]
pub struct DryRunActuator {
    executed: u64,
}

impl DryRunActuator {
    pub fn executed(&self) -> u64 {
        self.executed
    }
}

impl Actuator for DryRunActuator {
    fn execute(&mut self, command: &Command) -> Result<(), ActuatorError> {
        self.executed += 1;
        log::info!("[dry-run] {command}");
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_names() {
        assert_eq!("Darwin".parse::<Platform>().unwrap(), Platform::MacOs);
        assert_eq!("linux".parse::<Platform>().unwrap(), Platform::Linux);
        assert!("plan9".parse::<Platform>().is_err());
        assert_eq!(Platform::Windows.to_string(), "windows");
    }

    #[test]
    fn dry_run_counts() {
        let mut actuator = DryRunActuator::default();
        actuator.execute(&Command::Mute).unwrap();
        actuator.execute(&Command::Play).unwrap();
        assert_eq!(actuator.executed(), 2);
    }
}
