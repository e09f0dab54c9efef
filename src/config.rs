//! Configuration for the stabilizer and the `calira` host

use crate::actuator::Platform;
use crate::error::ConfigError;
use crate::router::CommandRouter;
use crate::stabilizer::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_COOLDOWN_FRAMES, DEFAULT_HISTORY_LENGTH, MAX_HISTORY_LENGTH,
};
use crate::types::Command;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::path::Path;

/// Parameters the stabilization engine is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Minimum classifier confidence for a prediction to vote (inclusive)
    pub confidence_threshold: f32,
    /// Number of admitted labels kept for the majority vote
    pub history_length: usize,
    /// Frames to suppress dispatch after each dispatch
    pub cooldown_frames: u32,
}

impl StabilizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_length == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        if self.history_length > MAX_HISTORY_LENGTH {
            return Err(ConfigError::HistoryTooLong(self.history_length));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Threshold(self.confidence_threshold));
        }
        Ok(())
    }
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            history_length: DEFAULT_HISTORY_LENGTH,
            cooldown_frames: DEFAULT_COOLDOWN_FRAMES,
        }
    }
}

/// Where classifier frames arrive from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub udp_addr: SocketAddr,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            udp_addr: SocketAddr::from(([127, 0, 0, 1], 5005)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Override platform detection
    pub platform: Option<Platform>,
    /// Log commands instead of running them
    pub dry_run: bool,
    /// Run the actuator on a worker thread so slow commands don't stall frames
    pub background: bool,
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaliraConfig {
    pub stabilizer: StabilizerConfig,
    /// Gesture label -> command. Empty means the built-in media table.
    pub gestures: BTreeMap<String, Command>,
    pub input: InputConfig,
    pub actuator: ActuatorConfig,
}

impl CaliraConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CaliraConfig = toml::from_str(content).context("invalid calira config")?;
        config.stabilizer.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading config from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// `CALIRA_CONFIG` if set, otherwise defaults
    pub fn from_env_or_default() -> Result<Self> {
        match std::env::var_os("CALIRA_CONFIG") {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn gesture_table(&self) -> HashMap<String, Command> {
        if self.gestures.is_empty() {
            return CommandRouter::default_table();
        }
        self.gestures
            .iter()
            .map(|(label, command)| (label.clone(), *command))
            .collect()
    }
}
