//! Core data types for the gesture stabilizer

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One frame's classifier output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Gesture label from the model's label list
    pub label: String,
    /// Classifier confidence (0.0-1.0)
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// A camera frame as seen by the stabilizer. `None` means no hand was detected.
pub type Frame = Option<Prediction>;

/// Emitted by the engine when a stabilized gesture is handed to the router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchEvent {
    pub label: String,
    pub frame_index: u64,
}

/// Abstract control-surface command, independent of the platform that runs it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Command {
    Play,
    Pause,
    Next,
    Previous,
    Mute,
    VolumeUp,
    VolumeDown,
    /// Absolute volume, 0..=100
    SetVolume(u8),
}

impl Command {
    /// Build a `SetVolume`, rejecting anything above 100%.
    pub fn set_volume(percent: u32) -> Result<Self, ConfigError> {
        if percent > 100 {
            return Err(ConfigError::VolumePercent(percent));
        }
        Ok(Command::SetVolume(percent as u8))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Play => write!(f, "play"),
            Command::Pause => write!(f, "pause"),
            Command::Next => write!(f, "next"),
            Command::Previous => write!(f, "previous"),
            Command::Mute => write!(f, "mute"),
            Command::VolumeUp => write!(f, "volume_up"),
            Command::VolumeDown => write!(f, "volume_down"),
            Command::SetVolume(percent) => write!(f, "volume:{percent}"),
        }
    }
}

impl FromStr for Command {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.to_ascii_lowercase().as_str() {
            "play" => Command::Play,
            "pause" => Command::Pause,
            "next" => Command::Next,
            "previous" | "prev" => Command::Previous,
            "mute" => Command::Mute,
            "volume_up" => Command::VolumeUp,
            "volume_down" => Command::VolumeDown,
            other => {
                let percent = other
                    .strip_prefix("volume:")
                    .and_then(|p| p.trim().parse::<u32>().ok())
                    .ok_or_else(|| ConfigError::UnknownCommand(s.to_string()))?;
                Command::set_volume(percent)?
            }
        })
    }
}

impl TryFrom<String> for Command {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Command> for String {
    fn from(command: Command) -> Self {
        command.to_string()
    }
}
