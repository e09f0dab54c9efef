//! Gesture label -> command routing

use crate::actuator::Actuator;
use crate::error::DispatchError;
use crate::types::Command;
use std::collections::HashMap;

/// Maps stabilized gesture labels to commands and hands them to an actuator.
///
/// The table is fixed at construction; the router keeps no other state.
pub struct CommandRouter {
    table: HashMap<String, Command>,
    actuator: Box<dyn Actuator + Send>,
}

impl CommandRouter {
    pub fn new(table: HashMap<String, Command>, actuator: Box<dyn Actuator + Send>) -> Self {
        Self { table, actuator }
    }

    /// Router over the stock media-control labels the gesture model is trained with
    pub fn with_default_table(actuator: Box<dyn Actuator + Send>) -> Self {
        Self::new(Self::default_table(), actuator)
    }

    pub fn default_table() -> HashMap<String, Command> {
        [
            ("play", Command::Play),
            ("pause", Command::Pause),
            ("next", Command::Next),
            ("previous", Command::Previous),
            ("mute", Command::Mute),
            ("volume_up", Command::VolumeUp),
            ("volume_down", Command::VolumeDown),
            ("volume_25", Command::SetVolume(25)),
            ("volume_50", Command::SetVolume(50)),
            ("volume_75", Command::SetVolume(75)),
            ("volume_100", Command::SetVolume(100)),
        ]
        .into_iter()
        .map(|(label, command)| (label.to_string(), command))
        .collect()
    }

    pub fn lookup(&self, label: &str) -> Option<Command> {
        self.table.get(label).copied()
    }

    /// Resolve `label` and run it. Returns the command that was executed.
    pub fn dispatch(&mut self, label: &str) -> Result<Command, DispatchError> {
        let command = self
            .lookup(label)
            .ok_or_else(|| DispatchError::UnmappedGesture(label.to_string()))?;
        log::debug!("Routing {label:?} to {} actuator as {command}", self.actuator.name());
        self.actuator.execute(&command)?;
        Ok(command)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
