use super::{Actuator, Platform};
use crate::error::ActuatorError;
use crate::types::Command;
use std::process;

/// Runs each command through the platform's media-control tool:
/// `playerctl`/`amixer` on Linux, `osascript` (Spotify) on macOS and
/// `nircmd.exe` on Windows.
pub struct ShellActuator {
    platform: Platform,
}

impl ShellActuator {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }
}

impl Actuator for ShellActuator {
    fn execute(&mut self, command: &Command) -> Result<(), ActuatorError> {
        let (program, args) = command_line(self.platform, command);
        log::debug!("exec {program} {}", args.join(" "));

        let status = process::Command::new(program)
            .args(&args)
            .stdout(process::Stdio::null())
            .status()
            .map_err(|source| ActuatorError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(ActuatorError::ExitStatus {
                program: program.to_string(),
                status,
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.platform {
            Platform::Linux => "playerctl",
            Platform::MacOs => "osascript",
            Platform::Windows => "nircmd",
        }
    }
}

/// Program and arguments that perform `command` on `platform`
pub fn command_line(platform: Platform, command: &Command) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Linux => linux(command),
        Platform::MacOs => ("osascript", vec!["-e".to_string(), applescript(command)]),
        Platform::Windows => ("nircmd.exe", nircmd(command)),
    }
}

fn linux(command: &Command) -> (&'static str, Vec<String>) {
    let args: &[&str] = match command {
        Command::Play => &["play"],
        Command::Pause => &["pause"],
        Command::Next => &["next"],
        Command::Previous => &["previous"],
        Command::VolumeUp => &["volume", "0.1+"],
        Command::VolumeDown => &["volume", "0.1-"],
        Command::SetVolume(percent) => {
            let level = format!("{:.2}", f32::from((*percent).min(100)) / 100.0);
            return ("playerctl", vec!["volume".to_string(), level]);
        }
        // playerctl has no mute, go through ALSA
        Command::Mute => return ("amixer", to_args(&["set", "Master", "toggle"])),
    };
    ("playerctl", to_args(args))
}

fn applescript(command: &Command) -> String {
    match command {
        Command::Play => r#"tell application "Spotify" to play"#.to_string(),
        Command::Pause => r#"tell application "Spotify" to pause"#.to_string(),
        Command::Next => r#"tell application "Spotify" to next track"#.to_string(),
        Command::Previous => r#"tell application "Spotify" to previous track"#.to_string(),
        Command::VolumeUp => {
            r#"tell application "Spotify" to set sound volume to (sound volume + 10)"#.to_string()
        }
        Command::VolumeDown => {
            r#"tell application "Spotify" to set sound volume to (sound volume - 10)"#.to_string()
        }
        Command::SetVolume(percent) => format!(
            r#"tell application "Spotify" to set sound volume to {}"#,
            (*percent).min(100)
        ),
        Command::Mute => "set volume output muted not (output muted of (get volume settings))".to_string(),
    }
}

// Virtual-key codes for the media keys
const VK_MEDIA_NEXT_TRACK: u8 = 0xB0;
const VK_MEDIA_PREV_TRACK: u8 = 0xB1;
const VK_MEDIA_PLAY_PAUSE: u8 = 0xB3;

// nircmd volume is 0..=65535
const NIRCMD_VOLUME_MAX: u32 = 65535;
const NIRCMD_VOLUME_STEP: u32 = NIRCMD_VOLUME_MAX / 10;

fn nircmd(command: &Command) -> Vec<String> {
    let media_key = |vk: u8| vec!["sendkeypress".to_string(), format!("0x{vk:02X}")];
    match command {
        // Windows only has a play/pause toggle key.
        Command::Play | Command::Pause => media_key(VK_MEDIA_PLAY_PAUSE),
        Command::Next => media_key(VK_MEDIA_NEXT_TRACK),
        Command::Previous => media_key(VK_MEDIA_PREV_TRACK),
        Command::Mute => to_args(&["mutesysvolume", "2"]),
        Command::VolumeUp => vec!["changesysvolume".to_string(), NIRCMD_VOLUME_STEP.to_string()],
        Command::VolumeDown => vec!["changesysvolume".to_string(), format!("-{NIRCMD_VOLUME_STEP}")],
        Command::SetVolume(percent) => {
            let level = NIRCMD_VOLUME_MAX * u32::from((*percent).min(100)) / 100;
            vec!["setsysvolume".to_string(), level.to_string()]
        }
    }
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}
