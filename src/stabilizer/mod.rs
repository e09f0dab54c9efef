//! Stabilization engine - turns noisy per-frame predictions into debounced dispatches
//!
//! Each frame runs, in order: confidence gate, vote window push, cooldown tick,
//! majority vote, and (when the cooldown is clear and the majority differs from
//! the last dispatched gesture) a dispatch through the [`CommandRouter`].

use crate::config::StabilizerConfig;
use crate::error::{ConfigError, DispatchError};
use crate::router::CommandRouter;
use crate::types::{Command, DispatchEvent, Prediction};
use std::num::NonZeroUsize;

mod cooldown;
mod gate;
mod window;

pub use cooldown::{CooldownTimer, DEFAULT_COOLDOWN_FRAMES};
pub use gate::{ConfidenceGate, DEFAULT_CONFIDENCE_THRESHOLD};
pub use window::{VoteWindow, DEFAULT_HISTORY_LENGTH, MAX_HISTORY_LENGTH};

/// Everything the engine carries from one frame to the next
#[derive(Debug, Clone)]
pub struct StabilizationState {
    last_dispatched: Option<String>,
    cooldown: CooldownTimer,
    window: VoteWindow,
}

impl StabilizationState {
    fn new(history_length: NonZeroUsize) -> Self {
        Self {
            last_dispatched: None,
            cooldown: CooldownTimer::new(),
            window: VoteWindow::new(history_length),
        }
    }

    pub fn last_dispatched(&self) -> Option<&str> {
        self.last_dispatched.as_deref()
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown.remaining()
    }

    pub fn is_cooling(&self) -> bool {
        !self.cooldown.is_ready()
    }

    pub fn vote_window(&self) -> &VoteWindow {
        &self.window
    }
}

/// A dispatch attempted during a frame, with what the router made of it
#[derive(Debug)]
pub struct DispatchOutcome {
    pub event: DispatchEvent,
    pub result: Result<Command, DispatchError>,
}

/// What happened during one `process_frame` call
#[derive(Debug)]
pub struct FrameOutcome {
    pub frame_index: u64,
    /// The prediction passed the gate and was pushed into the window
    pub admitted: bool,
    /// Majority label after this frame's push
    pub majority: Option<String>,
    pub dispatch: Option<DispatchOutcome>,
}

impl FrameOutcome {
    pub fn dispatched_label(&self) -> Option<&str> {
        self.dispatch.as_ref().map(|d| d.event.label.as_str())
    }
}

pub struct StabilizationEngine {
    config: StabilizerConfig,
    gate: ConfidenceGate,
    router: CommandRouter,
    state: StabilizationState,
    frame_index: u64,
}

impl StabilizationEngine {
    /// Build an engine. Malformed parameters are rejected here, never mid-stream.
    pub fn new(config: StabilizerConfig, router: CommandRouter) -> Result<Self, ConfigError> {
        config.validate()?;
        let history_length = NonZeroUsize::new(config.history_length).ok_or(ConfigError::ZeroHistory)?;

        log::info!(
            "Stabilizer ready: threshold={:.2} history={} cooldown={} frames, {} gestures mapped",
            config.confidence_threshold,
            config.history_length,
            config.cooldown_frames,
            router.len()
        );

        Ok(Self {
            gate: ConfidenceGate::new(config.confidence_threshold),
            state: StabilizationState::new(history_length),
            config,
            router,
            frame_index: 0,
        })
    }

    /// Process one camera frame. `None` means no hand was detected.
    pub fn process_frame(&mut self, frame: Option<&Prediction>) -> FrameOutcome {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let admitted = match frame {
            Some(prediction) if self.gate.admit(prediction) => {
                self.state.window.push(prediction.label.as_str());
                true
            }
            Some(prediction) => {
                log::trace!(
                    "frame {frame_index}: dropped {:?} at {:.2}",
                    prediction.label,
                    prediction.confidence
                );
                false
            }
            None => false,
        };

        // Always tick, even on empty or rejected frames, so cooldown tracks frames seen.
        self.state.cooldown.tick();

        let majority = self.state.window.majority().map(str::to_owned);
        let dispatch = match majority.as_deref() {
            Some(label)
                if self.state.cooldown.is_ready()
                    && self.state.last_dispatched.as_deref() != Some(label) =>
            {
                Some(self.dispatch(label, frame_index))
            }
            _ => None,
        };

        FrameOutcome {
            frame_index,
            admitted,
            majority,
            dispatch,
        }
    }

    fn dispatch(&mut self, label: &str, frame_index: u64) -> DispatchOutcome {
        let event = DispatchEvent {
            label: label.to_owned(),
            frame_index,
        };

        let result = self.router.dispatch(label);
        match &result {
            Ok(command) => log::info!("frame {frame_index}: {label:?} -> {command}"),
            Err(e) => log::warn!("frame {frame_index}: dispatch of {label:?} failed: {e}"),
        }

        // A failed dispatch still consumes the cooldown.
        self.state.last_dispatched = Some(label.to_owned());
        self.state.cooldown.reset(self.config.cooldown_frames);

        DispatchOutcome { event, result }
    }

    /// Drop all temporal state, as if the engine had just been built
    pub fn reset(&mut self) {
        log::debug!("Stabilizer reset after {} frames", self.frame_index);
        self.state.last_dispatched = None;
        self.state.cooldown = CooldownTimer::new();
        self.state.window.clear();
        self.frame_index = 0;
    }

    pub fn state(&self) -> &StabilizationState {
        &self.state
    }

    /// Index the next processed frame will get
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }
}
