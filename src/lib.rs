//! # CALIRA Cortex
//!
//! Temporal decision layer between a per-frame hand-gesture classifier and the
//! desktop media controls. Predictions are confidence-gated, majority-voted
//! over a short window and dispatched at most once per cooldown.

pub mod actuator;
pub mod config;
pub mod error;
pub mod ingest;
pub mod router;
pub mod stabilizer;
pub mod types;

pub use actuator::{Actuator, Platform};
pub use config::{CaliraConfig, StabilizerConfig};
pub use error::{ActuatorError, ConfigError, DispatchError, IngestError};
pub use router::CommandRouter;
pub use stabilizer::{FrameOutcome, StabilizationEngine};
pub use types::*;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How often the host loop re-checks the shutdown flag while no frames arrive
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Counters for a `Cortex` session
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CortexStats {
    pub frames: u64,
    pub admitted: u64,
    pub no_hand: u64,
    pub dispatches: u64,
    pub failed_dispatches: u64,
}

/// Host loop: feeds frames from a channel through the stabilization engine
pub struct Cortex {
    engine: StabilizationEngine,
    frames: Receiver<Frame>,
    shutdown: Arc<AtomicBool>,
    stats: CortexStats,
}

impl Cortex {
    pub fn new(engine: StabilizationEngine, frames: Receiver<Frame>) -> Self {
        Self {
            engine,
            frames,
            shutdown: Arc::new(AtomicBool::new(false)),
            stats: CortexStats::default(),
        }
    }

    /// Set to `true` to make `run` return after the current frame
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Process frames until the sender side disconnects or shutdown is requested.
    pub fn run(&mut self) -> CortexStats {
        log::info!("Starting Cortex main loop...");

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.frames.recv_timeout(SHUTDOWN_POLL) {
                Ok(frame) => {
                    self.step(frame.as_ref());
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    log::info!("Frame source closed");
                    break;
                }
            }
        }

        log::info!(
            "Cortex stopped after {} frames ({} dispatches, {} failed)",
            self.stats.frames,
            self.stats.dispatches,
            self.stats.failed_dispatches
        );
        self.stats
    }

    /// Run a single frame through the engine and update counters
    pub fn step(&mut self, frame: Option<&Prediction>) -> FrameOutcome {
        let outcome = self.engine.process_frame(frame);

        self.stats.frames += 1;
        if frame.is_none() {
            self.stats.no_hand += 1;
        }
        if outcome.admitted {
            self.stats.admitted += 1;
        }
        if let Some(ref dispatch) = outcome.dispatch {
            self.stats.dispatches += 1;
            if dispatch.result.is_err() {
                self.stats.failed_dispatches += 1;
            }
        }

        log::debug!(
            "frame {}: majority={:?} cooldown={}",
            outcome.frame_index,
            outcome.majority,
            self.engine.state().cooldown_remaining()
        );
        outcome
    }

    pub fn stats(&self) -> CortexStats {
        self.stats
    }

    pub fn engine(&self) -> &StabilizationEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::DryRunActuator;

    fn cortex(frames: Receiver<Frame>) -> Cortex {
        let router = CommandRouter::with_default_table(Box::new(DryRunActuator::default()));
        let engine = StabilizationEngine::new(StabilizerConfig::default(), router).unwrap();
        Cortex::new(engine, frames)
    }

    #[test]
    fn run_until_source_closes() {
        let (tx, rx) = crossbeam_channel::unbounded();
        for _ in 0..3 {
            tx.send(Some(Prediction::new("play", 0.9))).unwrap();
        }
        tx.send(None).unwrap();
        tx.send(Some(Prediction::new("pause", 0.1))).unwrap();
        drop(tx);

        let stats = cortex(rx).run();
        assert_eq!(stats.frames, 5);
        assert_eq!(stats.admitted, 3);
        assert_eq!(stats.no_hand, 1);
        assert_eq!(stats.dispatches, 1);
        assert_eq!(stats.failed_dispatches, 0);
    }

    #[test]
    fn shutdown_flag_stops_idle_loop() {
        let (_tx, rx) = crossbeam_channel::unbounded::<Frame>();
        let mut cortex = cortex(rx);
        cortex.shutdown_handle().store(true, Ordering::Relaxed);
        assert_eq!(cortex.run().frames, 0);
    }
}
