//! Frame-counted cooldown

pub const DEFAULT_COOLDOWN_FRAMES: u32 = 30;

/// Blocks dispatch for a number of processed frames.
///
/// Measured in frames, not wall-clock time: a stalled frame loop stalls the
/// cooldown with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownTimer {
    remaining: u32,
}

impl CooldownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call exactly once per processed frame.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    pub fn reset(&mut self, frames: u32) {
        self.remaining = frames;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}
