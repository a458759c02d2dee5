//! Deterministic animation frame selection
//!
//! Frames depend only on elapsed time, so every map driven by the same
//! clock value shows the same frame for the same animation byte.

use crate::map::cell::Animation;

/// Elapsed time driving tile animations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationClock {
    elapsed_ms: u64,
}

impl AnimationClock {
    /// Clock at a given elapsed time
    pub const fn at(elapsed_ms: u64) -> Self {
        Self { elapsed_ms }
    }

    /// Elapsed milliseconds
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Advance by one update tick
    pub const fn advance(&mut self, delta_ms: u64) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
    }

    /// Active frame for an animation byte, 0 for static tiles
    pub const fn frame(&self, animation: Animation) -> u16 {
        if !animation.is_animated() {
            return 0;
        }
        ((self.elapsed_ms / animation.period_ms()) % animation.frame_count() as u64) as u16
    }
}
