//! Platform abstraction layer
//!
//! Converts host animation-frame timestamps into the simulation's fractional
//! frame steps.

use crate::frame_step_from_ms;

/// Tracks the previous animation-frame timestamp
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames elapsed since the previous call, capped
    ///
    /// The first call only records the timestamp and returns 0. Timestamps
    /// that go backwards also yield 0 and re-anchor the clock.
    pub fn step(&mut self, now_ms: f64) -> f32 {
        let step = match self.last_ms {
            Some(last) => frame_step_from_ms(now_ms - last),
            None => 0.0,
        };
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
        }
        step
    }

    /// Wall-clock seconds since the last recorded timestamp; call before `step`
    pub fn seconds_between(&self, now_ms: f64) -> f64 {
        match self.last_ms {
            Some(last) if now_ms > last => (now_ms - last) / 1000.0,
            _ => 0.0,
        }
    }

    /// Forget the last timestamp (e.g. after the tab was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
