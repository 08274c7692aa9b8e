//! Data-driven game balance
//!
//! Every knob the simulation reads lives here so a run can be reproduced from
//! `(seed, Tuning)` alone. Defaults come from `consts`; JSON overrides may be
//! partial.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::obstacle::SpawnPolicy;
use crate::sim::scoring::ScoringPolicy;

/// Balance parameters for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Downward acceleration (pixels/frame²)
    pub gravity: f32,
    /// Launch velocity (negative = up)
    pub jump_velocity: f32,
    /// Frames before another jump is accepted
    pub jump_cooldown_frames: f32,

    // === Speed curve ===
    pub base_speed: f32,
    /// Points per speed step
    pub speed_step: u32,
    /// Speed added per step
    pub speed_increment: f32,
    pub speed_cap: f32,

    // === Spawning ===
    pub spawn_policy: SpawnPolicy,
    /// Pixels of travel between spawns at any speed
    pub spawn_distance: f32,
    /// Upper bound of the random extra delay (frames)
    pub spawn_jitter: f32,
    /// Accumulated points before flyers can appear
    pub flyer_min_score: u64,
    /// Chance that an eligible spawn is a flyer
    pub flyer_chance: f64,

    // === Scoring ===
    pub scoring: ScoringPolicy,
    pub milestone_interval: u64,
    pub cycle_interval: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            jump_cooldown_frames: JUMP_COOLDOWN_FRAMES,

            base_speed: 7.0,
            speed_step: 100,
            speed_increment: 1.0,
            speed_cap: 13.0,

            spawn_policy: SpawnPolicy::Timer,
            spawn_distance: 630.0,
            spawn_jitter: 40.0,
            flyer_min_score: 200,
            flyer_chance: 0.4,

            scoring: ScoringPolicy::default(),
            milestone_interval: 100,
            cycle_interval: 1000,
        }
    }
}

/// Errors from loading or validating tuning data
#[derive(Debug)]
pub enum TuningError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Io(e) => write!(f, "IO error: {}", e),
            TuningError::Parse(e) => write!(f, "Tuning parse error: {}", e),
            TuningError::Invalid(msg) => write!(f, "Invalid tuning: {}", msg),
        }
    }
}

impl std::error::Error for TuningError {}

impl From<std::io::Error> for TuningError {
    fn from(err: std::io::Error) -> Self {
        TuningError::Io(err)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        TuningError::Parse(err)
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON (missing fields keep defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: &str| Err(TuningError::Invalid(msg.to_string()));

        if !(self.gravity > 0.0) {
            return invalid("gravity must be positive");
        }
        if !(self.jump_velocity < 0.0) {
            return invalid("jump_velocity must be negative (upward)");
        }
        if !(self.jump_cooldown_frames >= 0.0) {
            return invalid("jump_cooldown_frames must not be negative");
        }
        if !(self.base_speed > 0.0) {
            return invalid("base_speed must be positive");
        }
        if !(self.speed_cap >= self.base_speed) {
            return invalid("speed_cap must be at least base_speed");
        }
        if self.speed_step == 0 {
            return invalid("speed_step must be non-zero");
        }
        if !(self.speed_increment >= 0.0) {
            return invalid("speed_increment must not be negative");
        }
        if !(self.spawn_distance > 0.0) {
            return invalid("spawn_distance must be positive");
        }
        if !(self.spawn_jitter >= 0.0 && self.spawn_jitter.is_finite()) {
            return invalid("spawn_jitter must be finite and not negative");
        }
        if !(0.0..=1.0).contains(&self.flyer_chance) {
            return invalid("flyer_chance must be within [0, 1]");
        }
        if self.milestone_interval == 0 || self.cycle_interval == 0 {
            return invalid("milestone and cycle intervals must be non-zero");
        }
        self.scoring.validate().map_err(TuningError::Invalid)
    }
}
