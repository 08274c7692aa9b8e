//! Score accumulation and the difficulty ramp
//!
//! The run tracks an unwrapped point total (`distance`); the displayed score
//! is that total modulo `SCORE_MODULUS`. Milestone and day/night events are
//! driven by last-fired markers over the unwrapped total, so a step that
//! skips an exact multiple still fires exactly once per threshold.

use serde::{Deserialize, Serialize};

use super::state::GameEvent;
use crate::consts::SCORE_MODULUS;
use crate::tuning::Tuning;

/// How points accrue per simulation step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ScoringPolicy {
    /// Flat +1 per step
    PerFrame,
    /// `floor(dt * speed * rate)`, carrying the fraction to the next step
    SpeedScaled { rate: f32 },
    /// `points` every `every` steps
    FrameGated { every: u32, points: u32 },
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy::SpeedScaled { rate: 0.025 }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            ScoringPolicy::PerFrame => Ok(()),
            ScoringPolicy::SpeedScaled { rate } if rate > 0.0 => Ok(()),
            ScoringPolicy::SpeedScaled { .. } => Err("scoring rate must be positive".into()),
            ScoringPolicy::FrameGated { every, .. } if every > 0 => Ok(()),
            ScoringPolicy::FrameGated { .. } => Err("scoring gate must be non-zero".into()),
        }
    }
}

/// Speed for a given score: `min(base + floor(score / step) * increment, cap)`
pub fn speed_for_score(score: u32, tuning: &Tuning) -> f32 {
    let steps = (score / tuning.speed_step.max(1)) as f32;
    (tuning.base_speed + steps * tuning.speed_increment).min(tuning.speed_cap)
}

/// Per-run score, speed and event markers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Displayed score (wraps at `SCORE_MODULUS`)
    pub score: u32,
    /// Total points this run, never wraps
    pub distance: u64,
    /// Current scroll speed (pixels/frame); never decreases within a run
    pub speed: f32,
    /// Milestones fired so far (index of the last one)
    pub milestone_marker: u64,
    /// Day/night toggles fired so far
    pub cycle_marker: u64,
    pub night: bool,
    /// Steps simulated this run
    pub frames: u64,
    carry: f32,
    gate: u32,
}

impl RunState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            distance: 0,
            speed: speed_for_score(0, tuning),
            milestone_marker: 0,
            cycle_marker: 0,
            night: false,
            frames: 0,
            carry: 0.0,
            gate: 0,
        }
    }

    /// Points earned by one step under `policy`
    fn points_for_step(&mut self, dt: f32, policy: ScoringPolicy) -> u64 {
        match policy {
            ScoringPolicy::PerFrame => 1,
            ScoringPolicy::SpeedScaled { rate } => {
                let raw = dt * self.speed * rate + self.carry;
                let whole = raw.floor();
                self.carry = raw - whole;
                whole as u64
            }
            ScoringPolicy::FrameGated { every, points } => {
                self.gate += 1;
                if self.gate >= every {
                    self.gate = 0;
                    points as u64
                } else {
                    0
                }
            }
        }
    }

    /// Add `points` directly and run the speed/milestone/cycle bookkeeping
    pub fn add_points(&mut self, points: u64, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        let previous = self.score;
        self.distance += points;
        self.score = (self.distance % SCORE_MODULUS) as u32;
        if self.score < previous {
            log::info!("Score wrapped at {}", SCORE_MODULUS);
        }

        let target = speed_for_score(self.score, tuning);
        if target > self.speed {
            log::info!("Speed up: {:.1} -> {:.1} at score {}", self.speed, target, self.score);
            self.speed = target;
        }

        // Zero intervals are rejected by `Tuning::validate`; treat them as 1 here
        let milestone_interval = tuning.milestone_interval.max(1);
        let milestones = self.distance / milestone_interval;
        while self.milestone_marker < milestones {
            self.milestone_marker += 1;
            let score = ((self.milestone_marker * milestone_interval) % SCORE_MODULUS) as u32;
            events.push(GameEvent::Milestone { score });
        }

        let cycles = self.distance / tuning.cycle_interval.max(1);
        while self.cycle_marker < cycles {
            self.cycle_marker += 1;
            self.night = !self.night;
            log::info!("Cycle -> {}", if self.night { "night" } else { "day" });
            events.push(GameEvent::Cycle { night: self.night });
        }
    }

    /// Advance scoring by one step of `dt` frames
    pub fn update(&mut self, dt: f32, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        self.frames += 1;
        let points = self.points_for_step(dt, tuning.scoring);
        if points > 0 {
            self.add_points(points, tuning, events);
        }
    }
}
