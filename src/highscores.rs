//! Best-score record
//!
//! Stored under `dino_highscore` as a plain integer string.

use serde::{Deserialize, Serialize};

use crate::consts::SCORE_MODULUS;

/// Storage key for the best score
pub const STORAGE_KEY: &str = "dino_highscore";

/// Digits shown on the HUD (scores are zero-padded)
pub const SCORE_DIGITS: usize = 5;

/// High-water mark across runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u32,
}

impl HighScore {
    pub fn new(best: u32) -> Self {
        Self { best }
    }

    /// Check if a score beats the stored best (ties do not count)
    pub fn qualifies(&self, score: u32) -> bool {
        score > self.best
    }

    /// Record `score` if it is a new best. Returns true when it was.
    pub fn record(&mut self, score: u32) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        true
    }

    /// Parse the stored representation (surrounding whitespace allowed)
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<u64>()
            .ok()
            .filter(|&v| v < SCORE_MODULUS)
            .map(|v| Self::new(v as u32))
    }

    /// Stored representation
    pub fn to_storage(&self) -> String {
        self.best.to_string()
    }
}

/// Format a score as the HUD does: 5 digits, zero-padded
pub fn format_score(score: u32) -> String {
    format!("{:0width$}", score, width = SCORE_DIGITS)
}
