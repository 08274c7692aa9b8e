//! Dino Runner - An endless side-scrolling runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, scoring)
//! - `session`: Run-boundary orchestration and input handlers
//! - `persistence`: Key/value storage for high score and settings
//! - `audio`: Event-driven sound cues and background music sequencing
//! - `platform`: Frame clock for animation-frame driven hosts
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use session::Session;
pub use settings::{Settings, SettingsPatch};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Nominal frame duration; one unit of simulation time
    pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest step the core will integrate in one call (in frames)
    pub const MAX_FRAME_STEP: f32 = 2.0;

    /// Logical playfield dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 300.0;

    /// Player sprite placement
    pub const PLAYER_X: f32 = 80.0;
    pub const GROUND_Y: f32 = 200.0;
    pub const DUCK_Y: f32 = GROUND_Y + 30.0;
    pub const PLAYER_WIDTH: f32 = 44.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;
    /// Hitbox inset on each side of the sprite (collision forgiveness)
    pub const HITBOX_INSET: f32 = 10.0;
    /// Hitbox height while ducking
    pub const DUCK_HITBOX_HEIGHT: f32 = 25.0;

    /// Player physics (pixels and frames)
    pub const GRAVITY: f32 = 0.8;
    pub const JUMP_VELOCITY: f32 = -14.0;
    pub const JUMP_COOLDOWN_FRAMES: f32 = 12.0;

    /// Obstacles enter this far past the right edge
    pub const SPAWN_MARGIN: f32 = 30.0;
    /// Bottom edge of ground hazards
    pub const HAZARD_BASELINE_Y: f32 = 268.0;
    /// Ground hazard (width, height) presets
    pub const HAZARD_PRESETS: [(f32, f32); 3] = [(24.0, 40.0), (32.0, 46.0), (40.0, 51.0)];
    /// Flyer dimensions and flight tiers (top edge)
    pub const FLYER_WIDTH: f32 = 46.0;
    pub const FLYER_HEIGHT: f32 = 20.0;
    pub const FLYER_TIERS: [f32; 3] = [160.0, 190.0, 220.0];
    pub const FLYER_VARIANTS: u8 = 2;
    /// Wing flap period in frames (independent of game speed)
    pub const FLAP_PERIOD_FRAMES: f32 = 12.0;

    /// Score display wraps at this value
    pub const SCORE_MODULUS: u64 = 100_000;
}

/// Convert a wall-clock delta to a frame step, capped at `MAX_FRAME_STEP`
#[inline]
pub fn frame_step_from_ms(delta_ms: f64) -> f32 {
    if !delta_ms.is_finite() || delta_ms <= 0.0 {
        return 0.0;
    }
    ((delta_ms / consts::NOMINAL_FRAME_MS) as f32).min(consts::MAX_FRAME_STEP)
}

/// Clamp a caller-supplied frame step into the range the core integrates
#[inline]
pub fn clamp_frame_step(dt: f32) -> f32 {
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, consts::MAX_FRAME_STEP)
}
