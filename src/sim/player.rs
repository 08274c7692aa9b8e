//! Player entity: vertical motion, ground clamp, jump and duck
//!
//! The player never moves horizontally; the world scrolls past it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Hitbox;
use crate::consts::*;
use crate::tuning::Tuning;

/// Frames per run-cycle animation step
const RUN_ANIM_FRAMES: f32 = 5.0;

/// What the renderer should draw for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPose {
    Running,
    Jumping,
    Ducking,
    Dead,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the sprite; x is fixed
    pub pos: Vec2,
    /// Vertical velocity (pixels/frame, negative = up)
    pub velocity_y: f32,
    /// Resting y of the sprite top
    pub ground_y: f32,
    pub ducking: bool,
    pub grounded: bool,
    /// Frames left before another jump is accepted
    pub jump_cooldown: f32,
    pub dead: bool,
    /// Run-cycle frame index (0 or 1)
    pub run_frame: u8,
    anim_timer: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(GROUND_Y)
    }
}

impl Player {
    pub fn new(ground_y: f32) -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, ground_y),
            velocity_y: 0.0,
            ground_y,
            ducking: false,
            grounded: true,
            jump_cooldown: 0.0,
            dead: false,
            run_frame: 0,
            anim_timer: 0.0,
        }
    }

    /// Return to the standing start pose (kept across runs, never recreated)
    pub fn reset(&mut self) {
        *self = Self::new(self.ground_y);
    }

    /// Integrate vertical motion for `dt` frames
    pub fn update(&mut self, dt: f32, gravity: f32) {
        if !self.grounded {
            self.velocity_y += gravity * dt;
            self.pos.y += self.velocity_y * dt;

            // Only a descending player can land (a zero-length step must not cancel a jump)
            if self.velocity_y >= 0.0 && self.pos.y >= self.ground_y {
                self.pos.y = self.ground_y;
                self.velocity_y = 0.0;
                self.grounded = true;
            }
        }

        if self.jump_cooldown > 0.0 {
            self.jump_cooldown = (self.jump_cooldown - dt).max(0.0);
        }

        if self.grounded {
            self.anim_timer += dt;
            if self.anim_timer >= RUN_ANIM_FRAMES {
                self.anim_timer = 0.0;
                self.run_frame = (self.run_frame + 1) % 2;
            }
        }
    }

    /// Launch upward. Returns false (and changes nothing) unless grounded
    /// with the cooldown expired.
    pub fn jump(&mut self, tuning: &Tuning) -> bool {
        if !self.can_jump() {
            return false;
        }
        self.velocity_y = tuning.jump_velocity;
        self.grounded = false;
        self.ducking = false;
        self.jump_cooldown = tuning.jump_cooldown_frames;
        true
    }

    pub fn can_jump(&self) -> bool {
        self.grounded && self.jump_cooldown <= 0.0 && !self.dead
    }

    /// Start or stop ducking; starting is ignored while airborne
    pub fn duck(&mut self, active: bool) {
        if active && !self.grounded {
            return;
        }
        self.ducking = active;
    }

    /// Collision box, narrower than the sprite and lowered when ducking
    pub fn hitbox(&self) -> Hitbox {
        let x = self.pos.x + HITBOX_INSET;
        let w = PLAYER_WIDTH - 2.0 * HITBOX_INSET;
        if self.ducking {
            let duck_y = self.ground_y + (DUCK_Y - GROUND_Y);
            Hitbox::new(x, duck_y + HITBOX_INSET, w, DUCK_HITBOX_HEIGHT)
        } else {
            Hitbox::new(x, self.pos.y + HITBOX_INSET, w, PLAYER_HEIGHT - 2.0 * HITBOX_INSET)
        }
    }

    pub fn pose(&self) -> PlayerPose {
        if self.dead {
            PlayerPose::Dead
        } else if !self.grounded {
            PlayerPose::Jumping
        } else if self.ducking {
            PlayerPose::Ducking
        } else {
            PlayerPose::Running
        }
    }
}
