//! Frame-stepped simulation update
//!
//! Core game loop that advances the simulation by one fractional frame.

use rand::Rng;

use super::collision::first_collision;
use super::state::{GameEvent, GamePhase, GameState};
use crate::clamp_frame_step;

/// Intents for a single update (one-shots are cleared by the host afterwards)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start a run from the menu
    pub start: bool,
    /// Start a fresh run after game over
    pub restart: bool,
    /// Return from game over to the menu
    pub menu: bool,
    /// Jump (one-shot)
    pub jump: bool,
    /// Duck key held
    pub duck: bool,
}

impl TickInput {
    /// Clear one-shot intents; held state (duck) survives
    pub fn clear_one_shots(&mut self) {
        self.start = false;
        self.restart = false;
        self.menu = false;
        self.jump = false;
    }
}

/// Advance the game state by `dt` frames
pub fn tick<R: Rng>(state: &mut GameState<R>, input: &TickInput, dt: f32) {
    let dt = clamp_frame_step(dt);

    // Phase commands
    if input.start || input.restart {
        state.start_run();
    } else if input.menu {
        state.back_to_menu();
    }

    // Only an active run drives the core
    if state.phase != GamePhase::Playing {
        return;
    }

    let speed = state.run.speed;

    // Player intents then physics
    state.player.duck(input.duck);
    if input.jump && state.player.jump(&state.tuning) {
        state.events.push(GameEvent::Jump);
    }
    state.player.update(dt, state.tuning.gravity);

    state.scenery.update(dt, speed, &mut state.rng);

    // Obstacles: spawn, scroll, prune
    state
        .field
        .try_spawn(dt, speed, state.run.distance, &state.tuning, &mut state.rng);
    state.field.advance(dt, speed);
    state.field.prune();

    // First hit ends the run; nothing else happens this frame
    let player_box = state.player.hitbox();
    let hit = first_collision(&player_box, state.field.iter().map(|o| o.hitbox()));
    if let Some(index) = hit {
        let obstacle_id = state.field.obstacles[index].id;
        state.end_run(obstacle_id);
        return;
    }

    state.run.update(dt, &state.tuning, &mut state.events);
}
