//! Game state and core simulation types
//!
//! `GameState` is the explicitly owned session context: every core call takes
//! it by reference, and nothing in the simulation reaches for ambient state.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Hitbox;
use super::obstacle::{Obstacle, ObstacleField};
use super::player::{Player, PlayerPose};
use super::scenery::{Cloud, Scenery};
use super::scoring::RunState;
use crate::tuning::{Tuning, TuningError};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Assets still being fetched by the host
    Loading,
    /// Asset load failed; terminal, never playable
    Error,
    /// Idle, waiting for a start command
    Menu,
    /// Active run
    Playing,
    /// Run ended by a collision
    GameOver,
}

impl GamePhase {
    /// Phases from which a start/restart command begins a new run
    pub fn can_start(&self) -> bool {
        matches!(self, GamePhase::Menu | GamePhase::GameOver)
    }
}

/// Outbound notifications for audio/visual collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { seed: u64 },
    Jump,
    Collision { obstacle_id: u32 },
    Milestone { score: u32 },
    Cycle { night: bool },
    GameOver { score: u32 },
    NewHighScore { score: u32 },
    SoundToggled { on: bool },
}

/// Read-only per-frame view for the rendering collaborator
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub pose: PlayerPose,
    pub player_x: f32,
    pub player_y: f32,
    pub player_hitbox: Hitbox,
    pub run_frame: u8,
    pub obstacles: Vec<Obstacle>,
    pub clouds: Vec<Cloud>,
    pub ground_offset: f32,
    pub score: u32,
    pub speed: f32,
    pub night: bool,
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState<R: Rng = Pcg32> {
    /// Seed the RNG was created from (reported on run start)
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Reason for the `Error` phase
    pub error: Option<String>,
    /// Owned across runs; reset, never recreated
    pub player: Player,
    /// Active obstacles (exclusive to the current run)
    pub field: ObstacleField,
    pub run: RunState,
    pub scenery: Scenery,
    /// Events emitted since the last drain, in order
    pub events: Vec<GameEvent>,
    /// Number of runs started this session
    pub runs_started: u32,
    pub(super) rng: R,
}

impl GameState<Pcg32> {
    /// Create a session in `Menu` with default tuning
    pub fn new(seed: u64) -> Self {
        Self::build(seed, Tuning::default(), Pcg32::seed_from_u64(seed))
    }

    /// Create a session with custom tuning, rejecting values the core can't run with
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        Self::with_rng(seed, tuning, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> GameState<R> {
    /// Create a session around any random source
    pub fn with_rng(seed: u64, tuning: Tuning, rng: R) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(seed, tuning, rng))
    }

    fn build(seed: u64, tuning: Tuning, mut rng: R) -> Self {
        let scenery = Scenery::new(&mut rng);
        Self {
            seed,
            run: RunState::new(&tuning),
            tuning,
            phase: GamePhase::Menu,
            error: None,
            player: Player::default(),
            field: ObstacleField::new(),
            scenery,
            events: Vec::new(),
            runs_started: 0,
            rng,
        }
    }

    /// Gate the session behind an asset fetch
    pub fn begin_loading(&mut self) {
        if self.phase != GamePhase::Error {
            self.phase = GamePhase::Loading;
        }
    }

    /// Finish the asset fetch: success opens the menu, failure is terminal
    pub fn finish_loading(&mut self, result: Result<(), String>) {
        if self.phase != GamePhase::Loading {
            return;
        }
        match result {
            Ok(()) => {
                log::info!("Assets ready");
                self.phase = GamePhase::Menu;
            }
            Err(reason) => {
                log::error!("Asset load failed: {}", reason);
                self.error = Some(reason);
                self.phase = GamePhase::Error;
            }
        }
    }

    /// Reset run state, player, obstacles and scenery
    pub fn reset_run(&mut self) {
        self.player.reset();
        self.field.clear();
        self.run = RunState::new(&self.tuning);
        self.scenery.reset(&mut self.rng);
    }

    /// Begin a fresh run. Ignored unless in `Menu` or `GameOver`.
    pub fn start_run(&mut self) -> bool {
        if !self.phase.can_start() {
            return false;
        }
        self.reset_run();
        self.phase = GamePhase::Playing;
        self.runs_started += 1;
        log::info!("Run {} started (seed {})", self.runs_started, self.seed);
        self.events.push(GameEvent::RunStarted { seed: self.seed });
        true
    }

    /// Leave the game-over screen for the menu
    pub fn back_to_menu(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.reset_run();
        self.phase = GamePhase::Menu;
        true
    }

    /// End the run after a collision with `obstacle_id`
    pub fn end_run(&mut self, obstacle_id: u32) {
        self.player.dead = true;
        self.phase = GamePhase::GameOver;
        log::info!(
            "Run {} over: score {} after {} frames",
            self.runs_started,
            self.run.score,
            self.run.frames
        );
        self.events.push(GameEvent::Collision { obstacle_id });
        self.events.push(GameEvent::GameOver {
            score: self.run.score,
        });
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            pose: self.player.pose(),
            player_x: self.player.pos.x,
            player_y: self.player.pos.y,
            player_hitbox: self.player.hitbox(),
            run_frame: self.player.run_frame,
            obstacles: self.field.obstacles.clone(),
            clouds: self.scenery.clouds.clone(),
            ground_offset: self.scenery.ground_offset,
            score: self.run.score,
            speed: self.run.speed,
            night: self.run.night,
        }
    }
}
