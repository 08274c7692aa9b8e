//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances in fractional frames supplied by the caller
//! - Seeded RNG only
//! - Stable iteration order (by obstacle ID)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod obstacle;
pub mod player;
pub mod scenery;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collision::{Hitbox, collides, first_collision};
pub use obstacle::{Obstacle, ObstacleField, ObstacleKind, SpawnPolicy};
pub use player::{Player, PlayerPose};
pub use scenery::{Cloud, Scenery};
pub use scoring::{RunState, ScoringPolicy, speed_for_score};
pub use state::{GameEvent, GamePhase, GameState, Snapshot};
pub use tick::{TickInput, tick};
