//! Obstacles and the generator that spawns, scrolls and prunes them
//!
//! All randomness comes from the caller's `Rng`, so a seeded source replays
//! the exact same obstacle sequence.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Hitbox;
use crate::consts::*;
use crate::tuning::Tuning;

/// Obstacle categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Sits on the ground; jump over it
    GroundHazard,
    /// Flies at one of the fixed tiers; duck under or avoid it
    Flyer,
}

/// When the generator places a new obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnPolicy {
    /// Countdown re-seeded from speed plus random jitter
    #[default]
    Timer,
    /// Spawn whenever no obstacle is active
    WhenEmpty,
}

/// A single obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    /// Preset index (hazard shape or flyer colour)
    pub variant: u8,
    /// Flight tier index (flyers only)
    pub tier: u8,
    /// Wing frame (flyers only)
    pub flap: u8,
    flap_timer: f32,
    size: Vec2,
}

impl Obstacle {
    /// Ground hazard using one of `HAZARD_PRESETS`
    pub fn ground_hazard(id: u32, x: f32, variant: u8) -> Self {
        let index = (variant as usize).min(HAZARD_PRESETS.len() - 1);
        let (w, h) = HAZARD_PRESETS[index];
        Self {
            id,
            kind: ObstacleKind::GroundHazard,
            pos: Vec2::new(x, HAZARD_BASELINE_Y - h),
            variant: index as u8,
            tier: 0,
            flap: 0,
            flap_timer: 0.0,
            size: Vec2::new(w, h),
        }
    }

    /// Flyer at one of `FLYER_TIERS`
    pub fn flyer(id: u32, x: f32, tier: u8, variant: u8) -> Self {
        let tier = (tier as usize).min(FLYER_TIERS.len() - 1);
        Self {
            id,
            kind: ObstacleKind::Flyer,
            pos: Vec2::new(x, FLYER_TIERS[tier]),
            variant: variant % FLYER_VARIANTS,
            tier: tier as u8,
            flap: 0,
            flap_timer: 0.0,
            size: Vec2::new(FLYER_WIDTH, FLYER_HEIGHT),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Scroll left and animate wings
    pub fn advance(&mut self, dt: f32, speed: f32) {
        self.pos.x -= speed * dt;
        if self.kind == ObstacleKind::Flyer {
            self.flap_timer += dt;
            while self.flap_timer >= FLAP_PERIOD_FRAMES {
                self.flap_timer -= FLAP_PERIOD_FRAMES;
                self.flap = (self.flap + 1) % 2;
            }
        }
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox {
            pos: self.pos,
            size: self.size,
        }
    }
}

/// Active obstacle set plus spawn bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleField {
    /// Active obstacles, ordered by id (oldest first)
    pub obstacles: Vec<Obstacle>,
    /// Frames until the next timed spawn
    pub spawn_timer: f32,
    next_id: u32,
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleField {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
            spawn_timer: 0.0,
            next_id: 1,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Obstacle> {
        self.obstacles.iter()
    }

    /// Spawn an obstacle if the policy says so. Returns the new obstacle's id.
    ///
    /// `progress` is the run's accumulated score, which gates flyers.
    pub fn try_spawn<R: Rng>(
        &mut self,
        dt: f32,
        speed: f32,
        progress: u64,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Option<u32> {
        let due = match tuning.spawn_policy {
            SpawnPolicy::Timer => {
                self.spawn_timer -= dt;
                if self.spawn_timer <= 0.0 {
                    self.spawn_timer = spawn_interval(speed, tuning, rng);
                    true
                } else {
                    false
                }
            }
            SpawnPolicy::WhenEmpty => self.obstacles.is_empty(),
        };
        if !due {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        let obstacle = roll_obstacle(id, SCREEN_WIDTH + SPAWN_MARGIN, progress, tuning, rng);
        log::debug!(
            "Spawned {:?} #{} ({}x{}) at y={}",
            obstacle.kind,
            id,
            obstacle.width(),
            obstacle.height(),
            obstacle.pos.y
        );
        self.obstacles.push(obstacle);
        Some(id)
    }

    /// Scroll every obstacle by `speed * dt`
    pub fn advance(&mut self, dt: f32, speed: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.advance(dt, speed);
        }
    }

    /// Drop obstacles whose right edge has passed x = 0. Returns how many.
    pub fn prune(&mut self) -> usize {
        let before = self.obstacles.len();
        self.obstacles.retain(|o| !o.is_off_screen());
        before - self.obstacles.len()
    }
}

/// Frames until the next timed spawn: inversely scaled by speed, plus jitter
pub fn spawn_interval<R: Rng>(speed: f32, tuning: &Tuning, rng: &mut R) -> f32 {
    let base = tuning.spawn_distance / speed.max(f32::EPSILON);
    let jitter = if tuning.spawn_jitter > 0.0 {
        rng.random_range(0.0..tuning.spawn_jitter)
    } else {
        0.0
    };
    base + jitter
}

/// Choose kind and preset for a new obstacle
pub fn roll_obstacle<R: Rng>(
    id: u32,
    x: f32,
    progress: u64,
    tuning: &Tuning,
    rng: &mut R,
) -> Obstacle {
    let flyer_eligible = progress >= tuning.flyer_min_score;
    let chance = if tuning.flyer_chance.is_nan() {
        0.0
    } else {
        tuning.flyer_chance.clamp(0.0, 1.0)
    };
    if flyer_eligible && rng.random_bool(chance) {
        let tier = rng.random_range(0..FLYER_TIERS.len()) as u8;
        let variant = rng.random_range(0..FLYER_VARIANTS);
        Obstacle::flyer(id, x, tier, variant)
    } else {
        let variant = rng.random_range(0..HAZARD_PRESETS.len()) as u8;
        Obstacle::ground_hazard(id, x, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_hazard_presets() {
        for (i, &(w, h)) in HAZARD_PRESETS.iter().enumerate() {
            let hazard = Obstacle::ground_hazard(1, 100.0, i as u8);
            assert_eq!(hazard.width(), w);
            assert_eq!(hazard.height(), h);
            // Rests on the baseline
            assert_eq!(hazard.hitbox().bottom(), HAZARD_BASELINE_Y);
        }
    }

    #[test]
    fn test_flyer_tiers() {
        for (i, &y) in FLYER_TIERS.iter().enumerate() {
            let flyer = Obstacle::flyer(1, 100.0, i as u8, 0);
            assert_eq!(flyer.pos.y, y);
            assert_eq!(flyer.kind, ObstacleKind::Flyer);
        }
        // Out-of-range indices clamp to the last preset
        assert_eq!(Obstacle::flyer(1, 0.0, 9, 5).tier, 2);
    }

    #[test]
    fn test_advance_moves_left_by_speed() {
        let mut hazard = Obstacle::ground_hazard(1, 500.0, 0);
        hazard.advance(1.5, 8.0);
        assert_eq!(hazard.pos.x, 488.0);
    }

    #[test]
    fn test_flap_independent_of_speed() {
        let mut slow = Obstacle::flyer(1, 500.0, 0, 0);
        let mut fast = Obstacle::flyer(2, 500.0, 0, 0);
        for _ in 0..FLAP_PERIOD_FRAMES as u32 {
            slow.advance(1.0, 2.0);
            fast.advance(1.0, 20.0);
        }
        assert_eq!(slow.flap, 1);
        assert_eq!(fast.flap, 1);
    }

    #[test]
    fn test_off_screen_boundary() {
        let mut hazard = Obstacle::ground_hazard(1, 0.0, 0);
        let w = hazard.width();

        hazard.pos.x = -w;
        assert!(!hazard.is_off_screen());
        hazard.pos.x = -w - 0.01;
        assert!(hazard.is_off_screen());
    }

    #[test]
    fn test_spawn_advance_prune_round_trip() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut field = ObstacleField::new();

        let id = field.try_spawn(1.0, 7.0, 0, &tuning, &mut rng);
        assert_eq!(id, Some(1));
        assert_eq!(field.obstacles[0].pos.x, SCREEN_WIDTH + SPAWN_MARGIN);

        // Scroll until just before leaving
        let travel = SCREEN_WIDTH + SPAWN_MARGIN + field.obstacles[0].width();
        field.advance(1.0, travel);
        assert!(!field.obstacles[0].is_off_screen());
        assert_eq!(field.prune(), 0);

        field.advance(1.0, 1.0);
        assert!(field.obstacles[0].is_off_screen());
        assert_eq!(field.prune(), 1);
        assert!(field.is_empty());
    }

    #[test]
    fn test_timer_policy_reseeds_with_speed() {
        let tuning = Tuning {
            spawn_jitter: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = ObstacleField::new();

        assert!(field.try_spawn(1.0, 7.0, 0, &tuning, &mut rng).is_some());
        assert_eq!(field.spawn_timer, 90.0);

        // Not due until the countdown runs out
        assert!(field.try_spawn(89.0, 7.0, 0, &tuning, &mut rng).is_none());
        assert!(field.try_spawn(1.0, 14.0, 0, &tuning, &mut rng).is_some());
        assert_eq!(field.spawn_timer, 45.0);
    }

    #[test]
    fn test_when_empty_policy() {
        let tuning = Tuning {
            spawn_policy: SpawnPolicy::WhenEmpty,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = ObstacleField::new();

        assert!(field.try_spawn(1.0, 7.0, 0, &tuning, &mut rng).is_some());
        assert!(field.try_spawn(100.0, 7.0, 0, &tuning, &mut rng).is_none());

        field.obstacles.clear();
        assert!(field.try_spawn(1.0, 7.0, 0, &tuning, &mut rng).is_some());
    }

    #[test]
    fn test_jitter_is_bounded() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..500 {
            let interval = spawn_interval(7.0, &tuning, &mut rng);
            assert!(interval >= 90.0);
            assert!(interval < 90.0 + tuning.spawn_jitter);
        }
    }

    #[test]
    fn test_no_flyers_below_threshold() {
        let tuning = Tuning {
            flyer_chance: 1.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        for id in 0..200 {
            let obstacle = roll_obstacle(id, 0.0, tuning.flyer_min_score - 1, &tuning, &mut rng);
            assert_eq!(obstacle.kind, ObstacleKind::GroundHazard);
        }
        let obstacle = roll_obstacle(0, 0.0, tuning.flyer_min_score, &tuning, &mut rng);
        assert_eq!(obstacle.kind, ObstacleKind::Flyer);
    }

    #[test]
    fn test_out_of_range_flyer_chance_is_clamped() {
        let mut rng = Pcg32::seed_from_u64(5);
        for (chance, kind) in [
            (1.5, ObstacleKind::Flyer),
            (-0.5, ObstacleKind::GroundHazard),
            (f64::NAN, ObstacleKind::GroundHazard),
        ] {
            let tuning = Tuning {
                flyer_chance: chance,
                flyer_min_score: 0,
                ..Default::default()
            };
            for id in 0..50 {
                assert_eq!(roll_obstacle(id, 0.0, 0, &tuning, &mut rng).kind, kind);
            }
        }
    }

    #[test]
    fn test_flyers_are_a_minority() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let flyers = (0..2000)
            .filter(|&id| roll_obstacle(id, 0.0, 10_000, &tuning, &mut rng).kind == ObstacleKind::Flyer)
            .count();
        // 40% nominal
        assert!(flyers > 650 && flyers < 950, "flyers = {}", flyers);
    }

    #[test]
    fn test_seeded_sequence_is_reproducible() {
        let tuning = Tuning::default();
        let roll = |seed: u64| {
            let mut rng = Pcg32::seed_from_u64(seed);
            (0..50)
                .map(|id| {
                    let o = roll_obstacle(id, 0.0, 1_000, &tuning, &mut rng);
                    (o.kind, o.variant, o.tier)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(roll(42), roll(42));
        assert_ne!(roll(42), roll(43));
    }
}
