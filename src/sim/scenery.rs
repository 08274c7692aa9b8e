//! Parallax scenery: drifting clouds and the scrolling ground track
//!
//! Purely cosmetic, but it draws from the run's RNG so a seeded run
//! reproduces its backdrop too.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::SCREEN_WIDTH;

/// Number of clouds kept alive
pub const CLOUD_COUNT: usize = 3;
/// Cloud sprite width; recycled once fully past the left edge
pub const CLOUD_WIDTH: f32 = 100.0;
/// Width of one ground track tile
pub const TRACK_WIDTH: f32 = 2400.0;
/// Scenery scrolls at this fraction of game speed
pub const PARALLAX: f32 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
}

impl Cloud {
    fn spawn<R: Rng>(rng: &mut R, min_offset: f32, spread: f32) -> Self {
        Self {
            pos: Vec2::new(
                SCREEN_WIDTH + min_offset + rng.random_range(0.0..spread),
                50.0 + rng.random_range(0.0..50.0),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenery {
    pub clouds: Vec<Cloud>,
    /// Horizontal offset of the ground track, in `(-TRACK_WIDTH, 0]`
    pub ground_offset: f32,
}

impl Scenery {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut scenery = Self::default();
        scenery.reset(rng);
        scenery
    }

    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.ground_offset = 0.0;
        self.clouds = (0..CLOUD_COUNT)
            .map(|_| Cloud::spawn(rng, 800.0, 800.0))
            .collect();
    }

    pub fn update<R: Rng>(&mut self, dt: f32, speed: f32, rng: &mut R) {
        let shift = speed * dt * PARALLAX;

        self.ground_offset -= shift;
        if self.ground_offset <= -TRACK_WIDTH {
            self.ground_offset %= TRACK_WIDTH;
        }

        for cloud in &mut self.clouds {
            cloud.pos.x -= shift;
            if cloud.pos.x < -CLOUD_WIDTH {
                *cloud = Cloud::spawn(rng, 3000.0, 2500.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_clouds_start_off_screen() {
        let mut rng = Pcg32::seed_from_u64(5);
        let scenery = Scenery::new(&mut rng);
        assert_eq!(scenery.clouds.len(), CLOUD_COUNT);
        for cloud in &scenery.clouds {
            assert!(cloud.pos.x >= SCREEN_WIDTH + 800.0);
            assert!((50.0..100.0).contains(&cloud.pos.y));
        }
    }

    #[test]
    fn test_clouds_drift_at_half_speed() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut scenery = Scenery::new(&mut rng);
        let before = scenery.clouds[0].pos.x;
        scenery.update(1.0, 10.0, &mut rng);
        assert_eq!(scenery.clouds[0].pos.x, before - 5.0);
    }

    #[test]
    fn test_cloud_recycled_past_left_edge() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut scenery = Scenery::new(&mut rng);
        scenery.clouds[0].pos.x = -CLOUD_WIDTH + 1.0;
        scenery.update(1.0, 10.0, &mut rng);
        assert!(scenery.clouds[0].pos.x >= SCREEN_WIDTH + 3000.0);
    }

    #[test]
    fn test_ground_offset_wraps() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut scenery = Scenery::new(&mut rng);
        for _ in 0..1000 {
            scenery.update(2.0, 13.0, &mut rng);
            assert!(scenery.ground_offset > -TRACK_WIDTH);
            assert!(scenery.ground_offset <= 0.0);
        }
    }
}
