//! Axis-aligned collision detection
//!
//! Every entity exposes a `Hitbox`; a run ends on the first overlapping pair.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box: top-left corner plus size (screen space, y grows down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Hitbox {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// Strict overlap test; boxes that only share an edge do not collide
#[inline]
pub fn collides(a: &Hitbox, b: &Hitbox) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Index of the first hitbox in `others` that overlaps `probe`
///
/// Stops at the first hit; later boxes are not examined.
pub fn first_collision<I>(probe: &Hitbox, others: I) -> Option<usize>
where
    I: IntoIterator<Item = Hitbox>,
{
    others.into_iter().position(|other| collides(probe, &other))
}
