//! Bodies and their per-category behavior
//!
//! A single `Body` record covers suns, asteroids, rockets and blocks. What
//! differs between them (mass scaling, field coupling, collision extent,
//! who pulls on whom) is looked up from the `Category` tag.

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Process-unique body identifier (shared counter across all categories)
pub type BodyId = u32;

/// Which kind of attractor a body is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttractorKind {
    /// Primary attractor; feeding it asteroids is the goal
    Sun,
    /// Secondary attractor; absorbs for a smaller reward
    BlackHole,
}

impl AttractorKind {
    /// Score per unit of absorbed mass
    pub fn score_per_mass(&self) -> f64 {
        match self {
            AttractorKind::Sun => 10.0,
            AttractorKind::BlackHole => 2.0,
        }
    }
}

/// Body category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Attractor(AttractorKind),
    FreeBody,
    Projectile,
    Obstacle,
}

/// How far a source's pull reaches a given sink
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reach {
    /// Source does not act on the sink
    None,
    /// Source acts only within this distance
    Within(f64),
    /// Source acts across the whole field
    Unlimited,
}

impl Reach {
    /// Whether a source at `distance` is in reach
    #[inline]
    pub fn admits(&self, distance: f64) -> bool {
        match *self {
            Reach::None => false,
            Reach::Within(cutoff) => distance <= cutoff,
            Reach::Unlimited => true,
        }
    }
}

impl Category {
    /// Gravitational coupling of a body of this category (as a sink)
    pub fn coupling(&self) -> f64 {
        match self {
            Category::Attractor(_) => ATTRACTOR_G,
            Category::FreeBody => FREE_BODY_G,
            Category::Projectile => PROJECTILE_G,
            Category::Obstacle => 0.0,
        }
    }

    /// Mass for a freshly created body of this category
    pub fn initial_mass(&self, radius: f64) -> f64 {
        let base = radius.sqrt();
        match self {
            Category::Attractor(_) => base * ATTRACTOR_MASS_FACTOR,
            Category::Projectile => base * PROJECTILE_MASS_FACTOR,
            Category::FreeBody | Category::Obstacle => base,
        }
    }

    /// Reach of a source of this category on a sink of category `sink`
    pub fn reach_on(&self, sink: Category) -> Reach {
        match self {
            Category::FreeBody => Reach::Within(FREE_BODY_REACH),
            Category::Projectile => Reach::Unlimited,
            Category::Attractor(_) if sink == Category::Projectile => Reach::Unlimited,
            Category::Attractor(_) => Reach::Within(ATTRACTOR_REACH),
            Category::Obstacle => Reach::None,
        }
    }

    /// Whether bodies of this category move under the integrator
    pub fn is_mobile(&self) -> bool {
        matches!(self, Category::FreeBody | Category::Projectile)
    }
}

/// One faded position sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSample {
    pub pos: DVec2,
    pub alpha: i32,
}

/// Time-decaying position history (oldest first)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    samples: VecDeque<TrailSample>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current position at full opacity
    pub fn record(&mut self, pos: DVec2) {
        self.samples.push_back(TrailSample {
            pos,
            alpha: TRAIL_ALPHA_START,
        });
    }

    /// Fade every sample by one step and evict the fully faded ones
    pub fn decay(&mut self) {
        for sample in self.samples.iter_mut() {
            sample.alpha -= TRAIL_ALPHA_STEP;
        }
        while self.samples.front().is_some_and(|s| s.alpha <= 0) {
            self.samples.pop_front();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> impl Iterator<Item = &TrailSample> {
        self.samples.iter()
    }
}

/// A simulated body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub category: Category,
    /// Center for round bodies, top-left corner for obstacles
    pub pos: DVec2,
    pub vel: DVec2,
    /// Radius for round bodies, edge length for obstacles
    pub radius: f64,
    pub mass: f64,
    /// Coupling constant applied when this body is pulled
    pub g: f64,
    /// Position history (projectiles only)
    #[serde(default)]
    pub trail: Trail,
}

impl Body {
    pub fn new(id: BodyId, category: Category, pos: DVec2, vel: DVec2, radius: f64) -> Self {
        Self {
            id,
            category,
            pos,
            vel,
            radius,
            mass: category.initial_mass(radius),
            g: category.coupling(),
            trail: Trail::new(),
        }
    }

    /// Collision rectangle
    pub fn rect(&self) -> Rect {
        let r = self.radius;
        match self.category {
            Category::Obstacle => Rect::new(self.pos.x, self.pos.y, r - 5.0, r - 5.0),
            Category::Projectile => Rect::new(self.pos.x - r, self.pos.y - r, r * 2.0 + 4.0, r * 2.0 + 4.0),
            Category::FreeBody | Category::Attractor(_) => {
                Rect::new(self.pos.x - r, self.pos.y - r, r * 2.0 - 2.0, r * 2.0 - 2.0)
            }
        }
    }

    /// Center point regardless of how `pos` is anchored
    pub fn center(&self) -> DVec2 {
        match self.category {
            Category::Obstacle => self.pos + DVec2::splat((self.radius / 2.0).floor()),
            _ => self.pos,
        }
    }

    /// Momentum vector
    pub fn momentum(&self) -> DVec2 {
        self.vel * self.mass
    }

    /// Glowing core radius of an attractor, grows as it is fed
    pub fn core_radius(&self) -> f64 {
        (self.mass - 7.0 * self.radius.sqrt()).max(0.0).sqrt()
    }

    /// Absorb another free body: grow toward it and conserve momentum
    ///
    /// While this body is no more than twice the other's radius, its center
    /// moves to the (floored) midpoint, but never more than `other.radius`
    /// along each axis. Larger bodies hold their position.
    pub fn absorb(&mut self, other: &Body) {
        let size = other.radius;
        if self.radius <= size * 2.0 {
            self.pos.x = blend_toward(self.pos.x, other.pos.x, size);
            self.pos.y = blend_toward(self.pos.y, other.pos.y, size);
        }
        self.radius = (self.radius + size.powf(0.1).trunc()).max(size + self.radius.powf(0.1).trunc());

        let total = self.mass + other.mass;
        self.vel = (self.momentum() + other.momentum()) / total;
        self.mass = total;
    }

    /// Take the impulse of a projectile blast (half the rocket's momentum, floored)
    pub fn take_blast(&mut self, rocket: &Body) {
        let kick = (rocket.momentum() / 2.0).floor();
        self.vel = (kick + self.momentum()) / (rocket.mass + self.mass);
    }
}

/// Move `from` to the floored midpoint with `to`, by at most `limit`
#[inline]
fn blend_toward(from: f64, to: f64, limit: f64) -> f64 {
    let midpoint = ((from + to) / 2.0).floor();
    if from - to >= 0.0 {
        (from - limit).max(midpoint)
    } else {
        (from + limit).min(midpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn asteroid(id: BodyId, x: f64, y: f64, radius: f64) -> Body {
        Body::new(id, Category::FreeBody, DVec2::new(x, y), DVec2::ZERO, radius)
    }

    #[test]
    fn test_category_mass() {
        let rock = asteroid(1, 0.0, 0.0, 8.0);
        assert!((rock.mass - 8f64.sqrt()).abs() < 1e-12);

        let rocket = Body::new(2, Category::Projectile, DVec2::ZERO, DVec2::ZERO, 3.0);
        assert!((rocket.mass - 30.0 * 3f64.sqrt()).abs() < 1e-12);
        assert_eq!(rocket.g, PROJECTILE_G);

        let sun = Body::new(3, Category::Attractor(AttractorKind::Sun), DVec2::ZERO, DVec2::ZERO, 15.0);
        assert!((sun.mass - 10.0 * 15f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rect_shapes() {
        let rock = asteroid(1, 100.0, 100.0, 8.0);
        assert_eq!(rock.rect(), Rect::new(92.0, 92.0, 14.0, 14.0));

        let rocket = Body::new(2, Category::Projectile, DVec2::new(50.0, 50.0), DVec2::ZERO, 3.0);
        assert_eq!(rocket.rect(), Rect::new(47.0, 47.0, 10.0, 10.0));

        let block = Body::new(3, Category::Obstacle, DVec2::new(40.0, 80.0), DVec2::ZERO, 40.0);
        assert_eq!(block.rect(), Rect::new(40.0, 80.0, 35.0, 35.0));
        assert_eq!(block.center(), DVec2::new(60.0, 100.0));
    }

    #[test]
    fn test_reach_table() {
        let sun = Category::Attractor(AttractorKind::Sun);
        assert_eq!(sun.reach_on(Category::FreeBody), Reach::Within(ATTRACTOR_REACH));
        assert_eq!(sun.reach_on(Category::Projectile), Reach::Unlimited);
        assert_eq!(Category::FreeBody.reach_on(Category::FreeBody), Reach::Within(80.0));
        assert_eq!(Category::Obstacle.reach_on(Category::FreeBody), Reach::None);
        assert!(Reach::Within(80.0).admits(80.0));
        assert!(!Reach::Within(80.0).admits(80.5));
    }

    #[test]
    fn test_absorb_equal_bodies() {
        let mut a = asteroid(1, 100.0, 100.0, 8.0);
        let b = asteroid(2, 110.0, 100.0, 8.0);
        a.absorb(&b);

        assert!((a.mass - 2.0 * 8f64.sqrt()).abs() < 1e-12);
        assert_eq!(a.radius, 9.0);
        assert_eq!(a.pos, DVec2::new(105.0, 100.0));
    }

    #[test]
    fn test_absorb_clamps_blend() {
        let mut a = asteroid(1, 100.0, 100.0, 8.0);
        let b = asteroid(2, 130.0, 100.0, 5.0);
        a.absorb(&b);
        // Midpoint would be 115, but the move is capped at the absorbed radius
        assert_eq!(a.pos.x, 105.0);
    }

    #[test]
    fn test_absorb_large_body_holds_position() {
        let mut a = asteroid(1, 100.0, 100.0, 20.0);
        let b = asteroid(2, 110.0, 100.0, 5.0);
        a.absorb(&b);
        assert_eq!(a.pos, DVec2::new(100.0, 100.0));
        assert_eq!(a.radius, 21.0);
    }

    #[test]
    fn test_blast_pushes_along_rocket() {
        let mut rock = asteroid(1, 0.0, 0.0, 8.0);
        let rocket = Body::new(2, Category::Projectile, DVec2::ZERO, DVec2::new(3.0, 0.0), 3.0);
        rock.take_blast(&rocket);
        let expected = (rocket.mass * 3.0 / 2.0).floor() / (rocket.mass + rock.mass);
        assert!((rock.vel.x - expected).abs() < 1e-12);
        assert_eq!(rock.vel.y, 0.0);
    }

    #[test]
    fn test_trail_fades_out() {
        let mut trail = Trail::new();
        trail.record(DVec2::new(1.0, 1.0));
        let mut ticks = 0;
        while !trail.is_empty() {
            trail.decay();
            ticks += 1;
        }
        // 255 -> -1 in steps of 4
        assert_eq!(ticks, 64);
    }

    #[test]
    fn test_trail_evicts_oldest_first() {
        let mut trail = Trail::new();
        trail.record(DVec2::new(1.0, 0.0));
        for _ in 0..63 {
            trail.decay();
        }
        trail.record(DVec2::new(2.0, 0.0));
        trail.decay();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.samples().next().map(|s| s.pos.x), Some(2.0));
    }

    proptest! {
        #[test]
        fn prop_absorb_conserves_momentum(
            r1 in 1.0..30.0f64, r2 in 1.0..30.0f64,
            v1 in (-5.0..5.0f64, -5.0..5.0f64), v2 in (-5.0..5.0f64, -5.0..5.0f64),
            offset in -40.0..40.0f64,
        ) {
            let mut a = asteroid(1, 200.0, 200.0, r1);
            a.vel = DVec2::new(v1.0, v1.1);
            let mut b = asteroid(2, 200.0 + offset, 200.0 - offset, r2);
            b.vel = DVec2::new(v2.0, v2.1);

            let before = a.momentum() + b.momentum();
            let mass_before = a.mass;
            a.absorb(&b);

            prop_assert!((a.momentum() - before).length() < 1e-9);
            prop_assert!(a.mass > mass_before);
            prop_assert!(a.radius > r1.min(r2));
        }
    }
}
