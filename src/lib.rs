//! Gravity Arcade - two gravity-driven arcade games on one physics core
//!
//! Core modules:
//! - `sim`: Shared physics core (RK4 integrator, vector field, AABB collision)
//!   plus the asteroids variant's interaction resolver
//! - `pong`: The gravity pong variant
//! - `driver`: Fixed-rate frame driver shared by both games
//! - `pattern`: Obstacle/attractor grid loading
//! - `highscores`: Leaderboard and shot log persistence
//! - `settings`: Run configuration

pub mod driver;
pub mod error;
pub mod highscores;
pub mod pattern;
pub mod pong;
pub mod settings;
pub mod sim;

pub use error::{Error, PatternError, StorageError};
pub use highscores::{Leaderboard, ShotLog};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Play-field dimensions (pixels)
    pub const FIELD_WIDTH: f64 = 1080.0;
    pub const FIELD_HEIGHT: f64 = 720.0;

    /// Pattern grid cell size; the grid is FIELD_HEIGHT/CELL rows by FIELD_WIDTH/CELL columns
    pub const CELL_SIZE: f64 = 40.0;

    /// Position deltas at or below this are dropped (velocity still integrates)
    pub const DEADBAND: f64 = 0.08;
    /// Horizontal displacement below which a force is treated as purely vertical
    pub const VERTICAL_EPSILON: f64 = 0.01;
    /// Force law exponent applied to squared distance (magnitude ~ 1/d^2.4)
    pub const FORCE_EXPONENT: f64 = 1.2;

    /// Free body (asteroid) defaults
    pub const FREE_BODY_RADIUS: f64 = 8.0;
    pub const FREE_BODY_G: f64 = 100.0;
    /// Free bodies only feel other free bodies within this distance
    pub const FREE_BODY_REACH: f64 = 80.0;

    /// Projectile (rocket) defaults
    pub const PROJECTILE_RADIUS: f64 = 3.0;
    pub const PROJECTILE_MASS_FACTOR: f64 = 30.0;
    pub const PROJECTILE_G: f64 = 200.0;
    pub const PROJECTILE_SPEED: f64 = 3.0;
    /// Launch point (Earth)
    pub const LAUNCH_X: f64 = 20.0;
    pub const LAUNCH_Y: f64 = FIELD_HEIGHT / 2.0;

    /// Attractor (sun / black hole) defaults
    pub const ATTRACTOR_RADIUS: f64 = 15.0;
    pub const ATTRACTOR_MASS_FACTOR: f64 = 10.0;
    pub const ATTRACTOR_G: f64 = 10_000.0;
    /// Attractors pull non-projectiles only within this distance
    pub const ATTRACTOR_REACH: f64 = 300.0;

    /// Obstacle (block) edge length
    pub const OBSTACLE_SIZE: f64 = 40.0;

    /// Trail samples start fully opaque and fade by this much per tick
    pub const TRAIL_ALPHA_START: i32 = 255;
    pub const TRAIL_ALPHA_STEP: i32 = 4;

    /// Free bodies leaving the field by more than this margin are lost
    pub const ESCAPE_MARGIN: f64 = 10.0;
}

/// Convert a duration in milliseconds into whole ticks at `fps` (at least one)
#[inline]
pub fn ms_to_ticks(ms: u64, fps: u32) -> u64 {
    ms.saturating_mul(u64::from(fps)).div_ceil(1000).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(800, 200), 160);
        assert_eq!(ms_to_ticks(300, 100), 30);
        assert_eq!(ms_to_ticks(1, 100), 1);
        assert_eq!(ms_to_ticks(0, 200), 1);
    }

    #[test]
    fn test_ms_to_ticks_saturates() {
        assert_eq!(ms_to_ticks(u64::MAX, u32::MAX), u64::MAX.div_ceil(1000));
    }
}
