//! Gravity pong
//!
//! Shares the integrator and collision primitives with the asteroids core,
//! but balls feel two fixed wells instead of each other.

pub mod state;
pub mod tick;

pub use state::{Ball, Bolt, Paddle, PongEvent, PongOutcome, PongState, Side, boundaries, well_acceleration};
pub use tick::{PaddleInput, PongInput, tick, track_ball};
