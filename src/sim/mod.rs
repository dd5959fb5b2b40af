//! Deterministic simulation core
//!
//! Bodies, the gravity field, the integrator and the asteroids game built on
//! them. Like the pong variant, this module must stay pure and deterministic:
//! - One physics step per tick, no wall clock
//! - Seeded RNG only, and only at setup
//! - Stable iteration order (by body id)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod field;
pub mod integrator;
pub mod registry;
pub mod state;
pub mod tick;

pub use body::{AttractorKind, Body, BodyId, Category, Reach, Trail, TrailSample};
pub use collision::{ContactLatch, Rect, detect, overlaps};
pub use field::{acceleration, field_force, pair_force};
pub use integrator::{Step, apply_step, rk4_step};
pub use registry::Registry;
pub use state::{BodyView, GameEvent, GamePhase, GameState, RoundSummary};
pub use tick::{TickInput, resolve, tick};
