//! Fixed-step classical Runge-Kutta integrator
//!
//! One call advances one body by one tick (the tick is the unit of time, so
//! there is no explicit dt). The acceleration source is a closure so the same
//! stepper drives asteroids through the n-body field and pong balls through
//! their fixed wells.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Change in position and velocity over one tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Step {
    pub dpos: DVec2,
    pub dvel: DVec2,
}

/// Compute one 4-stage Runge-Kutta step for a body at `pos` moving at `vel`
pub fn rk4_step<F>(pos: DVec2, vel: DVec2, mut accel: F) -> Step
where
    F: FnMut(DVec2) -> DVec2,
{
    let k1_acc = accel(pos);
    let k1_vel = vel;

    let k2_acc = accel(pos + 0.5 * k1_vel);
    let k2_vel = vel + 0.5 * k1_acc;

    let k3_acc = accel(pos + 0.5 * k2_vel);
    let k3_vel = vel + 0.5 * k2_acc;

    let k4_acc = accel(pos + k3_vel);
    let k4_vel = vel + k3_acc;

    Step {
        dpos: (1.0 / 6.0) * (k1_vel + 2.0 * (k2_vel + k3_vel) + k4_vel),
        dvel: (1.0 / 6.0) * (k1_acc + 2.0 * (k2_acc + k3_acc) + k4_acc),
    }
}

/// Apply a step, dropping position deltas at or below `deadband` per axis
///
/// Velocity always updates, so slow drift accumulates until it clears the
/// deadband.
pub fn apply_step(pos: &mut DVec2, vel: &mut DVec2, step: Step, deadband: f64) {
    if step.dpos.x.abs() > deadband {
        pos.x += step.dpos.x;
    }
    if step.dpos.y.abs() > deadband {
        pos.y += step.dpos.y;
    }
    *vel += step.dvel;
}
