//! Asteroids tick: input, interaction resolver, termination
//!
//! One call advances the round by one frame. The resolver runs in a fixed
//! order (move, pair scans, merges, attractor consumption, removal) and never
//! deletes a body mid-scan: everything is marked first and removed in one
//! pass at the end. A body marked earlier in the frame is invisible to every
//! later rule.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{AttractorKind, Body, BodyId, Category};
use super::collision::overlaps;
use super::field::acceleration;
use super::integrator::{apply_step, rk4_step};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input sampled once per tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Mouse held down at this position (fire request)
    pub fire_at: Option<DVec2>,
    /// Pause toggle
    pub pause: bool,
    /// Leave the game
    pub quit: bool,
}

/// Advance the round by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    if input.quit {
        log::info!("Quit requested after {} ticks", state.time_ticks);
        state.phase = GamePhase::Quit;
        return;
    }

    if input.pause {
        match state.phase {
            GamePhase::Running => state.phase = GamePhase::Paused,
            GamePhase::Paused => state.phase = GamePhase::Running,
            _ => {}
        }
    }

    if state.phase != GamePhase::Running {
        return;
    }

    state.time_ticks += 1;

    if let Some(aim) = input.fire_at {
        state.fire(aim);
    }

    resolve(state);

    for trail in state.fading_trails.iter_mut() {
        trail.decay();
    }
    state.fading_trails.retain(|t| !t.is_empty());

    if state.registry.count_all(Category::FreeBody) == 0 && state.registry.count_all(Category::Obstacle) == 0 {
        let summary = state.summarize();
        log::info!(
            "Round over: score {}, {} shots, {}s, cleared: {}",
            summary.score,
            summary.shots,
            summary.elapsed_secs,
            summary.cleared
        );
        state.summary = Some(summary);
        state.phase = GamePhase::RoundOver;
        state.events.push(GameEvent::RoundOver);
    }
}

/// One interaction resolver pass
pub fn resolve(state: &mut GameState) {
    move_bodies(state);
    let merges = scan_free_bodies(state);
    scan_obstacle_bumps(state);
    scan_projectiles(state);
    apply_merges(state, merges);
    consume_into_attractors(state);
    apply_removals(state);
}

/// Integrate every free body and projectile, then mark escapees
fn move_bodies(state: &mut GameState) {
    let mut ids = state.registry.live_ids(Category::FreeBody);
    ids.extend(state.registry.live_ids(Category::Projectile));

    for id in ids {
        if state.armed {
            let Some(body) = state.registry.get(id) else {
                continue;
            };
            let registry = &state.registry;
            let step = rk4_step(body.pos, body.vel, |at| acceleration(body, at, registry));
            if let Some(body) = state.registry.get_mut(id) {
                apply_step(&mut body.pos, &mut body.vel, step, DEADBAND);
            }
        }

        let Some(body) = state.registry.get_mut(id) else {
            continue;
        };
        let escaped = match body.category {
            Category::Projectile => {
                body.trail.record(body.pos);
                projectile_out_of_bounds(body)
            }
            _ => free_body_out_of_bounds(body),
        };

        if escaped && state.registry.mark(id) {
            if state.registry.get(id).is_some_and(|b| b.category == Category::FreeBody) {
                state.cleared = false;
                state.events.push(GameEvent::Escaped { body: id });
                log::debug!("Free body {} escaped the field", id);
            } else {
                state.events.push(GameEvent::Expired { projectile: id });
            }
        }
    }
}

fn free_body_out_of_bounds(body: &Body) -> bool {
    let (x, y, r) = (body.pos.x, body.pos.y, body.radius);
    x + r <= -ESCAPE_MARGIN
        || x - r >= FIELD_WIDTH + ESCAPE_MARGIN
        || y + r <= -ESCAPE_MARGIN
        || y - r >= FIELD_HEIGHT + ESCAPE_MARGIN
}

fn projectile_out_of_bounds(body: &Body) -> bool {
    let (x, y, r) = (body.pos.x, body.pos.y, body.radius);
    x - r <= 0.0 || x + r >= FIELD_WIDTH || y - r <= 0.0 || y + r >= FIELD_HEIGHT
}

/// Overlapping free bodies, keyed by the absorbing body (in id order)
type MergePlan = Vec<(BodyId, Vec<BodyId>)>;

fn scan_free_bodies(state: &GameState) -> MergePlan {
    let registry = &state.registry;
    let ids = registry.live_ids(Category::FreeBody);
    let mut plan = MergePlan::new();

    for &a in &ids {
        let Some(body_a) = registry.get(a) else { continue };
        let rect_a = body_a.rect();
        let partners: Vec<BodyId> = ids
            .iter()
            .copied()
            .filter(|&b| b != a)
            .filter(|&b| registry.get(b).is_some_and(|body_b| overlaps(&rect_a, &body_b.rect())))
            .collect();
        if !partners.is_empty() {
            plan.push((a, partners));
        }
    }
    plan
}

/// Free body against obstacle: the body loses half its velocity and the obstacle breaks
fn scan_obstacle_bumps(state: &mut GameState) {
    for body_id in state.registry.live_ids(Category::FreeBody) {
        for obstacle_id in state.registry.live_ids(Category::Obstacle) {
            let (Some(body), Some(obstacle)) = (state.registry.get(body_id), state.registry.get(obstacle_id)) else {
                continue;
            };
            if !overlaps(&body.rect(), &obstacle.rect()) {
                continue;
            }
            if let Some(body) = state.registry.get_mut(body_id) {
                body.vel *= 0.5;
            }
            state.registry.mark(obstacle_id);
            state.events.push(GameEvent::Bumped {
                body: body_id,
                obstacle: obstacle_id,
            });
        }
    }
}

/// Projectiles die on first contact with anything
fn scan_projectiles(state: &mut GameState) {
    for id in state.registry.live_ids(Category::Projectile) {
        // May have been taken out by an earlier projectile this frame
        if !state.registry.is_live(id) {
            continue;
        }
        let Some(rect) = state.registry.get(id).map(|p| p.rect()) else {
            continue;
        };
        let Some(target) = state
            .registry
            .live()
            .filter(|other| other.id != id)
            .filter(|other| overlaps(&rect, &other.rect()))
            .min_by_key(|other| (strike_priority(other.category), other.id))
            .map(|other| (other.id, other.category))
        else {
            continue;
        };

        state.registry.mark(id);
        match target {
            (other, Category::Projectile) => {
                state.registry.mark(other);
                state.events.push(GameEvent::Annihilated { first: id, second: other });
            }
            (other, Category::FreeBody) => {
                if let Some(rocket) = state.registry.get(id).cloned() {
                    if let Some(body) = state.registry.get_mut(other) {
                        body.take_blast(&rocket);
                    }
                }
                state.events.push(GameEvent::Blast { projectile: id, body: other });
            }
            (other, Category::Obstacle) => {
                state.registry.mark(other);
                state.events.push(GameEvent::Impact {
                    projectile: id,
                    target: other,
                    score: 0,
                });
            }
            (other, Category::Attractor(kind)) => {
                let score = match kind {
                    AttractorKind::Sun => 10 * state.registry.count(Category::FreeBody) as u64,
                    AttractorKind::BlackHole => 0,
                };
                state.score += score;
                state.events.push(GameEvent::Impact {
                    projectile: id,
                    target: other,
                    score,
                });
            }
        }
    }
}

/// Resolution order when a projectile touches several things at once
fn strike_priority(category: Category) -> u8 {
    match category {
        Category::Projectile => 0,
        Category::FreeBody => 1,
        Category::Obstacle => 2,
        Category::Attractor(AttractorKind::BlackHole) => 3,
        Category::Attractor(AttractorKind::Sun) => 4,
    }
}

fn apply_merges(state: &mut GameState, plan: MergePlan) {
    for (absorber, partners) in plan {
        for absorbed in partners {
            if !state.registry.is_live(absorber) {
                break;
            }
            if !state.registry.is_live(absorbed) {
                continue;
            }
            let Some(other) = state.registry.get(absorbed).cloned() else {
                continue;
            };
            state.registry.mark(absorbed);
            if let Some(body) = state.registry.get_mut(absorber) {
                body.absorb(&other);
                log::debug!(
                    "Body {} absorbed {} (radius {}, mass {:.3})",
                    absorber,
                    absorbed,
                    body.radius,
                    body.mass
                );
            }
            state.events.push(GameEvent::Merged { absorber, absorbed });
        }
    }
}

/// Free bodies touching a sun or black hole fall in
fn consume_into_attractors(state: &mut GameState) {
    let attractors = state.registry.live_attractor_ids();
    for body_id in state.registry.live_ids(Category::FreeBody) {
        let Some(body) = state.registry.get(body_id).cloned() else {
            continue;
        };
        let rect = body.rect();
        let hit = attractors.iter().copied().find(|&a| {
            state
                .registry
                .get(a)
                .is_some_and(|attractor| overlaps(&rect, &attractor.rect()))
        });
        let Some(attractor_id) = hit else { continue };
        let Some(attractor) = state.registry.get_mut(attractor_id) else {
            continue;
        };
        let Category::Attractor(kind) = attractor.category else {
            continue;
        };

        attractor.mass += body.mass;
        let score = (body.mass * kind.score_per_mass()).floor() as u64;
        state.score += score;
        state.registry.mark(body_id);
        state.events.push(GameEvent::Consumed {
            attractor: attractor_id,
            body: body_id,
            score,
        });
        log::debug!("{:?} {} consumed body {} (+{})", kind, attractor_id, body_id, score);
    }
}

/// Delete marked bodies; broken obstacles release a free body, dead projectiles leave their trail
fn apply_removals(state: &mut GameState) {
    for body in state.registry.apply_removals() {
        match body.category {
            Category::Obstacle => {
                let released = state
                    .registry
                    .spawn(Category::FreeBody, body.center(), DVec2::ZERO, FREE_BODY_RADIUS);
                state.events.push(GameEvent::Released {
                    obstacle: body.id,
                    body: released,
                });
            }
            Category::Projectile if !body.trail.is_empty() => {
                state.fading_trails.push(body.trail);
            }
            _ => {}
        }
    }

    for id in state.registry.live_ids(Category::Projectile) {
        if let Some(body) = state.registry.get_mut(id) {
            body.trail.decay();
        }
    }
}
