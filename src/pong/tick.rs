//! Gravity pong tick
//!
//! Order per tick: paddles act, balls move and bounce, bolts move and strike,
//! then scoring resolves. Balls crossing a goal line end the tick's ball
//! processing because the serve replaces every ball.

use serde::{Deserialize, Serialize};

use super::state::*;
use crate::consts::FIELD_WIDTH;
use crate::sim::GamePhase;
use crate::sim::collision::overlaps;
use crate::sim::integrator::{apply_step, rk4_step};

/// One paddle's controls for a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddleInput {
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongInput {
    pub left: PaddleInput,
    pub right: PaddleInput,
    pub pause: bool,
    pub quit: bool,
}

/// Advance the match by one tick
pub fn tick(state: &mut PongState, input: &PongInput) {
    state.events.clear();

    if input.quit {
        log::info!("Quit requested at {}-{}", state.paddles[0].score, state.paddles[1].score);
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

    act(state, Side::Left, input.left);
    act(state, Side::Right, input.right);

    if let Some(scorer) = move_balls(state) {
        score(state, scorer);
    }
    if state.phase == GamePhase::Running {
        move_bolts(state);
    }
}

/// Move or fire; moving up beats moving down beats firing
fn act(state: &mut PongState, side: Side, input: PaddleInput) {
    let now = state.time_ticks;
    let cooldown = state.fire_cooldown_ticks;
    let paddle = state.paddle_mut(side);

    if input.up {
        paddle.y -= PADDLE_SPEED;
    } else if input.down {
        paddle.y += PADDLE_SPEED;
    } else if input.fire {
        let ready = paddle
            .last_shot_tick
            .is_none_or(|last| now.saturating_sub(last) >= cooldown);
        if ready {
            paddle.last_shot_tick = Some(now);
            let pos = paddle.muzzle();
            let id = state.next_id();
            state.bolts.push(Bolt {
                id,
                pos,
                direction: side.facing(),
                owner: side,
            });
            state.events.push(PongEvent::BoltFired { side, bolt: id });
        }
    }

    state.paddle_mut(side).clamp();
}

/// Integrate, bounce and paddle-check every ball
///
/// Returns the side that scored if a ball crossed a goal line.
fn move_balls(state: &mut PongState) -> Option<Side> {
    let walls = boundaries();
    let paddle_rects = [state.paddles[0].rect(), state.paddles[1].rect()];

    for ball in state.balls.iter_mut() {
        let step = rk4_step(ball.pos, ball.vel, well_acceleration);
        apply_step(&mut ball.pos, &mut ball.vel, step, 0.0);

        if ball.pos.x <= 0.0 {
            return Some(Side::Right);
        }
        if ball.pos.x >= FIELD_WIDTH {
            return Some(Side::Left);
        }

        let rect = ball.rect();
        for (index, wall) in walls.iter().enumerate() {
            if ball.boundary_latches[index].update(&rect, wall) {
                if is_horizontal_boundary(index) {
                    ball.vel.y = -ball.vel.y;
                } else {
                    ball.vel.x = -ball.vel.x;
                }
                state.events.push(PongEvent::BoundaryHit { index, ball: ball.id });
            }
        }

        for (side, paddle_rect) in [Side::Left, Side::Right].into_iter().zip(paddle_rects.iter()) {
            if ball.paddle_latch(side).update(&rect, paddle_rect) {
                ball.set_direction_x(side.facing());
                state.events.push(PongEvent::PaddleHit { side, ball: ball.id });
            }
        }
    }
    None
}

/// Advance bolts, then let each strike at most one ball
fn move_bolts(state: &mut PongState) {
    let max_speed = state.max_speed();
    let mut spent: Vec<BoltId> = Vec::new();
    let mut new_balls: Vec<Ball> = Vec::new();
    let mut destroyed: Vec<BallId> = Vec::new();

    for bolt in state.bolts.iter_mut() {
        bolt.pos.x += BOLT_SPEED * bolt.direction;
        if bolt.out_of_field() {
            spent.push(bolt.id);
            continue;
        }

        let rect = bolt.rect();
        let Some(ball) = state
            .balls
            .iter_mut()
            .filter(|b| !destroyed.contains(&b.id))
            .find(|b| overlaps(&b.rect(), &rect))
        else {
            continue;
        };

        spent.push(bolt.id);
        if ball.size >= SPLIT_MIN_SIZE {
            ball.size = (f64::from(ball.size) / SPLIT_DIVISOR).floor() as u32;
            let id = state.next_entity_id;
            state.next_entity_id += 1;
            new_balls.push(Ball::new(id, ball.pos, ball.vel, ball.size));
            state.events.push(PongEvent::BallSplit { ball: ball.id, new_ball: id });
        } else {
            destroyed.push(ball.id);
            state.events.push(PongEvent::BallDestroyed { ball: ball.id });
        }
        ball.boost(bolt.direction, max_speed);
    }

    state.bolts.retain(|b| !spent.contains(&b.id));
    state.balls.retain(|b| !destroyed.contains(&b.id));
    state.balls.extend(new_balls);

    if state.balls.is_empty() {
        finish(state, PongOutcome::BothWin);
    }
}

/// Award a point, then either end the match or serve a bigger ball
fn score(state: &mut PongState, scorer: Side) {
    state.paddle_mut(scorer).score += 1;
    state.events.push(PongEvent::Scored { side: scorer });
    let (left, right) = state.scores();
    log::info!("Player {} scores ({}-{})", scorer.player_number(), left, right);

    if left >= state.score_to_win || right >= state.score_to_win {
        finish(state, PongOutcome::Loser(scorer.opponent()));
        return;
    }

    if state.ball_size < BALL_MAX_SIZE {
        state.ball_size = (f64::from(state.ball_size) * 1.1) as u32;
    }
    state.serve(SERVE_SPEED);
}

fn finish(state: &mut PongState, outcome: PongOutcome) {
    log::info!("{}", outcome.message());
    state.outcome = Some(outcome);
    state.phase = GamePhase::RoundOver;
    state.events.push(PongEvent::RoundOver);
}

/// Steer a paddle toward the ball heading its way (used by the demo autopilot)
pub fn track_ball(state: &PongState, side: Side) -> PaddleInput {
    let paddle = state.paddle(side);
    let center = paddle.y + PADDLE_HEIGHT / 2.0;
    let target = state
        .balls
        .iter()
        .filter(|b| b.vel.x * side.facing() < 0.0)
        .min_by(|a, b| {
            let da = (a.pos.x - paddle.x).abs();
            let db = (b.pos.x - paddle.x).abs();
            da.total_cmp(&db)
        })
        .map(|b| b.pos.y);

    match target {
        Some(y) if y < center - PADDLE_SPEED => PaddleInput {
            up: true,
            ..Default::default()
        },
        Some(y) if y > center + PADDLE_SPEED => PaddleInput {
            down: true,
            ..Default::default()
        },
        _ => PaddleInput {
            fire: state.time_ticks % 97 == 0,
            ..Default::default()
        },
    }
}
