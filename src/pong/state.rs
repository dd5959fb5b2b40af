//! Gravity pong state
//!
//! Two paddles, one or more balls pulled toward wells just beyond the left
//! and right edges, and the bolts the paddles fire to split balls.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};
use crate::ms_to_ticks;
use crate::settings::PongSettings;
use crate::sim::GamePhase;
use crate::sim::collision::{ContactLatch, Rect};

/// Paddle dimensions and speed (pixels, pixels per tick)
pub const PADDLE_WIDTH: f64 = 10.0;
pub const PADDLE_HEIGHT: f64 = 100.0;
pub const PADDLE_SPEED: f64 = 10.0;
/// Gap kept between a paddle and the top/bottom boundary
pub const PADDLE_MARGIN: f64 = 4.0;

/// Boundary strip thickness
pub const BOUNDARY_WIDTH: f64 = 5.0;
pub const BOUNDARY_COUNT: usize = 6;

/// Bolt dimensions and horizontal speed
pub const BOLT_WIDTH: f64 = 15.0;
pub const BOLT_HEIGHT: f64 = 6.0;
pub const BOLT_SPEED: f64 = 15.0;
/// Bolts further than this outside the field are gone
pub const BOLT_MARGIN: f64 = 40.0;

/// Gravity well strength (inverse square)
pub const WELL_G: f64 = 7000.0;
/// Wells sit this far outside each side edge
pub const WELL_OFFSET: f64 = 20.0;
/// Distance offset used in the well falloff
pub const WELL_FALLOFF_OFFSET: f64 = 80.0;

/// Starting ball size and serve speeds
pub const BALL_START_SIZE: u32 = 14;
pub const BALL_MAX_SIZE: u32 = 40;
pub const FIRST_SERVE_SPEED: f64 = 7.0;
pub const SERVE_SPEED: f64 = 8.0;
pub const SERVE_DRIFT: f64 = 3.0;
/// Horizontal speed a bolt adds to the ball it strikes
pub const BOLT_BOOST: f64 = 10.0;
/// Balls at least this big split when struck; smaller ones are destroyed
pub const SPLIT_MIN_SIZE: u32 = 10;
pub const SPLIT_DIVISOR: f64 = 1.25;

pub type BallId = u32;
pub type BoltId = u32;

/// Which paddle (and player)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Horizontal direction away from this side's edge
    pub fn facing(&self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }

    pub fn opponent(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Player number shown to humans
    pub fn player_number(&self) -> u8 {
        match self {
            Side::Left => 1,
            Side::Right => 2,
        }
    }

    fn index(&self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Player paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    pub x: f64,
    pub y: f64,
    pub score: u32,
    pub last_shot_tick: Option<u64>,
}

impl Paddle {
    pub fn new(side: Side) -> Self {
        let x = match side {
            Side::Left => 20.0 - PADDLE_WIDTH,
            Side::Right => FIELD_WIDTH - 20.0,
        };
        Self {
            side,
            x,
            y: (FIELD_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0).floor(),
            score: 0,
            last_shot_tick: None,
        }
    }

    /// Collision rectangle (slightly larger than the drawn paddle)
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PADDLE_WIDTH + 2.0, PADDLE_HEIGHT + 1.0)
    }

    /// Keep the paddle between the top and bottom boundaries
    pub fn clamp(&mut self) {
        let min = PADDLE_MARGIN + BOUNDARY_WIDTH;
        let max = FIELD_HEIGHT - PADDLE_HEIGHT - PADDLE_MARGIN - BOUNDARY_WIDTH;
        self.y = self.y.clamp(min, max);
    }

    /// Where this paddle's bolts appear
    pub fn muzzle(&self) -> DVec2 {
        DVec2::new(self.x, self.y + (PADDLE_HEIGHT / 2.0).floor())
    }
}

/// A ball under gravity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub pos: DVec2,
    pub vel: DVec2,
    /// Radius in whole pixels
    pub size: u32,
    /// Contact state against each boundary strip
    pub boundary_latches: [ContactLatch; BOUNDARY_COUNT],
    /// Contact state against each paddle (left, right)
    pub paddle_latches: [ContactLatch; 2],
}

impl Ball {
    pub fn new(id: BallId, pos: DVec2, vel: DVec2, size: u32) -> Self {
        Self {
            id,
            pos,
            vel,
            size,
            boundary_latches: Default::default(),
            paddle_latches: Default::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        let s = f64::from(self.size);
        Rect::new(self.pos.x - s, self.pos.y - s, s * 2.0, s * 2.0)
    }

    /// Send the ball horizontally in `direction` keeping its speed
    pub fn set_direction_x(&mut self, direction: f64) {
        self.vel.x = self.vel.x.abs() * direction;
    }

    /// Kick from a bolt travelling in `direction`, limited to `max_speed`
    pub fn boost(&mut self, direction: f64, max_speed: f64) {
        self.vel.x = (self.vel.x + direction * BOLT_BOOST).clamp(-max_speed, max_speed);
    }

    pub fn paddle_latch(&mut self, side: Side) -> &mut ContactLatch {
        &mut self.paddle_latches[side.index()]
    }
}

/// A bolt fired by a paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bolt {
    pub id: BoltId,
    pub pos: DVec2,
    /// +1 rightward (left paddle), -1 leftward
    pub direction: f64,
    pub owner: Side,
}

impl Bolt {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, BOLT_WIDTH + 3.0, BOLT_HEIGHT + 3.0)
    }

    pub fn out_of_field(&self) -> bool {
        self.pos.x <= -BOLT_MARGIN || self.pos.x >= FIELD_WIDTH + BOLT_MARGIN
    }
}

/// The six boundary strips: top, bottom, left-top, left-bottom, right-top, right-bottom
pub fn boundaries() -> [Rect; BOUNDARY_COUNT] {
    let (w, h, bw) = (FIELD_WIDTH, FIELD_HEIGHT, BOUNDARY_WIDTH);
    let range = (1.1 * (h / 4.0).floor() - 4.0).trunc();
    [
        Rect::new(4.0, 4.0, w - 8.0, bw),
        Rect::new(4.0, h - bw - 4.0, w - 8.0, bw),
        Rect::new(3.0, 4.0, bw, range),
        Rect::new(3.0, h - range - 4.0, bw, range),
        Rect::new(w - bw - 3.0, 4.0, bw, range),
        Rect::new(w - bw - 3.0, h - range - 4.0, bw, range),
    ]
}

/// Is this boundary index a horizontal strip (reflects vertical speed)?
pub fn is_horizontal_boundary(index: usize) -> bool {
    index < 2
}

/// Acceleration from the two side wells at `at`
///
/// Both wells sit on the horizontal center line and share the same falloff,
/// so the field is mirror-symmetric about `x = W/2`.
pub fn well_acceleration(at: DVec2) -> DVec2 {
    let mid_y = (FIELD_HEIGHT / 2.0).floor();
    let wells = [
        (at.x + WELL_FALLOFF_OFFSET, DVec2::new(-WELL_OFFSET, mid_y)),
        (FIELD_WIDTH - at.x + WELL_FALLOFF_OFFSET, DVec2::new(FIELD_WIDTH + WELL_OFFSET, mid_y)),
    ];

    wells
        .iter()
        .map(|&(dx, well)| {
            let distance_sq = dx * dx + (at.y - mid_y) * (at.y - mid_y);
            if distance_sq == 0.0 {
                return DVec2::ZERO;
            }
            (well - at) / distance_sq.sqrt() * (WELL_G / distance_sq)
        })
        .sum()
}

/// Pong events of the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PongEvent {
    BoltFired { side: Side, bolt: BoltId },
    /// Ball struck a boundary strip (drives the blink effect)
    BoundaryHit { index: usize, ball: BallId },
    PaddleHit { side: Side, ball: BallId },
    BallSplit { ball: BallId, new_ball: BallId },
    BallDestroyed { ball: BallId },
    Scored { side: Side },
    RoundOver,
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PongOutcome {
    /// One player reached the winning score
    Loser(Side),
    /// Every ball was shot to pieces
    BothWin,
}

impl PongOutcome {
    pub fn message(&self) -> String {
        match self {
            PongOutcome::Loser(side) => format!("Player {} Loses!", side.player_number()),
            PongOutcome::BothWin => "Congratulations! Both players win!".to_string(),
        }
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Fresh generator for the next draw; each call advances the stream
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::seed_from_u64(self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.stream += 1;
        rng
    }
}

/// Complete pong state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongState {
    pub phase: GamePhase,
    pub rng_state: RngState,
    pub paddles: [Paddle; 2],
    pub balls: Vec<Ball>,
    pub bolts: Vec<Bolt>,
    /// Size of the next served ball
    pub ball_size: u32,
    pub time_ticks: u64,
    pub fps: u32,
    pub score_to_win: u32,
    pub fire_cooldown_ticks: u64,
    pub outcome: Option<PongOutcome>,
    pub next_entity_id: u32,
    #[serde(skip)]
    pub events: Vec<PongEvent>,
}

impl PongState {
    /// New match with one ball served from the center
    pub fn new(seed: u64, settings: &PongSettings) -> Self {
        let fps = settings.fps.max(1);
        let mut state = Self {
            phase: GamePhase::Setup,
            rng_state: RngState::new(seed),
            paddles: [Paddle::new(Side::Left), Paddle::new(Side::Right)],
            balls: Vec::new(),
            bolts: Vec::new(),
            ball_size: BALL_START_SIZE,
            time_ticks: 0,
            fps,
            score_to_win: settings.score_to_win.max(1),
            fire_cooldown_ticks: ms_to_ticks(settings.fire_delay_ms, fps),
            outcome: None,
            next_entity_id: 0,
            events: Vec::new(),
        };
        state.serve(FIRST_SERVE_SPEED);
        state.phase = GamePhase::Running;
        state
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Replace all balls with a single one at the center, heading to a random side
    pub fn serve(&mut self, speed: f64) {
        let direction = if self.rng_state.next_rng().random_bool(0.5) { 1.0 } else { -1.0 };
        let id = self.next_id();
        let center = DVec2::new((FIELD_WIDTH / 2.0).floor(), (FIELD_HEIGHT / 2.0).floor());
        self.balls = vec![Ball::new(
            id,
            center,
            DVec2::new(direction * speed, SERVE_DRIFT),
            self.ball_size,
        )];
        log::debug!("Serve: ball {} size {} heading {}", id, self.ball_size, direction);
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        &self.paddles[side.index()]
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        &mut self.paddles[side.index()]
    }

    /// Fastest horizontal speed a bolt can give a ball
    pub fn max_speed(&self) -> f64 {
        f64::from(self.fps)
    }

    /// Scores as (left, right)
    pub fn scores(&self) -> (u32, u32) {
        (self.paddles[0].score, self.paddles[1].score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_match() {
        let state = PongState::new(1, &PongSettings::default());
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.balls.len(), 1);
        let ball = &state.balls[0];
        assert_eq!(ball.size, 14);
        assert_eq!(ball.pos, DVec2::new(540.0, 360.0));
        assert_eq!(ball.vel.x.abs(), 7.0);
        assert_eq!(ball.vel.y, 3.0);
        assert_eq!(state.fire_cooldown_ticks, 30);
        assert_eq!(state.paddle(Side::Left).x, 10.0);
        assert_eq!(state.paddle(Side::Right).x, 1060.0);
        assert_eq!(state.paddle(Side::Left).y, 310.0);
    }

    #[test]
    fn test_boundary_layout() {
        let b = boundaries();
        assert_eq!(b[0], Rect::new(4.0, 4.0, 1072.0, 5.0));
        assert_eq!(b[1], Rect::new(4.0, 711.0, 1072.0, 5.0));
        assert_eq!(b[2], Rect::new(3.0, 4.0, 5.0, 194.0));
        assert_eq!(b[3], Rect::new(3.0, 522.0, 5.0, 194.0));
        assert_eq!(b[5], Rect::new(1072.0, 522.0, 5.0, 194.0));
        assert!(is_horizontal_boundary(1));
        assert!(!is_horizontal_boundary(2));
    }

    #[test]
    fn test_paddle_clamp() {
        let mut paddle = Paddle::new(Side::Left);
        paddle.y = -50.0;
        paddle.clamp();
        assert_eq!(paddle.y, 9.0);
        paddle.y = 700.0;
        paddle.clamp();
        assert_eq!(paddle.y, 611.0);
    }

    #[test]
    fn test_wells_cancel_on_center_line() {
        let a = well_acceleration(DVec2::new(540.0, 360.0));
        assert!(a.length() < 1e-12);
    }

    #[test]
    fn test_wells_pull_toward_nearer_edge() {
        let left = well_acceleration(DVec2::new(200.0, 360.0));
        assert!(left.x < 0.0);
        assert!(left.y.abs() < 1e-12);

        let right = well_acceleration(DVec2::new(900.0, 100.0));
        assert!(right.x > 0.0);
        assert!(right.y > 0.0, "pulled back toward the center line");
    }

    #[test]
    fn test_wells_mirror_about_center() {
        for &(x, y) in &[(200.0, 360.0), (120.0, 40.0), (700.0, 650.0), (15.0, 500.0)] {
            let a = well_acceleration(DVec2::new(x, y));
            let b = well_acceleration(DVec2::new(FIELD_WIDTH - x, y));
            assert!((a.x + b.x).abs() < 1e-12, "x mirrored at ({}, {})", x, y);
            assert!((a.y - b.y).abs() < 1e-12, "y matches at ({}, {})", x, y);
        }
    }

    #[test]
    fn test_boost_is_capped() {
        let mut ball = Ball::new(0, DVec2::ZERO, DVec2::new(95.0, 0.0), 14);
        ball.boost(1.0, 100.0);
        assert_eq!(ball.vel.x, 100.0);
        ball.vel.x = -95.0;
        ball.boost(-1.0, 100.0);
        assert_eq!(ball.vel.x, -100.0);
        ball.vel.x = 5.0;
        ball.boost(-1.0, 100.0);
        assert_eq!(ball.vel.x, -5.0);
    }

    #[test]
    fn test_serve_direction_is_seeded() {
        let a = PongState::new(42, &PongSettings::default());
        let b = PongState::new(42, &PongSettings::default());
        assert_eq!(a.balls[0].vel, b.balls[0].vel);
    }

    #[test]
    fn test_outcome_message() {
        assert_eq!(PongOutcome::Loser(Side::Right).message(), "Player 2 Loses!");
    }
}
