//! Asteroids game state
//!
//! Everything the resolver mutates during a tick lives here: the body
//! registry, score, shot bookkeeping, fading trails and the phase machine.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{AttractorKind, BodyId, Category, Trail};
use super::collision::Rect;
use super::registry::Registry;
use crate::consts::*;
use crate::ms_to_ticks;
use crate::pattern::{Cell, Pattern};
use crate::settings::AsteroidSettings;

/// Frame driver phase, shared by both games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Bodies not yet spawned
    Setup,
    /// Ticking
    Running,
    /// Ticking suspended until the pause toggle
    Paused,
    /// Round finished (cleared, or a player reached the win threshold)
    RoundOver,
    /// Player asked to leave
    Quit,
}

impl GamePhase {
    /// No further ticks will change the state
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::RoundOver | GamePhase::Quit)
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Fired { projectile: BodyId },
    /// A free body left the field
    Escaped { body: BodyId },
    /// A projectile left the field
    Expired { projectile: BodyId },
    Merged { absorber: BodyId, absorbed: BodyId },
    /// A free body struck an obstacle
    Bumped { body: BodyId, obstacle: BodyId },
    /// An obstacle broke and released a free body
    Released { obstacle: BodyId, body: BodyId },
    Blast { projectile: BodyId, body: BodyId },
    Annihilated { first: BodyId, second: BodyId },
    /// A projectile hit an obstacle or attractor
    Impact { projectile: BodyId, target: BodyId, score: u64 },
    Consumed { attractor: BodyId, body: BodyId, score: u64 },
    RoundOver,
}

/// End-of-round telemetry for the leaderboard writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub shots: u32,
    pub elapsed_secs: u64,
    pub score: u64,
    /// No free body escaped the field during the round
    pub cleared: bool,
}

/// What a renderer needs to draw one body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyView {
    pub id: BodyId,
    pub category: Category,
    pub rect: Rect,
    pub radius: f64,
    /// Attractor core glow radius (0 for other categories)
    pub glow: f64,
}

/// Complete asteroids state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    pub phase: GamePhase,
    pub registry: Registry,
    pub score: u64,
    pub shots: u32,
    pub time_ticks: u64,
    pub fps: u32,
    /// Bodies stay frozen until the first shot
    pub armed: bool,
    /// Cleared unless a free body escapes
    pub cleared: bool,
    pub fire_cooldown_ticks: u64,
    pub last_shot_tick: Option<u64>,
    /// Trails of destroyed projectiles, still fading
    pub fading_trails: Vec<Trail>,
    pub summary: Option<RoundSummary>,
    /// Events of the last tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    initial_free_bodies: usize,
}

impl GameState {
    /// Empty state in `Setup`
    pub fn new(seed: u64, settings: &AsteroidSettings) -> Self {
        Self {
            seed,
            phase: GamePhase::Setup,
            registry: Registry::new(),
            score: 0,
            shots: 0,
            time_ticks: 0,
            fps: settings.fps.max(1),
            armed: false,
            cleared: true,
            fire_cooldown_ticks: ms_to_ticks(settings.fire_delay_ms, settings.fps.max(1)),
            last_shot_tick: None,
            fading_trails: Vec::new(),
            summary: None,
            events: Vec::new(),
            initial_free_bodies: settings.free_bodies,
        }
    }

    /// Spawn the round and enter `Running`
    ///
    /// Free bodies are placed first, then the pattern is laid out in row-major
    /// order, so ids follow the same order on every run with the same seed.
    pub fn setup(&mut self, pattern: &Pattern) {
        self.spawn_free_bodies(self.initial_free_bodies);
        self.spawn_pattern(pattern);
        self.phase = GamePhase::Running;
        log::info!(
            "Round started: {} free bodies, {} obstacles, {} attractors",
            self.registry.count(Category::FreeBody),
            self.registry.count(Category::Obstacle),
            self.registry.live_attractor_ids().len()
        );
    }

    /// Seeded placement along the launch side, avoiding the field center
    fn spawn_free_bodies(&mut self, count: usize) {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        let (cx, cy) = (FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0);
        let keep_out = |x: f64, y: f64| (x - cx).abs() <= 200.0 && (y - cy).abs() <= 200.0;
        let y_max = (FIELD_HEIGHT - 30.0) as i32;
        let x_max = (FIELD_WIDTH - 30.0) as i32;

        let positions: Vec<DVec2> = (0..count)
            .map(|_| {
                let mut x = f64::from(rng.random_range(45..=150i32));
                let mut y = f64::from(rng.random_range(30..=y_max));
                while keep_out(x, y) {
                    x = f64::from(rng.random_range(30..=x_max));
                    y = f64::from(rng.random_range(30..=y_max));
                }
                DVec2::new(x, y)
            })
            .collect();

        for pos in positions {
            self.registry.spawn(Category::FreeBody, pos, DVec2::ZERO, FREE_BODY_RADIUS);
        }
    }

    fn spawn_pattern(&mut self, pattern: &Pattern) {
        for (row, col, cell) in pattern.occupied() {
            let pos = DVec2::new(col as f64 * CELL_SIZE, row as f64 * CELL_SIZE);
            match cell {
                Cell::Obstacle => {
                    self.registry.spawn(Category::Obstacle, pos, DVec2::ZERO, OBSTACLE_SIZE);
                }
                Cell::Sun => {
                    self.registry
                        .spawn(Category::Attractor(AttractorKind::Sun), pos, DVec2::ZERO, ATTRACTOR_RADIUS);
                }
                Cell::BlackHole => {
                    self.registry.spawn(
                        Category::Attractor(AttractorKind::BlackHole),
                        pos,
                        DVec2::ZERO,
                        ATTRACTOR_RADIUS,
                    );
                }
                Cell::Empty => {}
            }
        }
    }

    /// Launch a projectile from the launch point toward `aim`
    ///
    /// Returns `None` while the launcher is cooling down or when `aim` gives
    /// no direction.
    pub fn fire(&mut self, aim: DVec2) -> Option<BodyId> {
        if let Some(last) = self.last_shot_tick {
            if self.time_ticks.saturating_sub(last) < self.fire_cooldown_ticks {
                return None;
            }
        }
        let offset = DVec2::new(aim.x, aim.y - LAUNCH_Y);
        let magnitude = offset.length();
        if magnitude == 0.0 {
            return None;
        }
        let vel = offset / magnitude * PROJECTILE_SPEED;
        let id = self
            .registry
            .spawn(Category::Projectile, DVec2::new(LAUNCH_X, LAUNCH_Y), vel, PROJECTILE_RADIUS);

        self.armed = true;
        self.shots += 1;
        self.last_shot_tick = Some(self.time_ticks);
        self.events.push(GameEvent::Fired { projectile: id });
        log::debug!("Shot {} fired toward ({:.0}, {:.0})", self.shots, aim.x, aim.y);
        Some(id)
    }

    /// Whole seconds of play so far
    pub fn elapsed_secs(&self) -> u64 {
        self.time_ticks / u64::from(self.fps)
    }

    /// Round summary as of now
    pub fn summarize(&self) -> RoundSummary {
        RoundSummary {
            shots: self.shots,
            elapsed_secs: self.elapsed_secs(),
            score: self.score,
            cleared: self.cleared,
        }
    }

    /// Drawable snapshot of every body
    pub fn views(&self) -> Vec<BodyView> {
        self.registry
            .iter()
            .map(|b| BodyView {
                id: b.id,
                category: b.category,
                rect: b.rect(),
                radius: b.radius,
                glow: match b.category {
                    Category::Attractor(_) => b.core_radius(),
                    _ => 0.0,
                },
            })
            .collect()
    }

    /// Trails to draw: live projectiles first, then fading ones
    pub fn trails(&self) -> impl Iterator<Item = &Trail> {
        self.registry
            .iter()
            .filter(|b| b.category == Category::Projectile)
            .map(|b| &b.trail)
            .chain(self.fading_trails.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AsteroidSettings {
        AsteroidSettings::default()
    }

    #[test]
    fn test_setup_default_pattern() {
        let mut state = GameState::new(7, &settings());
        assert_eq!(state.phase, GamePhase::Setup);
        state.setup(&Pattern::default());

        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.registry.count(Category::FreeBody), 7);
        assert_eq!(state.registry.live_attractor_ids().len(), 3);
        // 5 full-height walls plus two 12-cell ledges, minus the 4 overlapping cells
        assert_eq!(state.registry.count(Category::Obstacle), 5 * 18 + 24 - 4);
    }

    #[test]
    fn test_free_bodies_start_on_launch_side() {
        let mut state = GameState::new(99, &settings());
        state.setup(&Pattern::empty(18, 27));
        for body in state.registry.iter() {
            assert!((45.0..=150.0).contains(&body.pos.x));
            assert!((30.0..=690.0).contains(&body.pos.y));
            assert_eq!(body.vel, DVec2::ZERO);
        }
    }

    #[test]
    fn test_setup_is_seeded() {
        let mut a = GameState::new(5, &settings());
        let mut b = GameState::new(5, &settings());
        a.setup(&Pattern::default());
        b.setup(&Pattern::default());
        let pa: Vec<_> = a.registry.iter().map(|b| b.pos).collect();
        let pb: Vec<_> = b.registry.iter().map(|b| b.pos).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_fire_velocity_and_cooldown() {
        let mut state = GameState::new(1, &settings());
        state.phase = GamePhase::Running;

        let id = state.fire(DVec2::new(300.0, LAUNCH_Y - 400.0)).unwrap();
        let rocket = state.registry.get(id).unwrap();
        assert!((rocket.vel.length() - PROJECTILE_SPEED).abs() < 1e-12);
        assert!((rocket.vel.x - 300.0 / 500.0 * 3.0).abs() < 1e-12);
        assert!((rocket.vel.y + 400.0 / 500.0 * 3.0).abs() < 1e-12);
        assert!(state.armed);
        assert_eq!(state.shots, 1);

        // 800 ms at 200 fps
        assert_eq!(state.fire_cooldown_ticks, 160);
        state.time_ticks += 159;
        assert!(state.fire(DVec2::new(500.0, 100.0)).is_none());
        state.time_ticks += 1;
        assert!(state.fire(DVec2::new(500.0, 100.0)).is_some());
        assert_eq!(state.shots, 2);
    }

    #[test]
    fn test_fire_without_direction_is_ignored() {
        let mut state = GameState::new(1, &settings());
        assert!(state.fire(DVec2::new(0.0, LAUNCH_Y)).is_none());
        assert_eq!(state.shots, 0);
        assert!(!state.armed);
    }

    #[test]
    fn test_views_expose_rects() {
        let mut state = GameState::new(1, &settings());
        state.setup(&Pattern::default());
        let views = state.views();
        assert_eq!(views.len(), state.registry.len());
        let sun = views
            .iter()
            .find(|v| v.category == Category::Attractor(AttractorKind::Sun))
            .unwrap();
        assert_eq!(sun.rect.w, 28.0);
        assert!(sun.glow > 0.0);
    }
}
