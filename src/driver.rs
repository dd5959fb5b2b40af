//! Fixed-rate frame driver
//!
//! One physics step per frame: sample input, tick, present, then wait out the
//! rest of the frame period. Both games plug in through `Simulation`; input
//! and presentation are supplied by the caller.

use std::time::{Duration, Instant};

use glam::DVec2;

use crate::pong::{PongInput, PongState, Side, track_ball};
use crate::sim::{Category, GamePhase, GameState, TickInput};

/// A game the driver can run
pub trait Simulation {
    type Input;

    /// Advance one frame, returning the phase afterwards
    fn tick(&mut self, input: &Self::Input) -> GamePhase;

    fn phase(&self) -> GamePhase;

    /// Target frame rate
    fn fps(&self) -> u32;
}

impl Simulation for GameState {
    type Input = TickInput;

    fn tick(&mut self, input: &TickInput) -> GamePhase {
        crate::sim::tick(self, input);
        self.phase
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn fps(&self) -> u32 {
        self.fps
    }
}

impl Simulation for PongState {
    type Input = PongInput;

    fn tick(&mut self, input: &PongInput) -> GamePhase {
        crate::pong::tick(self, input);
        self.phase
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn fps(&self) -> u32 {
        self.fps
    }
}

/// Produces the input for the next frame
pub trait InputSource<S: Simulation> {
    fn sample(&mut self, sim: &S) -> S::Input;
}

impl<S, F> InputSource<S> for F
where
    S: Simulation,
    F: FnMut(&S) -> S::Input,
{
    fn sample(&mut self, sim: &S) -> S::Input {
        self(sim)
    }
}

/// Receives the state after every frame (draw calls live behind this)
pub trait Presenter<S> {
    fn present(&mut self, sim: &S);
}

/// Presenter that draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl<S> Presenter<S> for Headless {
    fn present(&mut self, _sim: &S) {}
}

/// Caps the frame rate by sleeping out each frame's remaining time
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Option<Duration>,
    frame_start: Option<Instant>,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self {
            period: Some(Duration::from_secs(1) / fps.max(1)),
            frame_start: None,
        }
    }

    /// No rate limit (tests and headless runs)
    pub fn unlimited() -> Self {
        Self {
            period: None,
            frame_start: None,
        }
    }

    /// Block until the current frame's period has elapsed
    pub fn wait(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        if let Some(start) = self.frame_start {
            let elapsed = start.elapsed();
            if elapsed < period {
                std::thread::sleep(period - elapsed);
            }
        }
        self.frame_start = Some(Instant::now());
    }
}

/// What a run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub frames: u64,
    pub phase: GamePhase,
}

/// Runs a simulation until it reaches a terminal phase
///
/// A simulation still in `Setup` is returned untouched.
#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    /// Stop after this many frames even if the round is still going
    pub max_frames: Option<u64>,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame_limit(max_frames: u64) -> Self {
        Self {
            max_frames: Some(max_frames),
        }
    }

    pub fn run<S, I, P>(&self, sim: &mut S, input: &mut I, presenter: &mut P, clock: &mut FrameClock) -> RunReport
    where
        S: Simulation,
        I: InputSource<S>,
        P: Presenter<S>,
    {
        let mut frames = 0;
        let mut phase = sim.phase();
        if phase == GamePhase::Setup {
            log::warn!("Frame driver refused a simulation that was never set up");
            return RunReport { frames, phase };
        }
        log::info!("Frame driver starting at {} fps", sim.fps());

        while !phase.is_terminal() {
            if self.max_frames.is_some_and(|max| frames >= max) {
                log::warn!("Frame limit reached after {} frames", frames);
                break;
            }
            let frame_input = input.sample(sim);
            phase = sim.tick(&frame_input);
            presenter.present(sim);
            clock.wait();
            frames += 1;
        }

        log::info!("Frame driver stopped after {} frames in {:?}", frames, phase);
        RunReport { frames, phase }
    }
}

/// Demo player for asteroids: aims at obstacles first, then at free bodies
#[derive(Debug, Clone, Default)]
pub struct AsteroidsAutopilot {
    shots: u64,
}

impl InputSource<GameState> for AsteroidsAutopilot {
    fn sample(&mut self, state: &GameState) -> TickInput {
        let ready = state
            .last_shot_tick
            .is_none_or(|last| state.time_ticks.saturating_sub(last) >= state.fire_cooldown_ticks);
        if !ready {
            return TickInput::default();
        }

        let mut targets: Vec<DVec2> = state
            .registry
            .live()
            .filter(|b| b.category == Category::Obstacle)
            .map(|b| b.center())
            .collect();
        if targets.is_empty() {
            targets = state
                .registry
                .live()
                .filter(|b| b.category == Category::FreeBody)
                .map(|b| b.pos)
                .collect();
        }
        if targets.is_empty() {
            return TickInput::default();
        }

        let aim = targets[(self.shots as usize) % targets.len()];
        self.shots += 1;
        TickInput {
            fire_at: Some(aim),
            ..Default::default()
        }
    }
}

/// Demo players for pong: both paddles chase the incoming ball
#[derive(Debug, Clone, Copy, Default)]
pub struct PongAutopilot;

impl InputSource<PongState> for PongAutopilot {
    fn sample(&mut self, state: &PongState) -> PongInput {
        PongInput {
            left: track_ball(state, Side::Left),
            right: track_ball(state, Side::Right),
            ..Default::default()
        }
    }
}
