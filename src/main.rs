//! Gravity Arcade entry point
//!
//! Usage: `gravity-arcade [asteroids|pong] [settings.json] [player-name]`
//!
//! Runs one headless round with the demo autopilot and logs the outcome.
//! Finished asteroids rounds are appended to the shot log and offered to the
//! leaderboard.

use std::path::Path;
use std::process::ExitCode;

use gravity_arcade::driver::{AsteroidsAutopilot, FrameClock, FrameDriver, Headless, PongAutopilot};
use gravity_arcade::pattern::Pattern;
use gravity_arcade::pong::PongState;
use gravity_arcade::sim::GameState;
use gravity_arcade::{Error, Leaderboard, PatternError, Settings, ShotLog};

/// Headless rounds give up after this much game time
const MAX_ROUND_SECS: u64 = 180;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let game = args.next().unwrap_or_else(|| "asteroids".to_string());
    let settings = args
        .next()
        .map(|path| Settings::load(Path::new(&path)))
        .unwrap_or_default();
    let player = args.next().unwrap_or_else(|| "player".to_string());

    log::info!("Gravity Arcade starting ({}, seed {})", game, settings.seed);

    let result = match game.as_str() {
        "asteroids" => run_asteroids(&settings, &player),
        "pong" => {
            run_pong(&settings);
            Ok(())
        }
        other => {
            eprintln!("Unknown game {:?}; expected \"asteroids\" or \"pong\"", other);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the configured pattern, falling back to the built-in layout if the file is absent
fn load_pattern(path: &Path) -> Result<Pattern, PatternError> {
    match Pattern::load(path) {
        Ok(pattern) => Ok(pattern),
        Err(PatternError::Missing(missing)) => {
            log::warn!("No pattern at {}, using the built-in layout", missing.display());
            Ok(Pattern::default())
        }
        Err(e) => Err(e),
    }
}

fn run_asteroids(settings: &Settings, player: &str) -> Result<(), Error> {
    let pattern = load_pattern(&settings.asteroids.pattern_path)?;
    let mut state = GameState::new(settings.seed, &settings.asteroids);
    state.setup(&pattern);

    let driver = FrameDriver::with_frame_limit(MAX_ROUND_SECS * u64::from(state.fps));
    let report = driver.run(
        &mut state,
        &mut AsteroidsAutopilot::default(),
        &mut Headless,
        &mut FrameClock::unlimited(),
    );

    let summary = state.summary.unwrap_or_else(|| state.summarize());
    log::info!(
        "Asteroids finished in {:?}: score {}, {} shots, {}s",
        report.phase,
        summary.score,
        summary.shots,
        summary.elapsed_secs
    );

    ShotLog::new(&settings.shot_log_path).append(&summary)?;

    let mut board = Leaderboard::load(&settings.leaderboard_path)?;
    match board.add_score(player, summary.score) {
        Some(rank) => log::info!("{} placed #{} on the leaderboard", player, rank),
        None => log::info!("{} did not make the leaderboard", player),
    }
    board.save(&settings.leaderboard_path)?;
    Ok(())
}

fn run_pong(settings: &Settings) {
    let mut state = PongState::new(settings.seed, &settings.pong);

    let driver = FrameDriver::with_frame_limit(MAX_ROUND_SECS * u64::from(state.fps));
    let report = driver.run(&mut state, &mut PongAutopilot, &mut Headless, &mut FrameClock::unlimited());

    let (left, right) = state.scores();
    match state.outcome {
        Some(outcome) => log::info!("Pong over after {} frames: {} ({}-{})", report.frames, outcome.message(), left, right),
        None => log::info!("Pong stopped after {} frames at {}-{}", report.frames, left, right),
    }
}
