//! Game settings
//!
//! Stored as JSON next to the binary. Anything missing from the file falls
//! back to its default, and a missing or broken file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Asteroids round settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidSettings {
    /// Target tick rate
    pub fps: u32,
    /// Minimum time between shots
    pub fire_delay_ms: u64,
    /// Free bodies spawned at setup
    pub free_bodies: usize,
    /// Obstacle/attractor layout file
    pub pattern_path: PathBuf,
}

impl Default for AsteroidSettings {
    fn default() -> Self {
        Self {
            fps: 200,
            fire_delay_ms: 800,
            free_bodies: 7,
            pattern_path: PathBuf::from("input.txt"),
        }
    }
}

/// Pong match settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongSettings {
    pub fps: u32,
    /// Points that end the match
    pub score_to_win: u32,
    /// Minimum time between bolts, per paddle
    pub fire_delay_ms: u64,
}

impl Default for PongSettings {
    fn default() -> Self {
        Self {
            fps: 100,
            score_to_win: 5,
            fire_delay_ms: 300,
        }
    }
}

/// All settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for setup randomness
    pub seed: u64,
    pub asteroids: AsteroidSettings,
    pub pong: PongSettings,
    pub leaderboard_path: PathBuf,
    pub shot_log_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            asteroids: AsteroidSettings::default(),
            pong: PongSettings::default(),
            leaderboard_path: PathBuf::from("leaderboard.txt"),
            shot_log_path: PathBuf::from("shots.txt"),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, using defaults if it can't be read
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load settings from a JSON file
    pub fn try_load(path: &Path) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gravity-arcade-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.asteroids.fps, 200);
        assert_eq!(settings.asteroids.fire_delay_ms, 800);
        assert_eq!(settings.asteroids.free_bodies, 7);
        assert_eq!(settings.pong.fps, 100);
        assert_eq!(settings.pong.score_to_win, 5);
        assert_eq!(settings.pong.fire_delay_ms, 300);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"seed": 9, "pong": {"score_to_win": 3}}"#).unwrap();
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.pong.score_to_win, 3);
        assert_eq!(settings.pong.fps, 100);
        assert_eq!(settings.asteroids, AsteroidSettings::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load(Path::new("/definitely/not/here/settings.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_broken_file_uses_defaults() {
        let path = temp_path("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::try_load(&path), Err(StorageError::Json(_))));
        assert_eq!(Settings::load(&path), Settings::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("settings.json");
        let mut settings = Settings::default();
        settings.seed = 1234;
        settings.asteroids.free_bodies = 3;
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }
}
