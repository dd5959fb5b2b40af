//! High score leaderboard and shot log
//!
//! The leaderboard is a plain text file of `name,score` lines, best first,
//! holding the top 10. The shot log gets one line appended per finished
//! asteroids round.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::sim::RoundSummary;

/// Entries kept in the leaderboard file
pub const MAX_HIGH_SCORES: usize = 10;

/// One `name,score` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Parse one `name,score` line (1-based `line` for error reporting)
    pub fn parse_line(line: usize, content: &str) -> Result<HighScoreEntry, StorageError> {
        let malformed = || StorageError::Malformed {
            line,
            content: content.to_string(),
        };
        let (name, score) = content.rsplit_once(',').ok_or_else(malformed)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(malformed());
        }
        let score = score.trim().parse::<u64>().map_err(|_| malformed())?;
        Ok(HighScoreEntry {
            name: name.to_string(),
            score,
        })
    }

    /// Parse a leaderboard file
    ///
    /// Malformed lines are logged and skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries: Vec<HighScoreEntry> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(i, line)| match Self::parse_line(i + 1, line.trim()) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping {}", e);
                    None
                }
            })
            .collect();

        // Stable sort keeps file order among equal scores
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Whether `score` would make the top ten
    pub fn qualifies(&self, score: u64) -> bool {
        self.entries.len() < MAX_HIGH_SCORES || self.entries.last().is_none_or(|lowest| score > lowest.score)
    }

    /// Insert a finished round's score, returning its 1-based rank
    ///
    /// `None` when the board is full and the score is not above the lowest entry.
    pub fn add_score(&mut self, name: &str, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: name.to_string(),
            score,
        };

        // A new score ranks ahead of existing equal scores
        let pos = self.entries.iter().position(|e| score >= e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score on the board
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// File contents, one `name,score` line per entry
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .take(MAX_HIGH_SCORES)
            .map(|e| format!("{},{}\n", e.name, e.score))
            .collect()
    }

    /// Load the leaderboard file; a missing file is an empty leaderboard
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let board = Self::parse(&text);
                log::info!("Loaded {} high scores", board.entries.len());
                Ok(board)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No leaderboard at {}, starting empty", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rewrite the leaderboard file with the current top entries
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        std::fs::write(path, self.to_text())?;
        log::info!("Leaderboard written to {} ({} entries)", path.display(), self.entries.len());
        Ok(())
    }
}

/// Append-only log of finished rounds
#[derive(Debug, Clone)]
pub struct ShotLog {
    path: PathBuf,
}

impl ShotLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log line for a round: shots, seconds and score, each followed by a space
    pub fn format_line(summary: &RoundSummary) -> String {
        format!("{} {} {} \n", summary.shots, summary.elapsed_secs, summary.score)
    }

    /// Append one round to the log, creating the file if needed
    pub fn append(&self, summary: &RoundSummary) -> Result<(), StorageError> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(Self::format_line(summary).as_bytes())?;
        log::debug!("Logged round to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gravity-arcade-{}-{}", std::process::id(), name))
    }

    fn summary(shots: u32, elapsed_secs: u64, score: u64) -> RoundSummary {
        RoundSummary {
            shots,
            elapsed_secs,
            score,
            cleared: true,
        }
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let board = Leaderboard::parse("ada,120\nbroken line\nbob,notanumber\n\n,40\ncy,300\n");
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.entries[0].name, "cy");
        assert_eq!(board.entries[1].score, 120);
    }

    #[test]
    fn test_parse_line_reports_position() {
        let err = Leaderboard::parse_line(3, "nobody").unwrap_err();
        assert!(matches!(err, StorageError::Malformed { line: 3, .. }));
        let entry = Leaderboard::parse_line(1, "a,b,7").unwrap();
        assert_eq!(entry.name, "a,b");
        assert_eq!(entry.score, 7);
    }

    #[test]
    fn test_add_score_keeps_order() {
        let mut board = Leaderboard::parse("a,300\nb,200\nc,100\n");
        assert_eq!(board.add_score("new", 250), Some(2));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 250, 200, 100]);
        assert_eq!(board.top_score(), Some(300));
    }

    #[test]
    fn test_leaderboard_caps_at_ten() {
        let mut board = Leaderboard::new();
        for i in 0..12 {
            board.add_score(&format!("p{}", i), (i + 1) * 10);
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(120));
        assert_eq!(board.entries.last().unwrap().score, 30);

        assert_eq!(board.add_score("low", 5), None);
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
    }

    #[test]
    fn test_save_truncates_and_reloads() {
        let path = temp_path("leaderboard.txt");
        std::fs::write(&path, "old,1\nold,2\nold,3\nold,4\nold,5\nold,6\nold,7\nold,8\nold,9\nold,10\nold,11\n").unwrap();

        let mut board = Leaderboard::load(&path).unwrap();
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        board.add_score("ada", 50);
        board.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), MAX_HIGH_SCORES);
        assert!(text.starts_with("ada,50\n"));
        assert_eq!(Leaderboard::load(&path).unwrap(), board);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_leaderboard_is_empty() {
        let board = Leaderboard::load(Path::new("/definitely/not/here/leaderboard.txt")).unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn test_shot_log_appends() {
        let path = temp_path("shots.txt");
        let _ = std::fs::remove_file(&path);
        let log = ShotLog::new(&path);
        log.append(&summary(4, 12, 230)).unwrap();
        log.append(&summary(1, 3, 0)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "4 12 230 \n1 3 0 \n");
        let _ = std::fs::remove_file(&path);
    }
}
