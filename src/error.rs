//! Error types for the games.
//!
//! Setup can fail on a missing or malformed pattern grid, and persistence can
//! fail on the leaderboard/settings files. Nothing inside a tick returns an
//! error: quitting is a phase transition, not a failure.

use std::fmt;
use std::path::PathBuf;

/// Errors raised while loading an obstacle/attractor pattern.
#[derive(Debug)]
pub enum PatternError {
    /// The pattern file does not exist.
    Missing(PathBuf),
    /// The pattern file exists but could not be read.
    Io(std::io::Error),
    /// Grid shape does not match the play field.
    Dimensions {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// A cell is not one of the known integer codes.
    BadCell {
        row: usize,
        col: usize,
        token: String,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Missing(path) => {
                write!(f, "Pattern file not found: {}", path.display())
            }
            PatternError::Io(e) => write!(f, "Failed to read pattern file: {}", e),
            PatternError::Dimensions { expected, found } => write!(
                f,
                "Pattern grid must be {} rows x {} columns, found {} x {}",
                expected.0, expected.1, found.0, found.1
            ),
            PatternError::BadCell { row, col, token } => write!(
                f,
                "Invalid pattern cell {:?} at row {}, column {} (expected 0-3)",
                token, row, col
            ),
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatternError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors raised by leaderboard, shot log and settings files.
#[derive(Debug)]
pub enum StorageError {
    /// Failed to read or write the file.
    Io(std::io::Error),
    /// A leaderboard line is not `name,score`.
    Malformed { line: usize, content: String },
    /// Settings file is not valid JSON.
    Json(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "Storage I/O failed: {}", e),
            StorageError::Malformed { line, content } => {
                write!(f, "Malformed leaderboard line {}: {:?}", line, content)
            }
            StorageError::Json(e) => write!(f, "Invalid settings JSON: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Malformed { .. } => None,
            StorageError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// Top-level error for running a game from the binary.
#[derive(Debug)]
pub enum Error {
    Pattern(PatternError),
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Pattern(e) => write!(f, "{}", e),
            Error::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Pattern(e) => Some(e),
            Error::Storage(e) => Some(e),
        }
    }
}

impl From<PatternError> for Error {
    fn from(e: PatternError) -> Self {
        Error::Pattern(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_message() {
        let err = PatternError::Dimensions {
            expected: (18, 27),
            found: (17, 27),
        };
        assert_eq!(
            err.to_string(),
            "Pattern grid must be 18 rows x 27 columns, found 17 x 27"
        );
    }

    #[test]
    fn test_umbrella_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: Error = StorageError::from(io).into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
