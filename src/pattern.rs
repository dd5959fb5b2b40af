//! Obstacle/attractor layout grids
//!
//! A pattern is a grid of integer codes, one cell per `CELL_SIZE` square of
//! the play field:
//!
//! ```text
//! 0 = empty, 1 = obstacle, 2 = sun, 3 = black hole
//! ```
//!
//! Files are comma-separated rows. A grid whose shape does not match the
//! field is rejected rather than truncated or padded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{CELL_SIZE, FIELD_HEIGHT, FIELD_WIDTH};
use crate::error::PatternError;

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Obstacle,
    Sun,
    BlackHole,
}

impl Cell {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Obstacle),
            2 => Some(Cell::Sun),
            3 => Some(Cell::BlackHole),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Obstacle => 1,
            Cell::Sun => 2,
            Cell::BlackHole => 3,
        }
    }
}

/// A validated rows x cols grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Pattern {
    /// Grid shape for the standard play field
    pub fn field_shape() -> (usize, usize) {
        (
            (FIELD_HEIGHT / CELL_SIZE) as usize,
            (FIELD_WIDTH / CELL_SIZE) as usize,
        )
    }

    /// An all-empty grid
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = cell;
        }
    }

    /// Non-empty cells in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != Cell::Empty)
            .map(|(i, cell)| (i / self.cols, i % self.cols, *cell))
    }

    /// Parse comma-separated rows, requiring exactly `rows` x `cols` cells
    ///
    /// Trailing blank lines are ignored.
    pub fn parse(text: &str, rows: usize, cols: usize) -> Result<Self, PatternError> {
        let lines: Vec<&str> = text.trim_end().lines().map(str::trim).collect();
        let found_rows = if text.trim().is_empty() { 0 } else { lines.len() };

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in lines.iter().enumerate().take(found_rows) {
            let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
            if tokens.len() != cols || found_rows != rows {
                return Err(PatternError::Dimensions {
                    expected: (rows, cols),
                    found: (found_rows, tokens.len()),
                });
            }
            for (col, token) in tokens.into_iter().enumerate() {
                let cell = token
                    .parse::<u8>()
                    .ok()
                    .and_then(Cell::from_code)
                    .ok_or_else(|| PatternError::BadCell {
                        row,
                        col,
                        token: token.to_string(),
                    })?;
                cells.push(cell);
            }
        }

        if found_rows != rows {
            return Err(PatternError::Dimensions {
                expected: (rows, cols),
                found: (found_rows, 0),
            });
        }

        Ok(Self { rows, cols, cells })
    }

    /// Load a pattern file sized for the standard field
    pub fn load(path: &Path) -> Result<Self, PatternError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PatternError::Missing(path.to_path_buf()),
            _ => PatternError::Io(e),
        })?;
        let (rows, cols) = Self::field_shape();
        let pattern = Self::parse(&text, rows, cols)?;
        log::info!(
            "Loaded pattern {} ({} occupied cells)",
            path.display(),
            pattern.occupied().count()
        );
        Ok(pattern)
    }

    /// Serialize back to the comma-separated file format
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in 0..self.rows {
            let line: Vec<String> = (0..self.cols)
                .map(|col| self.cells[row * self.cols + col].code().to_string())
                .collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }

    /// Built-in layout: five obstacle walls, short top/bottom ledges, one sun
    /// near the right edge and two black holes
    pub fn walls(rows: usize, cols: usize) -> Self {
        let mut pattern = Self::empty(rows, cols);

        for wall in 0..5 {
            let col = wall * 4 + 6;
            for row in 0..rows {
                pattern.set(row, col, Cell::Obstacle);
            }
        }
        for col in 0..12 {
            pattern.set(0, col, Cell::Obstacle);
            pattern.set(rows.saturating_sub(1), col, Cell::Obstacle);
        }
        pattern.set(rows / 2, cols.saturating_sub(4), Cell::Sun);
        pattern.set(rows / 4, cols / 2, Cell::BlackHole);
        pattern.set(3 * rows / 4, 3 * cols / 4, Cell::BlackHole);

        pattern
    }
}

impl Default for Pattern {
    fn default() -> Self {
        let (rows, cols) = Self::field_shape();
        Self::walls(rows, cols)
    }
}
