//! # Board Canonicalization
//!
//! Folds boards that are equal up to rotation or reflection onto a single
//! [`CanonicalKey`]. Square boards use the 8 elements of the dihedral group
//! D4; rectangular boards only admit the 4 transforms that keep their shape
//! (identity, 180° rotation and the two axis flips).
//!
//! The canonical key is the lexicographically smallest row-major encoding
//! over the group, with `Empty < A < B`. Swapping colors is not a symmetry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell};
use super::rules::RuleSet;
use super::side::Side;
use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    Identity,
    /// Quarter turn clockwise
    Rot90,
    Rot180,
    Rot270,
    /// Top row swaps with bottom row
    FlipRows,
    /// Left column swaps with right column
    FlipCols,
    /// Reflection across the main diagonal
    Transpose,
    /// Reflection across the anti-diagonal
    AntiTranspose,
}

const SQUARE_GROUP: [Symmetry; 8] = [
    Symmetry::Identity,
    Symmetry::Rot90,
    Symmetry::Rot180,
    Symmetry::Rot270,
    Symmetry::FlipRows,
    Symmetry::FlipCols,
    Symmetry::Transpose,
    Symmetry::AntiTranspose,
];

const RECT_GROUP: [Symmetry; 4] = [
    Symmetry::Identity,
    Symmetry::Rot180,
    Symmetry::FlipRows,
    Symmetry::FlipCols,
];

impl Symmetry {
    /// Transforms that map a `rows` x `cols` board onto itself.
    pub fn group(rows: usize, cols: usize) -> &'static [Symmetry] {
        if rows == cols {
            &SQUARE_GROUP
        } else {
            &RECT_GROUP
        }
    }

    /// Image of cell (row, col). Quarter turns and diagonal reflections are
    /// only shape-preserving on square boards.
    pub fn map(self, row: usize, col: usize, rows: usize, cols: usize) -> (usize, usize) {
        let last_r = rows - 1;
        let last_c = cols - 1;
        match self {
            Symmetry::Identity => (row, col),
            Symmetry::Rot90 => (col, last_r - row),
            Symmetry::Rot180 => (last_r - row, last_c - col),
            Symmetry::Rot270 => (last_c - col, row),
            Symmetry::FlipRows => (last_r - row, col),
            Symmetry::FlipCols => (row, last_c - col),
            Symmetry::Transpose => (col, row),
            Symmetry::AntiTranspose => (last_c - col, last_r - row),
        }
    }

    fn transform_cells(self, board: &Board) -> Vec<Cell> {
        let (rows, cols) = (board.rows(), board.cols());
        let mut out = vec![Cell::Empty; rows * cols];
        for row in 0..rows {
            for col in 0..cols {
                let (r, c) = self.map(row, col, rows, cols);
                out[r * cols + c] = board.get(row, col);
            }
        }
        out
    }

    /// The transformed board. Panics if the transform does not preserve the
    /// board's shape.
    pub fn apply(self, board: &Board) -> Board {
        assert!(
            Symmetry::group(board.rows(), board.cols()).contains(&self),
            "{self:?} does not preserve a {}x{} board",
            board.rows(),
            board.cols()
        );
        Board::from_cells(*board.rules(), self.transform_cells(board))
    }
}

/// Canonical value-table key for a board position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalKey {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl CanonicalKey {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn move_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Cell::Empty).count()
    }

    /// Side that made the last move into this position.
    pub fn last_mover(&self) -> Option<Side> {
        match self.move_count() {
            0 => None,
            n if n % 2 == 1 => Some(Side::A),
            _ => Some(Side::B),
        }
    }

    /// Rebuild the representative board under `rules`.
    pub fn to_board(&self, rules: RuleSet) -> Result<Board, GameError> {
        if rules.rows() != self.rows || rules.cols() != self.cols {
            return Err(GameError::InvalidBoard(format!(
                "key is {}x{}, rules are {}x{}",
                self.rows,
                self.cols,
                rules.rows(),
                rules.cols()
            )));
        }
        Board::parse(rules, &self.to_string())
    }
}

pub fn canonicalize(board: &Board) -> CanonicalKey {
    let cells = Symmetry::group(board.rows(), board.cols())
        .iter()
        .map(|g| g.transform_cells(board))
        .min()
        .unwrap_or_else(|| board.cells().to_vec());

    CanonicalKey {
        rows: board.rows(),
        cols: board.cols(),
        cells,
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.chunks(self.cols).enumerate() {
            if r > 0 {
                write!(f, "/")?;
            }
            for cell in row {
                write!(f, "{}", cell.token())?;
            }
        }
        Ok(())
    }
}

impl FromStr for CanonicalKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.split('/').collect();
        let cols = rows[0].chars().count();
        if cols == 0 {
            return Err("empty row".to_string());
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        for row in &rows {
            if row.chars().count() != cols {
                return Err(format!("rows have unequal length in '{s}'"));
            }
            for c in row.chars() {
                cells.push(Cell::from_token(c).ok_or_else(|| format!("unexpected character '{c}'"))?);
            }
        }

        Ok(CanonicalKey {
            rows: rows.len(),
            cols,
            cells,
        })
    }
}

impl TryFrom<String> for CanonicalKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CanonicalKey> for String {
    fn from(key: CanonicalKey) -> Self {
        key.to_string()
    }
}
