use std::fmt;

use super::rules::{Outcome, RuleSet};
use super::side::Side;
use super::symmetry::{self, CanonicalKey};
use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    Empty,
    A,
    B,
}

impl Cell {
    pub fn token(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::A => 'X',
            Cell::B => 'O',
        }
    }

    pub fn from_token(c: char) -> Option<Cell> {
        match c {
            '.' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::A),
            'O' | 'o' => Some(Cell::B),
            _ => None,
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::A => Some(Side::A),
            Cell::B => Some(Side::B),
        }
    }
}

/// A (row, column) coordinate. Ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub fn new(row: usize, col: usize) -> Self {
        Move { row, col }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Live game grid. Cells are stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rules: RuleSet,
    cells: Vec<Cell>,
    moves: usize,
}

impl Board {
    /// Create a new empty board
    pub fn new(rules: RuleSet) -> Self {
        Board {
            rules,
            cells: vec![Cell::Empty; rules.rows() * rules.cols()],
            moves: 0,
        }
    }

    pub(crate) fn from_cells(rules: RuleSet, cells: Vec<Cell>) -> Self {
        let moves = cells.iter().filter(|&&c| c != Cell::Empty).count();
        Board {
            rules,
            cells,
            moves,
        }
    }

    /// Parse the `/`-separated text form, e.g. `X.O/.X./...`.
    ///
    /// Rejects boards whose mark counts could not arise from alternating
    /// play starting with A.
    pub fn parse(rules: RuleSet, text: &str) -> Result<Self, GameError> {
        let rows: Vec<&str> = text.trim().split('/').collect();
        if rows.len() != rules.rows() {
            return Err(GameError::InvalidBoard(format!(
                "expected {} rows, found {}",
                rules.rows(),
                rows.len()
            )));
        }

        let mut cells = Vec::with_capacity(rules.rows() * rules.cols());
        for (r, row) in rows.iter().enumerate() {
            let before = cells.len();
            for c in row.chars() {
                let cell = Cell::from_token(c).ok_or_else(|| {
                    GameError::InvalidBoard(format!("unexpected character '{c}' in row {r}"))
                })?;
                cells.push(cell);
            }
            if cells.len() - before != rules.cols() {
                return Err(GameError::InvalidBoard(format!(
                    "row {r} has {} cells, expected {}",
                    cells.len() - before,
                    rules.cols()
                )));
            }
        }

        let a = cells.iter().filter(|&&c| c == Cell::A).count();
        let b = cells.iter().filter(|&&c| c == Cell::B).count();
        if a != b && a != b + 1 {
            return Err(GameError::InvalidBoard(format!(
                "{a} X marks and {b} O marks cannot arise from alternating play"
            )));
        }

        Ok(Board::from_cells(rules, cells))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rows(&self) -> usize {
        self.rules.rows()
    }

    pub fn cols(&self) -> usize {
        self.rules.cols()
    }

    /// Get the cell at a specific position. Panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        assert!(row < self.rows() && col < self.cols(), "({row}, {col}) out of bounds");
        self.cells[row * self.cols() + col]
    }

    /// Cell under `mv`, or `None` when the move is off the board.
    pub fn cell_at(&self, mv: Move) -> Option<Cell> {
        if mv.row < self.rows() && mv.col < self.cols() {
            Some(self.cells[mv.row * self.cols() + mv.col])
        } else {
            None
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn move_count(&self) -> usize {
        self.moves
    }

    pub fn is_full(&self) -> bool {
        self.moves == self.cells.len()
    }

    pub fn side_to_move(&self) -> Side {
        self.rules.side_to_move(self)
    }

    /// Side that placed the most recent mark, if any.
    pub fn last_mover(&self) -> Option<Side> {
        if self.moves == 0 {
            None
        } else {
            Some(self.side_to_move().other())
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.rules.legal_moves(self)
    }

    pub fn terminal_status(&self) -> Outcome {
        self.rules.terminal_status(self)
    }

    /// Place `side`'s mark at `mv`. On error the board is left unchanged.
    pub fn play(&mut self, mv: Move, side: Side) -> Result<(), GameError> {
        self.rules.validate(self, mv, side)?;
        let idx = mv.row * self.cols() + mv.col;
        self.cells[idx] = side.to_cell();
        self.moves += 1;
        Ok(())
    }

    pub fn to_canonical_key(&self) -> CanonicalKey {
        symmetry::canonicalize(self)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.cols() {
            write!(f, "{col:>3}")?;
        }
        writeln!(f)?;
        for row in 0..self.rows() {
            write!(f, "{row:>3}")?;
            for col in 0..self.cols() {
                write!(f, "{:>3}", self.get(row, col).token())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
