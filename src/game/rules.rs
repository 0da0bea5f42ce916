//! Legality and terminal-status rules for an m,n,k game.
//!
//! A [`RuleSet`] is a plain value holding the board shape and the run length
//! `k`. Every function is pure over the board passed in.

use std::collections::HashSet;
use std::fmt;

use super::board::{Board, Cell, Move};
use super::side::Side;
use crate::error::{ConfigError, GameError, IllegalReason};

/// Line directions: right, down, down-right, down-left.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    AWins,
    BWins,
    Draw,
    InProgress,
}

impl Outcome {
    pub fn won_by(side: Side) -> Self {
        match side {
            Side::A => Outcome::AWins,
            Side::B => Outcome::BWins,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::AWins => Some(Side::A),
            Outcome::BWins => Some(Side::B),
            Outcome::Draw | Outcome::InProgress => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AWins => write!(f, "X wins"),
            Outcome::BWins => write!(f, "O wins"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::InProgress => write!(f, "in progress"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSet {
    rows: usize,
    cols: usize,
    k: usize,
}

impl RuleSet {
    pub fn new(rows: usize, cols: usize, k: usize) -> Result<Self, ConfigError> {
        let reject = |reason| ConfigError::Board {
            rows,
            cols,
            k,
            reason,
        };
        if rows == 0 || cols == 0 {
            return Err(reject("dimensions must be positive"));
        }
        if k == 0 {
            return Err(reject("k must be positive"));
        }
        if k > rows.max(cols) {
            return Err(reject("k exceeds the longest line"));
        }
        Ok(RuleSet { rows, cols, k })
    }

    /// Classic 3x3 tic-tac-toe.
    pub fn tic_tac_toe() -> Self {
        RuleSet {
            rows: 3,
            cols: 3,
            k: 3,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Shape label used in logs and persisted metadata, e.g. `3x3k3`.
    pub fn label(&self) -> String {
        format!("{}x{}k{}", self.rows, self.cols, self.k)
    }

    /// Every empty cell in row-major order.
    pub fn legal_moves(&self, board: &Board) -> Vec<Move> {
        board
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == Cell::Empty)
            .map(|(i, _)| Move::new(i / self.cols, i % self.cols))
            .collect()
    }

    /// Turn is derived from move-count parity; A moves first.
    pub fn side_to_move(&self, board: &Board) -> Side {
        if board.move_count() % 2 == 0 {
            Side::A
        } else {
            Side::B
        }
    }

    pub fn validate(&self, board: &Board, mv: Move, side: Side) -> Result<(), GameError> {
        let reason = match board.cell_at(mv) {
            None => Some(IllegalReason::OutOfBounds),
            Some(Cell::A) | Some(Cell::B) => Some(IllegalReason::Occupied),
            Some(Cell::Empty) => {
                let expected = self.side_to_move(board);
                (expected != side).then_some(IllegalReason::WrongTurn { expected })
            }
        };
        match reason {
            Some(reason) => Err(GameError::IllegalMove { mv, reason }),
            None => Ok(()),
        }
    }

    /// Apply a move to a copy of `board`, leaving the input untouched.
    pub fn apply(&self, board: &Board, mv: Move, side: Side) -> Result<Board, GameError> {
        let mut next = board.clone();
        next.play(mv, side)?;
        Ok(next)
    }

    /// Exhaustive scan of every maximal row, column and diagonal.
    pub fn terminal_status(&self, board: &Board) -> Outcome {
        for &(dr, dc) in &DIRECTIONS {
            for row in 0..self.rows {
                for col in 0..self.cols {
                    // Only walk from the first cell of each maximal line.
                    if self.offset(row, col, -dr, -dc).is_some() {
                        continue;
                    }
                    if let Some(side) = self.scan_line(board, row, col, dr, dc) {
                        return Outcome::won_by(side);
                    }
                }
            }
        }

        if board.is_full() {
            Outcome::Draw
        } else {
            Outcome::InProgress
        }
    }

    /// Whether a `side` mark at `mv` would sit on a k-run, treating `mv` as
    /// holding that mark regardless of its current content.
    pub fn completes_line(&self, board: &Board, mv: Move, side: Side) -> bool {
        let cell = side.to_cell();
        DIRECTIONS.iter().any(|&(dr, dc)| {
            let run = 1
                + self.count_from(board, mv, dr, dc, cell)
                + self.count_from(board, mv, -dr, -dc, cell);
            run >= self.k
        })
    }

    /// All boards reachable from the empty board by legal play. Terminal
    /// boards are included but not expanded.
    pub fn reachable_boards(&self) -> HashSet<Board> {
        let start = Board::new(*self);
        let mut seen = HashSet::new();
        let mut stack = vec![start.clone()];
        seen.insert(start);

        while let Some(board) = stack.pop() {
            if board.terminal_status().is_terminal() {
                continue;
            }
            let side = board.side_to_move();
            for mv in board.legal_moves() {
                let mut child = board.clone();
                if child.play(mv, side).is_ok() && seen.insert(child.clone()) {
                    stack.push(child);
                }
            }
        }

        seen
    }

    fn offset(&self, row: usize, col: usize, dr: isize, dc: isize) -> Option<(usize, usize)> {
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        (r < self.rows && c < self.cols).then_some((r, c))
    }

    fn scan_line(&self, board: &Board, row: usize, col: usize, dr: isize, dc: isize) -> Option<Side> {
        let mut pos = Some((row, col));
        let mut current = Cell::Empty;
        let mut run = 0;

        while let Some((r, c)) = pos {
            let cell = board.get(r, c);
            if cell == current {
                run += 1;
            } else {
                current = cell;
                run = 1;
            }
            if current != Cell::Empty && run >= self.k {
                return current.side();
            }
            pos = self.offset(r, c, dr, dc);
        }

        None
    }

    fn count_from(&self, board: &Board, mv: Move, dr: isize, dc: isize, cell: Cell) -> usize {
        let mut count = 0;
        let mut pos = self.offset(mv.row, mv.col, dr, dc);
        while let Some((r, c)) = pos {
            if board.get(r, c) != cell {
                break;
            }
            count += 1;
            pos = self.offset(r, c, dr, dc);
        }
        count
    }
}
