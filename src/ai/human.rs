use std::io::{self, BufRead, Write};

use super::agent::{require_moves, Player};
use crate::error::GameError;
use crate::game::{Board, Move};

/// Text-mode human player.
///
/// Prints the board and reads `row col` (space or comma separated) from the
/// input. Malformed lines are re-prompted; well-formed coordinates are
/// returned unchecked so the engine rejects an illegal move.
pub struct HumanPlayer<R, W> {
    input: R,
    output: W,
    show_board: bool,
}

impl<R: BufRead, W: Write> HumanPlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        HumanPlayer {
            input,
            output,
            show_board: true,
        }
    }

    /// Skip printing the board before each prompt, for callers that render
    /// it themselves.
    pub fn without_board(mut self) -> Self {
        self.show_board = false;
        self
    }

    fn parse_move(line: &str) -> Option<Move> {
        let mut parts = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty());
        let row = parts.next()?.parse().ok()?;
        let col = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Move::new(row, col))
    }
}

impl HumanPlayer<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        HumanPlayer::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Player for HumanPlayer<R, W> {
    fn choose_move(&mut self, board: &Board, legal_moves: &[Move]) -> Result<Move, GameError> {
        require_moves(legal_moves)?;
        if self.show_board {
            writeln!(self.output, "\n{board}")?;
        }

        let side = board.side_to_move();
        loop {
            write!(self.output, "{} to move, enter row and column: ", side.name())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(GameError::InputClosed);
            }
            match Self::parse_move(&line) {
                Some(mv) => return Ok(mv),
                None => writeln!(self.output, "Please enter two numbers, e.g. `1 2`.")?,
            }
        }
    }

    fn name(&self) -> &str {
        "Human"
    }
}
