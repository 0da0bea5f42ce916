use std::collections::VecDeque;

use super::agent::{require_moves, Player};
use crate::error::GameError;
use crate::game::{Board, Move};

/// Replays a fixed list of moves, then falls back to the first empty cell.
///
/// Scripted moves are returned verbatim, legal or not, so callers can
/// exercise the engine's rejection path.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgent {
    script: VecDeque<Move>,
}

impl ScriptedAgent {
    pub fn new(moves: impl IntoIterator<Item = Move>) -> Self {
        ScriptedAgent {
            script: moves.into_iter().collect(),
        }
    }

    /// Convenience constructor from (row, col) pairs.
    pub fn from_pairs(pairs: &[(usize, usize)]) -> Self {
        Self::new(pairs.iter().map(|&(r, c)| Move::new(r, c)))
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Player for ScriptedAgent {
    fn choose_move(&mut self, _board: &Board, legal_moves: &[Move]) -> Result<Move, GameError> {
        require_moves(legal_moves)?;
        Ok(self.script.pop_front().unwrap_or(legal_moves[0]))
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}
