use crate::error::GameError;
use crate::game::{Board, Move, Side};

/// Universal interface for anything that can take a turn.
///
/// The engine only ever calls `choose_move` on a non-terminal board and
/// validates the returned move itself; implementations need not re-check it.
pub trait Player {
    /// Pick a move from `legal_moves` (row-major order) for the side to move
    /// on `board`. Fails with [`GameError::NoLegalMove`] when the list is
    /// empty.
    fn choose_move(&mut self, board: &Board, legal_moves: &[Move]) -> Result<Move, GameError>;

    /// Display name.
    fn name(&self) -> &str;

    /// Called once before each game with every side this player is seated
    /// as (both sides during self-play).
    fn begin_episode(&mut self, _sides: &[Side]) {}
}

/// Shared guard for the empty-move-list contract.
pub(crate) fn require_moves(legal_moves: &[Move]) -> Result<(), GameError> {
    if legal_moves.is_empty() {
        Err(GameError::NoLegalMove)
    } else {
        Ok(())
    }
}
