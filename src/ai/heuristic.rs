use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::{require_moves, Player};
use crate::error::GameError;
use crate::game::{Board, Move};

/// Wins when it can, blocks the opponent's immediate win otherwise, and
/// plays a random legal move when neither applies.
pub struct HeuristicAgent {
    rng: StdRng,
}

impl HeuristicAgent {
    pub fn new() -> Self {
        HeuristicAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        HeuristicAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for HeuristicAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for HeuristicAgent {
    fn choose_move(&mut self, board: &Board, legal_moves: &[Move]) -> Result<Move, GameError> {
        require_moves(legal_moves)?;
        let rules = board.rules();
        let me = board.side_to_move();

        if let Some(&mv) = legal_moves
            .iter()
            .find(|&&mv| rules.completes_line(board, mv, me))
        {
            return Ok(mv);
        }

        if let Some(&mv) = legal_moves
            .iter()
            .find(|&&mv| rules.completes_line(board, mv, me.other()))
        {
            tracing::trace!(%mv, "blocking");
            return Ok(mv);
        }

        let idx = self.rng.random_range(0..legal_moves.len());
        Ok(legal_moves[idx])
    }

    fn name(&self) -> &str {
        "Heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::RuleSet;

    fn choose(text: &str) -> Move {
        let board = Board::parse(RuleSet::tic_tac_toe(), text).unwrap();
        let legal = board.legal_moves();
        HeuristicAgent::seeded(3).choose_move(&board, &legal).unwrap()
    }

    #[test]
    fn test_takes_winning_move() {
        // X to move, X completes the top row
        assert_eq!(choose("XX./OO./..."), Move::new(0, 2));
    }

    #[test]
    fn test_blocks_opponent_win() {
        // O to move, X threatens the diagonal
        assert_eq!(choose("X../.X./O.."), Move::new(2, 2));
    }

    #[test]
    fn test_prefers_win_over_block() {
        // O to move: O can win on row 1, X threatens row 0
        assert_eq!(choose("XX./OO./X.."), Move::new(1, 2));
    }

    #[test]
    fn test_falls_back_to_legal_random() {
        let board = Board::new(RuleSet::tic_tac_toe());
        let legal = board.legal_moves();
        let mut agent = HeuristicAgent::seeded(11);
        for _ in 0..20 {
            assert!(legal.contains(&agent.choose_move(&board, &legal).unwrap()));
        }
    }
}
