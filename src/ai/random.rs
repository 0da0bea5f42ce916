use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::{require_moves, Player};
use crate::error::GameError;
use crate::game::{Board, Move};

/// An agent that selects uniformly at random from legal moves.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for RandomAgent {
    fn choose_move(&mut self, _board: &Board, legal_moves: &[Move]) -> Result<Move, GameError> {
        require_moves(legal_moves)?;
        let idx = self.rng.random_range(0..legal_moves.len());
        Ok(legal_moves[idx])
    }

    fn name(&self) -> &str {
        "Random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::RuleSet;

    #[test]
    fn test_random_agent_selects_legal_move() {
        let mut agent = RandomAgent::new();
        let board = Board::new(RuleSet::tic_tac_toe());
        let legal = board.legal_moves();

        for _ in 0..100 {
            let mv = agent.choose_move(&board, &legal).unwrap();
            assert!(legal.contains(&mv), "Move {} is not legal", mv);
        }
    }

    #[test]
    fn test_seeded_agents_agree() {
        let board = Board::new(RuleSet::tic_tac_toe());
        let legal = board.legal_moves();
        let mut a = RandomAgent::seeded(7);
        let mut b = RandomAgent::seeded(7);
        for _ in 0..20 {
            assert_eq!(
                a.choose_move(&board, &legal).unwrap(),
                b.choose_move(&board, &legal).unwrap()
            );
        }
    }

    #[test]
    fn test_empty_move_list_is_an_error() {
        let mut agent = RandomAgent::seeded(1);
        let board = Board::new(RuleSet::tic_tac_toe());
        assert!(matches!(
            agent.choose_move(&board, &[]),
            Err(GameError::NoLegalMove)
        ));
    }

    #[test]
    fn test_random_agent_name() {
        let agent = RandomAgent::new();
        assert_eq!(agent.name(), "Random");
    }
}
