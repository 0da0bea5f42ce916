use crate::error::GameError;
use crate::game::{Board, Cell, Move, Side};

use super::agent::{require_moves, Player};

/// Score for a win found at the root; wins further away score less.
const WIN_SCORE: f64 = 1_000_000.0;

/// Horizon evaluation that scans all k-cell windows and scores threats.
pub struct WindowHeuristic;

impl WindowHeuristic {
    fn score_window(k: usize, own: usize, opp: usize, empty: usize) -> f64 {
        if own == k - 1 && empty == 1 {
            50.0
        } else if k > 2 && own == k - 2 && empty == 2 {
            10.0
        } else if opp == k - 1 && empty == 1 {
            -80.0
        } else if k > 2 && opp == k - 2 && empty == 2 {
            -10.0
        } else {
            0.0
        }
    }

    /// Score of a non-terminal board from `side`'s perspective.
    pub fn evaluate(&self, board: &Board, side: Side) -> f64 {
        let own_cell = side.to_cell();
        let opp_cell = side.other().to_cell();
        let (rows, cols, k) = (board.rows(), board.cols(), board.rules().k());
        let mut score = 0.0;

        // Center bonus
        let center = board.get(rows / 2, cols / 2);
        if center == own_cell {
            score += 3.0;
        } else if center == opp_cell {
            score -= 3.0;
        }

        if k < 2 {
            return score;
        }

        for &(dr, dc) in &[(0isize, 1isize), (1, 0), (1, 1), (1, -1)] {
            for row in 0..rows {
                for col in 0..cols {
                    let end_r = row as isize + dr * (k as isize - 1);
                    let end_c = col as isize + dc * (k as isize - 1);
                    if end_r < 0 || end_r >= rows as isize || end_c < 0 || end_c >= cols as isize {
                        continue;
                    }
                    let mut own = 0;
                    let mut opp = 0;
                    let mut empty = 0;
                    for i in 0..k as isize {
                        let r = (row as isize + dr * i) as usize;
                        let c = (col as isize + dc * i) as usize;
                        match board.get(r, c) {
                            Cell::Empty => empty += 1,
                            cell if cell == own_cell => own += 1,
                            _ => opp += 1,
                        }
                    }
                    score += Self::score_window(k, own, opp, empty);
                }
            }
        }

        score
    }
}

/// Negamax agent with alpha-beta pruning.
///
/// With a depth of at least the number of empty cells the search is exact
/// and the agent plays perfectly; shallower searches fall back to the
/// heuristic at the horizon. Equal scores keep the first move in row-major
/// order.
pub struct NegamaxAgent {
    depth: usize,
    heuristic: WindowHeuristic,
}

impl NegamaxAgent {
    pub fn new(depth: usize) -> Self {
        NegamaxAgent {
            depth: depth.max(1),
            heuristic: WindowHeuristic,
        }
    }

    /// Unlimited depth: exhaustive search.
    pub fn perfect() -> Self {
        Self::new(usize::MAX)
    }

    fn best_move(&self, board: &Board, legal_moves: &[Move]) -> Move {
        let side = board.side_to_move();
        let mut best_move = legal_moves[0];
        let mut best_score = f64::NEG_INFINITY;

        for &mv in legal_moves {
            // Full window per root child keeps root scores exact for ties.
            let score = -self.search_child(board, mv, side, self.depth - 1, 1, f64::NEG_INFINITY, f64::INFINITY);
            if score > best_score {
                best_score = score;
                best_move = mv;
            }
        }

        best_move
    }

    /// Score of the position after `side` plays `mv`, from the perspective
    /// of the side to move in that position.
    #[allow(clippy::too_many_arguments)]
    fn search_child(
        &self,
        board: &Board,
        mv: Move,
        side: Side,
        depth: usize,
        ply: usize,
        alpha: f64,
        beta: f64,
    ) -> f64 {
        let mut child = board.clone();
        if child.play(mv, side).is_err() {
            return f64::NEG_INFINITY;
        }

        if child.rules().completes_line(&child, mv, side) {
            // The side that just moved won; a loss for the side to move.
            return -(WIN_SCORE - ply as f64);
        }
        if child.is_full() {
            return 0.0;
        }

        self.negamax(&child, depth, ply, alpha, beta)
    }

    fn negamax(&self, board: &Board, depth: usize, ply: usize, mut alpha: f64, beta: f64) -> f64 {
        let side = board.side_to_move();
        if depth == 0 {
            return self.heuristic.evaluate(board, side);
        }

        let mut best = f64::NEG_INFINITY;
        for mv in board.legal_moves() {
            let score = -self.search_child(board, mv, side, depth - 1, ply + 1, -beta, -alpha);
            if score > best {
                best = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        best
    }
}

impl Player for NegamaxAgent {
    fn choose_move(&mut self, board: &Board, legal_moves: &[Move]) -> Result<Move, GameError> {
        require_moves(legal_moves)?;
        Ok(self.best_move(board, legal_moves))
    }

    fn name(&self) -> &str {
        "Negamax"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RandomAgent;
    use crate::game::{Outcome, RuleSet};

    fn ttt(text: &str) -> Board {
        Board::parse(RuleSet::tic_tac_toe(), text).unwrap()
    }

    fn choose(agent: &mut NegamaxAgent, board: &Board) -> Move {
        let legal = board.legal_moves();
        agent.choose_move(board, &legal).unwrap()
    }

    fn play_out(a: &mut dyn Player, b: &mut dyn Player, rules: RuleSet) -> Outcome {
        let mut board = Board::new(rules);
        loop {
            let side = board.side_to_move();
            let legal = board.legal_moves();
            let mv = match side {
                Side::A => a.choose_move(&board, &legal).unwrap(),
                Side::B => b.choose_move(&board, &legal).unwrap(),
            };
            board.play(mv, side).unwrap();
            let outcome = board.terminal_status();
            if outcome.is_terminal() {
                return outcome;
            }
        }
    }

    // --- Heuristic tests ---

    #[test]
    fn heuristic_empty_board_is_zero() {
        let board = Board::new(RuleSet::tic_tac_toe());
        let h = WindowHeuristic;
        assert_eq!(h.evaluate(&board, Side::A), 0.0);
        assert_eq!(h.evaluate(&board, Side::B), 0.0);
    }

    #[test]
    fn heuristic_open_two_scores_high() {
        let h = WindowHeuristic;
        let board = Board::parse(RuleSet::new(1, 5, 3).unwrap(), "XX.O.").unwrap();
        let own = h.evaluate(&board, Side::A);
        let opp = h.evaluate(&board, Side::B);
        assert!(own > 30.0, "open two should score high, got {own}");
        assert!(opp < -50.0, "facing an open two should score low, got {opp}");
    }

    #[test]
    fn heuristic_center_preference() {
        let h = WindowHeuristic;
        let center = ttt(".../.X./...");
        let corner = ttt("X../.../...");
        assert!(h.evaluate(&center, Side::A) > h.evaluate(&corner, Side::A));
    }

    // --- Algorithm tests ---

    #[test]
    fn takes_winning_move() {
        let mut agent = NegamaxAgent::perfect();
        assert_eq!(choose(&mut agent, &ttt("XX./OO./...")), Move::new(0, 2));
    }

    #[test]
    fn blocks_opponent_win() {
        let mut agent = NegamaxAgent::perfect();
        // O to move; X threatens (2, 2)
        assert_eq!(choose(&mut agent, &ttt("X../.X./O..")), Move::new(2, 2));
    }

    #[test]
    fn prefers_win_over_block() {
        let mut agent = NegamaxAgent::perfect();
        assert_eq!(choose(&mut agent, &ttt("XX./OO./X..")), Move::new(1, 2));
    }

    #[test]
    fn depth_limited_search_returns_legal_move() {
        let rules = RuleSet::new(4, 4, 3).unwrap();
        let board = Board::new(rules);
        let mut agent = NegamaxAgent::new(2);
        let mv = choose(&mut agent, &board);
        assert!(board.legal_moves().contains(&mv));
    }

    // --- Integration tests ---

    #[test]
    fn perfect_self_play_is_a_draw() {
        let mut a = NegamaxAgent::perfect();
        let mut b = NegamaxAgent::perfect();
        assert_eq!(play_out(&mut a, &mut b, RuleSet::tic_tac_toe()), Outcome::Draw);
    }

    #[test]
    fn never_loses_to_random() {
        for seed in 0..5 {
            let mut negamax = NegamaxAgent::perfect();
            let mut random = RandomAgent::seeded(seed);
            let outcome = play_out(&mut negamax, &mut random, RuleSet::tic_tac_toe());
            assert_ne!(outcome, Outcome::BWins, "lost as X with seed {seed}");

            let mut negamax = NegamaxAgent::perfect();
            let mut random = RandomAgent::seeded(seed);
            let outcome = play_out(&mut random, &mut negamax, RuleSet::tic_tac_toe());
            assert_ne!(outcome, Outcome::AWins, "lost as O with seed {seed}");
        }
    }

    // --- Player trait tests ---

    #[test]
    fn name_is_negamax() {
        let agent = NegamaxAgent::new(7);
        assert_eq!(agent.name(), "Negamax");
    }
}
