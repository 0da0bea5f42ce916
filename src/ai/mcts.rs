use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::{require_moves, Player};
use crate::error::GameError;
use crate::game::{Board, Move, Outcome, Side};

/// Playouts per move when no budget is given.
pub const DEFAULT_PLAYOUTS: usize = 1000;

// ─── Search tree (arena-based) ───────────────────────────────────────────────

struct Node {
    board: Board,
    /// Move that produced this node; `None` at the root.
    mv: Option<Move>,
    /// Side that made `mv`. Scores are kept from this side's perspective.
    mover: Option<Side>,
    outcome: Outcome,
    children: Vec<usize>,
    untried: Vec<Move>,
    visits: u32,
    score: f64,
}

impl Node {
    fn root(board: Board, legal_moves: &[Move]) -> Self {
        let outcome = board.terminal_status();
        Node {
            board,
            mv: None,
            mover: None,
            outcome,
            children: Vec::new(),
            untried: legal_moves.to_vec(),
            visits: 0,
            score: 0.0,
        }
    }

    fn child(board: Board, mv: Move, mover: Side) -> Self {
        let outcome = settle(&board, mv, mover);
        let untried = if outcome.is_terminal() {
            Vec::new()
        } else {
            board.legal_moves()
        };
        Node {
            board,
            mv: Some(mv),
            mover: Some(mover),
            outcome,
            children: Vec::new(),
            untried,
            visits: 0,
            score: 0.0,
        }
    }

    fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.score / self.visits as f64
        }
    }
}

/// Outcome right after `side` played `mv` on `board`.
fn settle(board: &Board, mv: Move, side: Side) -> Outcome {
    if board.rules().completes_line(board, mv, side) {
        Outcome::won_by(side)
    } else if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}

/// Playout result for `side`: 1 for a win, 0.5 for a draw, 0 for a loss.
fn reward(outcome: Outcome, side: Side) -> f64 {
    match outcome.winner() {
        Some(w) if w == side => 1.0,
        Some(_) => 0.0,
        None => 0.5,
    }
}

/// Monte Carlo tree search with UCB1 selection and random playouts.
///
/// Each playout descends the tree by UCB1 while nodes are fully expanded,
/// adds one new node, finishes the game with uniformly random moves and
/// backs the result up the visited path. The move played is the root child
/// with the most visits.
pub struct MctsAgent {
    playouts: usize,
    exploration: f64,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl MctsAgent {
    pub fn new(playouts: usize) -> Self {
        Self::with_rng(playouts, StdRng::from_os_rng())
    }

    pub fn seeded(playouts: usize, seed: u64) -> Self {
        Self::with_rng(playouts, StdRng::seed_from_u64(seed))
    }

    fn with_rng(playouts: usize, rng: StdRng) -> Self {
        MctsAgent {
            playouts: playouts.max(1),
            exploration: std::f64::consts::SQRT_2,
            rng,
            nodes: Vec::new(),
        }
    }

    /// UCB1 exploration constant, √2 by default.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Child of `parent` with the highest UCB1 score.
    fn select_child(&self, parent: usize) -> usize {
        let node = &self.nodes[parent];
        let log_visits = (node.visits.max(1) as f64).ln();
        let mut best = node.children[0];
        let mut best_score = f64::NEG_INFINITY;
        for &ci in &node.children {
            let child = &self.nodes[ci];
            let score = if child.visits == 0 {
                f64::INFINITY
            } else {
                child.mean() + self.exploration * (log_visits / child.visits as f64).sqrt()
            };
            if score > best_score {
                best_score = score;
                best = ci;
            }
        }
        best
    }

    /// Add a child of `parent` for a random untried move.
    fn expand(&mut self, parent: usize) -> Result<usize, GameError> {
        let pick = self.rng.random_range(0..self.nodes[parent].untried.len());
        let mv = self.nodes[parent].untried.swap_remove(pick);
        let side = self.nodes[parent].board.side_to_move();
        let mut board = self.nodes[parent].board.clone();
        board.play(mv, side)?;

        let idx = self.nodes.len();
        self.nodes.push(Node::child(board, mv, side));
        self.nodes[parent].children.push(idx);
        Ok(idx)
    }

    /// Finish the game from `board` with uniformly random moves.
    fn rollout(&mut self, mut board: Board) -> Result<Outcome, GameError> {
        loop {
            let side = board.side_to_move();
            let legal = board.legal_moves();
            let mv = legal[self.rng.random_range(0..legal.len())];
            board.play(mv, side)?;
            let outcome = settle(&board, mv, side);
            if outcome.is_terminal() {
                return Ok(outcome);
            }
        }
    }

    fn backup(&mut self, path: &[usize], outcome: Outcome) {
        for &idx in path {
            let node = &mut self.nodes[idx];
            node.visits += 1;
            if let Some(mover) = node.mover {
                node.score += reward(outcome, mover);
            }
        }
    }

    fn playout(&mut self) -> Result<(), GameError> {
        let mut path = vec![0];
        let mut current = 0;

        while self.nodes[current].untried.is_empty() && !self.nodes[current].children.is_empty() {
            current = self.select_child(current);
            path.push(current);
        }

        if !self.nodes[current].untried.is_empty() {
            current = self.expand(current)?;
            path.push(current);
        }

        let node = &self.nodes[current];
        let outcome = if node.outcome.is_terminal() {
            node.outcome
        } else {
            let board = node.board.clone();
            self.rollout(board)?
        };
        self.backup(&path, outcome);
        Ok(())
    }

    fn search(&mut self, board: &Board, legal_moves: &[Move]) -> Result<Move, GameError> {
        self.nodes.clear();
        self.nodes.push(Node::root(board.clone(), legal_moves));

        for _ in 0..self.playouts {
            self.playout()?;
        }

        let root = &self.nodes[0];
        let best = root
            .children
            .iter()
            .map(|&ci| &self.nodes[ci])
            .fold(None::<&Node>, |best, child| match best {
                Some(b) if (b.visits, b.mean()) >= (child.visits, child.mean()) => Some(b),
                _ => Some(child),
            });

        tracing::trace!(
            playouts = root.visits,
            nodes = self.nodes.len(),
            "mcts search finished"
        );
        Ok(best.and_then(|n| n.mv).unwrap_or(legal_moves[0]))
    }
}

impl Player for MctsAgent {
    fn choose_move(&mut self, board: &Board, legal_moves: &[Move]) -> Result<Move, GameError> {
        require_moves(legal_moves)?;
        if legal_moves.len() == 1 || board.terminal_status().is_terminal() {
            return Ok(legal_moves[0]);
        }
        self.search(board, legal_moves)
    }

    fn name(&self) -> &str {
        "MCTS"
    }
}
