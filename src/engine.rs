//! Turn-taking state machine that runs one game between two players.
//!
//! The engine owns the board for the duration of an episode, asks the
//! player on move for a choice, applies it through the rules and records
//! every step. An illegal move aborts the episode with the error.

use crate::ai::Player;
use crate::error::GameError;
use crate::game::{Board, Move, Outcome, RuleSet, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Setup,
    AwaitingMove(Side),
    Terminal(Outcome),
}

/// One applied move and the board it was played on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeStep {
    pub board: Board,
    pub mv: Move,
    pub side: Side,
}

/// Ordered trace of a finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRecord {
    steps: Vec<EpisodeStep>,
    final_board: Board,
}

impl EpisodeRecord {
    pub fn steps(&self) -> &[EpisodeStep] {
        &self.steps
    }

    pub fn final_board(&self) -> &Board {
        &self.final_board
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Board right after step `i` was applied.
    pub fn board_after(&self, i: usize) -> &Board {
        match self.steps.get(i + 1) {
            Some(next) => &next.board,
            None => &self.final_board,
        }
    }

    /// Boards produced by `side`'s moves, in play order.
    pub fn afterstates(&self, side: Side) -> impl DoubleEndedIterator<Item = &Board> + '_ {
        self.steps
            .iter()
            .enumerate()
            .filter(move |(_, step)| step.side == side)
            .map(move |(i, _)| self.board_after(i))
    }
}

/// Callback run after every applied move.
pub type MoveObserver = Box<dyn FnMut(&Board, Move, Side)>;

enum Seats<'a> {
    Pair(&'a mut dyn Player, &'a mut dyn Player),
    Both(&'a mut dyn Player),
}

impl Seats<'_> {
    fn player(&mut self, side: Side) -> &mut dyn Player {
        match (self, side) {
            (Seats::Pair(a, _), Side::A) => &mut **a,
            (Seats::Pair(_, b), Side::B) => &mut **b,
            (Seats::Both(p), _) => &mut **p,
        }
    }
}

pub struct GameEngine {
    rules: RuleSet,
    state: EngineState,
    observer: Option<MoveObserver>,
}

impl GameEngine {
    pub fn new(rules: RuleSet) -> Self {
        GameEngine {
            rules,
            state: EngineState::Setup,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl FnMut(&Board, Move, Side) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    /// Where the last episode stopped. An aborted episode leaves the state at
    /// the turn that failed.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Play one game, `player_a` moving first.
    pub fn run_episode(
        &mut self,
        player_a: &mut dyn Player,
        player_b: &mut dyn Player,
    ) -> Result<(Outcome, EpisodeRecord), GameError> {
        player_a.begin_episode(&[Side::A]);
        player_b.begin_episode(&[Side::B]);
        self.drive(Seats::Pair(player_a, player_b), Board::new(self.rules))
    }

    /// Play one game continuing from `start`. The side to move follows
    /// from the number of marks already on the board; a finished board
    /// returns its outcome with an empty record.
    pub fn run_episode_from(
        &mut self,
        start: Board,
        player_a: &mut dyn Player,
        player_b: &mut dyn Player,
    ) -> Result<(Outcome, EpisodeRecord), GameError> {
        if *start.rules() != self.rules {
            return Err(GameError::InvalidBoard(format!(
                "start board is {}, engine plays {}",
                start.rules().label(),
                self.rules.label()
            )));
        }
        player_a.begin_episode(&[Side::A]);
        player_b.begin_episode(&[Side::B]);
        self.drive(Seats::Pair(player_a, player_b), start)
    }

    /// Play one game with the same player on both sides.
    pub fn run_self_play(
        &mut self,
        player: &mut dyn Player,
    ) -> Result<(Outcome, EpisodeRecord), GameError> {
        player.begin_episode(&Side::BOTH);
        self.drive(Seats::Both(player), Board::new(self.rules))
    }

    fn drive(
        &mut self,
        mut seats: Seats<'_>,
        mut board: Board,
    ) -> Result<(Outcome, EpisodeRecord), GameError> {
        self.state = EngineState::Setup;
        let mut steps = Vec::with_capacity(self.rules.rows() * self.rules.cols());
        let mut side = board.side_to_move();
        let mut outcome = board.terminal_status();

        while !outcome.is_terminal() {
            self.state = EngineState::AwaitingMove(side);
            let legal = board.legal_moves();
            let mv = seats.player(side).choose_move(&board, &legal)?;

            let before = board.clone();
            board.play(mv, side)?;
            tracing::debug!(side = side.name(), %mv, ply = steps.len() + 1, "move");
            if let Some(observer) = self.observer.as_mut() {
                observer(&board, mv, side);
            }
            steps.push(EpisodeStep { board: before, mv, side });

            outcome = board.terminal_status();
            side = side.other();
        }

        tracing::debug!(%outcome, moves = steps.len(), "episode finished");
        self.state = EngineState::Terminal(outcome);
        Ok((outcome, EpisodeRecord { steps, final_board: board }))
    }
}
