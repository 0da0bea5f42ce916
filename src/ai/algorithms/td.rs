use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ai::agent::{require_moves, Player};
use crate::ai::value_table::ValueTable;
use crate::engine::EpisodeRecord;
use crate::error::{ConfigError, GameError};
use crate::game::{canonicalize, Board, Move, Outcome, RuleSet, Side};

/// TD(0) hyperparameters and value-scale constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RlConfig {
    /// Step size α.
    pub learning_rate: f64,
    /// Exploration rate at the start of training.
    pub epsilon: f64,
    pub epsilon_end: f64,
    /// Episodes over which ε moves linearly to `epsilon_end`; 0 keeps it fixed.
    pub epsilon_decay_episodes: usize,
    pub initial_value: f64,
    pub win_value: f64,
    pub draw_value: f64,
    pub loss_value: f64,
    pub seed: Option<u64>,
}

impl Default for RlConfig {
    fn default() -> Self {
        RlConfig {
            learning_rate: 0.25,
            epsilon: 0.1,
            epsilon_end: 0.1,
            epsilon_decay_episodes: 0,
            initial_value: 0.5,
            win_value: 1.0,
            draw_value: 0.5,
            loss_value: 0.0,
            seed: None,
        }
    }
}

impl RlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        for (name, value) in [("epsilon", self.epsilon), ("epsilon_end", self.epsilon_end)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        for (name, value) in [
            ("initial_value", self.initial_value),
            ("win_value", self.win_value),
            ("draw_value", self.draw_value),
            ("loss_value", self.loss_value),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if !(self.loss_value <= self.draw_value && self.draw_value <= self.win_value)
            || self.loss_value == self.win_value
        {
            return Err(ConfigError::Validation(format!(
                "value scale must satisfy loss < win and loss <= draw <= win, got {}/{}/{}",
                self.loss_value, self.draw_value, self.win_value
            )));
        }
        Ok(())
    }

    /// Value of a finished game for `side`. `None` while in progress.
    pub fn outcome_value(&self, outcome: Outcome, side: Side) -> Option<f64> {
        match outcome {
            Outcome::InProgress => None,
            Outcome::Draw => Some(self.draw_value),
            _ if outcome.winner() == Some(side) => Some(self.win_value),
            _ => Some(self.loss_value),
        }
    }
}

/// Statistics from one [`RlAgent::update`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateMetrics {
    pub states_updated: usize,
    pub mean_td_error: f64,
}

/// Tabular TD(0) learner over afterstates.
///
/// A board's value is from the perspective of the side that made the last
/// move on it, so one table serves both sides. Terminal positions are
/// pinned at their outcome value the first time a sweep reaches them.
pub struct RlAgent {
    config: RlConfig,
    rules: RuleSet,
    table: ValueTable,
    epsilon: f64,
    sides: Vec<Side>,
    episode_count: usize,
    rng: StdRng,
}

impl RlAgent {
    pub fn new(config: RlConfig, rules: RuleSet) -> Self {
        Self::with_table(config, rules, ValueTable::new())
    }

    /// Start from a previously learned table. Terminal keys are pinned again
    /// at the configured outcome values.
    pub fn with_table(config: RlConfig, rules: RuleSet, mut table: ValueTable) -> Self {
        let terminal: Vec<_> = table
            .keys()
            .filter_map(|key| {
                let board = match key.to_board(rules) {
                    Ok(board) => board,
                    Err(e) => {
                        tracing::warn!(%key, error = %e, "skipping undecodable key");
                        return None;
                    }
                };
                let mover = key.last_mover()?;
                let value = config.outcome_value(board.terminal_status(), mover)?;
                Some((key.clone(), value))
            })
            .collect();
        for (key, value) in terminal {
            table.pin(key, value);
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        RlAgent {
            epsilon: config.epsilon,
            config,
            rules,
            table,
            sides: Vec::new(),
            episode_count: 0,
            rng,
        }
    }

    pub fn config(&self) -> &RlConfig {
        &self.config
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn into_table(self) -> ValueTable {
        self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Continue a run that stopped after `episode` updates: the episode
    /// counter and the ε schedule pick up where they left off.
    pub fn resume_from(&mut self, episode: usize) {
        self.episode_count = episode;
        self.epsilon = self.config.epsilon;
        self.decay_epsilon();
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    /// Greedy play for evaluation. Returns the ε to hand back to
    /// [`RlAgent::exit_eval_mode`].
    pub fn enter_eval_mode(&mut self) -> f64 {
        std::mem::replace(&mut self.epsilon, 0.0)
    }

    pub fn exit_eval_mode(&mut self, eps: f64) {
        self.epsilon = eps;
    }

    /// Value of `board` for the side that made its last move.
    pub fn value_of(&self, board: &Board) -> f64 {
        let Some(mover) = board.last_mover() else {
            return self.config.initial_value;
        };
        if let Some(v) = self.config.outcome_value(board.terminal_status(), mover) {
            return v;
        }
        self.table
            .get(&canonicalize(board))
            .unwrap_or(self.config.initial_value)
    }

    fn greedy_move(&self, board: &Board, legal_moves: &[Move]) -> Result<Move, GameError> {
        let side = board.side_to_move();
        let mut best_move = legal_moves[0];
        let mut best_value = f64::NEG_INFINITY;
        for &mv in legal_moves {
            let mut after = board.clone();
            after.play(mv, side)?;
            let value = self.value_of(&after);
            if value > best_value {
                best_value = value;
                best_move = mv;
            }
        }
        Ok(best_move)
    }

    /// Backward TD(0) sweep over the afterstates of every side this agent
    /// played in the episode, then advance the ε schedule.
    pub fn update(&mut self, record: &EpisodeRecord, outcome: Outcome) -> UpdateMetrics {
        let mut metrics = UpdateMetrics::default();
        let mut error_sum = 0.0;

        if self.sides.is_empty() {
            tracing::warn!("update called before begin_episode; nothing to learn");
        }

        let sides = self.sides.clone();
        for side in sides {
            let Some(mut target) = self.config.outcome_value(outcome, side) else {
                tracing::warn!(%outcome, "update called on an unfinished episode");
                break;
            };
            for after in record.afterstates(side).rev() {
                let key = canonicalize(after);
                if let Some(v) = self.config.outcome_value(after.terminal_status(), side) {
                    target = self.table.pin(key, v);
                    continue;
                }
                let current = self.table.get(&key).unwrap_or(self.config.initial_value);
                let td_error = target - current;
                let updated = current + self.config.learning_rate * td_error;
                self.table.set(key, updated);
                error_sum += td_error.abs();
                metrics.states_updated += 1;
                target = updated;
            }
        }

        if metrics.states_updated > 0 {
            metrics.mean_td_error = error_sum / metrics.states_updated as f64;
        }
        self.episode_count += 1;
        self.decay_epsilon();
        metrics
    }

    /// Linear schedule from `epsilon` to `epsilon_end`.
    fn decay_epsilon(&mut self) {
        let decay = self.config.epsilon_decay_episodes;
        if decay == 0 {
            return;
        }
        let progress = (self.episode_count as f64 / decay as f64).min(1.0);
        self.epsilon =
            self.config.epsilon + (self.config.epsilon_end - self.config.epsilon) * progress;
    }
}

impl Player for RlAgent {
    fn choose_move(&mut self, board: &Board, legal_moves: &[Move]) -> Result<Move, GameError> {
        require_moves(legal_moves)?;
        if self.epsilon > 0.0 && self.rng.random::<f64>() < self.epsilon {
            let idx = self.rng.random_range(0..legal_moves.len());
            return Ok(legal_moves[idx]);
        }
        self.greedy_move(board, legal_moves)
    }

    fn name(&self) -> &str {
        "RL"
    }

    fn begin_episode(&mut self, sides: &[Side]) {
        self.sides.clear();
        self.sides.extend_from_slice(sides);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{RandomAgent, ScriptedAgent};
    use crate::engine::GameEngine;

    fn config() -> RlConfig {
        RlConfig {
            seed: Some(7),
            ..RlConfig::default()
        }
    }

    fn ttt(text: &str) -> Board {
        Board::parse(RuleSet::tic_tac_toe(), text).unwrap()
    }

    #[test]
    fn test_default_config_validates() {
        assert!(RlConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_hyperparameters() {
        let bad = RlConfig { learning_rate: 0.0, ..RlConfig::default() };
        assert!(bad.validate().is_err());
        let bad = RlConfig { epsilon: 1.5, ..RlConfig::default() };
        assert!(bad.validate().is_err());
        let bad = RlConfig { draw_value: 2.0, ..RlConfig::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_value_scale() {
        let bad = RlConfig { win_value: f64::INFINITY, ..RlConfig::default() };
        assert!(bad.validate().is_err());
        let bad = RlConfig { loss_value: f64::NEG_INFINITY, ..RlConfig::default() };
        assert!(bad.validate().is_err());
        let bad = RlConfig { draw_value: f64::NAN, ..RlConfig::default() };
        assert!(bad.validate().is_err());
        let bad = RlConfig { initial_value: f64::INFINITY, ..RlConfig::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_outcome_values_follow_perspective() {
        let c = RlConfig::default();
        assert_eq!(c.outcome_value(Outcome::AWins, Side::A), Some(1.0));
        assert_eq!(c.outcome_value(Outcome::AWins, Side::B), Some(0.0));
        assert_eq!(c.outcome_value(Outcome::Draw, Side::B), Some(0.5));
        assert_eq!(c.outcome_value(Outcome::InProgress, Side::A), None);
    }

    #[test]
    fn test_value_of_unseen_and_terminal_boards() {
        let agent = RlAgent::new(config(), RuleSet::tic_tac_toe());
        assert_eq!(agent.value_of(&Board::new(RuleSet::tic_tac_toe())), 0.5);
        assert_eq!(agent.value_of(&ttt("X../.../...")), 0.5);
        // X just completed the top row
        assert_eq!(agent.value_of(&ttt("XXX/OO./...")), 1.0);
    }

    #[test]
    fn test_greedy_takes_immediate_win() {
        let mut agent = RlAgent::new(config(), RuleSet::tic_tac_toe());
        agent.enter_eval_mode();
        let board = ttt("XX./OO./...");
        let legal = board.legal_moves();
        assert_eq!(agent.choose_move(&board, &legal).unwrap(), Move::new(0, 2));
    }

    #[test]
    fn test_greedy_ties_break_row_major() {
        let mut agent = RlAgent::new(config(), RuleSet::tic_tac_toe());
        agent.enter_eval_mode();
        let board = Board::new(RuleSet::tic_tac_toe());
        let legal = board.legal_moves();
        assert_eq!(agent.choose_move(&board, &legal).unwrap(), Move::new(0, 0));
    }

    #[test]
    fn test_greedy_prefers_learned_value() {
        let mut agent = RlAgent::new(config(), RuleSet::tic_tac_toe());
        agent.table.set(canonicalize(&ttt(".../.X./...")), 0.9);
        agent.enter_eval_mode();
        let board = Board::new(RuleSet::tic_tac_toe());
        let legal = board.legal_moves();
        assert_eq!(agent.choose_move(&board, &legal).unwrap(), Move::new(1, 1));
    }

    #[test]
    fn test_eval_mode_restores_epsilon() {
        let mut agent = RlAgent::new(config(), RuleSet::tic_tac_toe());
        let saved = agent.enter_eval_mode();
        assert_eq!(agent.epsilon(), 0.0);
        agent.exit_eval_mode(saved);
        assert_eq!(agent.epsilon(), 0.1);
    }

    #[test]
    fn test_update_backs_up_win() {
        let rules = RuleSet::tic_tac_toe();
        let mut engine = GameEngine::new(rules);
        let mut agent = RlAgent::new(config(), rules);
        // X takes the diagonal, O never blocks
        let mut x = ScriptedAgent::from_pairs(&[(0, 0), (1, 1), (2, 2)]);
        let mut o = ScriptedAgent::from_pairs(&[(0, 1), (0, 2)]);

        agent.begin_episode(&[Side::A]);
        let (outcome, record) = engine.run_episode(&mut x, &mut o).unwrap();
        assert_eq!(outcome, Outcome::AWins);

        let metrics = agent.update(&record, outcome);
        assert_eq!(metrics.states_updated, 2);

        let final_key = canonicalize(record.final_board());
        assert!(agent.table().is_pinned(&final_key));
        assert_eq!(agent.table().get(&final_key), Some(1.0));

        // X's second afterstate moves a quarter of the way to 1.0
        let second = canonicalize(&ttt("XO./.X./..."));
        assert_eq!(agent.table().get(&second), Some(0.625));
        // First afterstate moves toward the freshly updated second value
        let first = canonicalize(&ttt("X../.../..."));
        assert_eq!(agent.table().get(&first), Some(0.5 + 0.25 * (0.625 - 0.5)));
    }

    #[test]
    fn test_update_learns_loss_for_losing_side() {
        let rules = RuleSet::tic_tac_toe();
        let mut engine = GameEngine::new(rules);
        let mut agent = RlAgent::new(config(), rules);
        let mut x = ScriptedAgent::from_pairs(&[(0, 0), (1, 1), (2, 2)]);
        let mut o = ScriptedAgent::from_pairs(&[(0, 1), (0, 2)]);

        let (outcome, record) = engine.run_episode(&mut x, &mut o).unwrap();
        agent.begin_episode(&[Side::B]);
        let metrics = agent.update(&record, outcome);
        assert_eq!(metrics.states_updated, 2);

        let last_o = canonicalize(&ttt("XOO/.X./..."));
        assert_eq!(agent.table().get(&last_o), Some(0.5 + 0.25 * (0.0 - 0.5)));
        assert!(!agent.table().is_pinned(&last_o));
    }

    #[test]
    fn test_update_never_changes_pinned_values() {
        let rules = RuleSet::tic_tac_toe();
        let mut engine = GameEngine::new(rules);
        let mut agent = RlAgent::new(RlConfig { epsilon: 1.0, epsilon_end: 1.0, ..config() }, rules);

        let mut pinned: Vec<(crate::game::CanonicalKey, f64)> = Vec::new();
        for _ in 0..200 {
            let (outcome, record) = engine.run_self_play(&mut agent).unwrap();
            agent.update(&record, outcome);
            for (key, value) in &pinned {
                assert_eq!(agent.table().get(key), Some(*value), "pinned {key} changed");
            }
            pinned = agent
                .table()
                .iter()
                .filter(|(k, _)| agent.table().is_pinned(k))
                .map(|(k, v)| (k.clone(), v))
                .collect();
        }
        assert!(!pinned.is_empty());
    }

    #[test]
    fn test_epsilon_decays_linearly() {
        let rules = RuleSet::tic_tac_toe();
        let cfg = RlConfig {
            epsilon: 0.5,
            epsilon_end: 0.1,
            epsilon_decay_episodes: 4,
            ..config()
        };
        let mut agent = RlAgent::new(cfg, rules);
        let mut engine = GameEngine::new(rules);
        let mut random = RandomAgent::seeded(1);
        let mut seen = Vec::new();
        for _ in 0..6 {
            let (outcome, record) = engine.run_episode(&mut agent, &mut random).unwrap();
            agent.update(&record, outcome);
            seen.push(agent.epsilon());
        }
        let expected = [0.4, 0.3, 0.2, 0.1, 0.1, 0.1];
        for (got, want) in seen.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_resume_from_continues_epsilon_schedule() {
        let rules = RuleSet::tic_tac_toe();
        let cfg = RlConfig {
            epsilon: 0.5,
            epsilon_end: 0.1,
            epsilon_decay_episodes: 4,
            ..config()
        };
        let mut agent = RlAgent::new(cfg, rules);
        agent.resume_from(2);
        assert_eq!(agent.episode_count(), 2);
        assert!((agent.epsilon() - 0.3).abs() < 1e-12);

        agent.resume_from(10);
        assert!((agent.epsilon() - 0.1).abs() < 1e-12);

        let mut fixed = RlAgent::new(RlConfig { epsilon: 0.2, ..config() }, rules);
        fixed.resume_from(50);
        assert_eq!(fixed.episode_count(), 50);
        assert_eq!(fixed.epsilon(), 0.2);
    }

    #[test]
    fn test_loaded_table_repins_terminal_keys() {
        let rules = RuleSet::tic_tac_toe();
        let mut table = ValueTable::new();
        let win = canonicalize(&ttt("XXX/OO./..."));
        let open = canonicalize(&ttt("X../.../..."));
        table.set(win.clone(), 1.0);
        table.set(open.clone(), 0.7);

        let agent = RlAgent::with_table(config(), rules, table);
        assert!(agent.table().is_pinned(&win));
        assert!(!agent.table().is_pinned(&open));
        assert_eq!(agent.table().get(&open), Some(0.7));
    }

    #[test]
    fn test_self_play_learns_to_beat_random() {
        let rules = RuleSet::tic_tac_toe();
        let mut agent = RlAgent::new(config(), rules);
        let mut engine = GameEngine::new(rules);
        for _ in 0..5000 {
            let (outcome, record) = engine.run_self_play(&mut agent).unwrap();
            agent.update(&record, outcome);
        }

        agent.enter_eval_mode();
        let mut random = RandomAgent::seeded(99);
        let mut not_lost = 0;
        for _ in 0..100 {
            let (outcome, _) = engine.run_episode(&mut agent, &mut random).unwrap();
            if outcome != Outcome::BWins {
                not_lost += 1;
            }
        }
        assert!(not_lost >= 80, "only {not_lost}/100 games not lost");
    }
}
