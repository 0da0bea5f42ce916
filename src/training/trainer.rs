use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ai::mcts::DEFAULT_PLAYOUTS;
use crate::ai::{HeuristicAgent, MctsAgent, NegamaxAgent, Player, RandomAgent, RlAgent};
use crate::checkpoint::{save_table, CheckpointMetadata, CheckpointStats};
use crate::engine::GameEngine;
use crate::error::{ConfigError, TrainingError};
use crate::game::{RuleSet, Side};
use crate::training::episode::{episode_seed, evaluate, EvalReport};
use crate::training::metrics::{EpisodeResult, TrainingMetrics};

/// Who the learner plays against during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentKind {
    /// The agent plays both sides and learns from both trajectories.
    #[serde(rename = "self")]
    SelfPlay,
    Random,
    Heuristic,
    Minimax,
    Mcts,
}

impl fmt::Display for OpponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpponentKind::SelfPlay => "self",
            OpponentKind::Random => "random",
            OpponentKind::Heuristic => "heuristic",
            OpponentKind::Minimax => "minimax",
            OpponentKind::Mcts => "mcts",
        })
    }
}

impl FromStr for OpponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "self" | "self-play" => Ok(OpponentKind::SelfPlay),
            "random" => Ok(OpponentKind::Random),
            "heuristic" => Ok(OpponentKind::Heuristic),
            "minimax" | "negamax" => Ok(OpponentKind::Minimax),
            "mcts" => Ok(OpponentKind::Mcts),
            other => Err(format!(
                "unknown opponent '{other}' (expected self, random, heuristic, minimax or mcts)"
            )),
        }
    }
}

/// Learner seat when training against a fixed opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentSide {
    A,
    B,
    Alternate,
}

impl AgentSide {
    /// Seat for the 1-based `episode`.
    pub fn for_episode(self, episode: usize) -> Side {
        match self {
            AgentSide::A => Side::A,
            AgentSide::B => Side::B,
            AgentSide::Alternate if episode % 2 == 1 => Side::A,
            AgentSide::Alternate => Side::B,
        }
    }
}

/// Trainer configuration. Intervals of 0 disable the corresponding step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub opponent: OpponentKind,
    pub agent_side: AgentSide,
    pub log_interval: usize,
    pub eval_interval: usize,
    pub eval_games: usize,
    pub checkpoint_interval: usize,
    pub table_path: Option<PathBuf>,
    /// Search depth for the minimax opponent; unset searches to the end.
    pub minimax_depth: Option<usize>,
    /// Playouts per move for the mcts opponent.
    pub mcts_playouts: usize,
    /// Base seed for opponent and evaluation randomness.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 20_000,
            opponent: OpponentKind::SelfPlay,
            agent_side: AgentSide::Alternate,
            log_interval: 1000,
            eval_interval: 5000,
            eval_games: 200,
            checkpoint_interval: 0,
            table_path: Some(PathBuf::from("value_table.json")),
            minimax_depth: None,
            mcts_playouts: DEFAULT_PLAYOUTS,
            seed: None,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_episodes == 0 {
            return Err(ConfigError::Validation("num_episodes must be > 0".into()));
        }
        if self.eval_interval > 0 && self.eval_games == 0 {
            return Err(ConfigError::Validation(
                "eval_games must be > 0 when eval_interval is set".into(),
            ));
        }
        if self.checkpoint_interval > 0 && self.table_path.is_none() {
            return Err(ConfigError::Validation(
                "checkpoint_interval requires table_path".into(),
            ));
        }
        if self.minimax_depth == Some(0) {
            return Err(ConfigError::Validation("minimax_depth must be > 0".into()));
        }
        if self.mcts_playouts == 0 {
            return Err(ConfigError::Validation("mcts_playouts must be > 0".into()));
        }
        Ok(())
    }
}

/// Final tallies of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub table_size: usize,
    pub final_eval: Option<EvalReport>,
}

fn due(interval: usize, episode: usize) -> bool {
    interval > 0 && episode % interval == 0
}

/// Runs episodes and feeds each one back into an [`RlAgent`].
pub struct Trainer {
    config: TrainerConfig,
    rules: RuleSet,
}

impl Trainer {
    pub fn new(config: TrainerConfig, rules: RuleSet) -> Self {
        Trainer { config, rules }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn build_opponent(&self) -> Option<Box<dyn Player>> {
        let seed = self.config.seed.map(|s| episode_seed(s, 0));
        match self.config.opponent {
            OpponentKind::SelfPlay => None,
            OpponentKind::Random => Some(Box::new(match seed {
                Some(s) => RandomAgent::seeded(s),
                None => RandomAgent::new(),
            })),
            OpponentKind::Heuristic => Some(Box::new(match seed {
                Some(s) => HeuristicAgent::seeded(s),
                None => HeuristicAgent::new(),
            })),
            OpponentKind::Minimax => Some(Box::new(match self.config.minimax_depth {
                Some(depth) => NegamaxAgent::new(depth),
                None => NegamaxAgent::perfect(),
            })),
            OpponentKind::Mcts => Some(Box::new(match seed {
                Some(s) => MctsAgent::seeded(self.config.mcts_playouts, s),
                None => MctsAgent::new(self.config.mcts_playouts),
            })),
        }
    }

    fn evaluate(&self, agent: &mut RlAgent, episode: usize) -> Result<EvalReport, TrainingError> {
        let seed = self.config.seed.map(|s| episode_seed(s, episode));
        Ok(evaluate(agent, self.rules, self.config.eval_games, seed)?)
    }

    fn save(
        &self,
        agent: &RlAgent,
        metrics: &TrainingMetrics,
        episode: usize,
        eval: Option<EvalReport>,
    ) -> Result<Option<PathBuf>, TrainingError> {
        let Some(path) = &self.config.table_path else {
            return Ok(None);
        };
        let window = self.config.log_interval.max(1);
        let stats = CheckpointStats {
            win_rate: metrics.win_rate(window),
            draw_rate: metrics.draw_rate(window),
            loss_rate: metrics.loss_rate(window),
            average_td_error: metrics.average_td_error(window),
            eval_win_rate: eval.map(|r| r.win_rate()),
        };
        let metadata = CheckpointMetadata::new(episode, self.rules, agent.config(), stats);
        save_table(path, &metadata, agent.table())?;
        Ok(Some(path.clone()))
    }

    /// Run the full training loop.
    pub fn train(&self, agent: &mut RlAgent) -> Result<TrainingSummary, TrainingError> {
        let mut metrics = TrainingMetrics::with_capacity(self.config.log_interval.max(100));
        let mut engine = GameEngine::new(self.rules);
        let mut opponent = self.build_opponent();
        let mut last_eval = None;

        let start_episode = agent.episode_count() + 1;
        let end_episode = agent.episode_count() + self.config.num_episodes;

        tracing::info!(
            episodes = self.config.num_episodes,
            opponent = %self.config.opponent,
            board = %self.rules.label(),
            "starting training"
        );

        for episode in start_episode..=end_episode {
            let (learner, (outcome, record)) = match opponent.as_deref_mut() {
                None => (Side::A, engine.run_self_play(agent)?),
                Some(opp) => {
                    let side = self.config.agent_side.for_episode(episode);
                    let played = match side {
                        Side::A => engine.run_episode(agent, opp)?,
                        Side::B => engine.run_episode(opp, agent)?,
                    };
                    (side, played)
                }
            };

            let update = agent.update(&record, outcome);
            metrics.record_update(update.mean_td_error);
            metrics.record_episode(EpisodeResult {
                winner: outcome.winner(),
                learner,
                game_length: record.len(),
            });

            if due(self.config.log_interval, episode) {
                let window = self.config.log_interval;
                tracing::info!(
                    episode,
                    epsilon = format_args!("{:.3}", agent.epsilon()),
                    td_error = format_args!("{:.4}", metrics.average_td_error(window)),
                    win = format_args!("{:.1}%", metrics.win_rate(window) * 100.0),
                    draw = format_args!("{:.1}%", metrics.draw_rate(window) * 100.0),
                    loss = format_args!("{:.1}%", metrics.loss_rate(window) * 100.0),
                    avg_len = format_args!("{:.2}", metrics.average_game_length(window)),
                    states = agent.table().len(),
                    "progress"
                );
            }

            if due(self.config.eval_interval, episode) {
                let report = self.evaluate(agent, episode)?;
                tracing::info!(
                    episode,
                    games = report.games,
                    win = format_args!("{:.1}%", report.win_rate() * 100.0),
                    non_loss = format_args!("{:.1}%", report.non_loss_rate() * 100.0),
                    "eval vs random"
                );
                last_eval = Some(report);
            }

            if due(self.config.checkpoint_interval, episode) {
                match self.save(agent, &metrics, episode, last_eval) {
                    Ok(Some(path)) => tracing::info!(path = %path.display(), episode, "checkpoint saved"),
                    Ok(None) => {}
                    Err(e) => tracing::error!(error = %e, episode, "checkpoint failed"),
                }
            }
        }

        let final_eval = if self.config.eval_games > 0 {
            let report = self.evaluate(agent, end_episode + 1)?;
            tracing::info!(
                games = report.games,
                win = format_args!("{:.1}%", report.win_rate() * 100.0),
                non_loss = format_args!("{:.1}%", report.non_loss_rate() * 100.0),
                "final eval vs random"
            );
            Some(report)
        } else {
            None
        };

        if let Some(path) = self.save(agent, &metrics, end_episode, final_eval)? {
            tracing::info!(path = %path.display(), states = agent.table().len(), "value table saved");
        }

        Ok(TrainingSummary {
            episodes: metrics.total_episodes(),
            wins: metrics.total_wins(),
            draws: metrics.total_draws(),
            losses: metrics.total_losses(),
            table_size: agent.table().len(),
            final_eval,
        })
    }
}
