use serde::{Deserialize, Serialize};

use crate::ai::RlConfig;
use crate::game::RuleSet;

/// Training statistics snapshot at save time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointStats {
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    pub average_td_error: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_win_rate: Option<f64>,
}

/// Hyperparameters recorded alongside the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub learning_rate: f64,
    pub epsilon: f64,
    pub epsilon_end: f64,
    pub epsilon_decay_episodes: usize,
    pub initial_value: f64,
    pub win_value: f64,
    pub draw_value: f64,
    pub loss_value: f64,
}

impl From<&RlConfig> for CheckpointHyperparameters {
    fn from(config: &RlConfig) -> Self {
        CheckpointHyperparameters {
            learning_rate: config.learning_rate,
            epsilon: config.epsilon,
            epsilon_end: config.epsilon_end,
            epsilon_decay_episodes: config.epsilon_decay_episodes,
            initial_value: config.initial_value,
            win_value: config.win_value,
            draw_value: config.draw_value,
            loss_value: config.loss_value,
        }
    }
}

/// Header of a value-table file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    pub timestamp: u64,
    pub board: String,
    pub rows: usize,
    pub cols: usize,
    pub k: usize,
    pub table_size: usize,
    pub hyperparameters: CheckpointHyperparameters,
    #[serde(default)]
    pub stats: CheckpointStats,
}

impl CheckpointMetadata {
    /// Metadata stamped with the current time. `table_size` is filled in on save.
    pub fn new(episode: usize, rules: RuleSet, config: &RlConfig, stats: CheckpointStats) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        CheckpointMetadata {
            episode,
            timestamp,
            board: rules.label(),
            rows: rules.rows(),
            cols: rules.cols(),
            k: rules.k(),
            table_size: 0,
            hyperparameters: config.into(),
            stats,
        }
    }

    pub fn matches(&self, rules: RuleSet) -> bool {
        self.rows == rules.rows() && self.cols == rules.cols() && self.k == rules.k()
    }
}
