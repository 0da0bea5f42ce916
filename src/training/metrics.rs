use std::collections::VecDeque;

use crate::game::Side;

/// Result of a single episode from the learner's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeResult {
    pub winner: Option<Side>,
    pub learner: Side,
    pub game_length: usize,
}

impl EpisodeResult {
    pub fn is_win(&self) -> bool {
        self.winner == Some(self.learner)
    }

    pub fn is_loss(&self) -> bool {
        self.winner == Some(self.learner.other())
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    td_errors: VecDeque<f64>,
    capacity: usize,
    total_episodes: usize,
    total_wins: usize,
    total_draws: usize,
    total_losses: usize,
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            td_errors: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
            total_wins: 0,
            total_draws: 0,
            total_losses: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        if result.is_win() {
            self.total_wins += 1;
        } else if result.is_loss() {
            self.total_losses += 1;
        } else {
            self.total_draws += 1;
        }
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    pub fn record_update(&mut self, td_error: f64) {
        self.td_errors.push_back(td_error);
        if self.td_errors.len() > self.capacity {
            self.td_errors.pop_front();
        }
    }

    fn rate(&self, last_n: usize, pred: impl Fn(&EpisodeResult) -> bool) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| pred(r))
            .count();
        hits as f64 / n as f64
    }

    /// Learner win rate in the last N episodes.
    pub fn win_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, EpisodeResult::is_win)
    }

    pub fn draw_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, EpisodeResult::is_draw)
    }

    pub fn loss_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, EpisodeResult::is_loss)
    }

    /// Mean absolute TD error over the last N updates.
    pub fn average_td_error(&self, last_n: usize) -> f64 {
        let n = self.td_errors.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.td_errors.iter().rev().take(n).sum();
        sum / n as f64
    }

    pub fn average_game_length(&self, last_n: usize) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.game_length)
            .sum();
        total as f64 / n as f64
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_wins(&self) -> usize {
        self.total_wins
    }

    pub fn total_draws(&self) -> usize {
        self.total_draws
    }

    pub fn total_losses(&self) -> usize {
        self.total_losses
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}
