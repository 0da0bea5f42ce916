//! Training infrastructure: the episode loop, greedy evaluation and
//! rolling metrics.

pub mod episode;
pub mod metrics;
pub mod trainer;

pub use episode::{evaluate, EvalReport};
pub use metrics::{EpisodeResult, TrainingMetrics};
pub use trainer::{AgentSide, OpponentKind, Trainer, TrainerConfig, TrainingSummary};
