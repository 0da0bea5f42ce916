//! Players: the [`Player`] trait and every agent that implements it.

mod agent;
pub mod algorithms;
mod heuristic;
mod human;
pub mod mcts;
pub mod negamax;
mod random;
mod scripted;
mod value_table;

pub use agent::Player;
pub use algorithms::{RlAgent, RlConfig, UpdateMetrics};
pub use heuristic::HeuristicAgent;
pub use human::HumanPlayer;
pub use mcts::MctsAgent;
pub use negamax::NegamaxAgent;
pub use random::RandomAgent;
pub use scripted::ScriptedAgent;
pub use value_table::ValueTable;
