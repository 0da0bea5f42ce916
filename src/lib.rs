//! # mnk-tictactoe
//!
//! An m,n,k game (tic-tac-toe generalised to an m×n board and a run of k)
//! with a tabular temporal-difference learning agent. Board positions are
//! folded under the board's symmetry group so one learned value covers every
//! equivalent position.
//!
//! ## Modules
//!
//! - [`game`] — Rules, board, sides and symmetry canonicalization
//! - [`ai`] — Player trait and agents: scripted, random, heuristic, minimax, human, TD learner
//! - [`engine`] — Turn-taking game engine and episode records
//! - [`training`] — Training loop, evaluation and metrics
//! - [`checkpoint`] — Value table persistence
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod training;
