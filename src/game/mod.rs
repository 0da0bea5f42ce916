//! Core m,n,k game logic: rules, board representation, sides and the
//! symmetry canonicalizer used to key learned values.

mod board;
mod rules;
mod side;
mod symmetry;

pub use board::{Board, Cell, Move};
pub use rules::{Outcome, RuleSet};
pub use side::Side;
pub use symmetry::{canonicalize, CanonicalKey, Symmetry};
