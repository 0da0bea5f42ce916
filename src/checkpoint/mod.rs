//! Persistence of learned value tables.
//!
//! A table file is a single JSON document holding a [`CheckpointMetadata`]
//! header and the flat `key -> value` map, written atomically.

mod manager;
mod metadata;

pub use manager::{load_table, save_table, tmp_path};
pub use metadata::{CheckpointHyperparameters, CheckpointMetadata, CheckpointStats};
