mod td;

pub use td::{RlAgent, RlConfig, UpdateMetrics};
