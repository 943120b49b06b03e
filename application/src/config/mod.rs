//! Application-level configuration.
//!
//! - [`ContinuationParams`]: continuation loop control (attempts, timeouts, judge)
//! - [`DetectionPolicy`]: how heuristic and judge votes combine

pub mod continuation_params;

pub use continuation_params::{ContinuationParams, DetectionPolicy};
