//! Completeness detection (pure part).
//!
//! These functions decide whether accumulated response text looks like a
//! whole answer. They are pure domain logic: no I/O, no provider calls.
//! The judge round-trip that complements them lives in the application
//! layer.
//!
//! | Item | Role |
//! |------|------|
//! | [`heuristics::evaluate_heuristics`] | Structural/lexical truncation signals |
//! | [`judge::parse_judge_answer`] | Reads a judge model's COMPLETE/INCOMPLETE answer |
//! | [`verdict::CompletionVerdict`] | Outcome with an enumerated reason |

pub mod heuristics;
pub mod judge;
pub mod verdict;
