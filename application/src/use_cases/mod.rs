//! Use cases (application services)
//!
//! - [`select_provider`]: ranked provider choice and replace-on-failure
//! - [`detect_completion`]: heuristic + judge completeness verdicts
//! - [`continue_generation`]: the bounded continuation loop
//! - [`stream_merge`]: one consumer stream over many fragments
//! - [`generate`]: request entry point wiring the above together

pub mod continue_generation;
pub mod detect_completion;
pub mod generate;
pub mod select_provider;
pub(crate) mod shared;
pub mod stream_merge;

#[cfg(test)]
pub(crate) mod testing;
