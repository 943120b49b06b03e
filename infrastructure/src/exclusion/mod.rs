//! Exclusion store adapters.
//!
//! - [`JsonFileExclusionStore`]: persistent JSON array on disk
//! - [`MemoryExclusionStore`]: process-local fallback

mod json_store;
mod memory;

pub use json_store::JsonFileExclusionStore;
pub use memory::MemoryExclusionStore;
