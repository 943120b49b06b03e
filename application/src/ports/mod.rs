//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod exclusion_store;
pub mod progress;
pub mod provider;
pub mod provider_catalog;
pub mod session_logger;
