//! Exclusion store port
//!
//! Holds the process-wide set of excluded provider identifiers. Reads happen
//! on every selection; writes (add/remove/clear) are rare and must be
//! exclusive, so readers never observe a half-applied update.

use relay_domain::{ExclusionSet, ProviderId};
use thiserror::Error;

/// Errors from the exclusion store's backing storage
#[derive(Error, Debug)]
pub enum ExclusionStoreError {
    #[error("Exclusion store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Exclusion store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistent set of provider identifiers barred from selection
pub trait ExclusionStore: Send + Sync {
    /// Snapshot of the current set.
    fn list(&self) -> Result<ExclusionSet, ExclusionStoreError>;

    /// Add an identifier. Returns `false` if it was already excluded.
    fn add(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError>;

    /// Remove an identifier. Returns `false` if it was not excluded.
    fn remove(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError>;

    /// Remove every identifier.
    fn clear(&self) -> Result<(), ExclusionStoreError>;

    /// Whether `id` is currently excluded.
    fn contains(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError> {
        Ok(self.list()?.contains(id))
    }
}
