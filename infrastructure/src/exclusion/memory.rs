//! In-memory exclusion store.

use relay_application::{ExclusionStore, ExclusionStoreError};
use relay_domain::{ExclusionSet, ProviderId};
use std::sync::{PoisonError, RwLock};

/// Exclusion store that lives only as long as the process.
///
/// Used when no configuration directory is available.
#[derive(Default)]
pub struct MemoryExclusionStore {
    set: RwLock<ExclusionSet>,
}

impl MemoryExclusionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excluded(ids: impl IntoIterator<Item = ProviderId>) -> Self {
        Self {
            set: RwLock::new(ids.into_iter().collect()),
        }
    }
}

impl ExclusionStore for MemoryExclusionStore {
    fn list(&self) -> Result<ExclusionSet, ExclusionStoreError> {
        Ok(self.set.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn add(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError> {
        let mut set = self.set.write().unwrap_or_else(PoisonError::into_inner);
        Ok(set.insert(id.clone()))
    }

    fn remove(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError> {
        let mut set = self.set.write().unwrap_or_else(PoisonError::into_inner);
        Ok(set.remove(id))
    }

    fn clear(&self) -> Result<(), ExclusionStoreError> {
        self.set
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let x: ProviderId = "X".parse().unwrap();
        let store = MemoryExclusionStore::new();
        store.add(&x).unwrap();
        assert!(store.contains(&x).unwrap());
        store.remove(&x).unwrap();
        assert!(!store.contains(&x).unwrap());

        let store = MemoryExclusionStore::with_excluded([x.clone()]);
        assert_eq!(store.list().unwrap().len(), 1);
        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());
    }
}
