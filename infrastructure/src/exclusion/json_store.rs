//! JSON-file backed exclusion store.
//!
//! The file holds a JSON array of provider ids:
//!
//! ```json
//! ["Blackbox", "FreeGpt"]
//! ```
//!
//! The file is read once when the store is opened and rewritten on every
//! change. A missing, empty or unreadable file is treated as an empty list.

use relay_application::{ExclusionStore, ExclusionStoreError};
use relay_domain::{ExclusionSet, ProviderId};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Exclusion store persisted as a JSON array on disk.
///
/// Readers share the in-memory copy; writers hold the write lock while the
/// file is replaced, so no reader ever sees a half-applied change.
pub struct JsonFileExclusionStore {
    path: PathBuf,
    cache: RwLock<ExclusionSet>,
}

impl JsonFileExclusionStore {
    /// Open the store at `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let set = read_file(&path);
        debug!(
            "Loaded {} excluded provider(s) from {}",
            set.len(),
            path.display()
        );
        Self {
            path,
            cache: RwLock::new(set),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, ExclusionSet> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ExclusionSet> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist `set`, then publish it. The cache is untouched if the write fails.
    fn commit(
        &self,
        cache: &mut RwLockWriteGuard<'_, ExclusionSet>,
        set: ExclusionSet,
    ) -> Result<(), ExclusionStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&set)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        **cache = set;
        Ok(())
    }
}

fn read_file(path: &Path) -> ExclusionSet {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ExclusionSet::new(),
        Err(e) => {
            warn!("Could not read exclusion list {}: {}", path.display(), e);
            return ExclusionSet::new();
        }
    };
    if content.trim().is_empty() {
        return ExclusionSet::new();
    }
    match serde_json::from_str::<Vec<String>>(&content) {
        Ok(ids) => ids
            .into_iter()
            .filter_map(|id| ProviderId::new(id).ok())
            .collect(),
        Err(e) => {
            warn!(
                "Exclusion list {} is not a JSON array of ids, ignoring it: {}",
                path.display(),
                e
            );
            ExclusionSet::new()
        }
    }
}

impl ExclusionStore for JsonFileExclusionStore {
    fn list(&self) -> Result<ExclusionSet, ExclusionStoreError> {
        Ok(self.read().clone())
    }

    fn add(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError> {
        let mut cache = self.write();
        if cache.contains(id) {
            return Ok(false);
        }
        let mut next = cache.clone();
        next.insert(id.clone());
        self.commit(&mut cache, next)?;
        Ok(true)
    }

    fn remove(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError> {
        let mut cache = self.write();
        if !cache.contains(id) {
            return Ok(false);
        }
        let mut next = cache.clone();
        next.remove(id);
        self.commit(&mut cache, next)?;
        Ok(true)
    }

    fn clear(&self) -> Result<(), ExclusionStoreError> {
        let mut cache = self.write();
        self.commit(&mut cache, ExclusionSet::new())
    }

    fn contains(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError> {
        Ok(self.read().contains(id))
    }
}
