//! Exclusion set value object

use super::descriptor::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of provider identifiers barred from selection (Value Object)
///
/// Membership only; iteration order is the identifiers' sort order and
/// carries no meaning. The process-wide instance lives behind an exclusion
/// store; this type is the snapshot the selector reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet {
    ids: BTreeSet<ProviderId>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ProviderId) -> bool {
        self.ids.contains(id)
    }

    /// Insert an identifier. Returns `false` if it was already present.
    pub fn insert(&mut self, id: ProviderId) -> bool {
        self.ids.insert(id)
    }

    /// Remove an identifier. Returns `false` if it was not present.
    pub fn remove(&mut self, id: &ProviderId) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderId> {
        self.ids.iter()
    }

    /// Union of this set and `extra`, leaving `self` untouched.
    ///
    /// Used for replace-on-failure, where providers already tried in a
    /// session are excluded on top of the persistent set.
    pub fn union_with<'a>(&self, extra: impl IntoIterator<Item = &'a ProviderId>) -> Self {
        let mut merged = self.clone();
        merged.ids.extend(extra.into_iter().cloned());
        merged
    }
}

impl FromIterator<ProviderId> for ExclusionSet {
    fn from_iter<T: IntoIterator<Item = ProviderId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ExclusionSet {
    type Item = ProviderId;
    type IntoIter = std::collections::btree_set::IntoIter<ProviderId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}
