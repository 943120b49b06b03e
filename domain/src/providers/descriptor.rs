//! Provider descriptors

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a text-generation provider (Value Object)
///
/// Compared case-sensitively, the same way the exclusion list stores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);

impl ProviderId {
    /// Create an identifier, rejecting empty or whitespace-only names
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidProviderId(id));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProviderId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ProviderId::new(value)
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ProviderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::new(s)
    }
}

/// Describes one provider able to serve a model (Value Object)
///
/// Owned by the provider catalog; the selector only reads it.
/// `priority` orders candidates within a catalog entry, lower first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub tags: BTreeSet<String>,
    pub priority: u32,
}

impl ProviderDescriptor {
    pub fn new(id: ProviderId, priority: u32) -> Self {
        Self {
            id,
            tags: BTreeSet::new(),
            priority,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
