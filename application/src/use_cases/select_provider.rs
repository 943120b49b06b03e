//! Provider selection use case
//!
//! Chooses a provider for a model from the catalog's ranked candidates,
//! honoring the exclusion set for both automatic and explicit selection.
//! On a transport failure, [`ProviderSelector::replace_on_failure`] picks the
//! next best candidate that has not already been tried for the session.

use crate::ports::exclusion_store::{ExclusionStore, ExclusionStoreError};
use crate::ports::provider::TextGenerationProvider;
use crate::ports::provider_catalog::ProviderCatalog;
use relay_domain::{ExclusionSet, Model, ProviderDescriptor, ProviderId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while selecting a provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Provider {0} is excluded")]
    ProviderExcluded(ProviderId),

    #[error("Provider {provider} does not serve model {model}")]
    ProviderNotFound { provider: ProviderId, model: String },

    #[error("No available provider for model {0}")]
    NoAvailableProvider(String),
}

impl SelectionError {
    /// True when every candidate was excluded or already failed.
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, SelectionError::NoAvailableProvider(_))
    }
}

/// A chosen candidate together with its adapter instance
#[derive(Clone)]
pub struct SelectedProvider {
    pub descriptor: ProviderDescriptor,
    pub provider: Arc<dyn TextGenerationProvider>,
}

impl SelectedProvider {
    pub fn id(&self) -> &ProviderId {
        &self.descriptor.id
    }
}

impl std::fmt::Debug for SelectedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedProvider")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// One row of a provider listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedProvider {
    pub descriptor: ProviderDescriptor,
    pub excluded: bool,
}

/// Picks providers from the catalog
///
/// The selector never mutates the catalog or the exclusion store. Callers
/// take one [`ExclusionSet`] snapshot per request and pass it in, so no lock
/// is held while a provider call is in flight.
pub struct ProviderSelector {
    catalog: Arc<dyn ProviderCatalog>,
    exclusions: Arc<dyn ExclusionStore>,
}

impl ProviderSelector {
    pub fn new(catalog: Arc<dyn ProviderCatalog>, exclusions: Arc<dyn ExclusionStore>) -> Self {
        Self {
            catalog,
            exclusions,
        }
    }

    /// Current contents of the exclusion store.
    pub fn exclusion_snapshot(&self) -> Result<ExclusionSet, ExclusionStoreError> {
        self.exclusions.list()
    }

    /// Select a provider for `model`.
    ///
    /// An explicit provider bypasses ranking but not the exclusion set.
    pub fn select(
        &self,
        model: &Model,
        explicit: Option<&ProviderId>,
        exclusions: &ExclusionSet,
    ) -> Result<SelectedProvider, SelectionError> {
        match explicit {
            Some(id) => self.select_explicit(model, id, exclusions),
            None => self.best_provider(model, exclusions),
        }
    }

    /// Highest-ranked candidate for `model` that is not excluded.
    pub fn best_provider(
        &self,
        model: &Model,
        exclusions: &ExclusionSet,
    ) -> Result<SelectedProvider, SelectionError> {
        for descriptor in self.catalog.candidates(model) {
            if exclusions.contains(&descriptor.id) {
                debug!("Skipping excluded provider {} for {}", descriptor.id, model);
                continue;
            }
            let Some(provider) = self.catalog.provider(&descriptor.id) else {
                warn!("Catalog lists {} but has no adapter for it", descriptor.id);
                continue;
            };
            debug!("Selected provider {} for {}", descriptor.id, model);
            return Ok(SelectedProvider {
                descriptor,
                provider,
            });
        }
        Err(SelectionError::NoAvailableProvider(model.to_string()))
    }

    /// Next candidate after a transport failure.
    ///
    /// Excludes the persistent set plus every provider in `tried`, so the
    /// search terminates once the candidate list is used up.
    pub fn replace_on_failure(
        &self,
        model: &Model,
        exclusions: &ExclusionSet,
        tried: &[ProviderId],
    ) -> Result<SelectedProvider, SelectionError> {
        let effective = exclusions.union_with(tried);
        self.best_provider(model, &effective)
    }

    /// Candidates for `model` (or every provider) with their exclusion status.
    pub fn ranked(&self, model: Option<&Model>, exclusions: &ExclusionSet) -> Vec<RankedProvider> {
        let descriptors = match model {
            Some(model) => self.catalog.candidates(model),
            None => self.catalog.all(),
        };
        descriptors
            .into_iter()
            .map(|descriptor| RankedProvider {
                excluded: exclusions.contains(&descriptor.id),
                descriptor,
            })
            .collect()
    }

    fn select_explicit(
        &self,
        model: &Model,
        id: &ProviderId,
        exclusions: &ExclusionSet,
    ) -> Result<SelectedProvider, SelectionError> {
        if exclusions.contains(id) {
            return Err(SelectionError::ProviderExcluded(id.clone()));
        }
        let not_found = || SelectionError::ProviderNotFound {
            provider: id.clone(),
            model: model.to_string(),
        };
        let descriptor = self
            .catalog
            .candidates(model)
            .into_iter()
            .find(|d| &d.id == id)
            .ok_or_else(not_found)?;
        let provider = self.catalog.provider(id).ok_or_else(not_found)?;
        debug!("Using explicitly requested provider {} for {}", id, model);
        Ok(SelectedProvider {
            descriptor,
            provider,
        })
    }
}
