use crate::config::{ConfigValidationError, FileConfig};
use crate::providers::OpenAiCompatibleProvider;
use relay_application::{ProviderCatalog, TextGenerationProvider};
use relay_domain::{Model, ProviderDescriptor, ProviderId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A provider known to the catalog, with the models it declares.
pub struct CatalogEntry {
    pub descriptor: ProviderDescriptor,
    /// Served models; empty means any model.
    pub models: Vec<Model>,
    pub provider: Arc<dyn TextGenerationProvider>,
}

impl CatalogEntry {
    pub fn new(
        descriptor: ProviderDescriptor,
        models: Vec<Model>,
        provider: Arc<dyn TextGenerationProvider>,
    ) -> Self {
        Self {
            descriptor,
            models,
            provider,
        }
    }

    fn serves(&self, model: &Model) -> bool {
        self.models.is_empty() || self.models.contains(model)
    }
}

/// Catalog built once at startup and read by every request.
///
/// Candidate order for a model:
///  1. providers named in the routing table for that model, in table order
///  2. the remaining providers serving the model, by ascending priority
///
/// Equal priorities keep their configuration order.
pub struct StaticProviderCatalog {
    entries: Vec<CatalogEntry>,
    /// Model name to preferred provider ids
    routing: HashMap<String, Vec<ProviderId>>,
}

impl StaticProviderCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            routing: HashMap::new(),
        }
    }

    /// Prefer `providers` (in order) whenever `model` is requested.
    pub fn with_route(mut self, model: impl Into<String>, providers: Vec<ProviderId>) -> Self {
        self.routing.insert(model.into(), providers);
        self
    }

    /// Build the catalog from `[[providers]]` and `[routing]`.
    ///
    /// All providers share one HTTP client.
    pub fn from_config(config: &FileConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;

        let client = reqwest::Client::new();
        let mut entries = Vec::with_capacity(config.providers.len());
        for provider in &config.providers {
            let id = ProviderId::new(provider.id.as_str())
                .map_err(|_| ConfigValidationError::EmptyProviderId)?;
            if provider.api_key.is_none()
                && let Some(var) = &provider.api_key_env
                && std::env::var(var).is_err()
            {
                warn!("API key variable {} for provider {} is not set", var, id);
            }

            let descriptor = ProviderDescriptor::new(id.clone(), provider.priority)
                .with_tags(provider.tags.iter().cloned());
            let adapter = OpenAiCompatibleProvider::new(
                id,
                provider.base_url.clone(),
                provider.resolve_api_key(),
                client.clone(),
            );
            entries.push(CatalogEntry::new(
                descriptor,
                provider.parsed_models(),
                Arc::new(adapter),
            ));
        }

        let mut catalog = Self::new(entries);
        for (model, ids) in &config.routing {
            let ids = ids
                .iter()
                .filter_map(|id| ProviderId::new(id.as_str()).ok())
                .collect();
            catalog = catalog.with_route(model.clone(), ids);
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: &ProviderId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| &e.descriptor.id == id)
    }
}

impl ProviderCatalog for StaticProviderCatalog {
    fn candidates(&self, model: &Model) -> Vec<ProviderDescriptor> {
        let mut ranked = Vec::new();

        // 1. Explicit routing table (from config [routing])
        if let Some(route) = self.routing.get(model.as_str()) {
            for id in route {
                match self.entry(id) {
                    Some(entry) => {
                        if !ranked.iter().any(|d: &ProviderDescriptor| &d.id == id) {
                            ranked.push(entry.descriptor.clone());
                        }
                    }
                    None => warn!("Routing for {} names unknown provider {}", model, id),
                }
            }
        }

        // 2. Everything else that serves the model, by priority
        let mut rest: Vec<&CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| e.serves(model) && !ranked.iter().any(|d| d.id == e.descriptor.id))
            .collect();
        rest.sort_by_key(|e| e.descriptor.priority);
        ranked.extend(rest.into_iter().map(|e| e.descriptor.clone()));

        ranked
    }

    fn provider(&self, id: &ProviderId) -> Option<Arc<dyn TextGenerationProvider>> {
        self.entry(id).map(|e| Arc::clone(&e.provider))
    }

    fn all(&self) -> Vec<ProviderDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }
}
