//! Provider catalog port
//!
//! The catalog knows which providers can serve a model and in which order
//! they should be tried. It is read-mostly and shared by concurrent requests.

use super::provider::TextGenerationProvider;
use relay_domain::{Model, ProviderDescriptor, ProviderId};
use std::sync::Arc;

/// Source of ranked provider candidates per model
pub trait ProviderCatalog: Send + Sync {
    /// Candidates able to serve `model`, best first.
    fn candidates(&self, model: &Model) -> Vec<ProviderDescriptor>;

    /// The adapter instance behind a provider identifier.
    fn provider(&self, id: &ProviderId) -> Option<Arc<dyn TextGenerationProvider>>;

    /// Every provider in the catalog, for listing.
    fn all(&self) -> Vec<ProviderDescriptor>;
}
