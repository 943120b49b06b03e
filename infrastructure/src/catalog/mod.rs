//! Provider catalog adapters

pub mod static_catalog;

pub use static_catalog::{CatalogEntry, StaticProviderCatalog};
