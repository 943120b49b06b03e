//! Provider value objects (provider-neutral, transport-free).
//!
//! - [`descriptor::ProviderId`]: identifier of a backend, unique within a catalog
//! - [`descriptor::ProviderDescriptor`]: identifier, capability tags and rank
//! - [`exclusion::ExclusionSet`]: identifiers barred from selection

pub mod descriptor;
pub mod exclusion;
