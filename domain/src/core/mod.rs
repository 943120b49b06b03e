//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: text-generation models known to the relay
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
