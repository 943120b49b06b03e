//! Conversation domain.
//!
//! - [`entities::Message`]: a single role/content message of a request
//! - [`stream::StreamEvent`]: one event of a streaming provider response

pub mod entities;
pub mod stream;
