//! Generation domain: the request, the fragments it produces, and the
//! session state machine that merges them.
//!
//! - [`request::GenerationRequest`]: what the caller asked for
//! - [`fragment::ResponseFragment`]: text produced by one provider call
//! - [`merge`]: overlap-trimming concatenation of fragments
//! - [`session::ContinuationSession`]: per-request continuation state

pub mod fragment;
pub mod merge;
pub mod request;
pub mod session;
