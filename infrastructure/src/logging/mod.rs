//! Structured session logging.
//!
//! [`JsonlSessionLogger`] appends one JSON object per
//! [`SessionEvent`](relay_application::SessionEvent) to a file.

mod jsonl_logger;

pub use jsonl_logger::JsonlSessionLogger;
