//! Port for structured session logging.
//!
//! Defines the [`SessionLogger`] trait for recording continuation events
//! (fragments, verdicts, reselections) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! per-request transcript in a machine-readable format (JSONL).

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A structured session event for logging.
///
/// Each event has a type string, a UTC timestamp taken when the event was
/// created, and a JSON payload containing event-specific fields.
pub struct SessionEvent {
    /// Event type identifier (e.g., "fragment", "verdict", "reselection").
    pub event_type: &'static str,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl SessionEvent {
    /// Create a new session event with the current UTC timestamp.
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Port for logging session events to a structured log.
///
/// The `log` method is synchronous and non-fallible so logging can never
/// disrupt a generation; failures are ignored by implementations.
pub trait SessionLogger: Send + Sync {
    /// Record a session event.
    fn log(&self, event: SessionEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoSessionLogger;

impl SessionLogger for NoSessionLogger {
    fn log(&self, _event: SessionEvent) {}
}
