//! Streaming events for provider communication.
//!
//! [`StreamEvent`] represents individual events in a streaming provider
//! response, enabling incremental forwarding of generated text.

/// An event in a streaming provider response.
///
/// Bridges transport-level streaming (e.g. SSE chunks) to the application
/// layer. A stream ends with exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The complete fragment text (signals end-of-fragment).
    Completed(String),
    /// An error that occurred during streaming.
    Error(String),
}
