//! Text generation provider port
//!
//! Defines the single capability interface every backend adapter implements.
//! Use cases depend only on this trait, never on concrete backend types.

use async_trait::async_trait;
use relay_domain::{Message, Model, ProviderId, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Transport-level failures of a provider call
///
/// Any of these during generation triggers replace-on-failure; none of them
/// is retried against the same provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Timeout")]
    Timeout,

    /// The event stream ended without a terminal event.
    #[error("Stream closed before the fragment completed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

/// Handle for receiving streaming events from a provider call.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. A well-formed stream ends with
/// one `Completed` or `Error`; a closed channel before that is a broken
/// transport.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// A handle that yields `text` as a single `Completed` event.
    pub fn completed(text: String) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 guarantees the send succeeds without awaiting.
        let _ = tx.try_send(StreamEvent::Completed(text));
        Self::new(rx)
    }

    /// Receive the next event, `None` once the sender is gone.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

/// A backend able to generate text for one or more models
#[async_trait]
pub trait TextGenerationProvider: Send + Sync {
    /// Identifier of this provider within the catalog
    fn id(&self) -> &ProviderId;

    /// Generate a whole fragment for `messages`
    async fn generate(&self, model: &Model, messages: &[Message]) -> Result<String, ProviderError>;

    /// Generate a fragment as a stream of events.
    ///
    /// Default implementation calls `generate()` and wraps the result in a
    /// single `Completed` event, so non-streaming backends work unchanged.
    async fn generate_streaming(
        &self,
        model: &Model,
        messages: &[Message],
    ) -> Result<StreamHandle, ProviderError> {
        let text = self.generate(model, messages).await?;
        Ok(StreamHandle::completed(text))
    }
}
