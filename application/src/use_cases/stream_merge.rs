//! Streaming merge use case
//!
//! Presents a multi-fragment generation as one stream. The initial fragment
//! is forwarded delta by delta as the provider produces it; each
//! continuation is fetched whole, overlap-trimmed, and forwarded as a single
//! chunk. Concatenating every [`MergeEvent::Chunk`] yields exactly the
//! final merged text.
//!
//! Dropping the [`MergedStream`] cancels the background task, so no further
//! provider calls are made on behalf of a consumer that went away.

use crate::ports::progress::ContinuationProgress;
use crate::ports::provider::ProviderError;
use crate::use_cases::continue_generation::{
    ContinuationOrchestrator, FragmentSink, GenerateError, GenerationOutcome,
};
use crate::use_cases::select_provider::SelectedProvider;
use crate::use_cases::shared::{CallOutcome, call_provider};
use async_trait::async_trait;
use futures::Stream;
use relay_domain::{
    AbortReason, ContinuationSession, ExclusionSet, GenerationRequest, StreamEvent,
};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

/// Undelivered events buffered before the producer waits.
const EVENT_BUFFER: usize = 64;

/// One item of a merged stream
#[derive(Debug)]
pub enum MergeEvent {
    /// Text that extends the answer.
    Chunk(String),
    /// The session ended; carries the full merged result.
    Finished(GenerationOutcome),
    /// The request failed before producing an answer.
    Failed(GenerateError),
}

/// Consumer end of a streaming generation
///
/// Yields zero or more chunks followed by exactly one `Finished` or
/// `Failed` event.
pub struct MergedStream {
    receiver: mpsc::Receiver<MergeEvent>,
    _cancel_on_drop: DropGuard,
}

impl Stream for MergedStream {
    type Item = MergeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Forwards continuation chunks to the stream consumer.
struct ChannelSink {
    tx: mpsc::Sender<MergeEvent>,
}

#[async_trait]
impl FragmentSink for ChannelSink {
    async fn forward(&mut self, text: &str) -> bool {
        self.tx.send(MergeEvent::Chunk(text.to_string())).await.is_ok()
    }
}

/// How streaming the initial fragment ended.
enum Streamed {
    Done(String),
    Failed(ProviderError),
    Cancelled,
}

/// Starts streaming generations on background tasks
pub struct StreamMerger {
    orchestrator: Arc<ContinuationOrchestrator>,
}

impl StreamMerger {
    pub fn new(orchestrator: Arc<ContinuationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Spawn the session and return its consumer end.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(
        &self,
        request: GenerationRequest,
        first: SelectedProvider,
        exclusions: ExclusionSet,
        cancel: &CancellationToken,
        progress: Arc<dyn ContinuationProgress>,
    ) -> MergedStream {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let token = cancel.child_token();
        let guard = token.clone().drop_guard();
        let orchestrator = Arc::clone(&self.orchestrator);

        tokio::spawn(async move {
            let result = drive_stream(
                &orchestrator,
                &request,
                first,
                &exclusions,
                &token,
                &tx,
                progress.as_ref(),
            )
            .await;
            let event = match result {
                Ok(outcome) => MergeEvent::Finished(outcome),
                Err(e) => MergeEvent::Failed(e),
            };
            if tx.send(event).await.is_err() {
                debug!("Stream consumer dropped before the final event");
            }
        });

        MergedStream {
            receiver: rx,
            _cancel_on_drop: guard,
        }
    }
}

async fn drive_stream(
    orchestrator: &ContinuationOrchestrator,
    request: &GenerationRequest,
    mut current: SelectedProvider,
    exclusions: &ExclusionSet,
    cancel: &CancellationToken,
    tx: &mpsc::Sender<MergeEvent>,
    progress: &dyn ContinuationProgress,
) -> Result<GenerationOutcome, GenerateError> {
    let mut session = ContinuationSession::new(current.id().clone(), request.continuation_attempts);
    orchestrator.log_session_start(request, &session);
    progress.on_provider_selected(current.id());
    let mut sink = ChannelSink { tx: tx.clone() };

    loop {
        let mut partial = String::new();
        match stream_fragment(orchestrator, request, &current, cancel, &mut sink, &mut partial).await {
            Streamed::Done(text) => {
                orchestrator.record_fragment(&mut session, text)?;
                break;
            }
            Streamed::Cancelled => {
                if partial.is_empty() {
                    return Err(GenerateError::Cancelled);
                }
                orchestrator.record_fragment(&mut session, partial)?;
                session.abort(AbortReason::Cancelled)?;
                return Ok(orchestrator.finish(&session, None, progress));
            }
            Streamed::Failed(err) if partial.is_empty() => {
                orchestrator.reselect(
                    &request.model,
                    &mut current,
                    &mut session,
                    exclusions,
                    &err,
                    progress,
                )?;
            }
            Streamed::Failed(err) => {
                // Delivered text stays; the rest comes from a continuation.
                orchestrator.record_fragment(&mut session, partial)?;
                if !request.auto_continue {
                    warn!("Stream from {} broke off: {}", current.id(), err);
                    session.exhaust()?;
                    return Ok(orchestrator.finish(&session, None, progress));
                }
                let replaced = orchestrator.reselect(
                    &request.model,
                    &mut current,
                    &mut session,
                    exclusions,
                    &err,
                    progress,
                );
                match replaced {
                    Ok(()) => break,
                    Err(GenerateError::Selection(e)) => {
                        session.abort(AbortReason::ProvidersExhausted(e.to_string()))?;
                        return Ok(orchestrator.finish(&session, None, progress));
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    let verdict = orchestrator
        .drive(
            request,
            &mut session,
            &mut current,
            exclusions,
            cancel,
            progress,
            &mut sink,
        )
        .await?;
    Ok(orchestrator.finish(&session, verdict, progress))
}

/// Stream one fragment from `current`, forwarding deltas as they arrive.
///
/// Text forwarded so far is accumulated in `partial`. The request timeout
/// bounds opening the stream and each wait for the next event.
async fn stream_fragment(
    orchestrator: &ContinuationOrchestrator,
    request: &GenerationRequest,
    current: &SelectedProvider,
    cancel: &CancellationToken,
    sink: &mut ChannelSink,
    partial: &mut String,
) -> Streamed {
    let timeout = orchestrator.request_timeout();
    let open = current
        .provider
        .generate_streaming(&request.model, &request.messages);
    let mut handle = match call_provider(cancel, timeout, open).await {
        CallOutcome::Done(handle) => handle,
        CallOutcome::Failed(err) => return Streamed::Failed(err),
        CallOutcome::Cancelled => return Streamed::Cancelled,
    };

    loop {
        let next = async { Ok::<_, ProviderError>(handle.next_event().await) };
        let event = match call_provider(cancel, timeout, next).await {
            CallOutcome::Done(event) => event,
            CallOutcome::Failed(err) => return Streamed::Failed(err),
            CallOutcome::Cancelled => return Streamed::Cancelled,
        };

        match event {
            Some(StreamEvent::Delta(chunk)) => {
                if chunk.is_empty() {
                    continue;
                }
                partial.push_str(&chunk);
                if !sink.forward(&chunk).await {
                    return Streamed::Cancelled;
                }
            }
            Some(StreamEvent::Completed(text)) => {
                if !partial.is_empty() {
                    return Streamed::Done(std::mem::take(partial));
                }
                // Non-streaming backend: the whole fragment arrives at once.
                if !text.is_empty() && !sink.forward(&text).await {
                    partial.push_str(&text);
                    return Streamed::Cancelled;
                }
                return Streamed::Done(text);
            }
            Some(StreamEvent::Error(e)) => {
                return Streamed::Failed(ProviderError::RequestFailed(e));
            }
            None => return Streamed::Failed(ProviderError::TransportClosed),
        }
    }
}
