//! Scripted test doubles shared by the use case tests.

use crate::ports::exclusion_store::{ExclusionStore, ExclusionStoreError};
use crate::ports::progress::ContinuationProgress;
use crate::ports::provider::{ProviderError, StreamHandle, TextGenerationProvider};
use crate::ports::provider_catalog::ProviderCatalog;
use async_trait::async_trait;
use relay_domain::{
    CompletionVerdict, ExclusionSet, Message, Model, ProviderDescriptor, ProviderId, SessionState,
    StreamEvent,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;

pub(crate) fn pid(s: &str) -> ProviderId {
    s.parse().unwrap()
}

/// One scripted provider reply.
pub(crate) enum Reply {
    Text(String),
    Fail(ProviderError),
    /// Reply after a delay.
    Slow(Duration, String),
    /// Never reply.
    Hang,
    /// Streaming reply; the channel closes after the events.
    Events(Vec<StreamEvent>),
    /// Streaming reply; the channel stays open after the events.
    OpenEvents(Vec<StreamEvent>),
}

pub(crate) fn text(s: &str) -> Reply {
    Reply::Text(s.to_string())
}

pub(crate) fn fail() -> Reply {
    Reply::Fail(ProviderError::ConnectionError("connection reset".into()))
}

pub(crate) struct ScriptedProvider {
    id: ProviderId,
    replies: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Message>>>,
    open_senders: Mutex<Vec<mpsc::Sender<StreamEvent>>>,
}

impl ScriptedProvider {
    pub(crate) fn new(id: &str, replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            id: pid(id),
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            open_senders: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }

    fn next_reply(&self, messages: &[Message]) -> Option<Reply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl TextGenerationProvider for ScriptedProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    async fn generate(&self, _model: &Model, messages: &[Message]) -> Result<String, ProviderError> {
        match self.next_reply(messages) {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Slow(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Events(_)) | Some(Reply::OpenEvents(_)) => {
                Err(ProviderError::Other("streaming reply on generate".into()))
            }
            None => Err(ProviderError::Other("script exhausted".into())),
        }
    }

    async fn generate_streaming(
        &self,
        _model: &Model,
        messages: &[Message],
    ) -> Result<StreamHandle, ProviderError> {
        match self.next_reply(messages) {
            Some(Reply::Events(events)) => {
                let (tx, rx) = mpsc::channel(events.len() + 1);
                for event in events {
                    tx.try_send(event).unwrap();
                }
                Ok(StreamHandle::new(rx))
            }
            Some(Reply::OpenEvents(events)) => {
                let (tx, rx) = mpsc::channel(events.len() + 1);
                for event in events {
                    tx.try_send(event).unwrap();
                }
                self.open_senders.lock().unwrap().push(tx);
                Ok(StreamHandle::new(rx))
            }
            Some(Reply::Text(text)) => Ok(StreamHandle::completed(text)),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Slow(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(StreamHandle::completed(text))
            }
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(ProviderError::Other("script exhausted".into())),
        }
    }
}

struct Entry {
    descriptor: ProviderDescriptor,
    provider: Arc<ScriptedProvider>,
    models: Option<Vec<Model>>,
}

/// Catalog over scripted providers, ranked by priority.
#[derive(Default)]
pub(crate) struct TestCatalog {
    entries: Vec<Entry>,
}

impl TestCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a provider serving every model.
    pub(crate) fn with(mut self, provider: Arc<ScriptedProvider>, priority: u32) -> Self {
        self.entries.push(Entry {
            descriptor: ProviderDescriptor::new(provider.id().clone(), priority),
            provider,
            models: None,
        });
        self
    }

    /// Register a provider serving only `model`.
    pub(crate) fn with_for(
        mut self,
        provider: Arc<ScriptedProvider>,
        priority: u32,
        model: Model,
    ) -> Self {
        self.entries.push(Entry {
            descriptor: ProviderDescriptor::new(provider.id().clone(), priority),
            provider,
            models: Some(vec![model]),
        });
        self
    }
}

impl ProviderCatalog for TestCatalog {
    fn candidates(&self, model: &Model) -> Vec<ProviderDescriptor> {
        let mut candidates: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.models.as_ref().is_none_or(|m| m.contains(model)))
            .map(|e| e.descriptor.clone())
            .collect();
        candidates.sort_by_key(|d| d.priority);
        candidates
    }

    fn provider(&self, id: &ProviderId) -> Option<Arc<dyn TextGenerationProvider>> {
        self.entries
            .iter()
            .find(|e| &e.descriptor.id == id)
            .map(|e| e.provider.clone() as Arc<dyn TextGenerationProvider>)
    }

    fn all(&self) -> Vec<ProviderDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }
}

#[derive(Default)]
pub(crate) struct TestExclusions {
    set: RwLock<ExclusionSet>,
}

impl TestExclusions {
    pub(crate) fn of(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            set: RwLock::new(ids.iter().map(|s| pid(s)).collect()),
        })
    }
}

impl ExclusionStore for TestExclusions {
    fn list(&self) -> Result<ExclusionSet, ExclusionStoreError> {
        Ok(self.set.read().unwrap().clone())
    }

    fn add(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError> {
        Ok(self.set.write().unwrap().insert(id.clone()))
    }

    fn remove(&self, id: &ProviderId) -> Result<bool, ExclusionStoreError> {
        Ok(self.set.write().unwrap().remove(id))
    }

    fn clear(&self) -> Result<(), ExclusionStoreError> {
        self.set.write().unwrap().clear();
        Ok(())
    }
}

/// Progress recorder for asserting on callbacks.
#[derive(Default)]
pub(crate) struct RecordingProgress {
    pub(crate) events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ContinuationProgress for RecordingProgress {
    fn on_provider_selected(&self, provider: &ProviderId) {
        self.push(format!("selected:{}", provider));
    }

    fn on_verdict(&self, verdict: &CompletionVerdict) {
        self.push(format!("verdict:{}", verdict.reason));
    }

    fn on_continuation_start(&self, attempt: u32, max_attempts: u32) {
        self.push(format!("continue:{}/{}", attempt, max_attempts));
    }

    fn on_provider_replaced(&self, failed: &ProviderId, next: &ProviderId) {
        self.push(format!("replaced:{}->{}", failed, next));
    }

    fn on_session_end(&self, state: SessionState) {
        self.push(format!("end:{}", state));
    }
}
