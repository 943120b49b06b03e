//! OpenAI-compatible chat completions provider.
//!
//! Speaks the `/chat/completions` wire format shared by most hosted and
//! self-hosted backends. Streaming uses server-sent events; each `data:`
//! line carries one JSON chunk until the `[DONE]` sentinel.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use relay_application::{ProviderError, StreamHandle, TextGenerationProvider};
use relay_domain::util::preview;
use relay_domain::{Message, Model, ProviderId, StreamEvent};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace};

const STREAM_BUFFER: usize = 64;

/// Error bodies longer than this are cut before they reach logs.
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// One decoded SSE `data:` payload
#[derive(Debug, PartialEq, Eq)]
enum ChunkData {
    Text(String),
    Finished(Option<String>),
    Done,
    Skip,
}

/// Provider backed by an OpenAI-compatible HTTP endpoint
pub struct OpenAiCompatibleProvider {
    id: ProviderId,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        id: ProviderId,
        base_url: impl Into<String>,
        api_key: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            id,
            base_url: base_url.into(),
            api_key,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn post(
        &self,
        model: &Model,
        messages: &[Message],
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let body = ChatRequest {
            model: model.as_str(),
            messages,
            stream,
        };
        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("POST {} (model={}, stream={})", self.endpoint(), model, stream);
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                body: preview(&body, MAX_ERROR_BODY),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TextGenerationProvider for OpenAiCompatibleProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    async fn generate(&self, model: &Model, messages: &[Message]) -> Result<String, ProviderError> {
        let response = self.post(model, messages, false).await?;
        let body = response.text().await.map_err(map_reqwest_error)?;
        let (text, finish_reason) = parse_completion(&body)?;
        if finish_reason.as_deref() == Some("length") {
            debug!("{} stopped at its length limit", self.id);
        }
        Ok(text)
    }

    async fn generate_streaming(
        &self,
        model: &Model,
        messages: &[Message],
    ) -> Result<StreamHandle, ProviderError> {
        let response = self.post(model, messages, true).await?;
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let id = self.id.clone();

        let payloads = response
            .bytes_stream()
            .eventsource()
            .map(|event| event.map(|event| event.data));
        tokio::spawn(pump_events(Box::pin(payloads), tx, id));

        Ok(StreamHandle::new(rx))
    }
}

/// Forward decoded SSE payloads to `tx` as stream events.
///
/// `Completed` is sent only once the backend signals the end with `[DONE]`
/// or a finish reason. A stream that stops short closes the channel with no
/// terminal event, which the receiver treats as a broken transport.
async fn pump_events<S, E>(mut payloads: S, tx: mpsc::Sender<StreamEvent>, id: ProviderId)
where
    S: Stream<Item = Result<String, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut text = String::new();
    let mut finished = false;

    while let Some(payload) = payloads.next().await {
        let data = match payload {
            Ok(data) => data,
            Err(e) => {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
        };
        match parse_chunk(&data) {
            ChunkData::Text(delta) => {
                text.push_str(&delta);
                if tx.send(StreamEvent::Delta(delta)).await.is_err() {
                    trace!("Stream receiver for {} dropped", id);
                    return;
                }
            }
            ChunkData::Finished(reason) => {
                finished = true;
                if reason.as_deref() == Some("length") {
                    debug!("{} stopped at its length limit", id);
                }
            }
            ChunkData::Done => {
                finished = true;
                break;
            }
            ChunkData::Skip => {}
        }
    }

    if finished {
        let _ = tx.send(StreamEvent::Completed(text)).await;
    } else {
        debug!("Stream from {} closed before [DONE]", id);
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_connect() {
        ProviderError::ConnectionError(e.to_string())
    } else {
        ProviderError::RequestFailed(e.to_string())
    }
}

/// Extract the first choice's text and finish reason from a completion body.
fn parse_completion(body: &str) -> Result<(String, Option<String>), ProviderError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| {
            ProviderError::Other(format!(
                "invalid completion body ({}): {}",
                e,
                preview(body, MAX_ERROR_BODY)
            ))
        })?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Other("completion contained no choices".into()))?;
    Ok((
        choice.message.content.unwrap_or_default(),
        choice.finish_reason,
    ))
}

fn parse_chunk(data: &str) -> ChunkData {
    let data = data.trim();
    if data == "[DONE]" {
        return ChunkData::Done;
    }
    let Ok(chunk) = serde_json::from_str::<ChatChunk>(data) else {
        return ChunkData::Skip;
    };
    let Some(choice) = chunk.choices.into_iter().next() else {
        return ChunkData::Skip;
    };
    match choice.delta.content {
        Some(content) if !content.is_empty() => ChunkData::Text(content),
        _ if choice.finish_reason.is_some() => ChunkData::Finished(choice.finish_reason),
        _ => ChunkData::Skip,
    }
}
