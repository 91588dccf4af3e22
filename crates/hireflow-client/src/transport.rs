//! Transport abstraction for the agent chat stream

use std::pin::Pin;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use hireflow_core::{AgentWorkflow, Frame};
use reqwest::header::ACCEPT;
use reqwest_eventsource::{Event, EventSource, retry::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, RetryConfig};
use crate::error::{Error, Result};

/// Body of a chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupt_response: Option<InterruptResponse>,
}

/// Reply to an agent paused mid-workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptResponse {
    pub message: String,
}

/// Why the stream could not be opened or was lost
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Server answered with a non-success status
    #[error("Server responded with status {0}")]
    Status(u16),

    /// Server answered with something other than an event stream
    #[error("Unexpected content type: {0}")]
    ContentType(String),

    /// Connection or stream parsing failure
    #[error("Connection error: {0}")]
    Network(String),
}

impl TransportFailure {
    /// Client errors other than 429 will fail the same way on every retry
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportFailure::Status(status) => !(400..500).contains(status) || *status == 429,
            TransportFailure::ContentType(_) | TransportFailure::Network(_) => true,
        }
    }
}

impl From<&reqwest_eventsource::Error> for TransportFailure {
    fn from(error: &reqwest_eventsource::Error) -> Self {
        match error {
            reqwest_eventsource::Error::InvalidStatusCode(status, _) => {
                TransportFailure::Status(status.as_u16())
            }
            reqwest_eventsource::Error::InvalidContentType(value, _) => {
                TransportFailure::ContentType(value.to_str().unwrap_or("<non-ascii>").to_string())
            }
            other => TransportFailure::Network(other.to_string()),
        }
    }
}

/// Events produced by a transport while a turn is open
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The stream is open with the expected content type
    Opened,
    /// One named frame
    Frame(Frame),
    /// Open or stream failure
    Failed(TransportFailure),
}

/// A stream of transport events
pub type TransportStream = Pin<Box<dyn Stream<Item = TransportEvent> + Send>>;

/// Transport delivering the frames of one turn
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the stream for `request`.
    ///
    /// The returned stream ends once `cancel` fires, after a fatal failure, or
    /// when the server closes the stream and no retry is attempted.
    async fn open(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<TransportStream>;
}

/// Server-sent events over HTTP
pub struct SseTransport {
    client: reqwest::Client,
    config: ClientConfig,
    retry_config: RetryConfig,
}

impl SseTransport {
    /// Create a transport for `config`
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let retry_config = config.retry_config();
        Ok(Self {
            client: reqwest::Client::new(),
            config,
            retry_config,
        })
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Fetch the agent's workflow graph
    pub async fn fetch_workflow(&self) -> Result<AgentWorkflow> {
        let url = self.config.workflow_url();
        tracing::debug!("Fetching workflow from {}", url);

        let body = self
            .authorize(self.client.get(&url))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn backoff(retry: &RetryConfig) -> ExponentialBackoff {
    ExponentialBackoff::new(
        retry.initial_delay,
        retry.backoff_multiplier,
        Some(retry.max_delay),
        Some(retry.max_retries as usize),
    )
}

#[async_trait]
impl Transport for SseTransport {
    async fn open(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<TransportStream> {
        let url = self.config.chat_url();
        tracing::debug!(
            "Opening chat stream at {} (conversation: {:?}, interrupt: {})",
            url,
            request.conversation_id,
            request.interrupt_response.is_some()
        );

        let request_builder = self
            .authorize(self.client.post(&url))
            .header(ACCEPT, "text/event-stream")
            .json(&request);

        let mut event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;
        event_source.set_retry_policy(Box::new(backoff(&self.retry_config)));

        Ok(Box::pin(create_stream(event_source, cancel)))
    }
}

/// Create the transport stream from SSE events
fn create_stream(
    mut event_source: EventSource,
    cancel: CancellationToken,
) -> impl Stream<Item = TransportEvent> {
    stream! {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Chat stream cancelled");
                    break;
                }
                next = event_source.next() => next,
            };

            let Some(result) = next else {
                break;
            };

            match result {
                Ok(Event::Open) => yield TransportEvent::Opened,
                Ok(Event::Message(message)) => {
                    let id = (!message.id.is_empty()).then_some(message.id);
                    yield TransportEvent::Frame(Frame {
                        event: message.event,
                        data: message.data,
                        id,
                    });
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    tracing::debug!("Server closed the chat stream");
                    break;
                }
                Err(e) => {
                    let failure = TransportFailure::from(&e);
                    let retryable = failure.is_retryable();
                    tracing::warn!("Chat stream failed (retryable: {}): {}", retryable, e);
                    yield TransportEvent::Failed(failure);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        event_source.close();
    }
}
