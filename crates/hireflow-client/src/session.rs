//! Stream session: one request/stream lifecycle per turn

use std::sync::Arc;

use futures::StreamExt;
use hireflow_core::{ConversationState, END_NODE, Message, START_NODE, Transition, decode, reduce};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::events::{Notification, NotificationLevel, SessionEvent, SessionPhase};
use crate::handle::SessionHandle;
use crate::transport::{
    ChatRequest, InterruptResponse, SseTransport, Transport, TransportEvent, TransportStream,
};

/// Message sent for an interrupt reply when the conversation has no user message yet
const INTERRUPT_FALLBACK_MESSAGE: &str = "Hi";

/// Default capacity of the session event channel
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// What the user typed for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnInput {
    pub text: String,
    /// Reply to an agent paused mid-workflow rather than a fresh message
    pub interrupt: bool,
}

impl TurnInput {
    /// A plain chat message
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            interrupt: false,
        }
    }

    /// A reply to an interrupted workflow
    pub fn interrupt(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            interrupt: true,
        }
    }
}

/// Drives one conversation: opens a stream per turn and folds its frames
/// into [`ConversationState`].
pub struct StreamSession {
    transport: Arc<dyn Transport>,
    state: ConversationState,
    phase: SessionPhase,
    event_tx: broadcast::Sender<SessionEvent>,
    handle: SessionHandle,
    /// Bot message of the turn that last started, until it reaches a terminal phase
    current_bot_id: Option<String>,
}

impl StreamSession {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_event_capacity(transport, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_event_capacity(transport: Arc<dyn Transport>, capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            transport,
            state: ConversationState::new(),
            phase: SessionPhase::Idle,
            event_tx,
            handle: SessionHandle::new(),
            current_bot_id: None,
        }
    }

    /// Create a session streaming over SSE as described by `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = SseTransport::new(config.clone())?;
        Ok(Self::with_event_capacity(
            Arc::new(transport),
            config.event_capacity,
        ))
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Get a cloneable handle for cancelling from another task
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Cancel the running turn.
    ///
    /// Idempotent. A running `start` notices before the next frame. When the
    /// `start` future was dropped mid-turn, this also settles the session so a
    /// new turn can begin.
    pub fn cancel(&mut self) {
        self.handle.cancel();
        if self.phase.is_active() {
            tracing::debug!("Settling turn abandoned in phase {:?}", self.phase);
            self.abort_turn();
            self.handle.end_run();
        }
    }

    /// Start a new conversation. The candidate registry is kept.
    pub fn reset_conversation(&mut self) -> Result<()> {
        if self.phase.is_active() {
            return Err(Error::TurnInProgress);
        }
        self.state.reset();
        self.current_bot_id = None;
        self.publish_state();
        self.set_phase(SessionPhase::Idle);
        Ok(())
    }

    /// Run one turn to a terminal phase.
    ///
    /// Returns `Err` when a turn is already running or the transport could not
    /// be created; every stream outcome, including fatal ones, is reported as
    /// the returned phase.
    pub async fn start(&mut self, input: TurnInput) -> Result<SessionPhase> {
        if self.phase.is_active() {
            return Err(Error::TurnInProgress);
        }

        let request = self.build_request(&input);
        let bot_id = Uuid::new_v4().to_string();
        self.state.begin_turn(
            Message::user(Uuid::new_v4().to_string(), input.text),
            Message::bot_placeholder(bot_id.clone()),
        );
        self.current_bot_id = Some(bot_id.clone());

        let cancel = self.handle.begin_run();
        self.set_phase(SessionPhase::Opening);
        self.publish_state();

        let result = self.run_turn(request, &bot_id, cancel).await;
        self.handle.end_run();
        result
    }

    fn build_request(&self, input: &TurnInput) -> ChatRequest {
        let conversation_id = self.state.conversation_id.clone();
        if input.interrupt {
            let message = self
                .state
                .first_user_text()
                .unwrap_or(INTERRUPT_FALLBACK_MESSAGE)
                .to_string();
            ChatRequest {
                message,
                conversation_id,
                interrupt_response: Some(InterruptResponse {
                    message: input.text.clone(),
                }),
            }
        } else {
            ChatRequest {
                message: input.text.clone(),
                conversation_id,
                interrupt_response: None,
            }
        }
    }

    async fn run_turn(
        &mut self,
        request: ChatRequest,
        bot_id: &str,
        cancel: CancellationToken,
    ) -> Result<SessionPhase> {
        let mut stream: TransportStream = match self.transport.open(request, cancel.clone()).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("Failed to open chat stream: {}", e);
                self.fail_turn(bot_id, e.to_string());
                return Err(e);
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Turn cancelled");
                    self.abort_turn();
                    return Ok(self.phase);
                }
                next = stream.next() => next,
            };

            // The token may fire while the transport is producing this item
            if cancel.is_cancelled() {
                tracing::debug!("Discarding stream event received after cancel");
                self.abort_turn();
                return Ok(self.phase);
            }

            let Some(event) = next else {
                return Ok(self.finish_unterminated(bot_id));
            };

            match event {
                TransportEvent::Opened => {
                    if self.phase == SessionPhase::Opening {
                        self.state.visited_nodes.append(START_NODE);
                        self.set_phase(SessionPhase::Streaming);
                        self.publish_state();
                    } else {
                        tracing::debug!("Stream reopened in phase {:?}", self.phase);
                    }
                }

                TransportEvent::Failed(failure) if failure.is_retryable() => {
                    self.notify(NotificationLevel::Retryable, failure.to_string());
                }

                TransportEvent::Failed(failure) => {
                    self.notify(NotificationLevel::Fatal, failure.to_string());
                    cancel.cancel();
                    self.fail_turn(bot_id, failure.to_string());
                    return Ok(self.phase);
                }

                TransportEvent::Frame(frame) => {
                    let Some(decoded) = decode(&frame) else {
                        continue;
                    };
                    tracing::trace!("Applying {} event", decoded.name());

                    match reduce(&mut self.state, decoded, bot_id) {
                        Transition::Continue => self.publish_state(),
                        Transition::Completed => {
                            cancel.cancel();
                            self.state.visited_nodes.append(END_NODE);
                            self.current_bot_id = None;
                            self.publish_state();
                            self.set_phase(SessionPhase::Closed);
                            let _ = self.event_tx.send(SessionEvent::TurnCompleted {
                                message_id: bot_id.to_string(),
                            });
                            return Ok(self.phase);
                        }
                        Transition::Failed => {
                            cancel.cancel();
                            self.abort_turn();
                            return Ok(self.phase);
                        }
                    }
                }
            }
        }
    }

    /// The stream ended without `done`
    fn finish_unterminated(&mut self, bot_id: &str) -> SessionPhase {
        if self.phase == SessionPhase::Opening {
            tracing::warn!("Chat stream ended before it opened");
            let reason = "The chat stream could not be opened".to_string();
            self.notify(NotificationLevel::Fatal, reason.clone());
            self.fail_turn(bot_id, reason);
        } else {
            tracing::warn!("Chat stream ended without done");
            self.state.finalize(bot_id);
            self.current_bot_id = None;
            self.publish_state();
            self.set_phase(SessionPhase::Closed);
        }
        self.phase
    }

    /// Finalize the in-flight bot message and move to `Aborted`
    fn abort_turn(&mut self) {
        if let Some(id) = self.current_bot_id.take() {
            self.state.finalize(&id);
            self.publish_state();
        }
        self.set_phase(SessionPhase::Aborted);
    }

    /// Mark the bot message as failed and move to `Errored`
    fn fail_turn(&mut self, bot_id: &str, reason: String) {
        if let Some(message) = self.state.message_mut(bot_id) {
            message.text = reason;
            message.is_error = true;
            message.finalize();
        }
        self.current_bot_id = None;
        self.publish_state();
        self.set_phase(SessionPhase::Errored);
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase == phase {
            return;
        }
        tracing::debug!("Session phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        let _ = self.event_tx.send(SessionEvent::PhaseChanged { phase });
    }

    fn publish_state(&self) {
        let _ = self.event_tx.send(SessionEvent::StateUpdated {
            state: self.state.clone(),
        });
    }

    fn notify(&self, level: NotificationLevel, message: String) {
        let _ = self
            .event_tx
            .send(SessionEvent::Notification(Notification { level, message }));
    }
}
