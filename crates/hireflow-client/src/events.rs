//! Session event types

use hireflow_core::ConversationState;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a stream session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No turn has run yet, or the conversation was reset
    #[default]
    Idle,
    /// Request sent, waiting for the stream to open
    Opening,
    /// Stream open, frames flowing
    Streaming,
    /// Turn finished with `done` or the server closed the stream
    Closed,
    /// Turn cancelled by the caller or by an agent-reported error
    Aborted,
    /// Turn failed to open
    Errored,
}

impl SessionPhase {
    /// Whether a turn is opening or streaming
    pub fn is_active(&self) -> bool {
        matches!(self, SessionPhase::Opening | SessionPhase::Streaming)
    }
}

/// Severity of a notification raised to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// The transport may try again
    Retryable,
    /// The turn cannot succeed; no retry
    Fatal,
}

/// Toast-style notice for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Events emitted by a stream session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session moved to a new phase
    PhaseChanged { phase: SessionPhase },

    /// Conversation state after one applied frame or bookkeeping step
    StateUpdated { state: ConversationState },

    /// Something the user should be told about
    Notification(Notification),

    /// A turn completed with `done`
    TurnCompleted { message_id: String },
}
