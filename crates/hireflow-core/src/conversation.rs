//! Conversation state: messages, conversation id, visited nodes and candidates.

use serde::{Deserialize, Serialize};

use crate::registry::CandidateRegistry;
use crate::trail::NodeTrail;
use crate::types::{Message, Role};

/// State of one conversation as seen by the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Messages in chat order
    pub messages: Vec<Message>,
    /// Backend conversation identifier, once announced
    pub conversation_id: Option<String>,
    /// Workflow nodes visited during the current turn
    pub visited_nodes: NodeTrail,
    /// Every candidate seen, across turns and conversation resets
    pub candidates: CandidateRegistry,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new turn: the user message and its bot placeholder.
    ///
    /// The node trail starts over for every turn.
    pub fn begin_turn(&mut self, user: Message, bot: Message) {
        self.visited_nodes.clear();
        self.messages.push(user);
        self.messages.push(bot);
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Text of the first user message of the conversation
    pub fn first_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.text.as_str())
    }

    /// Stop a message from waiting on further events.
    ///
    /// Returns false when no message has that id.
    pub fn finalize(&mut self, id: &str) -> bool {
        match self.message_mut(id) {
            Some(message) => {
                message.finalize();
                true
            }
            None => false,
        }
    }

    /// Start a new conversation. Candidates are kept.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.conversation_id = None;
    }
}
