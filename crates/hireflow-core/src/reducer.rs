//! Folding decoded events into conversation state

use crate::conversation::ConversationState;
use crate::events::DecodedEvent;
use crate::types::{Message, Role};

/// What the session should do after an event was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep reading frames
    Continue,
    /// The turn finished normally
    Completed,
    /// The agent reported a failure; the stream should be aborted
    Failed,
}

/// Apply `event` to `state`, patching only the message identified by `target`.
pub fn reduce(state: &mut ConversationState, event: DecodedEvent, target: &str) -> Transition {
    match event {
        DecodedEvent::ConversationId(id) => {
            match state.conversation_id.as_deref() {
                Some(previous) if previous != id => {
                    tracing::debug!("Conversation id changed from {} to {}", previous, id);
                }
                _ => {}
            }
            state.conversation_id = Some(id);
            Transition::Continue
        }

        DecodedEvent::Citations(files) => {
            patch(state, target, |m| m.citations = Some(files));
            Transition::Continue
        }

        DecodedEvent::Candidates(candidates) => {
            state.candidates.merge(&candidates);
            patch(state, target, |m| m.candidates = Some(candidates));
            Transition::Continue
        }

        DecodedEvent::ResumeCandidates(candidates) => {
            state.candidates.merge(&candidates);
            patch(state, target, |m| m.resume_candidates = Some(candidates));
            Transition::Continue
        }

        DecodedEvent::Message { text } => {
            patch(state, target, |m| {
                m.text = text;
                m.role = Role::Bot;
                m.is_loading = false;
                m.is_streaming = true;
            });
            Transition::Continue
        }

        DecodedEvent::Reason { text } => {
            patch(state, target, |m| {
                m.reason = Some(text);
                m.role = Role::Bot;
                m.is_loading = false;
                m.is_streaming = true;
            });
            Transition::Continue
        }

        DecodedEvent::Node(node) => {
            state.visited_nodes.append(&node);
            Transition::Continue
        }

        DecodedEvent::Error(message) => {
            // Still streaming until the stream is torn down
            patch(state, target, |m| {
                m.text = message;
                m.is_loading = false;
                m.is_streaming = true;
                m.is_error = true;
            });
            Transition::Failed
        }

        DecodedEvent::Done => {
            patch(state, target, |m| m.is_streaming = false);
            Transition::Completed
        }
    }
}

fn patch(state: &mut ConversationState, target: &str, f: impl FnOnce(&mut Message)) {
    match state.message_mut(target) {
        Some(message) => f(message),
        None => tracing::debug!("No message with id {} to update", target),
    }
}
