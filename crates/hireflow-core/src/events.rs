//! Decoding named stream frames into typed events

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::types::{FileRef, ResumeCandidate, ScoredCandidate};

/// Wire names of the events the backend emits
pub mod names {
    pub const CONVERSATION_ID: &str = "conversationId";
    pub const CITATIONS: &str = "citations";
    pub const CANDIDATES: &str = "candidates";
    pub const RESUME_CANDIDATES: &str = "resume_candidates";
    pub const MESSAGE: &str = "message";
    pub const REASON: &str = "reason";
    pub const NODE: &str = "node";
    pub const ERROR: &str = "error";
    pub const DONE: &str = "done";
}

/// One raw server-sent event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name
    pub event: String,
    /// Payload, raw string or JSON depending on the event
    pub data: String,
    /// SSE `id` field, kept for diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
            id: None,
        }
    }
}

/// Events decoded from the agent stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DecodedEvent {
    /// Identifier of the conversation this turn belongs to
    ConversationId(String),
    /// Files cited by the addressed message
    Citations(Vec<FileRef>),
    /// Candidates found for the addressed message
    Candidates(Vec<ScoredCandidate>),
    /// Candidates found through resume retrieval
    ResumeCandidates(Vec<ResumeCandidate>),
    /// Full answer text so far
    Message { text: String },
    /// Full reasoning text so far
    Reason { text: String },
    /// Workflow node the agent just entered
    Node(String),
    /// Agent-reported failure
    Error(String),
    /// End of the turn
    Done,
}

impl DecodedEvent {
    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            DecodedEvent::ConversationId(_) => names::CONVERSATION_ID,
            DecodedEvent::Citations(_) => names::CITATIONS,
            DecodedEvent::Candidates(_) => names::CANDIDATES,
            DecodedEvent::ResumeCandidates(_) => names::RESUME_CANDIDATES,
            DecodedEvent::Message { .. } => names::MESSAGE,
            DecodedEvent::Reason { .. } => names::REASON,
            DecodedEvent::Node(_) => names::NODE,
            DecodedEvent::Error(_) => names::ERROR,
            DecodedEvent::Done => names::DONE,
        }
    }
}

/// Decode a frame, dropping anything that cannot be decoded.
///
/// Failures are logged and never reach the caller.
pub fn decode(frame: &Frame) -> Option<DecodedEvent> {
    match try_decode(frame) {
        Ok(event) => Some(event),
        Err(e) if e.is_unknown_event() => {
            tracing::trace!("Dropping frame: {}", e);
            None
        }
        Err(e) => {
            tracing::warn!("Dropping undecodable frame: {}", e);
            None
        }
    }
}

/// Decode a frame, reporting why it could not be decoded
pub fn try_decode(frame: &Frame) -> Result<DecodedEvent, DecodeError> {
    let data = frame.data.as_str();
    match frame.event.as_str() {
        names::CONVERSATION_ID => Ok(DecodedEvent::ConversationId(data.to_string())),
        names::CITATIONS => parse_list(names::CITATIONS, data).map(DecodedEvent::Citations),
        names::CANDIDATES => parse_list(names::CANDIDATES, data).map(DecodedEvent::Candidates),
        names::RESUME_CANDIDATES => {
            parse_list(names::RESUME_CANDIDATES, data).map(DecodedEvent::ResumeCandidates)
        }
        names::MESSAGE => {
            parse_text(names::MESSAGE, data).map(|text| DecodedEvent::Message { text })
        }
        names::REASON => parse_text(names::REASON, data).map(|text| DecodedEvent::Reason { text }),
        names::NODE => Ok(DecodedEvent::Node(data.to_string())),
        names::ERROR => Ok(DecodedEvent::Error(data.to_string())),
        names::DONE => Ok(DecodedEvent::Done),
        other => Err(DecodeError::UnknownEvent(other.to_string())),
    }
}

fn parse_list<T>(event: &'static str, data: &str) -> Result<Vec<T>, DecodeError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(data).map_err(|source| DecodeError::Payload { event, source })
}

/// Extract the text of a `{text}` payload.
///
/// A bare JSON string is accepted too. Any other payload that is not an
/// object is used as the text verbatim.
fn parse_text(event: &'static str, data: &str) -> Result<String, DecodeError> {
    let value = match serde_json::from_str::<serde_json::Value>(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("'{}' payload is not JSON ({}), using raw text", event, e);
            return Ok(data.to_string());
        }
    };

    match value {
        serde_json::Value::Object(mut obj) => match obj.remove("text") {
            Some(serde_json::Value::String(text)) => Ok(text),
            Some(serde_json::Value::Null) | None => Err(DecodeError::MissingText { event }),
            Some(other) => Ok(other.to_string()),
        },
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Null => Err(DecodeError::MissingText { event }),
        _ => Ok(data.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_is_raw() {
        let ev = decode(&Frame::new("conversationId", "c1")).unwrap();
        assert_eq!(ev, DecodedEvent::ConversationId("c1".into()));
    }

    #[test]
    fn test_message_object() {
        let ev = decode(&Frame::new("message", r#"{"text":"Hello"}"#)).unwrap();
        assert_eq!(ev, DecodedEvent::Message { text: "Hello".into() });
    }

    #[test]
    fn test_reason_object() {
        let ev = decode(&Frame::new("reason", r#"{"text":"because"}"#)).unwrap();
        assert_eq!(ev, DecodedEvent::Reason { text: "because".into() });
    }

    #[test]
    fn test_message_non_json_falls_back_to_raw() {
        let ev = decode(&Frame::new("message", "plain words")).unwrap();
        assert_eq!(ev, DecodedEvent::Message { text: "plain words".into() });
    }

    #[test]
    fn test_message_bare_json_string() {
        let ev = decode(&Frame::new("message", r#""quoted""#)).unwrap();
        assert_eq!(ev, DecodedEvent::Message { text: "quoted".into() });
    }

    #[test]
    fn test_message_without_text_is_dropped() {
        let frame = Frame::new("message", r#"{"other": 1}"#);
        assert!(matches!(
            try_decode(&frame),
            Err(DecodeError::MissingText { event: "message" })
        ));
        assert!(decode(&frame).is_none());
    }

    #[test]
    fn test_candidates_array() {
        let ev = decode(&Frame::new(
            "candidates",
            r#"[{"id":"x","name":"Ada","score":0.5},{"id":"y"}]"#,
        ))
        .unwrap();
        match ev {
            DecodedEvent::Candidates(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[0].candidate.id, "x");
                assert_eq!(list[0].score, Some(0.5));
                assert_eq!(list[1].score, None);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_resume_candidates_array() {
        let ev = decode(&Frame::new("resume_candidates", r#"[{"id":"x","chunks":[]}]"#)).unwrap();
        assert!(matches!(ev, DecodedEvent::ResumeCandidates(ref l) if l[0].candidate.id == "x"));
        assert_eq!(ev.name(), "resume_candidates");
    }

    #[test]
    fn test_citations_array() {
        let ev = decode(&Frame::new(
            "citations",
            r#"[{"id":"f1","original_filename":"cv.pdf"}]"#,
        ))
        .unwrap();
        match ev {
            DecodedEvent::Citations(files) => assert_eq!(files[0].original_filename, "cv.pdf"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_malformed_array_is_dropped() {
        let frame = Frame::new("candidates", "[{not json");
        assert!(matches!(
            try_decode(&frame),
            Err(DecodeError::Payload { event: "candidates", .. })
        ));
        assert!(decode(&frame).is_none());
    }

    #[test]
    fn test_node_error_done() {
        assert_eq!(
            decode(&Frame::new("node", "retrieve")),
            Some(DecodedEvent::Node("retrieve".into()))
        );
        assert_eq!(
            decode(&Frame::new("error", "boom")),
            Some(DecodedEvent::Error("boom".into()))
        );
        let done = decode(&Frame::new("done", "whatever")).unwrap();
        assert_eq!(done, DecodedEvent::Done);
    }

    #[test]
    fn test_unknown_event_is_dropped() {
        let frame = Frame::new("heartbeat", "");
        assert!(matches!(
            try_decode(&frame),
            Err(DecodeError::UnknownEvent(ref n)) if n == "heartbeat"
        ));
        assert!(decode(&frame).is_none());
    }

    #[test]
    fn test_event_names_round_trip() {
        let events = [
            DecodedEvent::ConversationId("c".into()),
            DecodedEvent::Node("n".into()),
            DecodedEvent::Error("e".into()),
            DecodedEvent::Done,
        ];
        for ev in events {
            let frame = Frame::new(ev.name(), "c");
            assert_eq!(try_decode(&frame).unwrap().name(), ev.name());
        }
    }
}
