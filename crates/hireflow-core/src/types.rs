//! Core types for the agent chat protocol

use serde::{Deserialize, Serialize};

use crate::think::{SplitMessage, split_thoughts};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    /// Get the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }
}

/// A stored file referenced by an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub original_filename: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub content_length: u64,
}

/// A candidate (person record) surfaced by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub years_of_experience: f64,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Free-form experience entries (company, role, period, ...)
    #[serde(default)]
    pub experiences: Vec<serde_json::Value>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub knowledge_base_document_id: Option<String>,
}

impl Candidate {
    /// Create a candidate with only an identifier and a name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            contact: None,
            years_of_experience: 0.0,
            skills: vec![],
            experiences: vec![],
            certifications: vec![],
            knowledge_base_document_id: None,
        }
    }
}

/// Candidate returned by a structured search, with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Knowledge-base document a resume candidate was extracted from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Candidate found by resume retrieval, with the matching resume chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(default)]
    pub chunks: Vec<serde_json::Value>,
    #[serde(default)]
    pub knowledge_base_document: Option<KnowledgeBaseDocument>,
}

impl AsRef<Candidate> for Candidate {
    fn as_ref(&self) -> &Candidate {
        self
    }
}

impl AsRef<Candidate> for ScoredCandidate {
    fn as_ref(&self) -> &Candidate {
        &self.candidate
    }
}

impl AsRef<Candidate> for ResumeCandidate {
    fn as_ref(&self) -> &Candidate {
        &self.candidate
    }
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Caller-assigned identifier, unique within the conversation
    pub id: String,
    pub role: Role,
    /// Raw text as received; may contain think markers for bot messages
    pub text: String,
    /// Reasoning delivered separately from the answer text
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub citations: Option<Vec<FileRef>>,
    #[serde(default)]
    pub candidates: Option<Vec<ScoredCandidate>>,
    #[serde(default)]
    pub resume_candidates: Option<Vec<ResumeCandidate>>,
    #[serde(default)]
    pub created_at: i64,
}

impl Message {
    /// Create a user message
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            text: text.into(),
            reason: None,
            is_loading: false,
            is_streaming: false,
            is_error: false,
            citations: None,
            candidates: None,
            resume_candidates: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create an empty bot placeholder waiting for its first event
    pub fn bot_placeholder(id: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            is_loading: true,
            ..Self::user(id, "")
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Whether this message is still receiving events
    pub fn is_in_flight(&self) -> bool {
        self.is_loading || self.is_streaming
    }

    /// Mark the message as no longer receiving events
    pub fn finalize(&mut self) {
        self.is_loading = false;
        self.is_streaming = false;
    }

    /// Split the raw text into visible content and thought.
    ///
    /// User text is never split.
    pub fn split(&self) -> SplitMessage {
        if self.is_user() {
            return SplitMessage::verbatim(Some(self.text.as_str()));
        }
        split_thoughts(Some(self.text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_placeholder_is_loading() {
        let msg = Message::bot_placeholder("b1");
        assert_eq!(msg.role, Role::Bot);
        assert!(msg.is_loading);
        assert!(!msg.is_streaming);
        assert_eq!(msg.text, "");
        assert!(msg.is_in_flight());
    }

    #[test]
    fn test_finalize_clears_flags() {
        let mut msg = Message::bot_placeholder("b1");
        msg.is_streaming = true;
        msg.finalize();
        assert!(!msg.is_in_flight());
    }

    #[test]
    fn test_user_text_is_not_split() {
        let msg = Message::user("u1", "<think>not a thought</think>hi");
        let split = msg.split();
        assert_eq!(split.content.as_deref(), Some("<think>not a thought</think>hi"));
        assert_eq!(split.thought, None);
        assert!(!split.is_thinking);
    }

    #[test]
    fn test_bot_text_is_split() {
        let mut msg = Message::bot_placeholder("b1");
        msg.text = "<think>hmm</think>answer".into();
        let split = msg.split();
        assert_eq!(split.content.as_deref(), Some("answer"));
        assert_eq!(split.thought.as_deref(), Some("hmm"));
    }

    #[test]
    fn test_scored_candidate_decodes_partial_payload() {
        let json = r#"{"id": "c1", "name": "Ada", "skills": ["rust"], "score": 0.92}"#;
        let c: ScoredCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.candidate.id, "c1");
        assert_eq!(c.candidate.skills, vec!["rust".to_string()]);
        assert_eq!(c.score, Some(0.92));
        assert_eq!(c.as_ref().name, "Ada");
    }

    #[test]
    fn test_resume_candidate_decodes_document() {
        let json = r#"{
            "id": "c2",
            "email": "x@example.com",
            "chunks": ["led a team"],
            "knowledge_base_document": {"content": "resume body"}
        }"#;
        let c: ResumeCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.candidate.email, "x@example.com");
        assert_eq!(c.chunks.len(), 1);
        assert_eq!(
            c.knowledge_base_document.and_then(|d| d.content).as_deref(),
            Some("resume body")
        );
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Bot).unwrap(), "\"bot\"");
        assert_eq!(Role::User.as_str(), "user");
    }
}
