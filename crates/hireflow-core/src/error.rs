//! Error types for hireflow-core

use thiserror::Error;

/// Reasons a frame could not be turned into an event
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Event name outside the known set
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// JSON payload did not match the expected shape
    #[error("Invalid '{event}' payload: {source}")]
    Payload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// JSON payload carried no usable text
    #[error("'{event}' payload has no text")]
    MissingText { event: &'static str },
}

impl DecodeError {
    /// Unknown events are expected from newer backends and are not worth a warning
    pub fn is_unknown_event(&self) -> bool {
        matches!(self, DecodeError::UnknownEvent(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            DecodeError::UnknownEvent("ping".into()).to_string(),
            "Unknown event: ping"
        );
        assert_eq!(
            DecodeError::MissingText { event: "reason" }.to_string(),
            "'reason' payload has no text"
        );
    }

    #[test]
    fn test_payload_error_names_event() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let e = DecodeError::Payload {
            event: "citations",
            source,
        };
        assert!(e.to_string().starts_with("Invalid 'citations' payload"));
        assert!(!e.is_unknown_event());
    }
}
