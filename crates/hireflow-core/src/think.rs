//! Splitting inline `<think>` spans out of streamed answer text
//!
//! Reasoning models interleave their chain of thought with the answer using
//! literal marker tags. The text arrives as one growing buffer, so the split
//! is recomputed from scratch on every snapshot and never holds state.

use serde::{Deserialize, Serialize};

/// Opening marker of a thought span
pub const THINK_OPEN: &str = "<think>";
/// Closing marker of a thought span
pub const THINK_CLOSE: &str = "</think>";

/// A message's raw text decomposed into visible content and thought
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitMessage {
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    /// The buffer currently ends inside an unclosed thought
    #[serde(default)]
    pub is_thinking: bool,
}

impl SplitMessage {
    /// Return the raw text unchanged as content
    pub fn verbatim(raw: Option<&str>) -> Self {
        Self {
            content: raw.map(str::to_owned),
            thought: None,
            is_thinking: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Content,
    Thought,
}

/// Split `raw` into visible content and thought.
///
/// Without any closing marker the text is returned untouched, so a dangling
/// opening marker on partial data never shows up as an endless thought.
pub fn split_thoughts(raw: Option<&str>) -> SplitMessage {
    let Some(raw) = raw else {
        return SplitMessage::verbatim(None);
    };

    let Some(first_close) = raw.find(THINK_CLOSE) else {
        return SplitMessage::verbatim(Some(raw));
    };

    // A closing marker before any opening marker means the thought was
    // already open at the start of the buffer.
    let mut region = match raw.find(THINK_OPEN) {
        Some(first_open) if first_open < first_close => Region::Content,
        _ => Region::Thought,
    };

    let mut content = String::with_capacity(raw.len());
    let mut thought = String::new();
    let mut rest = raw;

    loop {
        match region {
            Region::Content => match rest.split_once(THINK_OPEN) {
                Some((visible, after)) => {
                    content.push_str(visible);
                    rest = after;
                    region = Region::Thought;
                }
                None => {
                    content.push_str(rest);
                    break;
                }
            },
            Region::Thought => match rest.split_once(THINK_CLOSE) {
                Some((thinking, after)) => {
                    thought.push_str(thinking);
                    rest = after;
                    region = Region::Content;
                }
                None => {
                    thought.push_str(rest);
                    break;
                }
            },
        }
    }

    SplitMessage {
        content: Some(content),
        thought: Some(thought),
        is_thinking: region == Region::Thought,
    }
}
