//! Trail of workflow nodes visited during a turn

use serde::{Deserialize, Serialize};

/// Sentinel node appended when the stream opens
pub const START_NODE: &str = "__start__";
/// Sentinel node appended when the turn completes
pub const END_NODE: &str = "__end__";

/// Ordered workflow nodes visited by the agent.
///
/// No two consecutive entries are equal; a node may reappear later when the
/// workflow loops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeTrail(Vec<String>);

impl NodeTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `node` unless it repeats the last entry.
    ///
    /// Returns whether the trail changed.
    pub fn append(&mut self, node: &str) -> bool {
        if self.last() == Some(node) {
            return false;
        }
        self.0.push(node.to_string());
        true
    }

    /// Forget every visited node
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.0.iter().any(|n| n == node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Consecutive (from, to) steps taken along the trail
    pub fn steps(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.windows(2).map(|w| (w[0].as_str(), w[1].as_str()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for NodeTrail {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut trail = NodeTrail::new();
        for node in iter {
            let node: String = node.into();
            trail.append(&node);
        }
        trail
    }
}
