//! Conversation-wide registry of candidates seen so far

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::Candidate;

/// Candidates keyed by identifier, in first-seen order.
///
/// Plain and resume candidates share one identifier namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Candidate>", into = "Vec<Candidate>")]
pub struct CandidateRegistry {
    entries: Vec<Candidate>,
    ids: HashSet<String>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every incoming candidate whose id has not been seen yet.
    ///
    /// Existing entries are never removed or reordered. Returns how many
    /// entries were added.
    pub fn merge<'a, I, C>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = &'a C>,
        C: AsRef<Candidate> + 'a,
    {
        let before = self.entries.len();
        for candidate in incoming {
            let candidate = candidate.as_ref();
            if self.ids.insert(candidate.id.clone()) {
                self.entries.push(candidate.clone());
            }
        }
        self.entries.len() - before
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        if !self.ids.contains(id) {
            return None;
        }
        self.entries.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }
}

impl From<Vec<Candidate>> for CandidateRegistry {
    fn from(entries: Vec<Candidate>) -> Self {
        let mut registry = Self::new();
        registry.merge(&entries);
        registry
    }
}

impl From<CandidateRegistry> for Vec<Candidate> {
    fn from(registry: CandidateRegistry) -> Self {
        registry.entries
    }
}

/// Merge `incoming` into a copy of `existing`, keeping first-seen order
pub fn merge_candidates(existing: &[Candidate], incoming: &[Candidate]) -> Vec<Candidate> {
    let mut registry = CandidateRegistry::from(existing.to_vec());
    registry.merge(incoming);
    registry.into()
}
