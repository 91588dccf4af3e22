//! hireflow-core: protocol logic for the hireflow agent chat stream
//!
//! This crate turns the named frames of one agent turn into typed events and
//! folds them into conversation state. It has no I/O and no async runtime;
//! the session and transport live in `hireflow-client`.

pub mod conversation;
pub mod error;
pub mod events;
pub mod reducer;
pub mod registry;
pub mod think;
pub mod trail;
pub mod types;
pub mod workflow;

pub use conversation::ConversationState;
pub use error::DecodeError;
pub use events::{DecodedEvent, Frame, decode, try_decode};
pub use reducer::{Transition, reduce};
pub use registry::{CandidateRegistry, merge_candidates};
pub use think::{SplitMessage, split_thoughts};
pub use trail::{END_NODE, NodeTrail, START_NODE};
pub use types::*;
pub use workflow::{AgentWorkflow, WorkflowEdge, WorkflowGraph, WorkflowNode};
