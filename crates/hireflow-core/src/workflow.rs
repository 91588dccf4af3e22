//! Agent workflow graph, as published by the backend

use serde::{Deserialize, Serialize};

use crate::trail::NodeTrail;

/// Workflow description: a mermaid rendering plus the raw graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentWorkflow {
    #[serde(default)]
    pub mermaid: String,
    pub state: WorkflowGraph,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

/// A graph node; `data` is a schema name or a runnable description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub conditional: bool,
}

impl WorkflowGraph {
    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    /// Edges of the graph that `trail` walked along, in walk order, each once
    pub fn visited_edges(&self, trail: &NodeTrail) -> Vec<&WorkflowEdge> {
        let mut visited: Vec<&WorkflowEdge> = vec![];
        for (source, target) in trail.steps() {
            let edge = self
                .edges
                .iter()
                .find(|e| e.source == source && e.target == target);
            if let Some(edge) = edge {
                if !visited.iter().any(|v| std::ptr::eq(*v, edge)) {
                    visited.push(edge);
                }
            }
        }
        visited
    }
}

impl AgentWorkflow {
    pub fn visited_edges(&self, trail: &NodeTrail) -> Vec<&WorkflowEdge> {
        self.state.visited_edges(trail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::{END_NODE, START_NODE};

    fn workflow() -> AgentWorkflow {
        serde_json::from_str(
            r#"{
                "mermaid": "graph TD;",
                "state": {
                    "nodes": [
                        {"id": "__start__", "type": "schema", "data": "__start__"},
                        {"id": "chatbot", "type": "runnable", "data": {"id": ["x"], "name": "chatbot"}},
                        {"id": "tools", "type": "runnable", "data": {"id": ["y"], "name": "tools"}},
                        {"id": "__end__", "type": "schema", "data": "__end__"}
                    ],
                    "edges": [
                        {"source": "__start__", "target": "chatbot"},
                        {"source": "chatbot", "target": "tools", "conditional": true},
                        {"source": "tools", "target": "chatbot"},
                        {"source": "chatbot", "target": "__end__", "conditional": true}
                    ]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parses_graph() {
        let wf = workflow();
        assert_eq!(wf.state.nodes.len(), 4);
        assert_eq!(
            wf.state.node("chatbot").and_then(|n| n.kind.as_deref()),
            Some("runnable")
        );
        assert!(wf.state.has_edge("chatbot", "tools"));
        assert!(!wf.state.has_edge("tools", "__end__"));
    }

    #[test]
    fn test_visited_edges_follow_trail_once() {
        let wf = workflow();
        let trail = NodeTrail::from_iter([
            START_NODE, "chatbot", "tools", "chatbot", "tools", "chatbot", END_NODE,
        ]);
        let edges: Vec<(&str, &str)> = wf
            .visited_edges(&trail)
            .into_iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                (START_NODE, "chatbot"),
                ("chatbot", "tools"),
                ("tools", "chatbot"),
                ("chatbot", END_NODE),
            ]
        );
    }

    #[test]
    fn test_unknown_steps_are_ignored() {
        let wf = workflow();
        let trail = NodeTrail::from_iter([START_NODE, "elsewhere"]);
        assert!(wf.visited_edges(&trail).is_empty());
    }
}
