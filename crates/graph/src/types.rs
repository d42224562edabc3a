//! Node and edge types for the graph model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Case-normalized node identifier.
///
/// Raw input is trimmed and uppercased before use; an identifier that
/// normalizes to the empty string is rejected. Normalization happens in
/// exactly one place so that `"a"`, `" A "`, and `"A"` all name the same
/// node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Normalize raw input into a node identifier.
    ///
    /// Returns `None` when the input is empty after trimming. The caller
    /// decides which error that maps to (an empty id means different
    /// things to `add_node` and `start`).
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// The normalized identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A node in the graph.
///
/// Spatial coordinates belong to the presentation layer and do not exist
/// here. The two status flags are mutated only by the animation scheduler
/// during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within the graph.
    pub id: NodeId,
    /// Set true exactly once per run, when the node is first visited.
    pub visited: bool,
    /// True for at most one node at any instant - the node being processed.
    pub current: bool,
}

impl Node {
    /// Create a node with both status flags cleared.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            visited: false,
            current: false,
        }
    }
}

/// An unordered edge between two nodes.
///
/// Stores identifiers, not node references. An edge between A and B
/// implies adjacency in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// First endpoint, in the order the edge was added.
    pub a: NodeId,
    /// Second endpoint.
    pub b: NodeId,
    /// Display flag set when the traversal crosses this edge.
    pub traversed: bool,
}

impl Edge {
    /// Create an edge with the traversed flag cleared.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        Self {
            a,
            b,
            traversed: false,
        }
    }

    /// Check whether this edge connects the given unordered pair.
    pub fn connects(&self, x: &NodeId, y: &NodeId) -> bool {
        (self.a == *x && self.b == *y) || (self.a == *y && self.b == *x)
    }
}
