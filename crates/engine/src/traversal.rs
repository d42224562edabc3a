//! Lazy BFS/DFS traversal over an adjacency snapshot.

use std::collections::{HashMap, HashSet, VecDeque};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use stepgraph_core::{Error, Result};
use stepgraph_graph::{Graph, NodeId};

/// Traversal algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Breadth-first search: FIFO frontier.
    Bfs,
    /// Depth-first search: pre-order walk, first neighbor first.
    Dfs,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bfs => write!(f, "bfs"),
            Self::Dfs => write!(f, "dfs"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bfs" => Ok(Self::Bfs),
            "dfs" => Ok(Self::Dfs),
            other => Err(format!("unknown algorithm '{other}' (expected 'bfs' or 'dfs')")),
        }
    }
}

/// One step of a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEvent {
    /// The node being visited.
    pub node: NodeId,
    /// 0-based position in the visit order.
    pub index: usize,
    /// The neighbor the traversal arrived from; `None` for the start node.
    ///
    /// Identifies the edge the animation flags as traversed.
    pub parent: Option<NodeId>,
}

/// A validated, lazy traversal: an iterator of [`VisitEvent`]s.
///
/// The plan snapshots the adjacency relation at creation, so the emitted
/// sequence depends only on adjacency insertion order and is fully
/// deterministic. Nodes unreachable from the start are never emitted.
#[derive(Debug)]
pub struct TraversalPlan {
    algorithm: Algorithm,
    adjacency: HashMap<NodeId, Vec<NodeId>>,
    /// Frontier: FIFO for BFS, LIFO for DFS. Each entry carries the node
    /// it was discovered from.
    pending: VecDeque<(NodeId, Option<NodeId>)>,
    visited: HashSet<NodeId>,
    emitted: usize,
}

impl TraversalPlan {
    /// Check that a run may start on this graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBuilt`] when the caller has not marked the
    /// graph ready, and [`Error::UnknownStartNode`] when the start id is
    /// absent. Readiness is checked first.
    pub fn validate(graph: &Graph, start: &NodeId) -> Result<()> {
        if !graph.is_built() {
            return Err(Error::NotBuilt);
        }
        if !graph.contains(start) {
            return Err(Error::unknown_start_node(start.as_str()));
        }
        Ok(())
    }

    /// Validate and build a lazy traversal plan.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TraversalPlan::validate`].
    pub fn new(graph: &Graph, start: &NodeId, algorithm: Algorithm) -> Result<Self> {
        Self::validate(graph, start)?;
        let mut pending = VecDeque::new();
        pending.push_back((start.clone(), None));
        Ok(Self {
            algorithm,
            adjacency: graph.adjacency_snapshot(),
            pending,
            visited: HashSet::new(),
            emitted: 0,
        })
    }

    /// The algorithm this plan runs.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl Iterator for TraversalPlan {
    type Item = VisitEvent;

    fn next(&mut self) -> Option<VisitEvent> {
        loop {
            let (node, parent) = match self.algorithm {
                Algorithm::Bfs => self.pending.pop_front()?,
                Algorithm::Dfs => self.pending.pop_back()?,
            };
            // A node may sit in the frontier more than once before its
            // first visit; later copies are discarded, not an error.
            if !self.visited.insert(node.clone()) {
                continue;
            }

            let neighbors = self.adjacency.get(&node).map_or(&[][..], Vec::as_slice);
            match self.algorithm {
                Algorithm::Bfs => {
                    for n in neighbors {
                        if !self.visited.contains(n) {
                            self.pending.push_back((n.clone(), Some(node.clone())));
                        }
                    }
                }
                Algorithm::Dfs => {
                    // Pushed in reverse so the first neighbor in insertion
                    // order is popped first, matching the recursive
                    // pre-order walk.
                    for n in neighbors.iter().rev() {
                        if !self.visited.contains(n) {
                            self.pending.push_back((n.clone(), Some(node.clone())));
                        }
                    }
                }
            }

            let event = VisitEvent {
                node,
                index: self.emitted,
                parent,
            };
            self.emitted += 1;
            return Some(event);
        }
    }
}
