//! The graph container: nodes, edges, adjacency, and the built flag.

use std::collections::HashMap;

use itertools::Itertools;
use tracing::debug;

use stepgraph_core::{Error, Result};

use crate::types::{Edge, Node, NodeId};

/// An undirected graph with insertion-ordered adjacency.
///
/// Mutation is validated up front: a failed operation leaves the graph
/// exactly as it was. The `built` flag is set by the caller once the
/// graph is ready and gates traversal.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Nodes in insertion order.
    nodes: Vec<Node>,
    /// Lookup from id to position in `nodes`.
    index: HashMap<NodeId, usize>,
    /// Edges in insertion order.
    edges: Vec<Edge>,
    /// Neighbor ids per node, insertion order preserved.
    ///
    /// This order is the traversal tie-breaker.
    adjacency: HashMap<NodeId, Vec<NodeId>>,
    /// Readiness flag set by the caller before a run is permitted.
    built: bool,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateNode`] when the id is already present.
    pub fn add_node(&mut self, id: NodeId) -> Result<()> {
        if self.index.contains_key(&id) {
            return Err(Error::duplicate_node(id.as_str()));
        }
        debug!(node = %id, "adding node");
        self.index.insert(id.clone(), self.nodes.len());
        self.adjacency.entry(id.clone()).or_default();
        self.nodes.push(Node::new(id));
        Ok(())
    }

    /// Insert an undirected edge and record adjacency both ways.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEdge`] on a self-loop,
    /// [`Error::UnknownNode`] when an endpoint is absent, and
    /// [`Error::DuplicateEdge`] when the unordered pair already exists.
    pub fn add_edge(&mut self, from: &NodeId, to: &NodeId) -> Result<()> {
        if from == to {
            return Err(Error::invalid_edge(from.as_str()));
        }
        if !self.index.contains_key(from) {
            return Err(Error::unknown_node(from.as_str()));
        }
        if !self.index.contains_key(to) {
            return Err(Error::unknown_node(to.as_str()));
        }
        if self.edges.iter().any(|e| e.connects(from, to)) {
            return Err(Error::duplicate_edge(from.as_str(), to.as_str()));
        }
        debug!(from = %from, to = %to, "adding edge");
        self.edges.push(Edge::new(from.clone(), to.clone()));
        self.adjacency
            .entry(from.clone())
            .or_default()
            .push(to.clone());
        self.adjacency
            .entry(to.clone())
            .or_default()
            .push(from.clone());
        Ok(())
    }

    /// Remove all nodes, edges, and adjacency entries and drop the built
    /// flag. The session layer cancels any active run first.
    pub fn clear(&mut self) {
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "clearing graph"
        );
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
        self.adjacency.clear();
        self.built = false;
    }

    /// Clear every status flag without touching structure.
    pub fn reset_status(&mut self) {
        for node in &mut self.nodes {
            node.visited = false;
            node.current = false;
        }
        for edge in &mut self.edges {
            edge.traversed = false;
        }
    }

    /// Set the readiness flag gating traversal.
    pub fn set_built(&mut self, built: bool) {
        self.built = built;
    }

    /// Whether the caller has marked the graph ready for traversal.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).and_then(|i| self.nodes.get(*i))
    }

    /// Neighbor ids of a node, in adjacency insertion order.
    ///
    /// Unknown ids yield an empty slice.
    pub fn neighbors(&self, id: &NodeId) -> &[NodeId] {
        self.adjacency.get(id).map_or(&[], Vec::as_slice)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id.clone()).collect_vec()
    }

    /// Edge endpoint pairs in insertion order.
    pub fn edge_pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.edges
            .iter()
            .map(|e| (e.a.clone(), e.b.clone()))
            .collect_vec()
    }

    /// Owned copy of the adjacency relation, for traversal snapshots.
    pub fn adjacency_snapshot(&self) -> HashMap<NodeId, Vec<NodeId>> {
        self.adjacency.clone()
    }

    /// Mark a single node as current, clearing the flag everywhere else.
    pub fn set_current(&mut self, id: &NodeId) {
        for node in &mut self.nodes {
            node.current = *id == node.id;
        }
    }

    /// Mark a node visited and no longer current.
    pub fn mark_visited(&mut self, id: &NodeId) {
        if let Some(node) = self.index.get(id).and_then(|i| self.nodes.get_mut(*i)) {
            node.visited = true;
            node.current = false;
        }
    }

    /// Flag the edge between the given pair as traversed, if it exists.
    pub fn mark_traversed(&mut self, a: &NodeId, b: &NodeId) {
        if let Some(edge) = self.edges.iter_mut().find(|e| e.connects(a, b)) {
            edge.traversed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn id(raw: &str) -> NodeId {
        NodeId::new(raw).unwrap()
    }

    fn diamond() -> Graph {
        // A-B, A-C, B-D, C-D
        let mut g = Graph::new();
        for n in ["A", "B", "C", "D"] {
            g.add_node(id(n)).unwrap();
        }
        g.add_edge(&id("A"), &id("B")).unwrap();
        g.add_edge(&id("A"), &id("C")).unwrap();
        g.add_edge(&id("B"), &id("D")).unwrap();
        g.add_edge(&id("C"), &id("D")).unwrap();
        g
    }

    #[test]
    fn test_add_node_rejects_duplicate() {
        let mut g = Graph::new();
        g.add_node(id("A")).unwrap();

        let err = g.add_node(id("A")).unwrap_err();
        assert_eq!(err, Error::duplicate_node("A"));
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_add_edge_rejects_self_loop() {
        let mut g = Graph::new();
        g.add_node(id("A")).unwrap();

        let err = g.add_edge(&id("A"), &id("A")).unwrap_err();
        assert_eq!(err, Error::invalid_edge("A"));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_add_edge_rejects_unknown_endpoint() {
        let mut g = Graph::new();
        g.add_node(id("A")).unwrap();

        assert_eq!(
            g.add_edge(&id("A"), &id("B")).unwrap_err(),
            Error::unknown_node("B")
        );
        assert_eq!(
            g.add_edge(&id("Z"), &id("A")).unwrap_err(),
            Error::unknown_node("Z")
        );
    }

    #[test]
    fn test_add_edge_rejects_duplicate_in_either_orientation() {
        let mut g = Graph::new();
        g.add_node(id("A")).unwrap();
        g.add_node(id("B")).unwrap();
        g.add_edge(&id("A"), &id("B")).unwrap();

        assert_eq!(
            g.add_edge(&id("A"), &id("B")).unwrap_err(),
            Error::duplicate_edge("A", "B")
        );
        // Undirected symmetry: the reversed pair is the same edge.
        assert_eq!(
            g.add_edge(&id("B"), &id("A")).unwrap_err(),
            Error::duplicate_edge("B", "A")
        );
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_failed_add_edge_leaves_adjacency_untouched() {
        let mut g = Graph::new();
        g.add_node(id("A")).unwrap();
        g.add_node(id("B")).unwrap();
        g.add_edge(&id("A"), &id("B")).unwrap();

        let before = g.adjacency_snapshot();
        assert!(g.add_edge(&id("B"), &id("A")).is_err());
        assert!(g.add_edge(&id("A"), &id("Z")).is_err());
        assert_eq!(g.adjacency_snapshot(), before);
    }

    #[test]
    fn test_adjacency_preserves_insertion_order() {
        let g = diamond();
        assert_eq!(g.neighbors(&id("A")), &[id("B"), id("C")]);
        assert_eq!(g.neighbors(&id("D")), &[id("B"), id("C")]);
        assert_eq!(g.neighbors(&id("B")), &[id("A"), id("D")]);
    }

    #[test]
    fn test_neighbors_of_unknown_node_is_empty() {
        let g = diamond();
        assert!(g.neighbors(&id("Z")).is_empty());
    }

    #[test]
    fn test_clear_removes_everything_and_drops_built() {
        let mut g = diamond();
        g.set_built(true);
        g.clear();

        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(!g.is_built());
        assert!(g.neighbors(&id("A")).is_empty());
    }

    #[test]
    fn test_status_flags_and_reset() {
        let mut g = diamond();
        g.set_current(&id("A"));
        assert!(g.node(&id("A")).unwrap().current);

        // Only one node may be current at a time.
        g.set_current(&id("B"));
        assert!(!g.node(&id("A")).unwrap().current);
        assert!(g.node(&id("B")).unwrap().current);

        g.mark_visited(&id("B"));
        assert!(g.node(&id("B")).unwrap().visited);
        assert!(!g.node(&id("B")).unwrap().current);

        g.mark_traversed(&id("B"), &id("A"));
        assert!(g.edges().iter().any(|e| e.traversed));

        g.reset_status();
        assert!(g.nodes().iter().all(|n| !n.visited && !n.current));
        assert!(g.edges().iter().all(|e| !e.traversed));
        // Structure survives a status reset.
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn test_node_ids_in_insertion_order() {
        let g = diamond();
        assert_eq!(g.node_ids(), vec![id("A"), id("B"), id("C"), id("D")]);
    }
}
