//! Undirected graph model for stepgraph.
//!
//! Pure data with mutation validation, no traversal behavior:
//!
//! - **Identifiers**: case-normalized [`NodeId`]s, unique within a graph
//! - **Structure**: nodes, unordered edges, insertion-ordered adjacency
//! - **Status flags**: `visited`/`current` on nodes and `traversed` on
//!   edges, mutated only by the animation scheduler during a run
//!
//! Adjacency insertion order is the traversal tie-breaker, so it is
//! preserved exactly as edges are added. Edges store identifiers rather
//! than node references; endpoints are resolved via lookup.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod graph;
pub mod types;

pub use graph::Graph;
pub use types::{Edge, Node, NodeId};
