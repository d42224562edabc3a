//! Error types for graph mutation and traversal control.
//!
//! Every failure is a local validation failure surfaced synchronously to
//! the caller. None are retried, none are fatal, and a failed operation
//! leaves the graph and the scheduler exactly as they were.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for stepgraph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Error {
    // Graph mutation failures
    #[error("node id '{id}' is empty or already present")]
    DuplicateNode { id: String },

    #[error("unknown node '{id}'")]
    UnknownNode { id: String },

    #[error("edge may not connect node '{id}' to itself")]
    InvalidEdge { id: String },

    #[error("edge between '{a}' and '{b}' already exists")]
    DuplicateEdge { a: String, b: String },

    // Traversal failures
    #[error("unknown start node '{id}'")]
    UnknownStartNode { id: String },

    #[error("graph has not been marked built")]
    NotBuilt,

    // Scheduler failures
    #[error("invalid state transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("graph cannot be mutated while a traversal run is active")]
    RunActive,

    // Reporting boundary failures
    #[error("frame channel closed")]
    ChannelClosed,
}

impl Error {
    /// Create a duplicate node error.
    pub fn duplicate_node(id: impl Into<String>) -> Self {
        Self::DuplicateNode { id: id.into() }
    }

    /// Create an unknown node error.
    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }

    /// Create a self-loop edge error.
    pub fn invalid_edge(id: impl Into<String>) -> Self {
        Self::InvalidEdge { id: id.into() }
    }

    /// Create a duplicate edge error.
    pub fn duplicate_edge(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::DuplicateEdge {
            a: a.into(),
            b: b.into(),
        }
    }

    /// Create an unknown start node error.
    pub fn unknown_start_node(id: impl Into<String>) -> Self {
        Self::UnknownStartNode { id: id.into() }
    }

    /// Create an invalid transition error.
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Stable machine-readable name for this error kind.
    ///
    /// Used by the reporting boundary when surfacing failures to the
    /// presentation layer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateNode { .. } => "duplicate_node",
            Self::UnknownNode { .. } => "unknown_node",
            Self::InvalidEdge { .. } => "invalid_edge",
            Self::DuplicateEdge { .. } => "duplicate_edge",
            Self::UnknownStartNode { .. } => "unknown_start_node",
            Self::NotBuilt => "not_built",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::RunActive => "run_active",
            Self::ChannelClosed => "channel_closed",
        }
    }
}
