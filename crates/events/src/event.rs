//! Frame event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stepgraph_core::Error;
use stepgraph_graph::NodeId;

use crate::types::{RunId, RunState};

/// Frames published by the traversal core for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameEvent {
    /// The graph structure changed (node or edge added, or cleared).
    GraphChanged {
        nodes: Vec<NodeId>,
        edges: Vec<(NodeId, NodeId)>,
        timestamp: DateTime<Utc>,
    },
    /// One traversal event: `current` was just marked, `order` is the
    /// partial visit sequence including it.
    VisitStep {
        run: RunId,
        order: Vec<NodeId>,
        current: NodeId,
        timestamp: DateTime<Utc>,
    },
    /// Scheduler state transition.
    StateChanged {
        from: RunState,
        to: RunState,
        timestamp: DateTime<Utc>,
    },
    /// A validation failure was surfaced to the caller.
    ErrorRaised {
        kind: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl FrameEvent {
    /// Create a GraphChanged frame.
    pub fn graph_changed(nodes: Vec<NodeId>, edges: Vec<(NodeId, NodeId)>) -> Self {
        Self::GraphChanged {
            nodes,
            edges,
            timestamp: Utc::now(),
        }
    }

    /// Create a VisitStep frame.
    pub fn visit_step(run: RunId, order: Vec<NodeId>, current: NodeId) -> Self {
        Self::VisitStep {
            run,
            order,
            current,
            timestamp: Utc::now(),
        }
    }

    /// Create a StateChanged frame.
    pub fn state_changed(from: RunState, to: RunState) -> Self {
        Self::StateChanged {
            from,
            to,
            timestamp: Utc::now(),
        }
    }

    /// Create an ErrorRaised frame from a core error.
    pub fn error_raised(error: &Error) -> Self {
        Self::ErrorRaised {
            kind: error.kind().to_string(),
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Get the frame type name.
    pub fn frame_type(&self) -> &'static str {
        match self {
            Self::GraphChanged { .. } => "graph_changed",
            Self::VisitStep { .. } => "visit_step",
            Self::StateChanged { .. } => "state_changed",
            Self::ErrorRaised { .. } => "error_raised",
        }
    }

    /// Get the timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::GraphChanged { timestamp, .. }
            | Self::VisitStep { timestamp, .. }
            | Self::StateChanged { timestamp, .. }
            | Self::ErrorRaised { timestamp, .. } => *timestamp,
        }
    }

    /// The run this frame belongs to, when it is run-scoped.
    pub fn run(&self) -> Option<RunId> {
        match self {
            Self::VisitStep { run, .. } => Some(*run),
            _ => None,
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

    #[test]
    fn test_graph_changed_frame() {
        let frame = FrameEvent::graph_changed(vec![id("A"), id("B")], vec![(id("A"), id("B"))]);
        assert_eq!(frame.frame_type(), "graph_changed");
        assert!(frame.run().is_none());
    }

    #[test]
    fn test_visit_step_frame_carries_run_id() {
        let run = RunId::new();
        let frame = FrameEvent::visit_step(run, vec![id("A")], id("A"));
        assert_eq!(frame.frame_type(), "visit_step");
        assert_eq!(frame.run(), Some(run));
    }

    #[test]
    fn test_state_changed_frame() {
        let frame = FrameEvent::state_changed(RunState::Idle, RunState::Running);
        assert_eq!(frame.frame_type(), "state_changed");
    }

    #[test]
    fn test_error_raised_frame_maps_kind_and_message() {
        let err = Error::unknown_start_node("Z");
        let frame = FrameEvent::error_raised(&err);

        match frame {
            FrameEvent::ErrorRaised { kind, message, .. } => {
                assert_eq!(kind, "unknown_start_node");
                assert!(message.contains('Z'));
            }
            other => unreachable!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_frame_round_trips_through_json() {
        let frame = FrameEvent::visit_step(RunId::new(), vec![id("A"), id("B")], id("B"));
        let json = serde_json::to_string(&frame).unwrap();
        let back: FrameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
