//! Run identifiers and the scheduler state machine.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a traversal run.
///
/// Every animated run gets a fresh id; `VisitStep` frames carry it so an
/// observer can discard frames from a run that has since been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Ulid);

impl RunId {
    /// Create a new random run ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Get the inner ULID.
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Animation scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// No run is active.
    Idle,
    /// A run is stepping through visit events.
    Running,
    /// A run is suspended at an event boundary (can be resumed).
    Paused,
    /// The run's event sequence was exhausted.
    Completed,
    /// The run was cancelled before completion.
    Cancelled,
}

impl RunState {
    /// Whether this state ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a run is live (stepping or suspended).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Check if the scheduler may transition to the given state.
    ///
    /// Terminal states transition back to `Idle` so a finished session
    /// can be restarted; `reset()` moves an active run straight to
    /// `Idle`, while cancellation passes through `Cancelled` first.
    pub fn can_transition_to(&self, target: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, target),
            (Idle, Running)
                | (Running, Paused)
                | (Running, Completed)
                | (Running, Cancelled)
                | (Running, Idle)
                | (Paused, Running)
                | (Paused, Cancelled)
                | (Paused, Idle)
                | (Completed, Idle)
                | (Cancelled, Idle)
        )
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}
