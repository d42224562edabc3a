//! Paced execution of a traversal plan.
//!
//! The scheduler walks a [`TraversalPlan`](crate::traversal::TraversalPlan)
//! one event at a time, sleeping a speed-derived delay between events and
//! gating each step on a pause/cancel signal. Pause and cancellation are
//! observed only at event boundaries, never mid-event: a delay that has
//! started always runs to completion, and the gate is checked before the
//! next event is emitted.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tokio::time::sleep;
use tracing::{debug, trace, warn};

use stepgraph_core::{Error, Result};
use stepgraph_events::{FrameBus, FrameEvent, RunId, RunState};
use stepgraph_graph::{Graph, NodeId};

use crate::traversal::TraversalPlan;

/// Animation speed, 1 (slowest) to 10 (fastest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speed(u8);

impl Speed {
    /// Minimum speed setting.
    pub const MIN: u8 = 1;
    /// Maximum speed setting.
    pub const MAX: u8 = 10;

    /// Create a speed, clamping out-of-range input into `1..=10`.
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// The clamped setting.
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(5)
    }
}

impl std::fmt::Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delay derivation for the animation loop.
///
/// The per-event delay is `base_delay - speed * step`, floored at
/// `min_delay` so the delay is always positive and monotonically
/// decreasing in speed. Tests inject much smaller values.
#[derive(Debug, Clone, Copy)]
pub struct PaceConfig {
    /// Delay at speed zero (never reached; speed starts at 1).
    pub base_delay: Duration,
    /// Delay reduction per speed unit.
    pub step: Duration,
    /// Floor for the derived delay.
    pub min_delay: Duration,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1000),
            step: Duration::from_millis(90),
            min_delay: Duration::from_millis(100),
        }
    }
}

impl PaceConfig {
    /// Derive the per-event delay for a speed setting.
    pub fn delay(&self, speed: Speed) -> Duration {
        let reduction = self.step.saturating_mul(u32::from(speed.get()));
        self.base_delay
            .saturating_sub(reduction)
            .max(self.min_delay)
    }
}

/// Control signal shared between the session and the run task.
///
/// Carried on a `watch` channel so the run task is woken on change
/// rather than polling on a fixed interval.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Control {
    pub paused: bool,
    pub cancelled: bool,
    pub speed: Speed,
}

impl Default for Control {
    fn default() -> Self {
        Self {
            paused: false,
            cancelled: false,
            speed: Speed::default(),
        }
    }
}

/// State shared between the session facade and the run task.
pub(crate) struct SharedState {
    pub graph: RwLock<Graph>,
    pub state: RwLock<RunState>,
    /// Visit order of the current or most recent run.
    pub order: RwLock<Vec<NodeId>>,
    pub bus: FrameBus,
    pub pace: PaceConfig,
}

impl SharedState {
    pub fn new(pace: PaceConfig) -> Self {
        Self {
            graph: RwLock::new(Graph::new()),
            state: RwLock::new(RunState::Idle),
            order: RwLock::new(Vec::new()),
            bus: FrameBus::new(),
            pace,
        }
    }
}

/// Transition the scheduler state, publishing a `StateChanged` frame.
///
/// # Errors
///
/// Returns [`Error::InvalidTransition`] when the transition table forbids
/// the move; the state is left unchanged.
pub(crate) async fn transition(shared: &SharedState, to: RunState) -> Result<RunState> {
    let mut state = shared.state.write().await;
    let from = *state;
    if !from.can_transition_to(to) {
        return Err(Error::invalid_transition(from.to_string(), to.to_string()));
    }
    *state = to;
    drop(state);

    debug!(%from, %to, "scheduler state changed");
    shared.bus.publish(FrameEvent::state_changed(from, to));
    Ok(from)
}

/// Outcome of the event-boundary gate.
enum Gate {
    Proceed,
    Cancelled,
}

/// Wait at an event boundary until the run may proceed or is cancelled.
///
/// While paused this awaits a change notification on the control channel;
/// a dropped sender counts as cancellation.
async fn wait_at_boundary(rx: &mut watch::Receiver<Control>) -> Gate {
    loop {
        {
            let control = rx.borrow_and_update();
            if control.cancelled {
                return Gate::Cancelled;
            }
            if !control.paused {
                return Gate::Proceed;
            }
        }
        if rx.changed().await.is_err() {
            return Gate::Cancelled;
        }
    }
}

/// Drive a traversal plan to completion at the controlled pace.
///
/// Per event: gate, mark the node current (and flag the discovering
/// edge), publish the partial order, sleep the speed-derived delay, then
/// mark the node visited. On cancellation the task returns immediately,
/// leaving flags in their last-reported state; the canceller owns the
/// subsequent state transitions.
pub(crate) async fn drive(
    shared: Arc<SharedState>,
    mut rx: watch::Receiver<Control>,
    plan: TraversalPlan,
    run: RunId,
) {
    for event in plan {
        if let Gate::Cancelled = wait_at_boundary(&mut rx).await {
            debug!(%run, "run cancelled at event boundary");
            return;
        }

        {
            let mut graph = shared.graph.write().await;
            graph.set_current(&event.node);
            if let Some(parent) = &event.parent {
                graph.mark_traversed(parent, &event.node);
            }
        }

        let order = {
            let mut order = shared.order.write().await;
            order.push(event.node.clone());
            order.clone()
        };
        trace!(%run, node = %event.node, index = event.index, "visit step");
        shared
            .bus
            .publish(FrameEvent::visit_step(run, order, event.node.clone()));

        let delay = shared.pace.delay(rx.borrow().speed);
        sleep(delay).await;

        shared.graph.write().await.mark_visited(&event.node);
    }

    // The final boundary: completion also respects the pause gate, so a
    // run paused after its last event completes only once resumed. A
    // pause can still take the state lock between the gate check and the
    // transition below; when it does, wait for the next control change
    // and try again instead of stranding the machine in `Paused`.
    loop {
        if let Gate::Cancelled = wait_at_boundary(&mut rx).await {
            debug!(%run, "run cancelled after final event");
            return;
        }
        match transition(&shared, RunState::Completed).await {
            Ok(_) => {
                debug!(%run, "run completed");
                return;
            }
            Err(e) => {
                if *shared.state.read().await != RunState::Paused {
                    warn!(%run, error = %e, "could not mark run completed");
                    return;
                }
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_speed_clamps_out_of_range_input() {
        assert_eq!(Speed::new(0).get(), 1);
        assert_eq!(Speed::new(5).get(), 5);
        assert_eq!(Speed::new(10).get(), 10);
        assert_eq!(Speed::new(200).get(), 10);
        assert_eq!(Speed::default().get(), 5);
    }

    #[test]
    fn test_delay_decreases_with_speed() {
        let pace = PaceConfig::default();
        let mut previous = pace.delay(Speed::new(1));
        for s in 2..=10 {
            let current = pace.delay(Speed::new(s));
            assert!(current < previous, "delay must fall as speed rises");
            previous = current;
        }
    }

    #[test]
    fn test_delay_endpoints() {
        let pace = PaceConfig::default();
        assert_eq!(pace.delay(Speed::new(1)), Duration::from_millis(910));
        assert_eq!(pace.delay(Speed::new(10)), Duration::from_millis(100));
    }

    #[test]
    fn test_delay_is_floored_at_min() {
        let pace = PaceConfig {
            base_delay: Duration::from_millis(100),
            step: Duration::from_millis(50),
            min_delay: Duration::from_millis(10),
        };
        // 100 - 10*50 saturates to zero, then the floor applies.
        assert_eq!(pace.delay(Speed::new(10)), Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_transition_publishes_frame() {
        let shared = SharedState::new(PaceConfig::default());
        let mut sub = shared.bus.subscribe();

        let from = transition(&shared, RunState::Running).await.unwrap();
        assert_eq!(from, RunState::Idle);
        assert_eq!(*shared.state.read().await, RunState::Running);

        let frame = sub.recv().await.unwrap();
        assert_eq!(frame.frame_type(), "state_changed");
    }

    #[tokio::test]
    async fn test_invalid_transition_leaves_state_unchanged() {
        let shared = SharedState::new(PaceConfig::default());

        let err = transition(&shared, RunState::Paused).await.unwrap_err();
        assert_eq!(err, Error::invalid_transition("idle", "paused"));
        assert_eq!(*shared.state.read().await, RunState::Idle);
    }

    #[tokio::test]
    async fn test_gate_proceeds_when_not_paused() {
        let (_tx, mut rx) = watch::channel(Control::default());
        assert!(matches!(wait_at_boundary(&mut rx).await, Gate::Proceed));
    }

    #[tokio::test]
    async fn test_gate_blocks_while_paused_and_wakes_on_resume() {
        let (tx, mut rx) = watch::channel(Control {
            paused: true,
            ..Control::default()
        });

        let unpause = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.send_modify(|c| c.paused = false);
            tx
        });

        assert!(matches!(wait_at_boundary(&mut rx).await, Gate::Proceed));
        drop(unpause.await.unwrap());
    }

    #[tokio::test]
    async fn test_gate_observes_cancellation_while_paused() {
        let (tx, mut rx) = watch::channel(Control {
            paused: true,
            ..Control::default()
        });

        tx.send_modify(|c| c.cancelled = true);
        assert!(matches!(wait_at_boundary(&mut rx).await, Gate::Cancelled));
    }

    #[tokio::test]
    async fn test_completion_waits_out_a_pause_that_wins_the_state_lock() {
        let shared = Arc::new(SharedState::new(PaceConfig {
            base_delay: Duration::from_millis(100),
            step: Duration::from_millis(1),
            min_delay: Duration::from_millis(50),
        }));
        let start = NodeId::new("A").unwrap();
        {
            let mut graph = shared.graph.write().await;
            graph.add_node(start.clone()).unwrap();
            graph.set_built(true);
        }
        *shared.state.write().await = RunState::Running;
        let plan = {
            let graph = shared.graph.read().await;
            TraversalPlan::new(&graph, &start, crate::traversal::Algorithm::Bfs).unwrap()
        };
        let (tx, rx) = watch::channel(Control::default());
        let task = tokio::spawn(drive(Arc::clone(&shared), rx, plan, RunId::new()));

        // While the run task sleeps its per-event delay, a pause takes
        // the state lock before its control flag becomes visible.
        tokio::time::sleep(Duration::from_millis(20)).await;
        *shared.state.write().await = RunState::Paused;

        // The task may not give up: the machine stays `Paused` with the
        // task alive, waiting for the next control change.
        tokio::time::sleep(Duration::from_millis(160)).await;
        assert!(!task.is_finished());
        assert_eq!(*shared.state.read().await, RunState::Paused);

        transition(&shared, RunState::Running).await.unwrap();
        tx.send_modify(|c| c.paused = false);
        task.await.unwrap();
        assert_eq!(*shared.state.read().await, RunState::Completed);
    }

    #[tokio::test]
    async fn test_gate_treats_dropped_sender_as_cancellation() {
        let (tx, mut rx) = watch::channel(Control {
            paused: true,
            ..Control::default()
        });
        drop(tx);
        assert!(matches!(wait_at_boundary(&mut rx).await, Gate::Cancelled));
    }
}
