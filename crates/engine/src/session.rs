//! The session facade: everything the presentation layer may call.
//!
//! A [`Session`] owns the graph, the frame bus, the scheduler state, and
//! at most one live run task. Structural mutation happens between runs;
//! starting a new run first cancels any active one and waits for it to
//! observe the signal, so no two runs ever mutate status flags
//! concurrently.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use stepgraph_core::{Error, Result};
use stepgraph_events::{FrameBus, FrameEvent, FrameSubscription, RunId, RunState};
use stepgraph_graph::{Node, NodeId};

use crate::scheduler::{drive, transition, Control, PaceConfig, SharedState, Speed};
use crate::traversal::{Algorithm, TraversalPlan};

/// Handle to a spawned run task.
struct ActiveRun {
    id: RunId,
    handle: JoinHandle<()>,
}

/// One interactive traversal session.
///
/// All methods take `&self`; the session can be shared behind an `Arc`
/// with a presentation layer. Every failure is published as an
/// `ErrorRaised` frame in addition to being returned.
pub struct Session {
    shared: Arc<SharedState>,
    control: watch::Sender<Control>,
    run: Mutex<Option<ActiveRun>>,
}

impl Session {
    /// Create a session with the default animation pace.
    pub fn new() -> Self {
        Self::with_pace(PaceConfig::default())
    }

    /// Create a session with a custom pace (tests use tiny delays).
    pub fn with_pace(pace: PaceConfig) -> Self {
        let (control, _) = watch::channel(Control::default());
        Self {
            shared: Arc::new(SharedState::new(pace)),
            control,
            run: Mutex::new(None),
        }
    }

    /// Subscribe to the frame bus.
    pub fn subscribe(&self) -> FrameSubscription {
        self.shared.bus.subscribe()
    }

    /// The frame bus itself.
    pub fn bus(&self) -> &FrameBus {
        &self.shared.bus
    }

    /// Add a node.
    ///
    /// The raw id is trimmed and case-normalized first.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateNode`] when the normalized id is empty or
    /// already present; [`Error::RunActive`] while a run is live.
    pub async fn add_node(&self, raw: &str) -> Result<NodeId> {
        let result = self.try_add_node(raw).await;
        self.report(result)
    }

    async fn try_add_node(&self, raw: &str) -> Result<NodeId> {
        let id = NodeId::new(raw).ok_or_else(|| Error::duplicate_node(raw.trim()))?;
        self.ensure_no_active_run().await?;
        let mut graph = self.shared.graph.write().await;
        graph.add_node(id.clone())?;
        let frame = FrameEvent::graph_changed(graph.node_ids(), graph.edge_pairs());
        drop(graph);
        self.shared.bus.publish(frame);
        Ok(id)
    }

    /// Add an undirected edge between two existing nodes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidEdge`] on a self-loop, [`Error::UnknownNode`] when
    /// an endpoint is absent (or empty), [`Error::DuplicateEdge`] when
    /// the unordered pair exists; [`Error::RunActive`] while a run is
    /// live.
    pub async fn add_edge(&self, from_raw: &str, to_raw: &str) -> Result<()> {
        let result = self.try_add_edge(from_raw, to_raw).await;
        self.report(result)
    }

    async fn try_add_edge(&self, from_raw: &str, to_raw: &str) -> Result<()> {
        let from = NodeId::new(from_raw).ok_or_else(|| Error::unknown_node(from_raw.trim()))?;
        let to = NodeId::new(to_raw).ok_or_else(|| Error::unknown_node(to_raw.trim()))?;
        self.ensure_no_active_run().await?;
        let mut graph = self.shared.graph.write().await;
        graph.add_edge(&from, &to)?;
        let frame = FrameEvent::graph_changed(graph.node_ids(), graph.edge_pairs());
        drop(graph);
        self.shared.bus.publish(frame);
        Ok(())
    }

    /// Remove all structure, cancelling any active run first.
    pub async fn clear(&self) {
        self.cancel_active().await;
        let mut graph = self.shared.graph.write().await;
        graph.clear();
        let frame = FrameEvent::graph_changed(graph.node_ids(), graph.edge_pairs());
        drop(graph);
        self.shared.order.write().await.clear();
        self.shared.bus.publish(frame);
    }

    /// Set the readiness flag gating traversal.
    pub async fn set_built(&self, built: bool) {
        self.shared.graph.write().await.set_built(built);
    }

    /// Set the animation speed; out-of-range input is clamped to 1..=10.
    ///
    /// Takes effect from the next event's delay.
    pub fn set_speed(&self, value: u8) -> Speed {
        let speed = Speed::new(value);
        self.control.send_modify(|c| c.speed = speed);
        speed
    }

    /// Start an animated traversal from the given node.
    ///
    /// Any active run is cancelled first and its task awaited, so at most
    /// one run is ever live. All status flags are reset before the first
    /// event.
    ///
    /// # Errors
    ///
    /// [`Error::NotBuilt`] when the graph is not marked built,
    /// [`Error::UnknownStartNode`] when the start id is absent or empty.
    /// On failure no run is cancelled and no flag is touched.
    pub async fn start(&self, start_raw: &str, algorithm: Algorithm) -> Result<RunId> {
        let result = self.try_start(start_raw, algorithm).await;
        self.report(result)
    }

    async fn try_start(&self, start_raw: &str, algorithm: Algorithm) -> Result<RunId> {
        let start =
            NodeId::new(start_raw).ok_or_else(|| Error::unknown_start_node(start_raw.trim()))?;

        // Validate before touching the active run, so a failed start has
        // no side effects.
        {
            let graph = self.shared.graph.read().await;
            TraversalPlan::validate(&graph, &start)?;
        }

        self.cancel_active().await;

        let plan = {
            let mut graph = self.shared.graph.write().await;
            graph.reset_status();
            TraversalPlan::new(&graph, &start, algorithm)?
        };
        self.shared.order.write().await.clear();

        transition(&self.shared, RunState::Running).await?;
        self.control.send_modify(|c| {
            c.paused = false;
            c.cancelled = false;
        });

        let id = RunId::new();
        let handle = tokio::spawn(drive(
            Arc::clone(&self.shared),
            self.control.subscribe(),
            plan,
            id,
        ));
        *self.run.lock().await = Some(ActiveRun { id, handle });

        info!(run = %id, %algorithm, start = %start, "traversal started");
        Ok(id)
    }

    /// Suspend the run at the next event boundary.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTransition`] unless the scheduler is `Running`.
    pub async fn pause(&self) -> Result<()> {
        // Raise the gate flag before the state transition so the run task
        // cannot slip past a boundary in between; a rejected pause lowers
        // it again.
        self.control.send_modify(|c| c.paused = true);
        let result = transition(&self.shared, RunState::Paused).await.map(|_| ());
        if result.is_err() {
            self.control.send_modify(|c| c.paused = false);
        }
        self.report(result)
    }

    /// Resume a paused run with the exact next un-emitted event.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTransition`] unless the scheduler is `Paused`.
    pub async fn resume(&self) -> Result<()> {
        let result = transition(&self.shared, RunState::Running).await.map(|_| ());
        let result = result.map(|()| self.control.send_modify(|c| c.paused = false));
        self.report(result)
    }

    /// Stop any run and return to `Idle`, clearing all status flags.
    ///
    /// Unlike cancellation via [`Session::clear`] or a restart, reset
    /// moves an active run straight to `Idle`.
    pub async fn reset(&self) {
        {
            let mut run = self.run.lock().await;
            if let Some(active) = run.take() {
                self.control.send_modify(|c| c.cancelled = true);
                Self::join(active).await;
            }
        }
        let state = *self.shared.state.read().await;
        if state != RunState::Idle {
            if let Err(e) = transition(&self.shared, RunState::Idle).await {
                warn!(error = %e, "reset transition failed");
            }
        }
        self.shared.graph.write().await.reset_status();
        self.shared.order.write().await.clear();
    }

    /// Current scheduler state.
    pub async fn state(&self) -> RunState {
        *self.shared.state.read().await
    }

    /// Visit order of the current or most recent run.
    pub async fn visit_order(&self) -> Vec<NodeId> {
        self.shared.order.read().await.clone()
    }

    /// Snapshot of the node ids in insertion order.
    pub async fn node_ids(&self) -> Vec<NodeId> {
        self.shared.graph.read().await.node_ids()
    }

    /// Snapshot of the edge endpoint pairs in insertion order.
    pub async fn edge_pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.shared.graph.read().await.edge_pairs()
    }

    /// Snapshot of a single node, with its status flags.
    pub async fn node(&self, id: &NodeId) -> Option<Node> {
        self.shared.graph.read().await.node(id).cloned()
    }

    /// Cancel any active run, wait for it to observe the signal, and
    /// normalize the scheduler back to `Idle`.
    async fn cancel_active(&self) {
        {
            let mut run = self.run.lock().await;
            if let Some(active) = run.take() {
                info!(run = %active.id, "cancelling active run");
                self.control.send_modify(|c| c.cancelled = true);
                Self::join(active).await;
            }
        }
        let state = *self.shared.state.read().await;
        match state {
            RunState::Running | RunState::Paused => {
                if let Err(e) = transition(&self.shared, RunState::Cancelled).await {
                    warn!(error = %e, "cancel transition failed");
                }
                if let Err(e) = transition(&self.shared, RunState::Idle).await {
                    warn!(error = %e, "idle transition failed");
                }
            }
            RunState::Completed | RunState::Cancelled => {
                if let Err(e) = transition(&self.shared, RunState::Idle).await {
                    warn!(error = %e, "idle transition failed");
                }
            }
            RunState::Idle => {}
        }
    }

    /// Await a run task; a cancelled task ending is not an error.
    async fn join(active: ActiveRun) {
        if let Err(e) = active.handle.await {
            warn!(run = %active.id, error = %e, "run task join failed");
        }
    }

    /// Reject structural mutation while a run is live.
    async fn ensure_no_active_run(&self) -> Result<()> {
        if self.shared.state.read().await.is_active() {
            return Err(Error::RunActive);
        }
        Ok(())
    }

    /// Publish failures on the bus before handing them back.
    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.shared.bus.publish(FrameEvent::error_raised(e));
        }
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
