//! Traversal engine and animation scheduler.
//!
//! Three layers, leaf to root:
//!
//! - [`TraversalPlan`]: a lazy, deterministic iterator of visit events
//!   over a validated adjacency snapshot (BFS or DFS)
//! - the scheduler ([`RunState`] machine, [`Speed`]/[`PaceConfig`]
//!   pacing, and the paced run task with its pause/cancel gate)
//! - [`Session`]: the presentation-to-core boundary owning the graph,
//!   the frame bus, and at most one live run
//!
//! # Example
//!
//! ```ignore
//! use stepgraph_engine::{Algorithm, Session};
//!
//! #[tokio::main]
//! async fn main() -> stepgraph_core::Result<()> {
//!     let session = Session::new();
//!     let mut frames = session.subscribe();
//!
//!     session.add_node("a").await?;
//!     session.add_node("b").await?;
//!     session.add_edge("a", "b").await?;
//!     session.set_built(true).await;
//!
//!     session.start("a", Algorithm::Bfs).await?;
//!     while let Ok(frame) = frames.recv().await {
//!         println!("{}", frame.frame_type());
//!     }
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod scheduler;
pub mod session;
pub mod traversal;

pub use scheduler::{PaceConfig, Speed};
pub use session::Session;
pub use traversal::{Algorithm, TraversalPlan, VisitEvent};

// Re-export the boundary types callers need alongside the session.
pub use stepgraph_events::{FrameBus, FrameEvent, FramePattern, FrameSubscription, RunId, RunState};
