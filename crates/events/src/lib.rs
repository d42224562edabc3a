//! The core-to-presentation reporting boundary.
//!
//! The traversal core never renders anything; it publishes [`FrameEvent`]s
//! on a [`FrameBus`] and the presentation layer subscribes:
//!
//! - **`GraphChanged`**: after any structural mutation
//! - **`VisitStep`**: once per traversal event, with the partial visit order
//! - **`StateChanged`**: every scheduler state transition
//! - **`ErrorRaised`**: every validation failure
//!
//! Frames are fire-and-forget display traffic over a broadcast channel;
//! an observer that falls behind simply misses frames.
//!
//! # Example
//!
//! ```ignore
//! use stepgraph_events::{FrameBus, FrameEvent, FramePattern};
//!
//! #[tokio::main]
//! async fn main() {
//!     let bus = FrameBus::new();
//!     let mut sub = bus.subscribe();
//!
//!     bus.publish(FrameEvent::graph_changed(vec![], vec![]));
//!
//!     let frame = sub.recv().await.unwrap();
//!     println!("got: {}", frame.frame_type());
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod bus;
pub mod event;
pub mod types;

pub use bus::{FrameBus, FramePattern, FrameSubscription};
pub use event::FrameEvent;
pub use types::{RunId, RunState};
