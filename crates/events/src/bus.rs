//! Frame bus for pub/sub between the core and the presentation layer.

use tokio::sync::broadcast;
use tracing::debug;

use stepgraph_core::{Error, Result};

use crate::event::FrameEvent;
use crate::types::RunId;

/// Default broadcast channel capacity.
///
/// Frames are small and a run emits at most one per animation step, so a
/// lagging observer has to be very slow indeed to drop anything.
const DEFAULT_CAPACITY: usize = 256;

/// Pattern for filtering frames.
#[derive(Debug, Clone)]
pub enum FramePattern {
    /// Match all frames.
    All,
    /// Match frames by type name.
    ByType(String),
    /// Match run-scoped frames from a specific run.
    ByRun(RunId),
}

impl FramePattern {
    /// Check if a frame matches this pattern.
    pub fn matches(&self, frame: &FrameEvent) -> bool {
        match self {
            Self::All => true,
            Self::ByType(t) => frame.frame_type() == t,
            Self::ByRun(run) => frame.run() == Some(*run),
        }
    }
}

/// Subscription handle for receiving frames.
pub struct FrameSubscription {
    receiver: broadcast::Receiver<FrameEvent>,
}

impl FrameSubscription {
    /// Receive the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] when the bus has been dropped.
    pub async fn recv(&mut self) -> Result<FrameEvent> {
        self.receiver.recv().await.map_err(|_| Error::ChannelClosed)
    }

    /// Try to receive a frame without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] when no frame is ready or the bus
    /// has been dropped.
    pub fn try_recv(&mut self) -> Result<FrameEvent> {
        self.receiver.try_recv().map_err(|_| Error::ChannelClosed)
    }

    /// Receive the next frame matching a pattern, discarding the rest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] when the bus has been dropped.
    pub async fn recv_matching(&mut self, pattern: &FramePattern) -> Result<FrameEvent> {
        loop {
            let frame = self.recv().await?;
            if pattern.matches(&frame) {
                return Ok(frame);
            }
        }
    }
}

/// Bus for publishing frames to any number of observers.
///
/// Publishing never blocks and never fails: with no subscribers the frame
/// is simply dropped, which is the normal case for a headless core.
pub struct FrameBus {
    sender: broadcast::Sender<FrameEvent>,
}

impl FrameBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with a custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a frame, returning the number of subscribers it reached.
    pub fn publish(&self, frame: FrameEvent) -> usize {
        debug!(frame = frame.frame_type(), "publishing frame");
        match self.sender.send(frame) {
            Ok(count) => count,
            Err(_) => {
                debug!("no active subscribers for frame");
                0
            }
        }
    }

    /// Subscribe to all frames published after this call.
    pub fn subscribe(&self) -> FrameSubscription {
        FrameSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for FrameBus {
    fn default() -> Self {
        Self::new()
    }
}
