//! Live streaming from the video tool's stdout.

use tokio::sync::mpsc;
use tracing::warn;

/// Read size for stdout chunks.
pub(crate) const CHUNK_SIZE: usize = 64 * 1024;

/// Lifecycle of one live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    /// The tool process was spawned and registered.
    Started { id: String, pid: u32 },
    /// One chunk of encoded stream data as read from stdout.
    ///
    /// Chunk boundaries follow pipe reads, not codec frames.
    Frame(Vec<u8>),
    /// The tool exited. `code` is `None` when it was killed by a signal.
    Closed { id: String, code: Option<i32> },
}

/// Receiving end of a live stream started by
/// [`Camera::start_live_stream`](crate::Camera::start_live_stream).
///
/// Dropping it does not stop the tool; cancel the task by id for that.
pub struct LiveStream {
    id: String,
    pid: u32,
    events: mpsc::Receiver<LiveEvent>,
}

impl LiveStream {
    pub(crate) fn new(id: String, pid: u32, events: mpsc::Receiver<LiveEvent>) -> Self {
        Self { id, pid, events }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Next event, or `None` after `Closed` has been delivered.
    pub async fn recv(&mut self) -> Option<LiveEvent> {
        self.events.recv().await
    }

    /// Drain the stream, returning the exit code from `Closed`.
    pub async fn wait(mut self) -> Option<i32> {
        while let Some(event) = self.events.recv().await {
            if let LiveEvent::Closed { code, .. } = event {
                return code;
            }
        }
        warn!("Live stream '{}' ended without a close event", self.id);
        None
    }
}
