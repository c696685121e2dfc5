//! Consumer side of the watch: runs one redraw per queued request.

use super::RedrawRequest;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome counters of a finished loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawStats {
    pub completed: usize,
    pub failed: usize,
}

pub struct RedrawLoop {
    poll_interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl RedrawLoop {
    pub fn new(shutdown: Arc<AtomicBool>) -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            shutdown,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Drain `requests` until shutdown is flagged or every sender is gone.
    ///
    /// A failing redraw is logged and the loop keeps going.
    pub fn run<F>(&self, requests: &Receiver<RedrawRequest>, mut redraw: F) -> RedrawStats
    where
        F: FnMut(&RedrawRequest) -> anyhow::Result<()>,
    {
        let mut stats = RedrawStats::default();

        while !self.shutdown.load(Ordering::Relaxed) {
            let request = match requests.recv_timeout(self.poll_interval) {
                Ok(request) => request,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("all watchers are gone");
                    break;
                }
            };

            info!(
                path = %request.path.display(),
                at = %request.timestamp.format("%H:%M:%S"),
                "change detected, redrawing"
            );
            match redraw(&request) {
                Ok(()) => stats.completed += 1,
                Err(error) => {
                    stats.failed += 1;
                    error!("redraw failed: {error:#}");
                }
            }
        }

        info!(completed = stats.completed, failed = stats.failed, "redraw loop stopped");
        stats
    }
}
