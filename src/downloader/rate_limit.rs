//! Request pacing
//!
//! Enforces a minimum send-to-send spacing for one transport. The last send
//! instant is recorded just before dispatch, so slow responses do not push
//! the next request further out than needed.

use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Tracks the last send of a single transport
///
/// Owned by the transport and mutated through `&mut self`; requests are
/// sequential so no locking is involved.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    min_interval: Duration,
    last_sent: Option<Instant>,
}

impl RequestPacer {
    /// Create a pacer that has not sent anything yet
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: None,
        }
    }

    /// Configured minimum spacing
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Instant of the most recent send, if any
    pub fn last_sent(&self) -> Option<Instant> {
        self.last_sent
    }

    /// Time left before the next send is allowed
    pub fn remaining(&self) -> Duration {
        match self.last_sent {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Sleep until the minimum interval since the last send has passed
    ///
    /// Returns how long it waited.
    pub async fn wait_for_slot(&self) -> Duration {
        let wait = self.remaining();
        if !wait.is_zero() {
            sleep(wait).await;
        }
        wait
    }

    /// Record a send happening now
    pub fn mark_sent(&mut self) {
        self.last_sent = Some(Instant::now());
    }
}
