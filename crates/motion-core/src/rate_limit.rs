//! Sliding-window rate limiting and log throttling.
//!
//! [`RateWindow`] is a strict sliding-window counter, not a token bucket:
//! at most `cap` commands are admitted in any span of `window`, and idle
//! time never accumulates credit.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Sliding-window counter over send timestamps.
#[derive(Debug, Clone)]
pub struct RateWindow {
    cap: usize,
    window: Duration,
    sent: VecDeque<Instant>,
}

impl RateWindow {
    /// Create an empty window admitting `cap` sends per `window`.
    pub fn new(cap: usize, window: Duration) -> Self {
        Self { cap, window, sent: VecDeque::with_capacity(cap) }
    }

    /// Try to admit one send at `now`.
    ///
    /// Timestamps at least `window` old are evicted first. The send is
    /// admitted, and recorded, only if fewer than `cap` remain.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        self.evict(now);
        if self.sent.len() < self.cap {
            self.sent.push_back(now);
            true
        } else {
            false
        }
    }

    /// Sends still counted against the window at `now`.
    pub fn len(&mut self, now: Instant) -> usize {
        self.evict(now);
        self.sent.len()
    }

    /// Whether no sends are counted at `now`.
    pub fn is_empty(&mut self, now: Instant) -> bool {
        self.len(now) == 0
    }

    /// Sends per window.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.sent.clear();
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&oldest) = self.sent.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.sent.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Emits at most one log line per interval for a repeating condition.
///
/// Occurrences inside the interval are counted and reported with the next
/// line that is allowed through.
#[derive(Debug, Clone)]
pub struct LogThrottle {
    interval: Duration,
    last_logged: Option<Instant>,
    suppressed: u64,
}

impl LogThrottle {
    /// Create a throttle allowing one line per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_logged: None, suppressed: 0 }
    }

    /// Record an occurrence at `now`.
    ///
    /// Returns `Some(suppressed)` when the caller should log, carrying the
    /// number of occurrences swallowed since the previous line.
    pub fn hit(&mut self, now: Instant) -> Option<u64> {
        let due = self
            .last_logged
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last_logged = Some(now);
            Some(std::mem::take(&mut self.suppressed))
        } else {
            self.suppressed += 1;
            None
        }
    }

    /// Forget the last log time and suppressed count.
    pub fn reset(&mut self) {
        self.last_logged = None;
        self.suppressed = 0;
    }
}
