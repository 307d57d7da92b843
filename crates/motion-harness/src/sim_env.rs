//! Virtual-clock environment.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use motion_core::Environment;
use parking_lot::Mutex;

/// Environment whose clock only moves when told to.
///
/// Clones share the same clock, so a test can keep one handle while the
/// bridge owns another.
#[derive(Debug, Clone)]
pub struct SimEnv {
    start: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl SimEnv {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self { start: Instant::now(), offset: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Time advanced since creation.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock()
    }
}
