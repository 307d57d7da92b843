//! Environment abstraction.
//!
//! The bridge reads time through [`Environment`] instead of calling
//! `Instant::now()` directly, so rate-limit windows and log throttling can
//! be tested against a virtual clock.

use std::time::Instant;

/// Source of time for the bridge.
pub trait Environment: Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock environment for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
