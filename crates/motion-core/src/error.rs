//! Transport and session error types.
//!
//! None of these cross the public dispatch API as errors: the dispatcher
//! turns them into `false` returns and, for genuine failures, a recorded
//! `last_error`.

use motion_proto::ProtocolError;
use thiserror::Error;

/// Failure reported by the native module's message entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("native module rejected message: {0}")]
pub struct NativeError(pub String);

/// Why an outbound command did not reach the native view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No native module attached.
    #[error("native module not attached")]
    NotReady,

    /// Module attached but no session has been established.
    #[error("no active session")]
    NoSession,

    /// Sliding window already holds the maximum number of commands.
    #[error("rate limit exceeded ({limit} messages per {window_ms}ms)")]
    RateLimited {
        /// Commands admitted per window.
        limit: usize,
        /// Window length in milliseconds.
        window_ms: u128,
    },

    /// Command could not be serialized.
    #[error(transparent)]
    Encode(#[from] ProtocolError),

    /// Native module call failed.
    #[error(transparent)]
    Native(#[from] NativeError),
}

impl TransportError {
    /// Whether this is a routine drop rather than a fault.
    ///
    /// The native view is absent for long stretches of the UI lifecycle, so
    /// missing module, missing session and rate limiting are all expected.
    pub fn is_expected_drop(&self) -> bool {
        matches!(self, Self::NotReady | Self::NoSession | Self::RateLimited { .. })
    }
}

/// Session lifecycle violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `SESSION_READY` carried an empty token.
    #[error("session token is empty")]
    EmptyToken,

    /// Confirmation arrived with no session to confirm.
    #[error("no session to confirm")]
    NoSession,

    /// Lifecycle message arrived before a native module was attached.
    #[error("bridge is not initialized")]
    NotInitialized,
}
