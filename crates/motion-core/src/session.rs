//! Session token holder.
//!
//! The native view issues one opaque token per bridge lifetime. It lives
//! only in memory, is required on every outbound command once received, and
//! is cleared synchronously on cleanup.
//!
//! # State Machine
//!
//! ```text
//! ┌────────┐  establish  ┌─────────────┐  confirm  ┌───────────┐
//! │ Absent │────────────>│ Established │──────────>│ Confirmed │
//! └────────┘             └─────────────┘           └───────────┘
//!      ^                        │                        │
//!      └────────── clear ───────┴────────────────────────┘
//! ```
//!
//! Establishing again from any state replaces the token and drops the
//! confirmation.

use std::{fmt, time::Instant};

use crate::error::SessionError;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token held.
    Absent,
    /// Token held, handshake not yet confirmed.
    Established,
    /// Token held and confirmed by the native side.
    Confirmed,
}

/// In-memory session token.
///
/// `Debug` shows only whether a token is present, never the token itself.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<String>,
    confirmed: bool,
    established_at: Option<Instant>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match (&self.token, self.confirmed) {
            (None, _) => SessionState::Absent,
            (Some(_), false) => SessionState::Established,
            (Some(_), true) => SessionState::Confirmed,
        }
    }

    /// Store `token` as the active session.
    ///
    /// # Errors
    /// Returns `EmptyToken` if `token` is empty; the session is unchanged.
    pub fn establish(&mut self, token: impl Into<String>, now: Instant) -> Result<(), SessionError> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        self.token = Some(token);
        self.confirmed = false;
        self.established_at = Some(now);
        Ok(())
    }

    /// Mark the handshake as confirmed.
    ///
    /// # Errors
    /// Returns `NoSession` if no token is held.
    pub fn confirm(&mut self) -> Result<(), SessionError> {
        if self.token.is_none() {
            return Err(SessionError::NoSession);
        }
        self.confirmed = true;
        Ok(())
    }

    /// Drop the token.
    pub fn clear(&mut self) {
        self.token = None;
        self.confirmed = false;
        self.established_at = None;
    }

    /// Active token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether a token is held.
    pub fn is_established(&self) -> bool {
        self.token.is_some()
    }

    /// Whether the native side confirmed our handshake.
    pub fn is_confirmed(&self) -> bool {
        self.token.is_some() && self.confirmed
    }

    /// When the current token was received.
    pub fn established_at(&self) -> Option<Instant> {
        self.established_at
    }

    /// First `len` characters of the token, safe to log.
    pub fn token_prefix(&self, len: usize) -> Option<String> {
        self.token.as_deref().map(|t| t.chars().take(len).collect())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("established_at", &self.established_at)
            .finish_non_exhaustive()
    }
}
