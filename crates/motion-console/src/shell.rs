//! Command execution against a live bridge.
//!
//! The shell owns a [`Bridge`] wired to a [`Loopback`]. Each command runs,
//! then every payload the loopback received is echoed and every reply it
//! queued is fed back through the bridge, so a single `/ready` shows the
//! whole handshake.

use std::{io::Write, sync::Arc};

use motion_core::{Bridge, BridgeConfig, SystemEnv};
use motion_proto::{HeroMetadata, SessionMessage};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    commands::{Command, HELP},
    loopback::Loopback,
};

/// Replies fed back per command before giving up on a feedback loop.
const MAX_REPLIES_PER_COMMAND: usize = 32;

/// Shell errors.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A simulated native payload could not be built.
    #[error("failed to build payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop.
    Quit,
}

/// Console state.
pub struct Shell {
    bridge: Bridge<Loopback, SystemEnv>,
    loopback: Option<Loopback>,
    auto_reply: bool,
    rate_cap: usize,
    notifications: Arc<Mutex<Vec<String>>>,
}

impl Shell {
    /// Create a shell with an uninitialized bridge.
    pub fn new(config: BridgeConfig, auto_reply: bool) -> Self {
        let rate_cap = config.rate_limit_max_messages;
        let mut bridge = Bridge::new(SystemEnv, config);

        let notifications = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notifications);
        bridge.dispatcher_mut().subscribe(move |message| sink.lock().push(format!("{message:?}")));

        Self { bridge, loopback: None, auto_reply, rate_cap, notifications }
    }

    /// Bridge under test.
    pub fn bridge(&self) -> &Bridge<Loopback, SystemEnv> {
        &self.bridge
    }

    /// Run one command, writing human-readable output to `out`.
    ///
    /// # Errors
    /// Only output failures and payload construction failures; bridge
    /// rejections are reported as text.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow, ShellError> {
        if command != Command::Empty {
            debug!(?command, "executing console command");
        }

        match command {
            Command::Empty => return Ok(Flow::Continue),
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => writeln!(out, "{HELP}")?,

            Command::Init => {
                let loopback = Loopback::new(self.auto_reply);
                if self.bridge.initialize(loopback.clone()) {
                    self.loopback = Some(loopback);
                    writeln!(out, "initialized, waiting for session")?;
                } else {
                    writeln!(out, "already initialized")?;
                }
            },

            Command::Ready { token } => {
                let raw = serde_json::to_string(&SessionMessage::SessionReady { session_token: token })?;
                self.deliver(&raw, out)?;
            },

            Command::Confirm => {
                let raw = serde_json::to_string(&SessionMessage::HandshakeConfirmed)?;
                self.deliver(&raw, out)?;
            },

            Command::Raw { json } => self.deliver(&json, out)?,

            Command::State { tag, hero } => {
                let sent = self.bridge.dispatcher_mut().set_state(&tag, hero.map(HeroMetadata::hero));
                self.report(sent, out)?;
            },

            Command::Enter { state, hero } => {
                let sent =
                    self.bridge.dispatcher_mut().set_motion_state(state, hero.map(HeroMetadata::hero));
                self.report(sent, out)?;
            },

            Command::Intensity { value } => {
                let sent = self.bridge.dispatcher_mut().set_intensity(value);
                self.report(sent, out)?;
            },

            Command::Speed { value } => {
                let sent = self.bridge.dispatcher_mut().set_speed(value);
                self.report(sent, out)?;
            },

            Command::Stop => {
                let sent = self.bridge.dispatcher_mut().stop_motion();
                self.report(sent, out)?;
            },

            Command::Reset => {
                let sent = self.bridge.dispatcher_mut().reset_to_idle();
                self.report(sent, out)?;
            },

            Command::Status => self.write_status(out)?,

            Command::Cleanup => {
                self.bridge.cleanup();
                self.loopback = None;
                writeln!(out, "cleaned up")?;
            },

            Command::Unknown { input } => writeln!(out, "unknown command: {input} (try /help)")?,

            Command::InvalidArgs { error, .. } => writeln!(out, "{error}")?,
        }

        self.pump(out)?;
        Ok(Flow::Continue)
    }

    fn deliver(&mut self, raw: &str, out: &mut impl Write) -> Result<(), ShellError> {
        writeln!(out, "<- {raw}")?;
        let outcome = self.bridge.handle_unity_message(raw);
        writeln!(out, "   {outcome:?}")?;

        let notified = std::mem::take(&mut *self.notifications.lock());
        for message in notified {
            writeln!(out, "   subscriber saw {message}")?;
        }
        Ok(())
    }

    fn report(&self, sent: bool, out: &mut impl Write) -> Result<(), ShellError> {
        if sent {
            return Ok(());
        }
        match self.bridge.dispatcher().status().last_error {
            Some(err) => writeln!(out, "dropped (phase {:?}, last error: {err})", self.bridge.phase())?,
            None => writeln!(out, "dropped (phase {:?})", self.bridge.phase())?,
        }
        Ok(())
    }

    /// Echo what the loopback received and feed its replies back.
    fn pump(&mut self, out: &mut impl Write) -> Result<(), ShellError> {
        let Some(loopback) = self.loopback.clone() else {
            return Ok(());
        };

        for _ in 0..MAX_REPLIES_PER_COMMAND {
            for payload in loopback.take_posted() {
                writeln!(out, "-> {payload}")?;
            }
            match loopback.next_reply() {
                Some(reply) => self.deliver(&reply, out)?,
                None => return Ok(()),
            }
        }

        warn!(limit = MAX_REPLIES_PER_COMMAND, "loopback reply limit reached");
        writeln!(out, "reply limit reached, remaining replies left queued")?;
        Ok(())
    }

    fn write_status(&self, out: &mut impl Write) -> Result<(), ShellError> {
        let status = self.bridge.status();
        let dispatcher = self.bridge.dispatcher().status();

        writeln!(out, "phase:     {:?}", status.phase)?;
        match &status.token_prefix {
            Some(prefix) => writeln!(
                out,
                "session:   {prefix}… ({})",
                if status.session_confirmed { "confirmed" } else { "unconfirmed" }
            )?,
            None => writeln!(out, "session:   none")?,
        }
        writeln!(out, "window:    {}/{}", status.messages_in_window, self.rate_cap)?;

        let c = status.counters;
        writeln!(
            out,
            "sent:      {} (dropped: not_ready={} no_session={} rate_limited={}, native failures={})",
            c.sent, c.dropped_not_ready, c.dropped_no_session, c.dropped_rate_limited, c.native_failures
        )?;
        writeln!(
            out,
            "state:     {} (profile {})",
            dispatcher.current_state.as_deref().unwrap_or("-"),
            dispatcher.last_profile_id.as_deref().unwrap_or("-")
        )?;
        if let Some(err) = dispatcher.last_error {
            writeln!(out, "error:     {err}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("bridge", &self.bridge)
            .field("auto_reply", &self.auto_reply)
            .finish_non_exhaustive()
    }
}
