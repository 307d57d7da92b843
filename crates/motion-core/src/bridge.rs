//! Transport bridge between the dispatcher and the native view.
//!
//! The bridge is the only component that talks to the [`NativeModule`]. It
//! enforces the policies the dispatcher knows nothing about: commands need an
//! established session and must fit in the rate window.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────────┐ initialize ┌────────────────┐ SESSION_READY ┌───────────────┐
//! │ Uninitialized │───────────>│ WiredNoSession │──────────────>│ SessionActive │
//! └───────────────┘            └────────────────┘               └───────────────┘
//!         ^                            │                                │
//!         └────────────────── cleanup ─┴────────────────────────────────┘
//! ```
//!
//! Both wired phases accept inbound messages. Only `SessionActive` lets
//! outbound commands through; everything else is dropped.
//!
//! # Outbound path
//!
//! On every dispatched command the session gate:
//! 1. Drops it if no module is attached or no session exists, logging at
//!    most once per `rejection_log_interval`
//! 2. Drops it with a warning if the rate window is full
//! 3. Stamps the session token and serializes
//! 4. Hands the JSON to the native module, logging any failure
//!
//! Dropped commands are lost. Motion states are transient hints, so there is
//! no retry queue.
//!
//! # Locking
//!
//! The bridge and the gate it registers with the dispatcher share one
//! mutex-guarded link. Each transition runs under a single lock
//! acquisition, and the lock is never held while the dispatcher runs
//! subscriber callbacks.

use std::sync::Arc;

use motion_proto::{
    Envelope, InboundMessage, OutboundMessage, ProtocolError, SessionMessage, decode_session,
    encode,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    config::BridgeConfig,
    dispatcher::Dispatcher,
    env::Environment,
    error::{SessionError, TransportError},
    rate_limit::{LogThrottle, RateWindow},
    session::Session,
    transport::{NativeModule, Transport},
};

/// Bridge lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    /// No native module attached.
    Uninitialized,
    /// Module attached, waiting for `SESSION_READY`.
    WiredNoSession,
    /// Session established, commands enabled.
    SessionActive,
}

/// What the bridge did with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// `SESSION_READY` accepted and the session stored.
    SessionEstablished {
        /// Whether the `HANDSHAKE` acknowledgement reached the module.
        handshake_sent: bool,
    },
    /// `HANDSHAKE_CONFIRMED` accepted.
    HandshakeConfirmed,
    /// A lifecycle message was refused.
    SessionRejected(SessionError),
    /// Not a lifecycle message; passed to the dispatcher.
    Forwarded(Result<InboundMessage, ProtocolError>),
    /// Bridge is not initialized; message dropped.
    Ignored,
}

/// Lifetime counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounters {
    /// Commands handed to the native module.
    pub sent: u64,
    /// Commands dropped because no module was attached.
    pub dropped_not_ready: u64,
    /// Commands dropped because no session existed.
    pub dropped_no_session: u64,
    /// Commands dropped by the rate limiter.
    pub dropped_rate_limited: u64,
    /// Native module calls that failed.
    pub native_failures: u64,
}

/// Snapshot of the bridge for diagnostics screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeStatus {
    /// Lifecycle phase.
    pub phase: BridgePhase,
    /// Native side confirmed the handshake.
    pub session_confirmed: bool,
    /// Loggable token prefix, if a session exists.
    pub token_prefix: Option<String>,
    /// Commands counted in the current rate window.
    pub messages_in_window: usize,
    /// Lifetime counters.
    pub counters: LinkCounters,
}

/// State shared by the bridge and its session gate.
struct Link<N, E> {
    env: E,
    config: BridgeConfig,
    module: Option<N>,
    session: Session,
    window: RateWindow,
    rejections: LogThrottle,
    counters: LinkCounters,
}

impl<N: NativeModule, E: Environment> Link<N, E> {
    fn new(env: E, config: BridgeConfig) -> Self {
        Self {
            env,
            window: RateWindow::new(config.rate_limit_max_messages, config.rate_limit_window),
            rejections: LogThrottle::new(config.rejection_log_interval),
            config,
            module: None,
            session: Session::new(),
            counters: LinkCounters::default(),
        }
    }

    fn phase(&self) -> BridgePhase {
        match (&self.module, self.session.is_established()) {
            (None, _) => BridgePhase::Uninitialized,
            (Some(_), false) => BridgePhase::WiredNoSession,
            (Some(_), true) => BridgePhase::SessionActive,
        }
    }

    fn send(&mut self, message: &OutboundMessage) -> Result<(), TransportError> {
        let now = self.env.now();

        if self.module.is_none() {
            self.counters.dropped_not_ready += 1;
            if let Some(suppressed) = self.rejections.hit(now) {
                warn!(kind = message.kind(), suppressed, "native module not attached, dropping command");
            }
            return Err(TransportError::NotReady);
        }

        let Some(token) = self.session.token() else {
            self.counters.dropped_no_session += 1;
            if let Some(suppressed) = self.rejections.hit(now) {
                warn!(kind = message.kind(), suppressed, "no session yet, dropping command");
            }
            return Err(TransportError::NoSession);
        };

        if !self.window.try_acquire(now) {
            self.counters.dropped_rate_limited += 1;
            warn!(
                kind = message.kind(),
                limit = self.window.cap(),
                "rate limit exceeded, dropping command"
            );
            return Err(TransportError::RateLimited {
                limit: self.window.cap(),
                window_ms: self.window.window().as_millis(),
            });
        }

        let payload = Envelope::stamped(message, token).to_json()?;
        self.post(message.kind(), &payload)
    }

    fn handshake(&mut self, token: &str) -> bool {
        let message = OutboundMessage::Handshake { session_token: token.to_string() };
        let payload = match encode(&message) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "failed to encode handshake");
                return false;
            },
        };
        self.post(message.kind(), &payload).is_ok()
    }

    fn post(&mut self, kind: &'static str, payload: &str) -> Result<(), TransportError> {
        let Some(module) = self.module.as_mut() else {
            warn!(kind, "native module not attached, dropping message");
            return Err(TransportError::NotReady);
        };

        match module.post_message(&self.config.game_object, &self.config.method, payload) {
            Ok(()) => {
                self.counters.sent += 1;
                debug!(kind, "forwarded to native module");
                Ok(())
            },
            Err(err) => {
                self.counters.native_failures += 1;
                error!(kind, error = %err, "native module post failed");
                Err(err.into())
            },
        }
    }

    fn token_prefix(&self) -> Option<String> {
        self.session.token_prefix(self.config.token_log_prefix)
    }
}

/// Transport registered with the dispatcher.
struct SessionGate<N, E> {
    link: Arc<Mutex<Link<N, E>>>,
}

impl<N: NativeModule, E: Environment> Transport for SessionGate<N, E> {
    fn post_message(&mut self, message: &OutboundMessage) -> Result<(), TransportError> {
        self.link.lock().send(message)
    }
}

/// Motion-state bridge
///
/// Owns the dispatcher and the native module handle. Construct one at the
/// application's composition root and hand out references; there is no
/// global instance.
pub struct Bridge<N: NativeModule, E: Environment> {
    link: Arc<Mutex<Link<N, E>>>,
    dispatcher: Dispatcher,
}

impl<N: NativeModule, E: Environment> Bridge<N, E> {
    /// Create an uninitialized bridge.
    pub fn new(env: E, config: BridgeConfig) -> Self {
        Self { link: Arc::new(Mutex::new(Link::new(env, config))), dispatcher: Dispatcher::new() }
    }

    /// Attach the native module and wire the dispatcher.
    ///
    /// Commands stay blocked until `SESSION_READY` arrives. Returns `false`
    /// and changes nothing if a module is already attached.
    pub fn initialize(&mut self, module: N) -> bool {
        {
            let mut link = self.link.lock();
            if link.module.is_some() {
                warn!("bridge already initialized, ignoring");
                return false;
            }
            link.module = Some(module);
        }

        self.dispatcher.initialize(Box::new(SessionGate { link: Arc::clone(&self.link) }));
        info!("bridge initialized, waiting for session");
        true
    }

    /// Dispatcher for read access.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Dispatcher for issuing commands.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Process a raw message from the native module.
    ///
    /// Session lifecycle messages are consumed here. Everything else,
    /// including payloads that are not valid JSON, goes to the dispatcher
    /// unchanged.
    pub fn handle_unity_message(&mut self, raw: &str) -> InboundOutcome {
        if !self.is_ready() {
            debug!("bridge not initialized, ignoring native message");
            return match decode_session(raw) {
                Ok(Some(_)) => InboundOutcome::SessionRejected(SessionError::NotInitialized),
                _ => InboundOutcome::Ignored,
            };
        }

        match decode_session(raw) {
            Ok(Some(SessionMessage::SessionReady { session_token })) => {
                self.establish_session(&session_token)
            },
            Ok(Some(SessionMessage::HandshakeConfirmed)) => self.confirm_session(),
            Ok(None) | Err(_) => InboundOutcome::Forwarded(self.dispatcher.handle_unity_message(raw)),
        }
    }

    /// Send a `HANDSHAKE` for `token` straight to the native module.
    ///
    /// Skips the session and rate checks, since it is part of establishing
    /// the session.
    pub fn perform_handshake(&mut self, token: &str) -> bool {
        self.link.lock().handshake(token)
    }

    /// Tear down: disconnect the dispatcher, drop the module, forget the
    /// session and rate history.
    ///
    /// Safe to call repeatedly and before `initialize`.
    pub fn cleanup(&mut self) {
        self.dispatcher.disconnect();

        let mut link = self.link.lock();
        let was_wired = link.module.take().is_some();
        link.session.clear();
        link.window.reset();
        link.rejections.reset();
        if was_wired {
            info!("bridge cleaned up");
        }
    }

    /// Native module attached.
    pub fn is_ready(&self) -> bool {
        self.link.lock().module.is_some()
    }

    /// Session established.
    pub fn is_session_valid(&self) -> bool {
        self.link.lock().session.is_established()
    }

    /// Module attached and session established.
    pub fn can_send_commands(&self) -> bool {
        self.phase() == BridgePhase::SessionActive
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> BridgePhase {
        self.link.lock().phase()
    }

    /// Diagnostics snapshot.
    pub fn status(&self) -> BridgeStatus {
        let mut link = self.link.lock();
        let now = link.env.now();
        BridgeStatus {
            phase: link.phase(),
            session_confirmed: link.session.is_confirmed(),
            token_prefix: link.token_prefix(),
            messages_in_window: link.window.len(now),
            counters: link.counters,
        }
    }

    fn establish_session(&mut self, token: &str) -> InboundOutcome {
        let mut link = self.link.lock();
        let now = link.env.now();
        let replacing = link.session.is_established();

        if let Err(err) = link.session.establish(token, now) {
            warn!(error = %err, "rejecting SESSION_READY");
            return InboundOutcome::SessionRejected(err);
        }

        link.rejections.reset();
        if replacing {
            info!("session replaced");
        } else {
            info!("session established");
        }
        debug!(token = ?link.token_prefix(), "session token prefix");

        let handshake_sent = link.handshake(token);
        InboundOutcome::SessionEstablished { handshake_sent }
    }

    fn confirm_session(&mut self) -> InboundOutcome {
        match self.link.lock().session.confirm() {
            Ok(()) => {
                debug!("handshake confirmed");
                InboundOutcome::HandshakeConfirmed
            },
            Err(err) => {
                warn!(error = %err, "ignoring HANDSHAKE_CONFIRMED");
                InboundOutcome::SessionRejected(err)
            },
        }
    }
}

impl<N: NativeModule, E: Environment> std::fmt::Debug for Bridge<N, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("phase", &self.phase())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::error::NativeError;

    #[derive(Clone, Default)]
    struct Recorder {
        posted: Arc<Mutex<Vec<(String, String, String)>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl Recorder {
        fn payloads(&self) -> Vec<String> {
            self.posted.lock().iter().map(|(_, _, p)| p.clone()).collect()
        }
    }

    impl NativeModule for Recorder {
        fn post_message(
            &mut self,
            game_object: &str,
            method: &str,
            payload: &str,
        ) -> Result<(), NativeError> {
            if *self.fail.lock() {
                return Err(NativeError("view unmounted".into()));
            }
            self.posted.lock().push((game_object.into(), method.into(), payload.into()));
            Ok(())
        }
    }

    #[derive(Clone)]
    struct ManualClock(Arc<Mutex<Instant>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Arc::new(Mutex::new(Instant::now())))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock() += by;
        }
    }

    impl Environment for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock()
        }
    }

    fn wired(config: BridgeConfig) -> (Bridge<Recorder, ManualClock>, Recorder, ManualClock) {
        let clock = ManualClock::new();
        let native = Recorder::default();
        let mut bridge = Bridge::new(clock.clone(), config);
        assert!(bridge.initialize(native.clone()));
        (bridge, native, clock)
    }

    fn ready(bridge: &mut Bridge<Recorder, ManualClock>, token: &str) {
        let raw = format!(r#"{{"type":"SESSION_READY","sessionToken":"{token}"}}"#);
        assert_eq!(
            bridge.handle_unity_message(&raw),
            InboundOutcome::SessionEstablished { handshake_sent: true }
        );
    }

    #[test]
    fn bridge_lifecycle() {
        let clock = ManualClock::new();
        let mut bridge: Bridge<Recorder, ManualClock> = Bridge::new(clock, BridgeConfig::default());
        assert_eq!(bridge.phase(), BridgePhase::Uninitialized);
        assert!(!bridge.is_ready());

        assert!(bridge.initialize(Recorder::default()));
        assert_eq!(bridge.phase(), BridgePhase::WiredNoSession);
        assert!(bridge.is_ready());
        assert!(!bridge.is_session_valid());
        assert!(!bridge.can_send_commands());

        ready(&mut bridge, "tok123");
        assert_eq!(bridge.phase(), BridgePhase::SessionActive);
        assert!(bridge.can_send_commands());

        bridge.cleanup();
        assert_eq!(bridge.phase(), BridgePhase::Uninitialized);
        assert!(!bridge.dispatcher().is_connected());
    }

    #[test]
    fn commands_blocked_until_session() {
        let (mut bridge, native, _) = wired(BridgeConfig::default());
        assert!(!bridge.dispatcher_mut().enter_combat(None));
        assert!(native.payloads().is_empty());
        assert_eq!(bridge.status().counters.dropped_no_session, 1);
    }

    #[test]
    fn session_ready_sends_handshake_and_stamps_commands() {
        let (mut bridge, native, _) = wired(BridgeConfig::default());
        ready(&mut bridge, "tok123");
        assert!(bridge.dispatcher_mut().set_speed(2.0));

        let payloads = native.payloads();
        assert_eq!(payloads[0], r#"{"type":"HANDSHAKE","sessionToken":"tok123"}"#);
        insta::assert_snapshot!(payloads[1], @r#"{"type":"SET_SPEED","value":2.0,"sessionToken":"tok123"}"#);
    }

    #[test]
    fn commands_target_configured_game_object() {
        let config = BridgeConfig {
            game_object: "Stage".into(),
            method: "Receive".into(),
            ..BridgeConfig::default()
        };
        let (mut bridge, native, _) = wired(config);
        ready(&mut bridge, "t");

        let posted = native.posted.lock().clone();
        assert_eq!(posted[0].0, "Stage");
        assert_eq!(posted[0].1, "Receive");
    }

    #[test]
    fn empty_token_is_rejected() {
        let (mut bridge, native, _) = wired(BridgeConfig::default());
        let outcome = bridge.handle_unity_message(r#"{"type":"SESSION_READY","sessionToken":""}"#);
        assert_eq!(outcome, InboundOutcome::SessionRejected(SessionError::EmptyToken));
        assert!(!bridge.is_session_valid());
        assert!(native.payloads().is_empty());
    }

    #[test]
    fn handshake_confirmation() {
        let (mut bridge, _, _) = wired(BridgeConfig::default());
        assert_eq!(
            bridge.handle_unity_message(r#"{"type":"HANDSHAKE_CONFIRMED"}"#),
            InboundOutcome::SessionRejected(SessionError::NoSession)
        );

        ready(&mut bridge, "tok");
        assert_eq!(
            bridge.handle_unity_message(r#"{"type":"HANDSHAKE_CONFIRMED"}"#),
            InboundOutcome::HandshakeConfirmed
        );
        assert!(bridge.status().session_confirmed);
    }

    #[test]
    fn lifecycle_messages_are_not_forwarded() {
        let (mut bridge, _, _) = wired(BridgeConfig::default());
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        bridge.dispatcher_mut().subscribe(move |_| *counter.lock() += 1);

        ready(&mut bridge, "tok");
        bridge.handle_unity_message(r#"{"type":"HANDSHAKE_CONFIRMED"}"#);
        assert_eq!(*calls.lock(), 0);

        bridge.handle_unity_message(r#"{"type":"BLEND_COMPLETE"}"#);
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn unparseable_input_still_reaches_dispatcher() {
        let (mut bridge, _, _) = wired(BridgeConfig::default());
        let outcome = bridge.handle_unity_message("<<garbage>>");
        assert!(matches!(outcome, InboundOutcome::Forwarded(Err(ProtocolError::Malformed(_)))));
        assert!(bridge.dispatcher().status().last_error.is_some());
    }

    #[test]
    fn rate_limit_drops_only_the_overflow() {
        let config = BridgeConfig { rate_limit_max_messages: 3, ..BridgeConfig::default() };
        let (mut bridge, native, clock) = wired(config);
        ready(&mut bridge, "tok");

        let results: Vec<bool> = (0..4).map(|_| bridge.dispatcher_mut().stop_motion()).collect();
        assert_eq!(results, vec![true, true, true, false]);
        assert_eq!(bridge.status().counters.dropped_rate_limited, 1);

        clock.advance(Duration::from_secs(1));
        assert!(bridge.dispatcher_mut().stop_motion());
        // Handshake plus four admitted commands.
        assert_eq!(native.payloads().len(), 5);
    }

    #[test]
    fn native_failure_is_caught_and_recorded() {
        let (mut bridge, native, _) = wired(BridgeConfig::default());
        ready(&mut bridge, "tok");

        *native.fail.lock() = true;
        assert!(!bridge.dispatcher_mut().enter_idle(None));
        assert!(bridge.dispatcher().status().last_error.unwrap().contains("view unmounted"));
        assert_eq!(bridge.status().counters.native_failures, 1);
    }

    #[test]
    fn double_initialize_is_ignored() {
        let (mut bridge, first, _) = wired(BridgeConfig::default());
        let second = Recorder::default();
        assert!(!bridge.initialize(second.clone()));

        ready(&mut bridge, "tok");
        assert_eq!(first.payloads().len(), 1);
        assert!(second.payloads().is_empty());
    }

    #[test]
    fn cleanup_is_idempotent_and_safe_before_initialize() {
        let mut bridge: Bridge<Recorder, ManualClock> =
            Bridge::new(ManualClock::new(), BridgeConfig::default());
        bridge.cleanup();
        bridge.cleanup();
        assert_eq!(bridge.phase(), BridgePhase::Uninitialized);

        assert!(bridge.initialize(Recorder::default()));
        ready(&mut bridge, "tok");
        bridge.cleanup();
        bridge.cleanup();
        assert!(!bridge.is_session_valid());
        assert_eq!(bridge.status().token_prefix, None);
    }

    #[test]
    fn uninitialized_bridge_ignores_inbound() {
        let mut bridge: Bridge<Recorder, ManualClock> =
            Bridge::new(ManualClock::new(), BridgeConfig::default());
        assert_eq!(
            bridge.handle_unity_message(r#"{"type":"SESSION_READY","sessionToken":"x"}"#),
            InboundOutcome::SessionRejected(SessionError::NotInitialized)
        );
        assert_eq!(bridge.handle_unity_message(r#"{"type":"BLEND_COMPLETE"}"#), InboundOutcome::Ignored);
        assert!(!bridge.is_session_valid());
    }

    #[test]
    fn token_prefix_is_truncated() {
        let config = BridgeConfig { token_log_prefix: 4, ..BridgeConfig::default() };
        let (mut bridge, _, _) = wired(config);
        ready(&mut bridge, "abcdefghij");
        assert_eq!(bridge.status().token_prefix.as_deref(), Some("abcd"));
    }
}
