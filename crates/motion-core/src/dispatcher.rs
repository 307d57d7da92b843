//! State dispatcher.
//!
//! Translates typed, validated intents into outbound commands and fans out
//! inbound status messages to subscribers. The dispatcher owns the cached
//! view of the native side (`current_state`, `last_profile_id`,
//! `last_error`) and nothing else; sessions and rate limits belong to
//! whatever [`Transport`] it was initialized with.
//!
//! Every dispatch method returns `bool`. The native view is routinely
//! absent (before mount, during navigation), so a `false` is a signal for
//! the caller to ignore or softly surface, never a reason to fail.

use motion_proto::{
    HeroMetadata, InboundMessage, MotionState, OutboundMessage, ProtocolError, decode_inbound,
    limits,
};
use tracing::{debug, warn};

use crate::transport::Transport;

/// Callback invoked for every inbound status message.
pub type Subscriber = Box<dyn FnMut(&InboundMessage) + Send>;

/// Handle returned by [`Dispatcher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Read-only snapshot for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherStatus {
    /// A transport is attached.
    pub is_connected: bool,
    /// Last state the native side reported.
    pub current_state: Option<String>,
    /// Last profile the native side reported.
    pub last_profile_id: Option<String>,
    /// Most recent validation, decode or native failure.
    pub last_error: Option<String>,
}

/// Motion-state dispatcher
///
/// Never performs animation math: it only names states and passes bounded
/// scalars through.
#[derive(Default)]
pub struct Dispatcher {
    transport: Option<Box<dyn Transport>>,
    current_state: Option<String>,
    last_profile_id: Option<String>,
    last_error: Option<String>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Dispatcher {
    /// Create a disconnected dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the transport and mark connected.
    ///
    /// Re-initializing replaces the previous transport and logs a warning.
    pub fn initialize(&mut self, transport: Box<dyn Transport>) {
        if self.transport.replace(transport).is_some() {
            warn!("dispatcher re-initialized, replacing existing transport");
        } else {
            debug!("dispatcher connected");
        }
    }

    /// Drop the transport. Later dispatches return `false`.
    pub fn disconnect(&mut self) {
        if self.transport.take().is_some() {
            debug!("dispatcher disconnected");
        }
    }

    /// Whether a transport is attached.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Request a state by wire tag.
    ///
    /// Unknown tags are rejected without touching the transport and recorded
    /// as `last_error`.
    pub fn set_state(&mut self, tag: &str, metadata: Option<HeroMetadata>) -> bool {
        match tag.parse::<MotionState>() {
            Ok(state) => self.set_motion_state(state, metadata),
            Err(err) => {
                warn!(state = tag, "rejecting unknown motion state");
                self.last_error = Some(err.to_string());
                false
            },
        }
    }

    /// Request a state.
    pub fn set_motion_state(&mut self, state: MotionState, metadata: Option<HeroMetadata>) -> bool {
        self.dispatch(OutboundMessage::SetState { state, metadata })
    }

    /// Set motion intensity, clamped into the intensity bounds.
    pub fn set_intensity(&mut self, value: f64) -> bool {
        let clamped = limits::clamp_intensity(value);
        if clamped.to_bits() != value.to_bits() {
            warn!(requested = value, clamped, "intensity out of range, clamping");
        }
        self.dispatch(OutboundMessage::SetIntensity { value: clamped })
    }

    /// Set playback speed, clamped into the speed bounds.
    pub fn set_speed(&mut self, value: f64) -> bool {
        let clamped = limits::clamp_speed(value);
        if clamped.to_bits() != value.to_bits() {
            warn!(requested = value, clamped, "speed out of range, clamping");
        }
        self.dispatch(OutboundMessage::SetSpeed { value: clamped })
    }

    /// Freeze the current motion.
    pub fn stop_motion(&mut self) -> bool {
        self.dispatch(OutboundMessage::StopMotion)
    }

    /// Return to the idle loop.
    pub fn reset_to_idle(&mut self) -> bool {
        self.dispatch(OutboundMessage::ResetToIdle)
    }

    /// Enter [`MotionState::Idle`].
    pub fn enter_idle(&mut self, metadata: Option<HeroMetadata>) -> bool {
        self.set_motion_state(MotionState::Idle, metadata)
    }

    /// Enter [`MotionState::Combat`].
    pub fn enter_combat(&mut self, metadata: Option<HeroMetadata>) -> bool {
        self.set_motion_state(MotionState::Combat, metadata)
    }

    /// Enter [`MotionState::Banner`].
    pub fn enter_banner(&mut self, metadata: Option<HeroMetadata>) -> bool {
        self.set_motion_state(MotionState::Banner, metadata)
    }

    /// Enter [`MotionState::Summon`].
    pub fn enter_summon(&mut self, metadata: Option<HeroMetadata>) -> bool {
        self.set_motion_state(MotionState::Summon, metadata)
    }

    /// Enter [`MotionState::Victory`].
    pub fn enter_victory(&mut self, metadata: Option<HeroMetadata>) -> bool {
        self.set_motion_state(MotionState::Victory, metadata)
    }

    /// Enter [`MotionState::Defeat`].
    pub fn enter_defeat(&mut self, metadata: Option<HeroMetadata>) -> bool {
        self.set_motion_state(MotionState::Defeat, metadata)
    }

    /// Enter [`MotionState::Dialogue`].
    pub fn enter_dialogue(&mut self, metadata: Option<HeroMetadata>) -> bool {
        self.set_motion_state(MotionState::Dialogue, metadata)
    }

    /// Process a raw status message from the native side.
    ///
    /// Bookkeeping happens first, then every subscriber sees the parsed
    /// message in registration order. Decode failures are logged, recorded
    /// as `last_error` and returned; subscribers are not called.
    pub fn handle_unity_message(&mut self, raw: &str) -> Result<InboundMessage, ProtocolError> {
        let message = match decode_inbound(raw) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "failed to decode native message");
                self.last_error = Some(err.to_string());
                return Err(err);
            },
        };

        match &message {
            InboundMessage::StateChanged { state, profile_id } => {
                debug!(state = %state, profile = ?profile_id, "native state changed");
                self.current_state = Some(state.clone());
                self.last_profile_id.clone_from(profile_id);
            },
            InboundMessage::BlendComplete => debug!("native blend complete"),
            InboundMessage::Error { message } => {
                warn!(error = %message, "native view reported an error");
                self.last_error = Some(message.clone());
            },
        }

        for (_, subscriber) in &mut self.subscribers {
            subscriber(&message);
        }

        Ok(message)
    }

    /// Register a callback for inbound status messages.
    pub fn subscribe(&mut self, callback: impl FnMut(&InboundMessage) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshot of connection and cached native state.
    pub fn status(&self) -> DispatcherStatus {
        DispatcherStatus {
            is_connected: self.is_connected(),
            current_state: self.current_state.clone(),
            last_profile_id: self.last_profile_id.clone(),
            last_error: self.last_error.clone(),
        }
    }

    fn dispatch(&mut self, message: OutboundMessage) -> bool {
        let Some(transport) = self.transport.as_mut() else {
            debug!(kind = message.kind(), "dispatcher not connected, dropping command");
            return false;
        };

        match transport.post_message(&message) {
            Ok(()) => true,
            Err(err) if err.is_expected_drop() => false,
            Err(err) => {
                self.last_error = Some(err.to_string());
                false
            },
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("is_connected", &self.is_connected())
            .field("current_state", &self.current_state)
            .field("last_profile_id", &self.last_profile_id)
            .field("last_error", &self.last_error)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
