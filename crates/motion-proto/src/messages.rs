//! Message catalog for both directions of the bridge.
//!
//! # Outbound
//!
//! `SET_STATE`, `SET_INTENSITY`, `SET_SPEED`, `STOP_MOTION`, `RESET_TO_IDLE`
//! and `HANDSHAKE`. All but `HANDSHAKE` are wrapped in an [`Envelope`] that
//! adds the current `sessionToken`.
//!
//! # Inbound
//!
//! `SESSION_READY` and `HANDSHAKE_CONFIRMED` are session lifecycle messages
//! consumed by the bridge. `STATE_CHANGED`, `BLEND_COMPLETE` and `ERROR` are
//! status messages forwarded to the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    errors::{ProtocolError, Result},
    state::{HeroMetadata, MotionState},
};

/// Command sent to the native view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    /// Switch to a named motion state.
    SetState {
        /// Target state.
        state: MotionState,
        /// Hero the state applies to, resolved by the native side.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<HeroMetadata>,
    },
    /// Scale motion amplitude. Always within the intensity bounds.
    SetIntensity {
        /// Clamped intensity.
        value: f64,
    },
    /// Scale playback speed. Always within the speed bounds.
    SetSpeed {
        /// Clamped speed multiplier.
        value: f64,
    },
    /// Freeze the current motion.
    StopMotion,
    /// Return to the idle loop.
    ResetToIdle,
    /// Acknowledge a `SESSION_READY`. Carries its own token.
    Handshake {
        /// Token being acknowledged.
        session_token: String,
    },
}

impl OutboundMessage {
    /// Wire discriminant, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetState { .. } => "SET_STATE",
            Self::SetIntensity { .. } => "SET_INTENSITY",
            Self::SetSpeed { .. } => "SET_SPEED",
            Self::StopMotion => "STOP_MOTION",
            Self::ResetToIdle => "RESET_TO_IDLE",
            Self::Handshake { .. } => "HANDSHAKE",
        }
    }
}

/// Session lifecycle message from the native view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum SessionMessage {
    /// Native side issued a session token.
    ///
    /// A missing token decodes as empty and is rejected by the bridge.
    SessionReady {
        /// Opaque token required on every later command.
        #[serde(default)]
        session_token: String,
    },
    /// Native side accepted our `HANDSHAKE`.
    HandshakeConfirmed,
}

/// Status message from the native view, delivered to dispatcher subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    /// The native view entered a new state.
    StateChanged {
        /// State tag as reported. The native side is authoritative, so this
        /// is kept verbatim even if it is not a known [`MotionState`].
        state: String,
        /// Motion profile the native side resolved.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        profile_id: Option<String>,
    },
    /// A blend between two states finished.
    BlendComplete,
    /// The native side reported a failure.
    Error {
        /// Human-readable description.
        message: String,
    },
}

const SESSION_TYPES: [&str; 2] = ["SESSION_READY", "HANDSHAKE_CONFIRMED"];
const INBOUND_TYPES: [&str; 3] = ["STATE_CHANGED", "BLEND_COMPLETE", "ERROR"];

/// Outbound message with the session token stamped next to its fields.
///
/// Serializes as one flat object: `{"type":"SET_SPEED","value":1.0,"sessionToken":"..."}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Envelope<'a> {
    /// Message being sent.
    #[serde(flatten)]
    pub message: &'a OutboundMessage,

    /// Token of the active session.
    #[serde(rename = "sessionToken", skip_serializing_if = "Option::is_none")]
    pub session_token: Option<&'a str>,
}

impl<'a> Envelope<'a> {
    /// Wrap `message` with `session_token`.
    pub fn stamped(message: &'a OutboundMessage, session_token: &'a str) -> Self {
        Self { message, session_token: Some(session_token) }
    }

    /// Serialize to the wire string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

/// Serialize an outbound message without a session token.
pub fn encode(message: &OutboundMessage) -> Result<String> {
    serde_json::to_string(message).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decode a status message destined for the dispatcher.
///
/// Lifecycle messages are not part of this catalog and come back as
/// [`ProtocolError::UnknownType`].
pub fn decode_inbound(raw: &str) -> Result<InboundMessage> {
    let value = parse_object(raw)?;
    let kind = type_of(&value)?;
    if !INBOUND_TYPES.contains(&kind) {
        return Err(ProtocolError::UnknownType(kind.to_string()));
    }
    serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// Decode a session lifecycle message.
///
/// Returns `Ok(None)` for any well-formed object that is not a lifecycle
/// message.
pub fn decode_session(raw: &str) -> Result<Option<SessionMessage>> {
    let value = parse_object(raw)?;
    let Ok(kind) = type_of(&value) else {
        return Ok(None);
    };
    if !SESSION_TYPES.contains(&kind) {
        return Ok(None);
    }
    serde_json::from_value(value).map(Some).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

fn parse_object(raw: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ProtocolError::Malformed("expected a JSON object".into()))
    }
}

fn type_of(value: &Value) -> Result<&str> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::Malformed("missing string `type` field".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_state_wire_shape() {
        let msg = OutboundMessage::SetState {
            state: MotionState::Combat,
            metadata: Some(HeroMetadata::hero("aethon")),
        };
        insta::assert_snapshot!(
            encode(&msg).unwrap(),
            @r#"{"type":"SET_STATE","state":"combat","metadata":{"heroId":"aethon"}}"#
        );
    }

    #[test]
    fn envelope_stamps_token_last() {
        let msg = OutboundMessage::SetSpeed { value: 1.5 };
        let json = Envelope::stamped(&msg, "tok123").to_json().unwrap();
        insta::assert_snapshot!(json, @r#"{"type":"SET_SPEED","value":1.5,"sessionToken":"tok123"}"#);
    }

    #[test]
    fn unit_commands_stamp_token() {
        let json = Envelope::stamped(&OutboundMessage::ResetToIdle, "t").to_json().unwrap();
        assert_eq!(json, r#"{"type":"RESET_TO_IDLE","sessionToken":"t"}"#);
    }

    #[test]
    fn handshake_carries_its_own_token() {
        let msg = OutboundMessage::Handshake { session_token: "abc".into() };
        assert_eq!(encode(&msg).unwrap(), r#"{"type":"HANDSHAKE","sessionToken":"abc"}"#);
    }

    #[test]
    fn decode_state_changed() {
        let msg =
            decode_inbound(r#"{"type":"STATE_CHANGED","state":"combat","profileId":"p1"}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::StateChanged { state: "combat".into(), profile_id: Some("p1".into()) }
        );
    }

    #[test]
    fn decode_error_and_blend() {
        assert_eq!(
            decode_inbound(r#"{"type":"ERROR","message":"boom"}"#),
            Ok(InboundMessage::Error { message: "boom".into() })
        );
        assert_eq!(decode_inbound(r#"{"type":"BLEND_COMPLETE"}"#), Ok(InboundMessage::BlendComplete));
    }

    #[test]
    fn inbound_rejects_lifecycle_and_unknown_types() {
        assert_eq!(
            decode_inbound(r#"{"type":"SESSION_READY","sessionToken":"x"}"#),
            Err(ProtocolError::UnknownType("SESSION_READY".into()))
        );
        assert!(matches!(decode_inbound(r#"{"type":"DANCE"}"#), Err(ProtocolError::UnknownType(_))));
    }

    #[test]
    fn inbound_rejects_garbage() {
        assert!(decode_inbound("not json").unwrap_err().is_malformed());
        assert!(decode_inbound("[1,2]").unwrap_err().is_malformed());
        assert!(decode_inbound(r#"{"state":"idle"}"#).unwrap_err().is_malformed());
        assert!(decode_inbound(r#"{"type":"ERROR"}"#).unwrap_err().is_malformed());
    }

    #[test]
    fn decode_session_ready() {
        assert_eq!(
            decode_session(r#"{"type":"SESSION_READY","sessionToken":"tok123"}"#),
            Ok(Some(SessionMessage::SessionReady { session_token: "tok123".into() }))
        );
    }

    #[test]
    fn session_ready_without_token_is_empty() {
        assert_eq!(
            decode_session(r#"{"type":"SESSION_READY"}"#),
            Ok(Some(SessionMessage::SessionReady { session_token: String::new() }))
        );
    }

    #[test]
    fn non_lifecycle_objects_are_none() {
        assert_eq!(decode_session(r#"{"type":"BLEND_COMPLETE"}"#), Ok(None));
        assert_eq!(decode_session(r#"{"no_type":true}"#), Ok(None));
        assert!(decode_session("{").is_err());
    }
}
