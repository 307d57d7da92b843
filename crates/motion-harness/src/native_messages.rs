//! Builders for payloads the native view sends.
//!
//! Built from the protocol types, so tests cannot drift from the wire
//! format. Serializing these plain enums cannot fail; an empty string is
//! returned if it somehow does.

use motion_proto::{InboundMessage, SessionMessage};
use serde::Serialize;

fn to_json<T: Serialize>(message: &T) -> String {
    serde_json::to_string(message).unwrap_or_default()
}

/// `SESSION_READY` carrying `token`.
pub fn session_ready(token: &str) -> String {
    to_json(&SessionMessage::SessionReady { session_token: token.to_string() })
}

/// `HANDSHAKE_CONFIRMED`.
pub fn handshake_confirmed() -> String {
    to_json(&SessionMessage::HandshakeConfirmed)
}

/// `STATE_CHANGED` for `state` resolved to `profile_id`.
pub fn state_changed(state: &str, profile_id: &str) -> String {
    to_json(&InboundMessage::StateChanged {
        state: state.to_string(),
        profile_id: Some(profile_id.to_string()),
    })
}

/// `BLEND_COMPLETE`.
pub fn blend_complete() -> String {
    to_json(&InboundMessage::BlendComplete)
}

/// `ERROR` with `message`.
pub fn error(message: &str) -> String {
    to_json(&InboundMessage::Error { message: message.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_match_wire_format() {
        assert_eq!(session_ready("tok123"), r#"{"type":"SESSION_READY","sessionToken":"tok123"}"#);
        assert_eq!(handshake_confirmed(), r#"{"type":"HANDSHAKE_CONFIRMED"}"#);
        assert_eq!(
            state_changed("combat", "p1"),
            r#"{"type":"STATE_CHANGED","state":"combat","profileId":"p1"}"#
        );
        assert_eq!(error("boom"), r#"{"type":"ERROR","message":"boom"}"#);
    }
}
