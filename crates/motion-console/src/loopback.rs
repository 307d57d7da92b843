//! In-process stand-in for the native view.
//!
//! Records every payload it is handed and, when auto-reply is on, queues the
//! answer a real view would send: `HANDSHAKE_CONFIRMED` for a handshake and
//! `STATE_CHANGED` for each state request. The console drains the queue and
//! feeds it back through the bridge.

use std::{collections::VecDeque, sync::Arc};

use motion_core::{NativeError, NativeModule};
use motion_proto::{InboundMessage, MotionState, SessionMessage};
use parking_lot::Mutex;
use serde_json::Value;

/// Profile id reported when a state request names no hero.
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Default)]
struct Inner {
    posted: Vec<String>,
    replies: VecDeque<String>,
    auto_reply: bool,
    fail_next: Option<String>,
}

/// Cloneable handle; the bridge owns one clone, the console keeps another.
#[derive(Debug, Clone, Default)]
pub struct Loopback {
    inner: Arc<Mutex<Inner>>,
}

impl Loopback {
    /// Create a loopback, optionally answering commands.
    pub fn new(auto_reply: bool) -> Self {
        Self { inner: Arc::new(Mutex::new(Inner { auto_reply, ..Inner::default() })) }
    }

    /// Make the next `post_message` fail with `reason`.
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.inner.lock().fail_next = Some(reason.into());
    }

    /// Drain payloads received since the last call.
    pub fn take_posted(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.lock().posted)
    }

    /// Pop the oldest queued reply.
    pub fn next_reply(&self) -> Option<String> {
        self.inner.lock().replies.pop_front()
    }
}

impl NativeModule for Loopback {
    fn post_message(
        &mut self,
        game_object: &str,
        method: &str,
        payload: &str,
    ) -> Result<(), NativeError> {
        let mut inner = self.inner.lock();
        if let Some(reason) = inner.fail_next.take() {
            return Err(NativeError(reason));
        }

        inner.posted.push(format!("{game_object}.{method} {payload}"));
        if inner.auto_reply {
            if let Some(reply) = reply_for(payload) {
                inner.replies.push_back(reply);
            }
        }
        Ok(())
    }
}

/// Answer a real native view would give to `payload`, if any.
pub fn reply_for(payload: &str) -> Option<String> {
    let value: Value = serde_json::from_str(payload).ok()?;
    let reply = match value.get("type")?.as_str()? {
        "HANDSHAKE" => serde_json::to_string(&SessionMessage::HandshakeConfirmed),
        "SET_STATE" => {
            let state = value.get("state")?.as_str()?;
            let hero = value
                .pointer("/metadata/heroId")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PROFILE);
            state_changed(state, hero)
        },
        "RESET_TO_IDLE" => state_changed(MotionState::Idle.as_str(), DEFAULT_PROFILE),
        "STOP_MOTION" => serde_json::to_string(&InboundMessage::BlendComplete),
        _ => return None,
    };
    reply.ok()
}

fn state_changed(state: &str, hero: &str) -> serde_json::Result<String> {
    serde_json::to_string(&InboundMessage::StateChanged {
        state: state.to_string(),
        profile_id: Some(format!("{state}:{hero}")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_is_confirmed() {
        let reply = reply_for(r#"{"type":"HANDSHAKE","sessionToken":"tok"}"#);
        assert_eq!(reply.as_deref(), Some(r#"{"type":"HANDSHAKE_CONFIRMED"}"#));
    }

    #[test]
    fn set_state_reports_profile() {
        let reply = reply_for(
            r#"{"type":"SET_STATE","state":"combat","metadata":{"heroId":"aethon"},"sessionToken":"t"}"#,
        );
        insta::assert_snapshot!(reply.unwrap_or_default(), @r#"{"type":"STATE_CHANGED","state":"combat","profileId":"combat:aethon"}"#);
    }

    #[test]
    fn set_state_without_hero_uses_default_profile() {
        let reply = reply_for(r#"{"type":"SET_STATE","state":"idle"}"#);
        assert_eq!(
            reply.as_deref(),
            Some(r#"{"type":"STATE_CHANGED","state":"idle","profileId":"idle:default"}"#)
        );
    }

    #[test]
    fn intensity_has_no_reply() {
        assert_eq!(reply_for(r#"{"type":"SET_INTENSITY","value":0.5}"#), None);
        assert_eq!(reply_for("not json"), None);
    }

    #[test]
    fn records_and_queues() {
        let loopback = Loopback::new(true);
        let mut handle = loopback.clone();
        handle
            .post_message("MotionController", "OnExpoMessage", r#"{"type":"STOP_MOTION"}"#)
            .unwrap();

        assert_eq!(
            loopback.take_posted(),
            vec![r#"MotionController.OnExpoMessage {"type":"STOP_MOTION"}"#.to_string()]
        );
        assert_eq!(loopback.next_reply().as_deref(), Some(r#"{"type":"BLEND_COMPLETE"}"#));
        assert_eq!(loopback.next_reply(), None);
    }

    #[test]
    fn silent_without_auto_reply() {
        let loopback = Loopback::new(false);
        let mut handle = loopback.clone();
        handle.post_message("g", "m", r#"{"type":"HANDSHAKE","sessionToken":"t"}"#).unwrap();
        assert_eq!(loopback.next_reply(), None);
        assert_eq!(loopback.take_posted().len(), 1);
    }

    #[test]
    fn fail_next_fails_once() {
        let loopback = Loopback::new(false);
        let mut handle = loopback.clone();
        loopback.fail_next("view gone");
        assert_eq!(handle.post_message("g", "m", "{}"), Err(NativeError("view gone".into())));
        assert!(handle.post_message("g", "m", "{}").is_ok());
    }
}
