//! Recording native module.

use std::sync::Arc;

use motion_core::{NativeError, NativeModule};
use parking_lot::Mutex;
use serde_json::Value;

/// One call to [`NativeModule::post_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    /// Target game object.
    pub game_object: String,
    /// Target method.
    pub method: String,
    /// Raw JSON payload.
    pub payload: String,
}

impl Posted {
    /// Payload parsed as JSON. `Value::Null` if it does not parse.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.payload).unwrap_or(Value::Null)
    }

    /// The payload's `type` field.
    pub fn kind(&self) -> Option<String> {
        self.json().get("type").and_then(Value::as_str).map(str::to_string)
    }

    /// The payload's `sessionToken` field.
    pub fn session_token(&self) -> Option<String> {
        self.json().get("sessionToken").and_then(Value::as_str).map(str::to_string)
    }
}

#[derive(Debug, Default)]
struct Recorded {
    posted: Vec<Posted>,
    fail_remaining: usize,
    failures: usize,
}

/// Native module that records every message it receives.
///
/// Clones share one recording, so a test keeps a handle after giving the
/// module to the bridge. Failures can be injected for a number of calls.
#[derive(Debug, Clone, Default)]
pub struct SimNative {
    inner: Arc<Mutex<Recorded>>,
}

impl SimNative {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `calls` posts fail.
    pub fn fail_next(&self, calls: usize) {
        self.inner.lock().fail_remaining = calls;
    }

    /// Every successfully delivered message, in order.
    pub fn posted(&self) -> Vec<Posted> {
        self.inner.lock().posted.clone()
    }

    /// Raw payloads, in order.
    pub fn payloads(&self) -> Vec<String> {
        self.inner.lock().posted.iter().map(|p| p.payload.clone()).collect()
    }

    /// Payloads whose `type` is `kind`.
    pub fn of_kind(&self, kind: &str) -> Vec<Posted> {
        self.posted().into_iter().filter(|p| p.kind().as_deref() == Some(kind)).collect()
    }

    /// Most recent delivered message.
    pub fn last(&self) -> Option<Posted> {
        self.inner.lock().posted.last().cloned()
    }

    /// Number of delivered messages.
    pub fn count(&self) -> usize {
        self.inner.lock().posted.len()
    }

    /// Number of injected failures that fired.
    pub fn failures(&self) -> usize {
        self.inner.lock().failures
    }

    /// Forget recorded messages.
    pub fn clear(&self) {
        self.inner.lock().posted.clear();
    }
}

impl NativeModule for SimNative {
    fn post_message(
        &mut self,
        game_object: &str,
        method: &str,
        payload: &str,
    ) -> Result<(), NativeError> {
        let mut inner = self.inner.lock();
        if inner.fail_remaining > 0 {
            inner.fail_remaining -= 1;
            inner.failures += 1;
            return Err(NativeError("injected native failure".into()));
        }
        inner.posted.push(Posted {
            game_object: game_object.to_string(),
            method: method.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_injects_failures() {
        let native = SimNative::new();
        let mut handle = native.clone();

        handle.post_message("Obj", "M", r#"{"type":"STOP_MOTION"}"#).unwrap();
        native.fail_next(1);
        assert!(handle.post_message("Obj", "M", "{}").is_err());
        handle.post_message("Obj", "M", r#"{"type":"RESET_TO_IDLE","sessionToken":"t"}"#).unwrap();

        assert_eq!(native.count(), 2);
        assert_eq!(native.failures(), 1);
        let last = native.last().unwrap();
        assert_eq!(last.kind().as_deref(), Some("RESET_TO_IDLE"));
        assert_eq!(last.session_token().as_deref(), Some("t"));
        assert_eq!(native.of_kind("STOP_MOTION").len(), 1);
    }
}
