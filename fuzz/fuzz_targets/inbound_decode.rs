//! Arbitrary native payloads must never panic the decoder or the bridge,
//! and must never let a command through without a session.

#![no_main]

use libfuzzer_sys::fuzz_target;
use motion_core::{Bridge, BridgeConfig};
use motion_harness::{SimEnv, SimNative};
use motion_proto::{decode_inbound, decode_session};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let _ = decode_inbound(raw);
    let _ = decode_session(raw);

    let native = SimNative::new();
    let mut bridge = Bridge::new(SimEnv::new(), BridgeConfig::default());
    bridge.initialize(native.clone());
    let _ = bridge.handle_unity_message(raw);

    // Whatever arrived, a command is only forwarded once a session exists.
    let sent = bridge.dispatcher_mut().enter_idle(None);
    assert_eq!(sent, bridge.is_session_valid());
    if !sent {
        assert!(native.of_kind("SET_STATE").is_empty());
    }
});
