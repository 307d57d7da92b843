//! Reusable oracle helpers.

use motion_core::BridgePhase;

use crate::scenario::{OracleFn, World};

/// Every oracle must pass.
pub fn all_of(oracles: Vec<OracleFn>) -> OracleFn {
    Box::new(move |world: &World| oracles.iter().try_for_each(|oracle| oracle(world)))
}

/// Bridge ends in `phase`.
pub fn phase_is(phase: BridgePhase) -> OracleFn {
    Box::new(move |world: &World| {
        let actual = world.bridge().phase();
        if actual == phase { Ok(()) } else { Err(format!("expected phase {phase:?}, got {actual:?}")) }
    })
}

/// Intent steps returned exactly `expected`.
pub fn dispatch_results(expected: Vec<bool>) -> OracleFn {
    Box::new(move |world: &World| {
        if world.dispatch_results() == expected.as_slice() {
            Ok(())
        } else {
            Err(format!("dispatch results {:?}, expected {expected:?}", world.dispatch_results()))
        }
    })
}

/// The native module received exactly `count` messages of `kind`.
pub fn native_received(kind: &'static str, count: usize) -> OracleFn {
    Box::new(move |world: &World| {
        let actual = world.native().of_kind(kind).len();
        if actual == count {
            Ok(())
        } else {
            Err(format!("native received {actual} {kind} messages, expected {count}"))
        }
    })
}

/// Every command after the handshake carries `token`.
pub fn commands_stamped_with(token: &'static str) -> OracleFn {
    Box::new(move |world: &World| {
        for posted in world.native().posted() {
            if posted.session_token().as_deref() != Some(token) {
                return Err(format!("payload not stamped with {token}: {}", posted.payload));
            }
        }
        Ok(())
    })
}

/// The scenario subscriber saw exactly `count` notifications.
pub fn notified(count: usize) -> OracleFn {
    Box::new(move |world: &World| {
        let actual = world.notifications().len();
        if actual == count { Ok(()) } else { Err(format!("{actual} notifications, expected {count}")) }
    })
}
