//! World state for scenario execution.

use std::sync::Arc;

use motion_core::{BridgeStatus, DispatcherStatus, InboundOutcome};
use motion_proto::InboundMessage;
use parking_lot::Mutex;

use crate::{SimBridge, SimEnv, SimNative};

/// Everything a scenario touched, available to the oracle.
pub struct World {
    bridge: SimBridge,
    native: SimNative,
    env: SimEnv,
    notifications: Arc<Mutex<Vec<InboundMessage>>>,
    dispatch_results: Vec<bool>,
    inbound_outcomes: Vec<InboundOutcome>,
}

impl World {
    pub(crate) fn new(bridge: SimBridge, native: SimNative, env: SimEnv) -> Self {
        let mut world = Self {
            bridge,
            native,
            env,
            notifications: Arc::default(),
            dispatch_results: Vec::new(),
            inbound_outcomes: Vec::new(),
        };
        let sink = Arc::clone(&world.notifications);
        world.bridge.dispatcher_mut().subscribe(move |msg| sink.lock().push(msg.clone()));
        world
    }

    pub(crate) fn bridge_mut(&mut self) -> &mut SimBridge {
        &mut self.bridge
    }

    pub(crate) fn record_dispatch(&mut self, ok: bool) {
        self.dispatch_results.push(ok);
    }

    pub(crate) fn record_inbound(&mut self, outcome: InboundOutcome) {
        self.inbound_outcomes.push(outcome);
    }

    /// The bridge under test.
    pub fn bridge(&self) -> &SimBridge {
        &self.bridge
    }

    /// Recorder standing in for the native view.
    pub fn native(&self) -> &SimNative {
        &self.native
    }

    /// Virtual clock.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Bridge diagnostics.
    pub fn bridge_status(&self) -> BridgeStatus {
        self.bridge.status()
    }

    /// Dispatcher diagnostics.
    pub fn dispatcher_status(&self) -> DispatcherStatus {
        self.bridge.dispatcher().status()
    }

    /// Messages delivered to the scenario's subscriber, in order.
    pub fn notifications(&self) -> Vec<InboundMessage> {
        self.notifications.lock().clone()
    }

    /// Return value of every intent step, in order.
    pub fn dispatch_results(&self) -> &[bool] {
        &self.dispatch_results
    }

    /// Outcome of every native message step, in order.
    pub fn inbound_outcomes(&self) -> &[InboundOutcome] {
        &self.inbound_outcomes
    }
}
