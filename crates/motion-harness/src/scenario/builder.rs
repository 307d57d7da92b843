//! Scenario builder API.
//!
//! Provides a declarative API for constructing scenario tests that enforce
//! the Oracle Pattern.

use std::time::Duration;

use motion_core::{Bridge, BridgeConfig};
use motion_proto::{HeroMetadata, MotionState};
use tracing::debug;

use crate::{
    SimEnv, SimNative, native_messages,
    scenario::{OracleFn, World},
};

/// A UI intent issued through the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// `set_state` with a raw tag.
    SetState(String, Option<HeroMetadata>),
    /// One of the `enter_*` wrappers.
    Enter(MotionState, Option<HeroMetadata>),
    /// `set_intensity`.
    Intensity(f64),
    /// `set_speed`.
    Speed(f64),
    /// `stop_motion`.
    Stop,
    /// `reset_to_idle`.
    ResetToIdle,
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Attach the native module.
    Initialize,
    /// Deliver a raw payload from the native view.
    Native(String),
    /// Issue a UI intent.
    Intent(Intent),
    /// Move the virtual clock.
    Advance(Duration),
    /// Tear the bridge down.
    Cleanup,
}

/// Scenario builder.
///
/// Add steps, then call `.oracle()` to get a [`RunnableScenario`].
pub struct Scenario {
    name: String,
    config: BridgeConfig,
    steps: Vec<Step>,
}

impl Scenario {
    /// Create a new scenario with the given name and default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), config: BridgeConfig::default(), steps: Vec::new() }
    }

    /// Use a custom bridge configuration.
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Append an arbitrary step.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Attach the native module.
    pub fn initialize(self) -> Self {
        self.step(Step::Initialize)
    }

    /// Deliver a raw native payload.
    pub fn native(self, raw: impl Into<String>) -> Self {
        self.step(Step::Native(raw.into()))
    }

    /// Deliver `SESSION_READY` with `token`.
    pub fn session_ready(self, token: &str) -> Self {
        self.native(native_messages::session_ready(token))
    }

    /// Issue a UI intent.
    pub fn intent(self, intent: Intent) -> Self {
        self.step(Step::Intent(intent))
    }

    /// Issue the same intent `times` times.
    pub fn repeat(mut self, intent: &Intent, times: usize) -> Self {
        for _ in 0..times {
            self.steps.push(Step::Intent(intent.clone()));
        }
        self
    }

    /// Move the virtual clock.
    pub fn advance(self, by: Duration) -> Self {
        self.step(Step::Advance(by))
    }

    /// Tear the bridge down.
    pub fn cleanup(self) -> Self {
        self.step(Step::Cleanup)
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory - you cannot run a scenario without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute every step in order, then run the oracle.
    pub fn run(self) -> Result<World, String> {
        let world = self.execute();
        (self.oracle)(&world).map_err(|e| format!("{}: {e}", self.scenario.name))?;
        Ok(world)
    }

    fn execute(&self) -> World {
        let env = SimEnv::new();
        let native = SimNative::new();
        let bridge = Bridge::new(env.clone(), self.scenario.config.clone());
        let mut world = World::new(bridge, native.clone(), env.clone());

        debug!(scenario = %self.scenario.name, steps = self.scenario.steps.len(), "running scenario");

        for step in &self.scenario.steps {
            match step {
                Step::Initialize => {
                    world.bridge_mut().initialize(native.clone());
                },
                Step::Native(raw) => {
                    let outcome = world.bridge_mut().handle_unity_message(raw);
                    world.record_inbound(outcome);
                },
                Step::Intent(intent) => {
                    let ok = apply_intent(world.bridge_mut().dispatcher_mut(), intent);
                    world.record_dispatch(ok);
                },
                Step::Advance(by) => env.advance(*by),
                Step::Cleanup => world.bridge_mut().cleanup(),
            }
        }

        world
    }
}

fn apply_intent(dispatcher: &mut motion_core::Dispatcher, intent: &Intent) -> bool {
    match intent {
        Intent::SetState(tag, meta) => dispatcher.set_state(tag, meta.clone()),
        Intent::Enter(state, meta) => dispatcher.set_motion_state(*state, meta.clone()),
        Intent::Intensity(value) => dispatcher.set_intensity(*value),
        Intent::Speed(value) => dispatcher.set_speed(*value),
        Intent::Stop => dispatcher.stop_motion(),
        Intent::ResetToIdle => dispatcher.reset_to_idle(),
    }
}
