//! Scenario framework.
//!
//! A scenario is a scripted sequence of steps (initialize, native messages,
//! UI intents, clock advances, cleanup) run against a real bridge. Running
//! requires an oracle: a scenario without verification cannot be built.

mod builder;
pub mod oracle;
mod world;

pub use builder::{Intent, RunnableScenario, Scenario, Step};
pub use world::World;

/// Oracle function that verifies the final world state.
pub type OracleFn = Box<dyn Fn(&World) -> Result<(), String>>;
