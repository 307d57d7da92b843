//! Deterministic harness for motion-state bridge testing.
//!
//! Virtual-clock [`SimEnv`], recording [`SimNative`] module with fault
//! injection, builders for native-side payloads, and a scenario framework
//! that drives a real [`motion_core::Bridge`] and checks the result with a
//! mandatory oracle.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod native_messages;
pub mod scenario;
pub mod sim_env;
pub mod sim_native;

pub use sim_env::SimEnv;
pub use sim_native::{Posted, SimNative};

/// Bridge type driven by the harness.
pub type SimBridge = motion_core::Bridge<SimNative, SimEnv>;
