//! Console for the motion-state bridge
//!
//! A thin line-oriented shell over [`motion_core::Bridge`] with a loopback
//! native module standing in for the embedded view. Useful for watching the
//! session handshake, rate limiter and status fan-out without a device.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
pub mod loopback;
pub mod shell;

pub use commands::Command;
pub use loopback::Loopback;
pub use shell::{Flow, Shell, ShellError};
