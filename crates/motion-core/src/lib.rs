//! Motion-state bridge core logic
//!
//! Pure state machines that translate typed UI intents into native view
//! commands and relay the native view's status back, decoupled from any
//! particular host runtime.
//!
//! # Architecture
//!
//! The [`Dispatcher`] validates intents, builds typed commands and fans out
//! inbound status to subscribers. It never sees sessions or rate limits.
//! The [`Bridge`] owns the native module handle and gates every outbound
//! command on an established session and a sliding-window rate limit. The
//! two meet at one seam: the bridge registers a [`Transport`] with the
//! dispatcher, and forwards non-lifecycle inbound messages to it.
//!
//! Nothing here animates, interpolates or eases. Commands are discrete
//! state hints; a dropped command is lost, not retried.
//!
//! Time is read from an [`Environment`], so tests drive the rate limiter
//! with a virtual clock.
//!
//! # Components
//!
//! - [`dispatcher`]: intent validation, command building, subscriber fan-out
//! - [`bridge`]: session lifecycle, rate limiting, native transport
//! - [`session`]: in-memory session token holder
//! - [`rate_limit`]: sliding-window counter and log throttle
//! - [`mod@env`]: environment abstraction (time)
//! - [`transport`]: dispatcher transport and native module traits
//! - [`config`]: bridge configuration
//! - [`error`]: transport and session error types

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod env;
pub mod error;
pub mod rate_limit;
pub mod session;
pub mod transport;

pub use bridge::{Bridge, BridgePhase, BridgeStatus, InboundOutcome};
pub use config::BridgeConfig;
pub use dispatcher::{Dispatcher, DispatcherStatus, SubscriptionId};
pub use env::{Environment, SystemEnv};
pub use error::{NativeError, SessionError, TransportError};
pub use transport::{NativeModule, Transport};
