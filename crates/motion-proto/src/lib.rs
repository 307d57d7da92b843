//! Wire format for the motion-state bridge.
//!
//! Every message exchanged with the embedded native view is a flat UTF-8 JSON
//! object carrying a `type` discriminant. There is no length prefix and no
//! framing: the native transport delivers whole strings.
//!
//! Messages are modelled as internally tagged enums, so adding a new message
//! kind forces every `match` on receipt to be updated. Outbound session tokens
//! are stamped by wrapping a message in an [`Envelope`] rather than by
//! mutating the message itself.
//!
//! # Security
//!
//! Message variants are plain data. Nothing on the wire carries code or
//! callbacks, and state names outside [`MotionState`] are rejected at parse
//! time instead of being coerced.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod limits;
pub mod messages;
pub mod state;

pub use errors::{ProtocolError, Result};
pub use messages::{
    Envelope, InboundMessage, OutboundMessage, SessionMessage, decode_inbound, decode_session,
    encode,
};
pub use state::{HeroMetadata, MotionState};
