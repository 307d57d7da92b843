//! Transport seams.
//!
//! Two traits sit at the edges of the core:
//!
//! - [`Transport`] is what the [`crate::Dispatcher`] sends typed commands
//!   through. The bridge registers its session gate here; tests can register
//!   a closure.
//! - [`NativeModule`] is the embedded native view. Its only call shape is
//!   `post_message(game_object, method, json)`.

use motion_proto::OutboundMessage;

use crate::error::{NativeError, TransportError};

/// Outbound path used by the dispatcher.
///
/// Implementations decide whether a command may be sent and how it is
/// serialized. They must not reorder or batch: commands reach the native
/// module in call order or not at all.
pub trait Transport: Send + 'static {
    /// Forward one command.
    fn post_message(&mut self, message: &OutboundMessage) -> Result<(), TransportError>;
}

impl<F> Transport for F
where
    F: FnMut(&OutboundMessage) -> Result<(), TransportError> + Send + 'static,
{
    fn post_message(&mut self, message: &OutboundMessage) -> Result<(), TransportError> {
        self(message)
    }
}

/// Handle to the embedded native view.
pub trait NativeModule: Send + 'static {
    /// Deliver a JSON string to `method` on `game_object`.
    ///
    /// Errors are reported, never retried.
    fn post_message(
        &mut self,
        game_object: &str,
        method: &str,
        payload: &str,
    ) -> Result<(), NativeError>;
}
