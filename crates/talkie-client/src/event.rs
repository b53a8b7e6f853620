//! Transport events.

use talkie_proto::{Envelope, ProtocolError};

/// Events the transport delivers to its consumer, in arrival order.
///
/// For one connection, `Closed` is always the last event and is delivered
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A frame parsed into an envelope.
    Message(Envelope),

    /// A text frame that is not a valid envelope.
    Malformed(ProtocolError),

    /// Transport-level failure.
    Error(String),

    /// Connection ended.
    Closed {
        /// WebSocket close code.
        code: u16,
    },
}
