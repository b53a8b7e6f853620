//! Client transport
//!
//! Thin WebSocket adapter for the Talkie protocol. Opens one connection per
//! session, registers on open, serializes outgoing [`Envelope`]s to JSON text
//! frames and hands parsed incoming frames to a single consumer as
//! [`TransportEvent`]s.
//!
//! Protocol and session logic live elsewhere; this crate has no retry,
//! backpressure, or ordering logic beyond the in-order event channel.
//!
//! # Components
//!
//! - [`Transport`]: Owns at most one connection and its event stream
//! - [`transport::connect`]: Open a single connection
//! - [`TransportEvent`]: Message, malformed frame, error, close

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod event;
pub mod transport;

pub use event::TransportEvent;
pub use talkie_proto::{ChatTarget, Envelope, FileAttachment, ProtocolError};
pub use transport::{ConnectedClient, Transport, TransportError};
