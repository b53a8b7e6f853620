//! Talkie protocol
//!
//! Wire types for the Talkie chat protocol: one JSON object per WebSocket text
//! frame, tagged by its `type` field.
//!
//! # Components
//!
//! - [`Envelope`]: Closed tagged union of every frame the client sends or
//!   receives
//! - [`Group`], [`FileAttachment`]: Nested payload records
//! - [`ChatTarget`]: Private peer or group a message is addressed to
//! - [`CloseReason`]: Classification of WebSocket close codes
//!
//! Decoding is strict at the boundary: an unknown `type` or a missing
//! required field yields [`ProtocolError`] instead of a partially-filled
//! value.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod close;
mod envelope;
pub mod errors;
mod payloads;

pub use close::{CLOSE_ABNORMAL, CLOSE_NAME_IN_USE, CLOSE_NORMAL, CloseReason};
pub use envelope::Envelope;
pub use errors::ProtocolError;
pub use payloads::{
    ChatTarget, DirectFile, DirectMessage, FileAttachment, GROUP_KEY_PREFIX, Group, GroupFile,
    GroupMessage,
};
