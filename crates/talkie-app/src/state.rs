//! Observable application state types.
//!
//! This module defines the data structures that represent the application's
//! current view of the session, such as [`ChatMessage`], [`Notification`]
//! and [`ConnectionState`]. They are the view model the presentation layer
//! renders from.

use talkie_proto::FileAttachment;

use crate::sticker::STICKER_PREFIX;

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection, no session.
    Disconnected,
    /// Connection requested, waiting for the server to confirm registration.
    Connecting,
    /// Registered under a display name.
    Registered,
    /// Session is ending. Incoming frames are ignored until teardown.
    TearingDown,
}

/// What a message carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Plain text.
    Text(String),
    /// A sticker, by id. The id may be unknown to this client.
    Sticker(String),
    /// A whole text file.
    File(FileAttachment),
}

impl MessageBody {
    /// Classify text content, recognizing `sticker:<id>`.
    pub fn from_content(content: impl Into<String>) -> Self {
        let content = content.into();
        match content.strip_prefix(STICKER_PREFIX) {
            Some(id) => Self::Sticker(id.to_string()),
            None => Self::Text(content),
        }
    }
}

/// One entry in a conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Sender's display name.
    pub from: String,
    /// Message payload.
    pub body: MessageBody,
}

impl ChatMessage {
    /// Create a message.
    pub fn new(from: impl Into<String>, body: MessageBody) -> Self {
        Self { from: from.into(), body }
    }
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Neutral information.
    Info,
    /// An operation succeeded.
    Success,
    /// Something was rejected or needs attention.
    Warning,
    /// Something failed.
    Error,
}

/// A transient notification.
///
/// At most one is shown at a time; a newer one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Identifies the dismiss timer that belongs to this notification.
    pub id: u64,
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
}
