//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two sources:
//! - Server envelopes and transport notifications, classified by the
//!   [`crate::Bridge`].
//! - Timer deadlines held by the [`crate::Runtime`].

use talkie_proto::{ChatTarget, Group};

use crate::MessageBody;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Server confirmed registration.
    Registered {
        /// Display name assigned to this session.
        name: String,
    },

    /// Server reported an error.
    ServerError {
        /// Error text. `None` when the server sent none.
        message: Option<String>,
    },

    /// Someone else logged in with our name.
    DuplicateLogin,

    /// Server is disconnecting us.
    Kicked,

    /// Online users, replacing the previous roster.
    UsersUpdated {
        /// User names.
        users: Vec<String>,
    },

    /// Groups, replacing the previous list.
    GroupsUpdated {
        /// All groups.
        groups: Vec<Group>,
    },

    /// A message addressed to us or to one of our groups.
    MessageReceived {
        /// Conversation the message belongs to.
        target: ChatTarget,
        /// Sender's display name.
        from: String,
        /// Payload.
        body: MessageBody,
    },

    /// A frame could not be parsed.
    MalformedFrame {
        /// Parse error description.
        error: String,
    },

    /// Transport failed or could not connect.
    TransportFailed {
        /// Error description.
        message: String,
    },

    /// Connection closed.
    ConnectionClosed {
        /// WebSocket close code.
        code: u16,
    },

    /// Dismiss deadline of a notification passed.
    NotificationExpired {
        /// Notification the timer belongs to.
        id: u64,
    },

    /// Teardown delay elapsed.
    TeardownElapsed,
}
