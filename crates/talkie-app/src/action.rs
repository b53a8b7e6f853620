//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use std::time::Duration;

use talkie_proto::{ChatTarget, FileAttachment};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect to the server and register.
    Connect {
        /// Requested display name.
        identity: String,
    },

    /// Send a text message.
    SendMessage {
        /// Recipient user or group.
        target: ChatTarget,
        /// Message text.
        content: String,
    },

    /// Send a whole file in one frame.
    SendFile {
        /// Recipient user or group.
        target: ChatTarget,
        /// The file.
        file: FileAttachment,
    },

    /// Join a group.
    JoinGroup {
        /// Group name.
        name: String,
    },

    /// Leave a group.
    LeaveGroup {
        /// Group name.
        name: String,
    },

    /// Ask the server to create a group.
    CreateGroup {
        /// Group name, already validated.
        name: String,
    },

    /// Deliver [`crate::AppEvent::NotificationExpired`] after a delay.
    ScheduleDismiss {
        /// Notification id.
        id: u64,
        /// Delay from now.
        after: Duration,
    },

    /// Deliver [`crate::AppEvent::TeardownElapsed`] after a delay.
    ScheduleTeardown {
        /// Delay from now.
        after: Duration,
    },

    /// Close the transport with code 1000.
    CloseTransport,
}

impl AppAction {
    /// Whether this action produces an envelope on the wire.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::SendMessage { .. }
                | Self::SendFile { .. }
                | Self::JoinGroup { .. }
                | Self::LeaveGroup { .. }
                | Self::CreateGroup { .. }
        )
    }
}
