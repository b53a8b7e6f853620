//! The `Envelope` sum type and its JSON codec.
//!
//! # Invariants
//!
//! - Every variant maps to exactly one `type` string, and `kind()` returns
//!   the same string serde writes.
//! - Absent optional fields are omitted from the encoded JSON, never written
//!   as `null`.

use serde::{Deserialize, Serialize};

use crate::{
    ChatTarget, DirectFile, DirectMessage, FileAttachment, Group, GroupFile, GroupMessage,
    errors::{ProtocolError, Result},
};

/// One protocol frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// Client registration; the server echoes it back with the assigned
    /// identity as the last word of `content`.
    Register {
        /// Requested name (outgoing) or confirmation text (incoming).
        content: String,
    },

    /// Server-reported error.
    Error {
        /// Error description.
        #[serde(default)]
        error: String,
    },

    /// Another session logged in with this account.
    DuplicateLogin,

    /// This session was replaced by a login elsewhere.
    Kicked,

    /// Full list of online users.
    ClientList {
        /// User names.
        #[serde(default)]
        clients: Vec<String>,
    },

    /// Full list of groups with their members.
    GroupList {
        /// Groups.
        #[serde(default)]
        groups: Vec<Group>,
    },

    /// Private text message.
    Private(DirectMessage),

    /// Group text message.
    GroupMessage(GroupMessage),

    /// Private file transfer.
    FilePrivate(DirectFile),

    /// Group file transfer.
    FileGroup(GroupFile),

    /// Request to join a group.
    JoinGroup {
        /// Target group.
        group_name: String,
    },

    /// Request to leave a group.
    LeaveGroup {
        /// Target group.
        group_name: String,
    },

    /// Request to create a group.
    CreateGroup {
        /// Name of the new group.
        group_name: String,
    },
}

impl Envelope {
    /// Registration request for `name`.
    pub fn register(name: impl Into<String>) -> Self {
        Self::Register { content: name.into() }
    }

    /// Text message addressed to `target`.
    pub fn text(target: &ChatTarget, content: impl Into<String>) -> Self {
        let content = content.into();
        match target {
            ChatTarget::Private(to) => {
                Self::Private(DirectMessage { from: None, to: Some(to.clone()), content })
            },
            ChatTarget::Group(group_name) => {
                Self::GroupMessage(GroupMessage { from: None, group_name: group_name.clone(), content })
            },
        }
    }

    /// File transfer addressed to `target`.
    ///
    /// Produces `file_private` with `to` set, or `file_group` with
    /// `group_name` set.
    pub fn file(target: &ChatTarget, file: FileAttachment) -> Self {
        match target {
            ChatTarget::Private(to) => {
                Self::FilePrivate(DirectFile { from: None, to: Some(to.clone()), file })
            },
            ChatTarget::Group(group_name) => {
                Self::FileGroup(GroupFile { from: None, group_name: group_name.clone(), file })
            },
        }
    }

    /// Join request for `group_name`.
    pub fn join_group(group_name: impl Into<String>) -> Self {
        Self::JoinGroup { group_name: group_name.into() }
    }

    /// Leave request for `group_name`.
    pub fn leave_group(group_name: impl Into<String>) -> Self {
        Self::LeaveGroup { group_name: group_name.into() }
    }

    /// Creation request for `group_name`.
    pub fn create_group(group_name: impl Into<String>) -> Self {
        Self::CreateGroup { group_name: group_name.into() }
    }

    /// Wire `type` string of this envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Error { .. } => "error",
            Self::DuplicateLogin => "duplicate_login",
            Self::Kicked => "kicked",
            Self::ClientList { .. } => "client_list",
            Self::GroupList { .. } => "group_list",
            Self::Private(_) => "private",
            Self::GroupMessage(_) => "group_message",
            Self::FilePrivate(_) => "file_private",
            Self::FileGroup(_) => "file_group",
            Self::JoinGroup { .. } => "join_group",
            Self::LeaveGroup { .. } => "leave_group",
            Self::CreateGroup { .. } => "create_group",
        }
    }

    /// Sender of a chat message, if this is one and the server stamped it.
    pub fn sender(&self) -> Option<&str> {
        match self {
            Self::Private(m) => m.from.as_deref(),
            Self::GroupMessage(m) => m.from.as_deref(),
            Self::FilePrivate(f) => f.from.as_deref(),
            Self::FileGroup(f) => f.from.as_deref(),
            Self::Register { .. }
            | Self::Error { .. }
            | Self::DuplicateLogin
            | Self::Kicked
            | Self::ClientList { .. }
            | Self::GroupList { .. }
            | Self::JoinGroup { .. }
            | Self::LeaveGroup { .. }
            | Self::CreateGroup { .. } => None,
        }
    }

    /// Encode as a JSON text frame.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode a JSON text frame.
    pub fn decode(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(ProtocolError::EmptyFrame);
        }
        serde_json::from_str(text).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}
