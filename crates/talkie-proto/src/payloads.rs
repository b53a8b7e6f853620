//! Payload records nested inside envelopes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix that distinguishes group conversation keys from private ones.
pub const GROUP_KEY_PREFIX: &str = "group_";

/// A chat group as advertised by the server in `group_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group name. Unique per server, compared case-sensitively.
    pub name: String,
    /// User who created the group. Older servers omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Member names. Order carries no meaning.
    #[serde(default)]
    pub members: Vec<String>,
}

impl Group {
    /// Create a group with the given members.
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = String>) -> Self {
        Self { name: name.into(), creator: None, members: members.into_iter().collect() }
    }

    /// Whether `user` is a member of this group.
    pub fn has_member(&self, user: &str) -> bool {
        self.members.iter().any(|m| m == user)
    }
}

/// A text file shipped whole inside a single frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// File name including extension.
    pub name: String,
    /// Decoded text content.
    pub content: String,
    /// Size in bytes as reported by the sender.
    #[serde(default)]
    pub size: u64,
    /// MIME-ish type string. May be empty.
    #[serde(rename = "type", default)]
    pub mime: String,
}

impl FileAttachment {
    /// Create an attachment, deriving `size` from the content length.
    pub fn new(name: impl Into<String>, content: impl Into<String>, mime: impl Into<String>) -> Self {
        let content = content.into();
        let size = content.len() as u64;
        Self { name: name.into(), content, size, mime: mime.into() }
    }
}

/// Private text message (`private`).
///
/// Outgoing frames carry `to`; the server stamps `from` before relaying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMessage {
    /// Sender, set by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Message text. The server omits it when empty.
    #[serde(default)]
    pub content: String,
}

/// Group text message (`group_message`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMessage {
    /// Sender, set by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Target group.
    pub group_name: String,
    /// Message text.
    #[serde(default)]
    pub content: String,
}

/// Private file transfer (`file_private`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectFile {
    /// Sender, set by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// The file.
    pub file: FileAttachment,
}

/// Group file transfer (`file_group`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFile {
    /// Sender, set by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Target group.
    pub group_name: String,
    /// The file.
    pub file: FileAttachment,
}

/// Addressee of a message: a single peer or a group.
///
/// Also serves as the conversation key. Being a sum type, a user named
/// `group_x` and a group named `x` never share a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChatTarget {
    /// One-to-one conversation with the named user.
    Private(String),
    /// Conversation in the named group.
    Group(String),
}

impl ChatTarget {
    /// Peer or group name, without prefix.
    pub fn name(&self) -> &str {
        match self {
            Self::Private(name) | Self::Group(name) => name,
        }
    }

    /// Whether this is a group conversation.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// String form of the conversation key: the peer name for private chats,
    /// `group_<name>` for groups.
    pub fn conversation_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private(user) => f.write_str(user),
            Self::Group(name) => write!(f, "{GROUP_KEY_PREFIX}{name}"),
        }
    }
}
