//! Scripted scenarios.
//!
//! A [`Scenario`] is an ordered list of [`Step`]s. The [`crate::SimDriver`]
//! consumes one step per input poll, so a step always sees the effects of
//! every earlier step that the runtime has processed.

use std::time::Duration;

use talkie_app::{App, AppAction};
use talkie_proto::{Envelope, FileAttachment};

/// Something the local user does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    /// Log in under a name.
    Login(String),
    /// Open a private conversation.
    OpenPrivate(String),
    /// Open a group conversation.
    OpenGroup(String),
    /// Send text to the open conversation.
    Send(String),
    /// Send a sticker to the open conversation.
    Sticker(String),
    /// Send a file to the open conversation.
    File(FileAttachment),
    /// Try to send a file of the given size that is never read.
    OversizedFile(u64),
    /// Create a group.
    CreateGroup(String),
    /// Join a group.
    JoinGroup(String),
    /// Leave a group.
    LeaveGroup(String),
    /// End the session.
    Quit,
}

impl UserIntent {
    /// Apply the intent to `app`.
    pub fn apply(self, app: &mut App) -> Vec<AppAction> {
        match self {
            Self::Login(name) => app.login(&name),
            Self::OpenPrivate(user) => app.open_private_chat(user),
            Self::OpenGroup(name) => app.open_group_chat(name),
            Self::Send(text) => app.send_message(&text),
            Self::Sticker(id) => app.send_sticker(&id),
            Self::File(file) => app.send_file(file),
            Self::OversizedFile(size) => app.reject_oversized(size).unwrap_or_default(),
            Self::CreateGroup(name) => app.create_group(&name),
            Self::JoinGroup(name) => app.join_group(&name),
            Self::LeaveGroup(name) => app.leave_group(&name),
            Self::Quit => app.quit(),
        }
    }
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The local user acts.
    User(UserIntent),
    /// Another user comes online.
    PeerConnect(String),
    /// Another user goes offline.
    PeerDisconnect(String),
    /// Another online user sends a request to the server.
    Peer {
        /// Peer name.
        name: String,
        /// Request as the peer's client sends it.
        envelope: Envelope,
    },
    /// The server pushes an envelope to the local session only.
    Push(Envelope),
    /// The server sends a raw text frame to the local session.
    RawFrame(String),
    /// The server closes the local connection.
    Close(u16),
    /// The connection drops without a close frame reaching the client.
    Sever,
    /// Nothing happens for a while.
    Wait(Duration),
}

/// Builder for a step list.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    steps: Vec<Step>,
}

impl Scenario {
    /// Empty scenario.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a user intent.
    #[must_use]
    pub fn user(self, intent: UserIntent) -> Self {
        self.step(Step::User(intent))
    }

    /// Bring a peer online.
    #[must_use]
    pub fn peer_connects(self, name: &str) -> Self {
        self.step(Step::PeerConnect(name.to_string()))
    }

    /// Have a peer send a request.
    #[must_use]
    pub fn peer(self, name: &str, envelope: Envelope) -> Self {
        self.step(Step::Peer { name: name.to_string(), envelope })
    }

    /// Have the server push an envelope.
    #[must_use]
    pub fn push(self, envelope: Envelope) -> Self {
        self.step(Step::Push(envelope))
    }

    /// Let virtual time pass.
    #[must_use]
    pub fn wait(self, duration: Duration) -> Self {
        self.step(Step::Wait(duration))
    }

    /// The steps in order.
    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}
