//! Session state machine.
//!
//! This module defines the [`App`] state machine, which owns everything the
//! client knows about the current session, decoupled from I/O and from the
//! wire format.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks identity, the online roster, and the group roster.
//! - Keeps one append-only log and one unread counter per conversation.
//! - Echoes own messages locally at send time and discards the server's copy.
//! - Validates user intents (group names, file type and size) before anything
//!   is sent.
//! - Owns the single transient notification and its dismiss timer.

use std::collections::HashMap;

use talkie_proto::{ChatTarget, CloseReason, FileAttachment, Group};

use crate::{
    AppAction, AppEvent, ChatMessage, ConnectionState, MessageBody, Notification,
    NotificationLevel, SessionConfig, preview, sticker,
};

/// Session state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Timeouts and limits.
    config: SessionConfig,
    /// Connection lifecycle phase.
    state: ConnectionState,
    /// Own display name. Set once per session by the server.
    my_name: Option<String>,
    /// Online users, as last reported.
    users: Vec<String>,
    /// Groups, as last reported.
    groups: Vec<Group>,
    /// Per-conversation message logs.
    chats: HashMap<ChatTarget, Vec<ChatMessage>>,
    /// Per-conversation unread counters.
    unread: HashMap<ChatTarget, u32>,
    /// Open conversation. `None` if none is selected.
    current_chat: Option<ChatTarget>,
    /// Visible notification. `None` if nothing to show.
    notification: Option<Notification>,
    /// Next notification id. Survives teardown so stale timers never match.
    next_notification_id: u64,
}

impl Default for App {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl App {
    /// Create an empty, disconnected session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: ConnectionState::Disconnected,
            my_name: None,
            users: Vec::new(),
            groups: Vec::new(),
            chats: HashMap::new(),
            unread: HashMap::new(),
            current_chat: None,
            notification: None,
            next_notification_id: 0,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        if self.state == ConnectionState::TearingDown
            && !matches!(event, AppEvent::NotificationExpired { .. } | AppEvent::TeardownElapsed)
        {
            tracing::debug!(?event, "tearing down, event ignored");
            return vec![];
        }

        match event {
            AppEvent::Registered { name } => self.on_registered(name),
            AppEvent::ServerError { message } => {
                let message =
                    message.filter(|m| !m.is_empty()).unwrap_or_else(|| "An error occurred".into());
                self.notify(NotificationLevel::Error, message)
            },
            AppEvent::DuplicateLogin => self.notify(
                NotificationLevel::Warning,
                "This account is being logged in from another location",
            ),
            AppEvent::Kicked => {
                let mut actions = self.notify(
                    NotificationLevel::Warning,
                    "You have been disconnected due to login from another device",
                );
                actions.extend(self.begin_teardown());
                actions
            },
            AppEvent::UsersUpdated { users } => {
                self.users = users;
                vec![AppAction::Render]
            },
            AppEvent::GroupsUpdated { groups } => {
                self.groups = groups;
                vec![AppAction::Render]
            },
            AppEvent::MessageReceived { target, from, body } => {
                self.on_message(target, from, body)
            },
            AppEvent::MalformedFrame { error } => {
                self.notify(NotificationLevel::Error, format!("Received an invalid message: {error}"))
            },
            AppEvent::TransportFailed { message } => {
                tracing::warn!(%message, "transport failed");
                if self.state == ConnectionState::Connecting {
                    self.state = ConnectionState::Disconnected;
                }
                self.notify(NotificationLevel::Error, "Connection failed")
            },
            AppEvent::ConnectionClosed { code } => self.on_closed(code),
            AppEvent::NotificationExpired { id } => {
                if self.notification.as_ref().is_some_and(|n| n.id == id) {
                    self.notification = None;
                    vec![AppAction::Render]
                } else {
                    vec![]
                }
            },
            AppEvent::TeardownElapsed => {
                if self.state != ConnectionState::TearingDown {
                    return vec![];
                }
                tracing::info!("session torn down");
                self.reset();
                vec![AppAction::CloseTransport, AppAction::Render, AppAction::Quit]
            },
        }
    }

    fn on_registered(&mut self, name: String) -> Vec<AppAction> {
        if let Some(existing) = &self.my_name {
            tracing::warn!(%existing, %name, "already registered, ignoring");
            return vec![];
        }
        tracing::info!(%name, "registered");
        self.my_name = Some(name);
        self.state = ConnectionState::Registered;
        vec![AppAction::Render]
    }

    fn on_message(&mut self, target: ChatTarget, from: String, body: MessageBody) -> Vec<AppAction> {
        if self.my_name.as_deref() == Some(from.as_str()) {
            tracing::debug!(%target, "discarding own echo");
            return vec![];
        }

        let is_open = self.current_chat.as_ref() == Some(&target);
        if !is_open {
            let count = self.unread.entry(target.clone()).or_insert(0);
            *count = count.saturating_add(1);
        }
        self.chats.entry(target).or_default().push(ChatMessage::new(from, body));
        vec![AppAction::Render]
    }

    fn on_closed(&mut self, code: u16) -> Vec<AppAction> {
        let reason = CloseReason::from_code(code);
        tracing::info!(code, ?reason, "connection closed");

        let mut actions = match reason {
            CloseReason::Normal => {
                self.reset();
                self.notify(NotificationLevel::Info, "Connection closed")
            },
            CloseReason::NameInUse => {
                self.notify(NotificationLevel::Warning, "This name is already in use")
            },
            CloseReason::Lost(_) => {
                self.notify(NotificationLevel::Error, "Connection lost. Please try again")
            },
        };

        if reason.requires_teardown() {
            actions.extend(self.begin_teardown());
        } else {
            self.state = ConnectionState::Disconnected;
        }
        actions
    }

    fn begin_teardown(&mut self) -> Vec<AppAction> {
        self.state = ConnectionState::TearingDown;
        vec![AppAction::ScheduleTeardown { after: self.config.teardown_delay }]
    }

    /// Discard all session state.
    fn reset(&mut self) {
        let next_notification_id = self.next_notification_id;
        *self = Self::new(self.config.clone());
        self.next_notification_id = next_notification_id;
    }

    /// Replace the current notification and schedule its dismissal.
    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) -> Vec<AppAction> {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notification = Some(Notification { id, level, message: message.into() });
        vec![AppAction::ScheduleDismiss { id, after: self.config.notification_ttl }, AppAction::Render]
    }

    /// Show a notification on behalf of the presentation layer.
    pub fn set_notification(
        &mut self,
        level: NotificationLevel,
        message: impl Into<String>,
    ) -> Vec<AppAction> {
        self.notify(level, message)
    }

    /// Start a session under `name`.
    ///
    /// Blank names are rejected without connecting. Anything left over from
    /// an earlier session is discarded first.
    pub fn login(&mut self, name: &str) -> Vec<AppAction> {
        let name = name.trim();
        if name.is_empty() {
            return self.notify(NotificationLevel::Warning, "Please enter a name");
        }
        if self.state != ConnectionState::Disconnected {
            tracing::debug!(state = ?self.state, "login while connected, ignoring");
            return vec![];
        }

        self.reset();
        self.state = ConnectionState::Connecting;
        vec![AppAction::Connect { identity: name.to_string() }, AppAction::Render]
    }

    /// Open a private conversation with `user`.
    pub fn open_private_chat(&mut self, user: impl Into<String>) -> Vec<AppAction> {
        self.open_chat(ChatTarget::Private(user.into()))
    }

    /// Open the conversation of group `name`.
    pub fn open_group_chat(&mut self, name: impl Into<String>) -> Vec<AppAction> {
        self.open_chat(ChatTarget::Group(name.into()))
    }

    /// Make `target` the open conversation and clear its unread counter.
    pub fn open_chat(&mut self, target: ChatTarget) -> Vec<AppAction> {
        self.unread.remove(&target);
        self.chats.entry(target.clone()).or_default();
        self.current_chat = Some(target);
        vec![AppAction::Render]
    }

    /// Send text to the open conversation and echo it locally.
    ///
    /// Ignored when nothing is open, the session is not registered, or the
    /// text is blank.
    pub fn send_message(&mut self, content: &str) -> Vec<AppAction> {
        let content = content.trim();
        if content.is_empty() {
            return vec![];
        }
        let Some((target, me)) = self.outgoing_context() else {
            tracing::debug!("no open conversation or not registered, message dropped");
            return vec![];
        };

        self.append_own(&target, me, MessageBody::from_content(content));
        vec![AppAction::SendMessage { target, content: content.to_string() }, AppAction::Render]
    }

    /// Send the sticker `id` to the open conversation.
    pub fn send_sticker(&mut self, id: &str) -> Vec<AppAction> {
        match sticker::find(id) {
            Some(s) => self.send_message(&sticker::content(s)),
            None => self.notify(NotificationLevel::Warning, format!("Unknown sticker \"{id}\"")),
        }
    }

    /// Check a file size against the configured cap.
    ///
    /// Returns the rejection actions if the file is too large, so callers
    /// can refuse before reading the file at all.
    pub fn reject_oversized(&mut self, size: u64) -> Option<Vec<AppAction>> {
        if size <= self.config.max_file_size {
            return None;
        }
        let limit = self.config.max_file_size_label();
        Some(self.notify(NotificationLevel::Warning, format!("File size must be less than {limit}")))
    }

    /// Check a file name against the supported types.
    ///
    /// Returns the rejection actions for an unknown extension, so callers
    /// can refuse before reading the file at all.
    pub fn reject_unsupported(&mut self, name: &str) -> Option<Vec<AppAction>> {
        if preview::is_supported(name) {
            return None;
        }
        tracing::debug!(%name, "unsupported file type");
        Some(self.notify(NotificationLevel::Warning, format!("Unsupported file type: {name}")))
    }

    /// Report a file that could not be read.
    pub fn file_unreadable(&mut self) -> Vec<AppAction> {
        self.notify(NotificationLevel::Warning, "Error reading file")
    }

    /// Send a whole file to the open conversation and echo it locally.
    pub fn send_file(&mut self, file: FileAttachment) -> Vec<AppAction> {
        if self.current_chat.is_none() {
            return self.notify(NotificationLevel::Warning, "Please select a user or group first");
        }
        if let Some(rejected) = self.reject_unsupported(&file.name) {
            return rejected;
        }
        if let Some(rejected) = self.reject_oversized(file.size) {
            return rejected;
        }
        let Some((target, me)) = self.outgoing_context() else {
            tracing::debug!("not registered, file dropped");
            return vec![];
        };

        let name = file.name.clone();
        self.append_own(&target, me, MessageBody::File(file.clone()));

        let mut actions = vec![AppAction::SendFile { target, file }];
        actions.extend(
            self.notify(NotificationLevel::Success, format!("File \"{name}\" sent successfully")),
        );
        actions
    }

    /// Ask to join group `name`.
    pub fn join_group(&self, name: &str) -> Vec<AppAction> {
        match self.group_intent(name) {
            Some(name) => vec![AppAction::JoinGroup { name }, AppAction::Render],
            None => vec![],
        }
    }

    /// Ask to leave group `name`.
    pub fn leave_group(&self, name: &str) -> Vec<AppAction> {
        match self.group_intent(name) {
            Some(name) => vec![AppAction::LeaveGroup { name }, AppAction::Render],
            None => vec![],
        }
    }

    /// Validate `name` and ask the server to create the group.
    ///
    /// The group only appears once the server sends a new group list.
    pub fn create_group(&mut self, name: &str) -> Vec<AppAction> {
        let name = name.trim();
        let len = name.chars().count();

        if name.is_empty() {
            return self.notify(NotificationLevel::Warning, "Please enter a group name");
        }
        if len < self.config.min_group_name_len {
            let min = self.config.min_group_name_len;
            return self.notify(
                NotificationLevel::Warning,
                format!("Group name must be at least {min} characters"),
            );
        }
        if len > self.config.max_group_name_len {
            let max = self.config.max_group_name_len;
            return self.notify(
                NotificationLevel::Warning,
                format!("Group name must be at most {max} characters"),
            );
        }
        let lowered = name.to_lowercase();
        if self.groups.iter().any(|g| g.name.to_lowercase() == lowered) {
            return self.notify(NotificationLevel::Error, "Group name already exists");
        }
        if self.state != ConnectionState::Registered {
            tracing::debug!("not registered, create_group dropped");
            return vec![];
        }

        let mut actions = vec![AppAction::CreateGroup { name: name.to_string() }];
        actions.extend(self.notify(NotificationLevel::Info, "Creating group..."));
        actions
    }

    /// End the session.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::CloseTransport, AppAction::Quit]
    }

    fn group_intent(&self, name: &str) -> Option<String> {
        let name = name.trim();
        (self.state == ConnectionState::Registered && !name.is_empty()).then(|| name.to_string())
    }

    /// Open conversation and own name, if a message can be sent right now.
    fn outgoing_context(&self) -> Option<(ChatTarget, String)> {
        if self.state != ConnectionState::Registered {
            return None;
        }
        Some((self.current_chat.clone()?, self.my_name.clone()?))
    }

    fn append_own(&mut self, target: &ChatTarget, me: String, body: MessageBody) {
        self.chats.entry(target.clone()).or_default().push(ChatMessage::new(me, body));
    }

    /// Current connection phase.
    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the server has confirmed registration.
    pub fn is_registered(&self) -> bool {
        self.state == ConnectionState::Registered
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Own display name. `None` until registered.
    pub fn my_name(&self) -> Option<&str> {
        self.my_name.as_deref()
    }

    /// Online users.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Known groups.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Groups the current user belongs to.
    pub fn my_groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| self.my_name.as_deref().is_some_and(|me| g.has_member(me)))
    }

    /// Message log of `target`. Empty if nothing was exchanged.
    pub fn messages(&self, target: &ChatTarget) -> &[ChatMessage] {
        self.chats.get(target).map(Vec::as_slice).unwrap_or_default()
    }

    /// Message log of the open conversation. Empty when none is open.
    pub fn current_messages(&self) -> &[ChatMessage] {
        self.current_chat.as_ref().map(|t| self.messages(t)).unwrap_or_default()
    }

    /// Unread count of `target`.
    pub fn unread_count(&self, target: &ChatTarget) -> u32 {
        self.unread.get(target).copied().unwrap_or(0)
    }

    /// All conversations with a log, in stable order.
    pub fn conversations(&self) -> Vec<&ChatTarget> {
        let mut keys: Vec<_> = self.chats.keys().collect();
        keys.sort();
        keys
    }

    /// Open conversation. `None` if none is selected.
    pub fn current_chat(&self) -> Option<&ChatTarget> {
        self.current_chat.as_ref()
    }

    /// Visible notification. `None` if nothing to show.
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }
}
