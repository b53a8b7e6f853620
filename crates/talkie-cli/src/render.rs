//! Incremental line-oriented rendering.
//!
//! The terminal is a log, not a screen: each render prints only what changed
//! since the previous one (new messages in the open conversation, unread
//! badges, the latest notification, connection phase changes).

use std::{
    collections::HashMap,
    io::{self, Write},
};

use talkie_app::{
    App, ChatMessage, ChatTarget, ConnectionState, FilePreview, MessageBody, NotificationLevel,
    sticker,
};

/// Tracks what has already been printed.
#[derive(Debug)]
pub struct Renderer {
    state: ConnectionState,
    current_chat: Option<ChatTarget>,
    printed: HashMap<ChatTarget, usize>,
    unread: HashMap<ChatTarget, u32>,
    notification: Option<u64>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer that has printed nothing.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            current_chat: None,
            printed: HashMap::new(),
            unread: HashMap::new(),
            notification: None,
        }
    }

    /// Print everything that changed since the last call.
    pub fn render<W: Write>(&mut self, app: &App, out: &mut W) -> io::Result<()> {
        self.render_state(app, out)?;
        self.render_notification(app, out)?;
        self.render_current_chat(app, out)?;
        self.render_unread(app, out)?;
        out.flush()
    }

    fn render_state<W: Write>(&mut self, app: &App, out: &mut W) -> io::Result<()> {
        let state = app.connection_state();
        if state == self.state {
            return Ok(());
        }
        self.state = state;

        match state {
            ConnectionState::Disconnected => {
                // A fresh session starts with nothing printed
                self.printed.clear();
                self.unread.clear();
                self.current_chat = None;
                writeln!(out, "* disconnected")
            },
            ConnectionState::Connecting => writeln!(out, "* connecting..."),
            ConnectionState::Registered => {
                writeln!(out, "* logged in as {}", app.my_name().unwrap_or_default())
            },
            ConnectionState::TearingDown => writeln!(out, "* session ending"),
        }
    }

    fn render_notification<W: Write>(&mut self, app: &App, out: &mut W) -> io::Result<()> {
        let Some(notification) = app.notification() else {
            return Ok(());
        };
        if self.notification == Some(notification.id) {
            return Ok(());
        }
        self.notification = Some(notification.id);

        let tag = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        writeln!(out, "[{tag}] {}", notification.message)
    }

    fn render_current_chat<W: Write>(&mut self, app: &App, out: &mut W) -> io::Result<()> {
        let Some(target) = app.current_chat() else {
            return Ok(());
        };

        if self.current_chat.as_ref() != Some(target) {
            self.current_chat = Some(target.clone());
            self.unread.remove(target);
            // Reprint the whole log when switching conversations
            self.printed.remove(target);
            writeln!(out, "--- {} ---", describe(target))?;
        }

        let log = app.messages(target);
        let printed = self.printed.entry(target.clone()).or_default();
        for message in log.iter().skip(*printed) {
            writeln!(out, "{}", format_message(message))?;
        }
        *printed = log.len();
        Ok(())
    }

    fn render_unread<W: Write>(&mut self, app: &App, out: &mut W) -> io::Result<()> {
        for target in app.conversations() {
            let count = app.unread_count(target);
            let previous = self.unread.insert(target.clone(), count).unwrap_or(0);
            if count > previous {
                writeln!(out, "* {count} unread in {}", describe(target))?;
            }
        }
        Ok(())
    }

    /// Print the online users.
    pub fn users<W: Write>(app: &App, out: &mut W) -> io::Result<()> {
        writeln!(out, "users: {}", join_or_none(app.users().iter().map(String::as_str)))
    }

    /// Print the groups with their members.
    pub fn groups<W: Write>(app: &App, out: &mut W) -> io::Result<()> {
        if app.groups().is_empty() {
            return writeln!(out, "groups: (none)");
        }
        for group in app.groups() {
            let joined = if app.my_name().is_some_and(|me| group.has_member(me)) { "*" } else { " " };
            let members = join_or_none(group.members.iter().map(String::as_str));
            match &group.creator {
                Some(creator) => writeln!(out, "{joined} {} ({members}; by {creator})", group.name)?,
                None => writeln!(out, "{joined} {} ({members})", group.name)?,
            }
        }
        Ok(())
    }

    /// Print conversations with their unread counts.
    pub fn chats<W: Write>(app: &App, out: &mut W) -> io::Result<()> {
        let conversations = app.conversations();
        if conversations.is_empty() {
            return writeln!(out, "chats: (none)");
        }
        for target in conversations {
            let marker = if app.current_chat() == Some(target) { ">" } else { " " };
            match app.unread_count(target) {
                0 => writeln!(out, "{marker} {}", describe(target))?,
                n => writeln!(out, "{marker} {} ({n} unread)", describe(target))?,
            }
        }
        Ok(())
    }

    /// Print the sticker set.
    pub fn stickers<W: Write>(out: &mut W) -> io::Result<()> {
        let ids = sticker::STICKERS.iter().map(|s| s.id);
        writeln!(out, "stickers: {}", join_or_none(ids))
    }
}

fn describe(target: &ChatTarget) -> String {
    match target {
        ChatTarget::Private(user) => format!("@{user}"),
        ChatTarget::Group(name) => format!("#{name}"),
    }
}

fn join_or_none<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    if joined.is_empty() { "(none)".to_string() } else { joined }
}

/// One-line form of a message.
pub fn format_message(message: &ChatMessage) -> String {
    match &message.body {
        MessageBody::Text(text) => format!("{}: {text}", message.from),
        MessageBody::Sticker(id) => match sticker::find(id) {
            Some(s) => format!("{} [sticker: {}]", message.from, s.label),
            None => format!("{} [sticker: {id}]", message.from),
        },
        MessageBody::File(file) => {
            let preview = FilePreview::of(file);
            format!(
                "{} [file] {} ({}, {} KB, {} lines)",
                message.from, preview.name, preview.language, preview.size_kb, preview.line_count
            )
        },
    }
}
