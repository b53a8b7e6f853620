//! Maps parsed commands onto the App API.
//!
//! Display-only commands (`/users`, `/help`, ...) are handled by the driver;
//! everything that changes session state goes through here.

use std::path::Path;

use talkie_app::{App, AppAction, ChatTarget, NotificationLevel};
use talkie_proto::FileAttachment;

use crate::Command;

/// MIME type attached to files sent from the terminal.
const FILE_MIME: &str = "text/plain";

/// Apply a state-changing command to the App.
///
/// `/file` needs I/O and goes through [`send_file_at`]; display-only
/// commands produce no actions here.
pub fn apply(command: Command, app: &mut App) -> Vec<AppAction> {
    match command {
        Command::Login { name } => app.login(&name),
        Command::Open { user } => app.open_private_chat(user),
        Command::Group { name } => app.open_group_chat(name),
        Command::Join { name } => app.join_group(&name),
        Command::Leave { name } => {
            let name = name.or_else(|| match app.current_chat() {
                Some(ChatTarget::Group(group)) => Some(group.clone()),
                _ => None,
            });
            match name {
                Some(name) => app.leave_group(&name),
                None => app.set_notification(NotificationLevel::Warning, "No group to leave"),
            }
        },
        Command::Create { name } => app.create_group(&name),
        Command::Sticker { id } => app.send_sticker(&id),
        Command::Quit => app.quit(),
        Command::Message { content } => app.send_message(&content),
        Command::Unknown { input } => {
            app.set_notification(NotificationLevel::Warning, format!("Unknown command: {input}"))
        },
        Command::InvalidArgs { command, error } => {
            app.set_notification(NotificationLevel::Warning, format!("/{command}: {error}"))
        },
        Command::File { .. }
        | Command::Stickers
        | Command::Users
        | Command::Groups
        | Command::Chats
        | Command::Help => vec![],
    }
}

/// Read the file at `path` and send it to the open conversation.
///
/// The type and size are checked before the file is read.
pub async fn send_file_at(path: &Path, app: &mut App) -> Vec<AppAction> {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    if let Some(rejected) = app.reject_unsupported(&name) {
        return rejected;
    }

    let size = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return app.file_unreadable(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot stat file");
            return app.file_unreadable();
        },
    };
    if let Some(rejected) = app.reject_oversized(size) {
        return rejected;
    }

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read file");
            return app.file_unreadable();
        },
    };

    app.send_file(FileAttachment::new(name, content, FILE_MIME))
}
