//! Slash-command parsing.
//!
//! Lines starting with `/` are commands; anything else is a message for the
//! open conversation.

use std::path::PathBuf;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/login <name>`
    Login {
        /// Requested display name. May be blank; the App rejects it.
        name: String,
    },
    /// `/open <user>`
    Open {
        /// Peer to chat with.
        user: String,
    },
    /// `/group <name>`: open a group conversation.
    Group {
        /// Group name.
        name: String,
    },
    /// `/join <name>`
    Join {
        /// Group name.
        name: String,
    },
    /// `/leave [name]`: defaults to the open group.
    Leave {
        /// Group name, if given.
        name: Option<String>,
    },
    /// `/create <name>`
    Create {
        /// Group name as typed. Validated by the App.
        name: String,
    },
    /// `/file <path>`
    File {
        /// Path of the file to send.
        path: PathBuf,
    },
    /// `/sticker <id>`
    Sticker {
        /// Sticker id.
        id: String,
    },
    /// `/stickers`
    Stickers,
    /// `/users`
    Users,
    /// `/groups`
    Groups,
    /// `/chats`
    Chats,
    /// `/help`
    Help,
    /// `/quit`
    Quit,
    /// Plain text for the open conversation.
    Message {
        /// Message text.
        content: String,
    },
    /// Unrecognized command.
    Unknown {
        /// The command as typed.
        input: String,
    },
    /// A command missing its argument.
    InvalidArgs {
        /// Command name.
        command: &'static str,
        /// What is wrong.
        error: &'static str,
    },
}

/// Short usage text for `/help`.
pub const HELP: &str = "\
/login <name>     log in
/open <user>      chat with a user
/group <name>     open a group chat
/join <name>      join a group
/leave [name]     leave a group (default: open group)
/create <name>    create a group
/file <path>      send a text file to the open chat
/sticker <id>     send a sticker (/stickers lists them)
/users /groups /chats
/quit";

/// Parse one input line.
pub fn parse(line: &str) -> Command {
    let Some(cmd) = line.strip_prefix('/') else {
        return Command::Message { content: line.to_string() };
    };

    let (name, rest) = match cmd.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (cmd, ""),
    };

    match name {
        "login" => Command::Login { name: rest.to_string() },
        "open" | "msg" => with_arg(rest, "open", "missing user", |user| Command::Open { user }),
        "group" => with_arg(rest, "group", "missing group name", |name| Command::Group { name }),
        "join" => with_arg(rest, "join", "missing group name", |name| Command::Join { name }),
        "leave" => Command::Leave { name: (!rest.is_empty()).then(|| rest.to_string()) },
        "create" => Command::Create { name: rest.to_string() },
        "file" => with_arg(rest, "file", "missing path", |p| Command::File { path: p.into() }),
        "sticker" => with_arg(rest, "sticker", "missing sticker id", |id| Command::Sticker { id }),
        "stickers" => Command::Stickers,
        "users" => Command::Users,
        "groups" => Command::Groups,
        "chats" => Command::Chats,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown { input: line.to_string() },
    }
}

fn with_arg(
    rest: &str,
    command: &'static str,
    error: &'static str,
    build: impl FnOnce(String) -> Command,
) -> Command {
    if rest.is_empty() { Command::InvalidArgs { command, error } } else { build(rest.to_string()) }
}
