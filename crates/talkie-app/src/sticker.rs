//! Built-in sticker set.
//!
//! Stickers travel as ordinary text messages with content `sticker:<id>`, so
//! every client maps the id to its own assets.

/// Content prefix that marks a sticker message.
pub const STICKER_PREFIX: &str = "sticker:";

/// A sticker known to this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sticker {
    /// Wire id.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// All stickers this client can send.
pub const STICKERS: &[Sticker] = &[
    Sticker { id: "smile", label: "Smile" },
    Sticker { id: "laugh", label: "Laugh" },
    Sticker { id: "love", label: "Love" },
    Sticker { id: "cool", label: "Cool" },
    Sticker { id: "cry", label: "Cry" },
    Sticker { id: "angry", label: "Angry" },
    Sticker { id: "thumbs", label: "Thumbs up" },
    Sticker { id: "cat", label: "Cat" },
    Sticker { id: "star", label: "Star" },
    Sticker { id: "party", label: "Party" },
    Sticker { id: "rickroll", label: "Rickroll" },
    Sticker { id: "tralalero", label: "Tralalero" },
];

/// Look up a sticker by id.
pub fn find(id: &str) -> Option<&'static Sticker> {
    STICKERS.iter().find(|s| s.id == id)
}

/// Message content that sends `sticker`.
pub fn content(sticker: &Sticker) -> String {
    format!("{STICKER_PREFIX}{}", sticker.id)
}
