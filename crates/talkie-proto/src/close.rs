//! WebSocket close code classification.

/// Normal closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// Connection dropped without a close frame. The server closes this way
/// when it rejects a registration because the name is taken.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Application close code for a rejected, already-used name.
pub const CLOSE_NAME_IN_USE: u16 = 4001;

/// Why a connection ended, as far as the client cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Orderly shutdown (1000).
    Normal,
    /// Registration rejected: the name is in use (1006 or 4001).
    NameInUse,
    /// Any other code.
    Lost(u16),
}

impl CloseReason {
    /// Classify a numeric close code.
    pub fn from_code(code: u16) -> Self {
        match code {
            CLOSE_NORMAL => Self::Normal,
            CLOSE_ABNORMAL | CLOSE_NAME_IN_USE => Self::NameInUse,
            other => Self::Lost(other),
        }
    }

    /// Whether the session must be torn down after this close.
    pub fn requires_teardown(self) -> bool {
        !matches!(self, Self::Normal)
    }
}
