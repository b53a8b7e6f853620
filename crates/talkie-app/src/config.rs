//! Session configuration.

use std::time::Duration;

/// Largest file accepted for sending by default (2 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Timeouts and admission limits for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
    /// Delay between a fatal event (kicked, abnormal close) and teardown.
    pub teardown_delay: Duration,
    /// Files larger than this are rejected before any network interaction.
    pub max_file_size: u64,
    /// Shortest accepted group name, in characters after trimming.
    pub min_group_name_len: usize,
    /// Longest accepted group name, in characters after trimming.
    pub max_group_name_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            notification_ttl: Duration::from_secs(3),
            teardown_delay: Duration::from_secs(2),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            min_group_name_len: 3,
            max_group_name_len: 50,
        }
    }
}

impl SessionConfig {
    /// Override the file size cap.
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Human-readable form of the file size cap, e.g. `2MB`.
    pub fn max_file_size_label(&self) -> String {
        const MIB: u64 = 1024 * 1024;
        const KIB: u64 = 1024;

        match self.max_file_size {
            n if n >= MIB && n % MIB == 0 => format!("{}MB", n / MIB),
            n if n >= KIB && n % KIB == 0 => format!("{}KB", n / KIB),
            n => format!("{n} bytes"),
        }
    }
}
