//! Application layer for Talkie
//!
//! Pure session state machine and generic runtime, so the same reconciliation
//! code runs in the terminal client and in deterministic simulation.
//!
//! # Components
//!
//! - [`App`]: Session state machine (identity, rosters, conversations, unread)
//! - [`Bridge`]: Translates transport events to app events and actions to
//!   envelopes
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`SessionConfig`]: Timeouts and admission limits

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod config;
mod driver;
mod event;
pub mod preview;
mod runtime;
mod state;
pub mod sticker;

pub use action::AppAction;
pub use app::App;
pub use bridge::Bridge;
pub use config::{DEFAULT_MAX_FILE_SIZE, SessionConfig};
pub use driver::Driver;
pub use event::AppEvent;
pub use preview::FilePreview;
pub use runtime::Runtime;
pub use state::{ChatMessage, ConnectionState, MessageBody, Notification, NotificationLevel};
pub use talkie_proto::{ChatTarget, FileAttachment, Group};
