//! Terminal client for Talkie
//!
//! A thin shell over [`talkie_app::Driver`] that reads commands from stdin
//! and prints session updates to stdout. All orchestration logic lives in the
//! generic [`talkie_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
pub mod input;
pub mod render;
pub mod stdio;

pub use commands::Command;
pub use render::Renderer;
pub use stdio::{CliError, StdioDriver};
pub use talkie_app::{App, AppAction, AppEvent, Driver, Runtime, SessionConfig};
