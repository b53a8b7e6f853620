//! Deterministic simulation harness for Talkie client testing.
//!
//! Runs the production [`talkie_app::Runtime`] against a [`SimDriver`]: a
//! virtual clock, a scripted user, and an in-process [`SimServer`] that
//! mirrors the real server's fan-out rules (private messages go to both
//! parties, group messages to every member, roster changes are broadcast
//! whole). Every frame crosses the JSON codec, so the wire format is
//! exercised end to end.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod scenario;
pub mod sim_clock;
pub mod sim_driver;
pub mod sim_server;

pub use scenario::{Scenario, Step, UserIntent};
pub use sim_clock::SimInstant;
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_server::SimServer;
