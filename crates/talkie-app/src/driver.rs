//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Add, time::Duration};

use talkie_client::TransportEvent;
use talkie_proto::Envelope;

use crate::{App, AppAction};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal client and in
/// simulation.
///
/// # Implementations
///
/// - **CLI**: stdin commands, stdout rendering, WebSocket transport
/// - **Simulation**: scripted input, virtual clock, captured envelopes
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Add<Duration, Output = Self::Instant>;

    /// Wait briefly for user input and apply it to `app`.
    ///
    /// Returns the actions the input produced, possibly none. Must return
    /// within a bounded time so transport events and timers keep flowing.
    fn poll_input(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Send an envelope to the server. A no-op when not connected.
    ///
    /// # Errors
    ///
    /// Returns an error only on driver failure, never for a closed
    /// connection.
    fn send_envelope(
        &mut self,
        envelope: Envelope,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Take the next transport event if one is ready.
    ///
    /// Events keep arriving after [`Driver::close`] until the final
    /// [`TransportEvent::Closed`].
    fn recv_event(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Open a connection and register as `identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if connection cannot be established.
    fn connect(&mut self, identity: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Check if connected to server.
    fn is_connected(&self) -> bool;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Close the connection with code 1000.
    fn close(&mut self);
}
