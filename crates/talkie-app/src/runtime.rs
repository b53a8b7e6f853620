//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: Session state machine
//! - [`Bridge`]: Protocol translation
//! - [`Driver`]: Platform-specific I/O
//!
//! It is the single owner of the [`App`]. Timers are deadlines kept here and
//! fed back to the App as events, so they always act on current state.

use crate::{App, AppAction, AppEvent, Bridge, Driver, SessionConfig};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
pub struct Runtime<D: Driver> {
    driver: D,
    app: App,
    bridge: Bridge,
    identity: String,
    timers: Vec<(D::Instant, AppEvent)>,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime that logs in as `identity` when run.
    ///
    /// A blank identity leaves the session disconnected until the driver
    /// logs in on the user's behalf.
    pub fn new(driver: D, config: SessionConfig, identity: impl Into<String>) -> Self {
        Self {
            driver,
            app: App::new(config),
            bridge: Bridge::new(),
            identity: identity.into(),
            timers: Vec::new(),
        }
    }

    /// Run the main event loop until the app quits.
    ///
    /// Each cycle:
    /// 1. Polls the driver for user input
    /// 2. Drains ready transport events through the Bridge into the App
    /// 3. Fires expired timers
    /// 4. Sends outgoing envelopes through the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        let identity = self.identity.clone();
        let actions = if identity.trim().is_empty() { vec![] } else { self.app.login(&identity) };

        if !self.process_actions(actions).await? {
            loop {
                let should_quit = self.process_cycle().await?;
                if should_quit {
                    break;
                }
            }
        }

        self.driver.close();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_input(&mut self.app).await?;
        if !actions.is_empty() && self.process_actions(actions).await? {
            return Ok(true);
        }

        while let Some(event) = self.driver.recv_event().await {
            let events = self.bridge.handle_event(event);
            if self.process_app_events(events).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let expired = self.take_expired(now);
        if self.process_app_events(expired).await? {
            return Ok(true);
        }

        Ok(false)
    }

    /// Feed events to the App and execute the resulting actions.
    ///
    /// Returns `true` if should quit.
    async fn process_app_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => {
                        self.send_outgoing().await?;
                        return Ok(true);
                    },
                    AppAction::Connect { identity } => {
                        if let Err(e) = self.driver.connect(&identity).await {
                            tracing::warn!(error = %e, "connect failed");
                            let event = AppEvent::TransportFailed { message: e.to_string() };
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                    AppAction::ScheduleDismiss { id, after } => {
                        let deadline = self.driver.now() + after;
                        self.timers.push((deadline, AppEvent::NotificationExpired { id }));
                    },
                    AppAction::ScheduleTeardown { after } => {
                        let deadline = self.driver.now() + after;
                        self.timers.push((deadline, AppEvent::TeardownElapsed));
                    },
                    AppAction::CloseTransport => {
                        self.send_outgoing().await?;
                        self.driver.close();
                    },

                    // Protocol operations go through the bridge
                    AppAction::SendMessage { .. }
                    | AppAction::SendFile { .. }
                    | AppAction::JoinGroup { .. }
                    | AppAction::LeaveGroup { .. }
                    | AppAction::CreateGroup { .. } => self.bridge.process_app_action(action),
                }
            }

            self.send_outgoing().await?;
        }
        Ok(false)
    }

    /// Remove timers due at `now`, earliest first.
    fn take_expired(&mut self, now: D::Instant) -> Vec<AppEvent> {
        let (mut expired, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.timers).into_iter().partition(|(deadline, _)| *deadline <= now);
        self.timers = pending;
        expired.sort_by_key(|(deadline, _)| *deadline);
        expired.into_iter().map(|(_, event)| event).collect()
    }

    /// Send all pending outgoing envelopes to the server.
    ///
    /// The queue is always drained. Without a connection the envelopes are
    /// dropped, so nothing queued in one session reaches the next.
    async fn send_outgoing(&mut self) -> Result<(), D::Error> {
        let outgoing = self.bridge.take_outgoing();
        if outgoing.is_empty() {
            return Ok(());
        }
        if !self.driver.is_connected() {
            tracing::debug!(dropped = outgoing.len(), "not connected, outgoing envelopes dropped");
            return Ok(());
        }
        for envelope in outgoing {
            self.driver.send_envelope(envelope).await?;
        }
        Ok(())
    }

    /// Number of timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
