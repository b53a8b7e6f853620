//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`talkie_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Each input poll advances the virtual clock by a fixed step and consumes
//! one scripted [`Step`], but only once every queued transport event has
//! been taken, so the user always acts on settled state. Envelopes in both directions are encoded to JSON
//! and decoded again, so the wire codec sits on the simulated path just as
//! it does on a real socket.

use std::{collections::VecDeque, fmt, time::Duration};

use talkie_app::{App, AppAction, Driver};
use talkie_client::TransportEvent;
use talkie_proto::{CLOSE_NORMAL, Envelope};

use crate::{
    SimInstant, Step,
    sim_server::{Delivery, SimServer},
};

/// Virtual time that passes on every input poll.
pub const DEFAULT_POLL_STEP: Duration = Duration::from_millis(100);

/// Idle polls after the script ends before the user quits.
pub const DEFAULT_IDLE_LIMIT: usize = 100;

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDriverError(pub String);

impl fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    server: SimServer,
    script: VecDeque<Step>,
    session: Option<String>,
    inbox: VecDeque<TransportEvent>,
    sent: Vec<Envelope>,
    send_calls: usize,
    clock: SimInstant,
    poll_step: Duration,
    idle_polls: usize,
    idle_limit: usize,
    refuse_connections: bool,
    connects: usize,
    renders: usize,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a driver with an empty script and an empty server.
    pub fn new() -> Self {
        Self {
            server: SimServer::new(),
            script: VecDeque::new(),
            session: None,
            inbox: VecDeque::new(),
            sent: Vec::new(),
            send_calls: 0,
            clock: SimInstant::ZERO,
            poll_step: DEFAULT_POLL_STEP,
            idle_polls: 0,
            idle_limit: DEFAULT_IDLE_LIMIT,
            refuse_connections: false,
            connects: 0,
            renders: 0,
        }
    }

    /// Append steps to the script.
    #[must_use]
    pub fn with_script(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.script.extend(steps);
        self
    }

    /// Polls to wait after the script ends before quitting.
    #[must_use]
    pub fn with_idle_limit(mut self, polls: usize) -> Self {
        self.idle_limit = polls;
        self
    }

    /// Make every connection attempt fail.
    #[must_use]
    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connections = true;
        self
    }

    /// Bring a peer online before the run starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the server refuses the name.
    pub fn with_peer(mut self, name: &str) -> Result<Self, SimDriverError> {
        self.peer_connect(name)?;
        Ok(self)
    }

    /// Every envelope the client sent, in order.
    pub fn sent(&self) -> &[Envelope] {
        &self.sent
    }

    /// Take the envelopes sent so far.
    pub fn take_sent(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.sent)
    }

    /// Number of `send_envelope` calls, connected or not.
    pub fn send_calls(&self) -> usize {
        self.send_calls
    }

    /// The simulated server.
    pub fn server(&self) -> &SimServer {
        &self.server
    }

    /// Number of connection attempts.
    pub fn connects(&self) -> usize {
        self.connects
    }

    /// Number of render calls.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Steps not yet consumed.
    pub fn remaining_steps(&self) -> usize {
        self.script.len()
    }

    /// Queue a server-to-client envelope, passing it through the codec.
    fn deliver(&mut self, envelope: &Envelope) {
        match envelope.encode() {
            Ok(text) => self.deliver_raw(&text),
            Err(e) => self.inbox.push_back(TransportEvent::Malformed(e)),
        }
    }

    fn deliver_raw(&mut self, text: &str) {
        let event = match Envelope::decode(text) {
            Ok(envelope) => TransportEvent::Message(envelope),
            Err(e) => TransportEvent::Malformed(e),
        };
        self.inbox.push_back(event);
    }

    /// Route server output; only the local session's share is observable.
    fn route(&mut self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            if self.session.as_deref() == Some(delivery.to.as_str()) {
                self.deliver(&delivery.envelope);
            }
        }
    }

    /// End the local session, queueing the final close event.
    fn drop_session(&mut self, code: u16) {
        if let Some(name) = self.session.take() {
            self.server.disconnect(&name);
            self.inbox.push_back(TransportEvent::Closed { code });
        }
    }

    fn peer_connect(&mut self, name: &str) -> Result<(), SimDriverError> {
        let deliveries = self
            .server
            .register(name)
            .map_err(|code| SimDriverError(format!("peer {name} refused with {code}")))?;
        self.route(deliveries);
        Ok(())
    }

    fn run_step(&mut self, step: Step, app: &mut App) -> Result<Vec<AppAction>, SimDriverError> {
        tracing::trace!(?step, at = ?self.clock.elapsed(), "sim step");
        match step {
            Step::User(intent) => return Ok(intent.apply(app)),
            Step::PeerConnect(name) => self.peer_connect(&name)?,
            Step::PeerDisconnect(name) => {
                let deliveries = self.server.disconnect(&name);
                self.route(deliveries);
            },
            Step::Peer { name, envelope } => {
                let deliveries = self.server.handle(&name, envelope);
                self.route(deliveries);
            },
            Step::Push(envelope) => {
                if self.session.is_some() {
                    self.deliver(&envelope);
                }
            },
            Step::RawFrame(text) => {
                if self.session.is_some() {
                    self.deliver_raw(&text);
                }
            },
            Step::Close(code) => self.drop_session(code),
            Step::Sever => {
                if let Some(name) = self.session.take() {
                    self.server.disconnect(&name);
                }
            },
            Step::Wait(duration) => self.clock += duration,
        }
        Ok(vec![])
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_input(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        self.clock += self.poll_step;
        if !self.inbox.is_empty() {
            return Ok(vec![]);
        }

        if let Some(step) = self.script.pop_front() {
            return self.run_step(step, app);
        }

        self.idle_polls += 1;
        if self.idle_polls >= self.idle_limit {
            tracing::debug!("script finished, quitting");
            return Ok(app.quit());
        }
        Ok(vec![])
    }

    async fn send_envelope(&mut self, envelope: Envelope) -> Result<(), Self::Error> {
        self.send_calls += 1;
        let Some(me) = self.session.clone() else {
            tracing::debug!(kind = envelope.kind(), "not connected, envelope dropped");
            return Ok(());
        };

        let text = envelope.encode().map_err(|e| SimDriverError(e.to_string()))?;
        let envelope = Envelope::decode(&text).map_err(|e| SimDriverError(e.to_string()))?;
        self.sent.push(envelope.clone());

        let deliveries = self.server.handle(&me, envelope);
        self.route(deliveries);
        Ok(())
    }

    async fn recv_event(&mut self) -> Option<TransportEvent> {
        self.inbox.pop_front()
    }

    async fn connect(&mut self, identity: &str) -> Result<(), Self::Error> {
        self.connects += 1;
        if self.refuse_connections {
            return Err(SimDriverError("connection refused".into()));
        }
        if let Some(previous) = self.session.take() {
            self.server.disconnect(&previous);
        }

        self.sent.push(Envelope::register(identity));
        match self.server.register(identity) {
            Ok(deliveries) => {
                self.session = Some(identity.trim().to_string());
                self.route(deliveries);
            },
            Err(code) => self.inbox.push_back(TransportEvent::Closed { code }),
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn now(&self) -> Self::Instant {
        self.clock
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        self.renders += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.drop_session(CLOSE_NORMAL);
    }
}
