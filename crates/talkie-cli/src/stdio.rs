//! Stdio driver for the terminal client.
//!
//! Implements the [`Driver`] trait with line-buffered stdin for commands,
//! stdout for session output, and the WebSocket [`Transport`] for the
//! network.

use std::{
    io::{self, Stdout, Write},
    time::{Duration, Instant},
};

use talkie_app::{App, AppAction, Driver};
use talkie_client::{Transport, TransportError, TransportEvent};
use talkie_proto::Envelope;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{Command, Renderer, commands, input};

/// How long one input poll waits before letting the runtime run.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Terminal client errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// I/O error from stdin or stdout.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Stdio driver implementing the [`Driver`] trait.
pub struct StdioDriver {
    transport: Transport,
    lines: Lines<BufReader<Stdin>>,
    input_closed: bool,
    stdout: Stdout,
    renderer: Renderer,
}

impl StdioDriver {
    /// Create a driver for the server at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            transport: Transport::new(url),
            lines: BufReader::new(tokio::io::stdin()).lines(),
            input_closed: false,
            stdout: io::stdout(),
            renderer: Renderer::new(),
        }
    }

    async fn handle_line(&mut self, line: &str, app: &mut App) -> Result<Vec<AppAction>, CliError> {
        if line.trim().is_empty() {
            return Ok(vec![]);
        }

        let command = commands::parse(line);
        if let Command::File { path } = &command {
            return Ok(input::send_file_at(path, app).await);
        }

        let mut out = self.stdout.lock();
        match command {
            Command::Users => Renderer::users(app, &mut out)?,
            Command::Groups => Renderer::groups(app, &mut out)?,
            Command::Chats => Renderer::chats(app, &mut out)?,
            Command::Stickers => Renderer::stickers(&mut out)?,
            Command::Help => writeln!(out, "{}", commands::HELP)?,
            command => return Ok(input::apply(command, app)),
        }
        Ok(vec![])
    }
}

impl Driver for StdioDriver {
    type Error = CliError;
    type Instant = Instant;

    async fn poll_input(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        if self.input_closed {
            tokio::time::sleep(INPUT_POLL).await;
            return Ok(vec![]);
        }

        tokio::select! {
            line = self.lines.next_line() => match line? {
                Some(line) => self.handle_line(&line, app).await,
                None => {
                    tracing::info!("stdin closed");
                    self.input_closed = true;
                    Ok(app.quit())
                },
            },

            () = tokio::time::sleep(INPUT_POLL) => Ok(vec![]),
        }
    }

    async fn send_envelope(&mut self, envelope: Envelope) -> Result<(), Self::Error> {
        let kind = envelope.kind();
        if !self.transport.send(envelope) {
            tracing::debug!(kind, "not connected, envelope dropped");
        }
        Ok(())
    }

    async fn recv_event(&mut self) -> Option<TransportEvent> {
        self.transport.try_next_event()
    }

    async fn connect(&mut self, identity: &str) -> Result<(), Self::Error> {
        tracing::info!(url = self.transport.url(), %identity, "connecting");
        self.transport.connect(identity).await?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.renderer.render(app, &mut self.stdout.lock())?;
        Ok(())
    }

    fn close(&mut self) {
        self.transport.close();
    }
}
