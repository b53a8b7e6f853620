//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`] which handles WebSocket I/O for envelope
//! transport. This is a thin layer that just sends/receives envelopes -
//! session logic remains in the application state machine.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures_util::{SinkExt, StreamExt};
use talkie_proto::{CLOSE_ABNORMAL, CLOSE_NORMAL, ChatTarget, Envelope, FileAttachment};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        Message,
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};

use crate::TransportEvent;

/// Capacity of the incoming event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Close code reported when the peer sent a close frame without a status.
const CLOSE_NO_STATUS: u16 = 1005;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Work queued for the connection task.
enum Outbound {
    Envelope(Envelope),
    Close,
}

/// Handle to one open WebSocket connection.
///
/// Envelopes are queued to an internal task that owns the socket; incoming
/// frames are read with [`ConnectedClient::recv`]. Dropping the handle
/// closes the connection.
pub struct ConnectedClient {
    to_server: mpsc::UnboundedSender<Outbound>,
    /// Events from the server, in arrival order.
    from_server: mpsc::Receiver<TransportEvent>,
    open: Arc<AtomicBool>,
    /// Set by [`ConnectedClient::close`]. Frames still queued are dropped.
    closed_locally: AtomicBool,
}

impl ConnectedClient {
    /// Whether the connection still accepts sends.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Queue an envelope. Fire-and-forget; a no-op once the connection is
    /// closed.
    ///
    /// Returns `true` if the envelope was queued.
    pub fn send(&self, envelope: Envelope) -> bool {
        if !self.is_open() {
            tracing::debug!(kind = envelope.kind(), "connection closed, dropping envelope");
            return false;
        }
        self.to_server.send(Outbound::Envelope(envelope)).is_ok()
    }

    /// Send a whole file to `target` in a single frame.
    pub fn send_file(&self, file: FileAttachment, target: &ChatTarget) -> bool {
        self.send(Envelope::file(target, file))
    }

    /// Close the connection with code 1000.
    ///
    /// Stops message delivery immediately, including frames already received
    /// but not yet read. The final [`TransportEvent::Closed`] is still
    /// delivered.
    pub fn close(&self) {
        self.closed_locally.store(true, Ordering::Release);
        if self.open.swap(false, Ordering::AcqRel) {
            let _ = self.to_server.send(Outbound::Close);
        }
    }

    /// Wait for the next event. `None` after the close event.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        loop {
            let event = self.from_server.recv().await?;
            if self.deliverable(&event) {
                return Some(event);
            }
        }
    }

    /// Take the next event if one is ready.
    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        loop {
            let event = self.from_server.try_recv().ok()?;
            if self.deliverable(&event) {
                return Some(event);
            }
        }
    }

    /// Frames received before a local close are not delivered after it.
    fn deliverable(&self, event: &TransportEvent) -> bool {
        let stale = self.closed_locally.load(Ordering::Acquire)
            && matches!(event, TransportEvent::Message(_) | TransportEvent::Malformed(_));
        if stale {
            tracing::trace!("closed locally, queued frame discarded");
        }
        !stale
    }
}

/// Connect to a Talkie server and register as `identity`.
///
/// The `register` envelope is the first frame sent on the new connection.
pub async fn connect(url: &str, identity: &str) -> Result<ConnectedClient, TransportError> {
    let (ws, _response) =
        connect_async(url).await.map_err(|e| TransportError::Connection(e.to_string()))?;
    tracing::info!(%url, "websocket connected");

    let (to_server_tx, to_server_rx) = mpsc::unbounded_channel();
    let (from_server_tx, from_server_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let open = Arc::new(AtomicBool::new(true));

    // Queued before the task starts, so nothing can overtake it
    let _ = to_server_tx.send(Outbound::Envelope(Envelope::register(identity)));

    tokio::spawn(run_connection(ws, to_server_rx, from_server_tx, Arc::clone(&open)));

    Ok(ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        open,
        closed_locally: AtomicBool::new(false),
    })
}

/// Run the connection, bridging between channels and the socket.
async fn run_connection(
    ws: WsStream,
    mut to_server: mpsc::UnboundedReceiver<Outbound>,
    from_server: mpsc::Sender<TransportEvent>,
    open: Arc<AtomicBool>,
) {
    let (mut sink, mut stream) = ws.split();

    let code = loop {
        tokio::select! {
            outbound = to_server.recv() => match outbound {
                Some(Outbound::Envelope(envelope)) => {
                    let text = match envelope.encode() {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!(kind = envelope.kind(), error = %e, "failed to encode envelope");
                            continue;
                        },
                    };
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        let _ = from_server.send(TransportEvent::Error(e.to_string())).await;
                        break CLOSE_ABNORMAL;
                    }
                },
                Some(Outbound::Close) | None => {
                    let frame = CloseFrame { code: CloseCode::Normal, reason: Default::default() };
                    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                        tracing::debug!(error = %e, "close frame not delivered");
                    }
                    break CLOSE_NORMAL;
                },
            },

            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if !open.load(Ordering::Acquire) {
                        continue;
                    }
                    let event = match Envelope::decode(text.as_str()) {
                        Ok(envelope) => TransportEvent::Message(envelope),
                        Err(e) => {
                            tracing::warn!(error = %e, "malformed frame from server");
                            TransportEvent::Malformed(e)
                        },
                    };
                    if from_server.send(event).await.is_err() {
                        // Consumer went away
                        break CLOSE_NORMAL;
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    break frame.map_or(CLOSE_NO_STATUS, |f| u16::from(f.code));
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "websocket error");
                    let _ = from_server.send(TransportEvent::Error(e.to_string())).await;
                    break CLOSE_ABNORMAL;
                },
                None => break CLOSE_ABNORMAL,
            },
        }
    };

    open.store(false, Ordering::Release);
    tracing::info!(code, "websocket closed");
    let _ = from_server.send(TransportEvent::Closed { code }).await;
}

/// Owns at most one connection to a fixed server URL.
///
/// Connecting again replaces the previous connection, so only one consumer
/// ever sees events.
pub struct Transport {
    url: String,
    connection: Option<ConnectedClient>,
}

impl Transport {
    /// Create a transport for `url` (e.g. `ws://localhost:8080/ws`).
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), connection: None }
    }

    /// Server URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open a connection and register as `identity`, closing any previous
    /// connection first.
    pub async fn connect(&mut self, identity: &str) -> Result<(), TransportError> {
        if let Some(previous) = self.connection.take() {
            previous.close();
        }
        self.connection = Some(connect(&self.url, identity).await?);
        Ok(())
    }

    /// Whether an open connection exists.
    pub fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(ConnectedClient::is_open)
    }

    /// Queue an envelope. A no-op unless connected.
    pub fn send(&self, envelope: Envelope) -> bool {
        self.connection.as_ref().is_some_and(|c| c.send(envelope))
    }

    /// Send a file to `target`. A no-op unless connected.
    pub fn send_file(&self, file: FileAttachment, target: &ChatTarget) -> bool {
        self.connection.as_ref().is_some_and(|c| c.send_file(file, target))
    }

    /// Close the connection if open.
    pub fn close(&self) {
        if let Some(connection) = &self.connection {
            connection.close();
        }
    }

    /// Wait for the next event. `None` once the connection has delivered
    /// its close event, or if there never was one.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        match &mut self.connection {
            Some(connection) => connection.recv().await,
            None => None,
        }
    }

    /// Take the next event if one is ready.
    pub fn try_next_event(&mut self) -> Option<TransportEvent> {
        self.connection.as_mut().and_then(ConnectedClient::try_recv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconnected_transport_is_inert() {
        let mut transport = Transport::new("ws://127.0.0.1:1/ws");
        assert!(!transport.is_connected());
        assert!(!transport.send(Envelope::join_group("g")));
        assert!(transport.try_next_event().is_none());
        transport.close();
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let mut transport = Transport::new("ws://127.0.0.1:1/ws");
        let result = transport.connect("alice").await;
        assert!(matches!(result, Err(TransportError::Connection(_))));
    }
}
