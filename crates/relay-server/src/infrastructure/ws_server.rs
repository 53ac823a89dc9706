//! WebSocket server: accept loop and per-connection sessions.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Upgrading each accepted connection to a WebSocket.
//! 3. Parsing every text frame through `relay_core::parse_message` and handing
//!    valid events to a [`ClientSession`].
//! 4. Writing the session's reply (`ack`, `pong`, `echo`) or an `error` frame
//!    for input that failed validation.
//! 5. Stopping the accept loop when the shared `running` flag is cleared.
//!
//! A rejected frame never closes the connection; the client gets an `error`
//! frame and may carry on.  Binary frames are not part of the protocol and are
//! ignored.
//!
//! # Scalability
//!
//! Each connection runs in its own tokio task.  All connections feed the same
//! event queue; the single dispatch loop is the only consumer.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use relay_core::{encode_server_message, parse_message, ServerMessage};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};

use crate::application::relay_service::{ClientSession, RelayService};

/// How long one `accept()` may block before the `running` flag is re-checked.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

// ── Public API ────────────────────────────────────────────────────────────────

/// A bound, not yet running, WebSocket listener.
///
/// Binding is separate from running so callers (and tests) can bind port `0`
/// and learn the actual address before any client connects.
pub struct WsServer {
    listener: TcpListener,
}

impl WsServer {
    /// Binds the listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (port in use, missing
    /// permission).
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind WebSocket listener on {addr}"))?;
        Ok(Self { listener })
    }

    /// The address actually bound, with the real port when `0` was requested.
    ///
    /// # Errors
    ///
    /// Propagates the OS error if the socket address cannot be read.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to read listener address")
    }

    /// Runs the accept loop until `running` is set to `false`.
    ///
    /// Each accepted connection gets its own task.  Sessions already running
    /// when the loop stops are not interrupted; they end when the runtime
    /// shuts down or the client disconnects.
    ///
    /// # Errors
    ///
    /// Currently never fails once bound; transient accept errors are logged.
    pub async fn run(self, service: Arc<RelayService>, running: Arc<AtomicBool>) -> anyhow::Result<()> {
        if let Ok(addr) = self.listener.local_addr() {
            info!("relay listening on ws://{addr}");
        }

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            match timeout(ACCEPT_POLL, self.listener.accept()).await {
                Ok(Ok((stream, peer_addr))) => {
                    info!("new connection from {peer_addr}");
                    let service = Arc::clone(&service);
                    tokio::spawn(async move {
                        handle_client(stream, peer_addr, service).await;
                    });
                }
                Ok(Err(e)) => {
                    error!("accept error: {e}");
                }
                Err(_) => {
                    // No connection within ACCEPT_POLL; re-check the flag.
                }
            }
        }

        Ok(())
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

async fn handle_client(stream: TcpStream, peer_addr: SocketAddr, service: Arc<RelayService>) {
    match run_session(stream, peer_addr, service).await {
        Ok(()) => info!("session {peer_addr} closed normally"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

/// Drives one WebSocket connection until it closes.
///
/// The [`ClientSession`] is dropped on every exit path, which stops the repeat
/// timers of keys this client still held.
async fn run_session(
    stream: TcpStream,
    peer_addr: SocketAddr,
    service: Arc<RelayService>,
) -> anyhow::Result<()> {
    let mut ws_stream = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    let mut session = service.open_session(peer_addr.to_string());

    loop {
        let frame = match ws_stream.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("session {peer_addr}: WebSocket closed");
                break;
            }
            Some(Err(e)) => return Err(e).context("WebSocket read failed"),
            None => {
                debug!("session {peer_addr}: stream ended");
                break;
            }
        };

        match frame {
            WsMessage::Text(text) => {
                let Some(reply) = handle_text(&mut session, &text) else {
                    continue;
                };
                let json = encode_server_message(&reply)?;
                ws_stream
                    .send(WsMessage::Text(json))
                    .await
                    .context("WebSocket send failed")?;
            }
            WsMessage::Binary(data) => {
                warn!(
                    "session {peer_addr}: unexpected binary frame ({} bytes, ignored)",
                    data.len()
                );
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) => {
                // tungstenite queues the Pong reply itself.
            }
            WsMessage::Close(_) => {
                debug!("session {peer_addr}: Close frame received");
                break;
            }
            WsMessage::Frame(_) => {}
        }
    }

    Ok(())
}

/// Parses one text frame and returns the reply to send.
fn handle_text(session: &mut ClientSession, text: &str) -> Option<ServerMessage> {
    match parse_message(text) {
        Ok(event) => session.handle(event),
        Err(e) => {
            warn!(peer = session.peer(), "rejected frame: {e}");
            Some(ServerMessage::Error {
                message: e.to_string(),
            })
        }
    }
}
