//! WebSocket transport built on tokio-tungstenite.
//!
//! ## Responsibilities
//!
//! - `WebSocketTransport::open` spawns one task per socket and returns a
//!   handle immediately
//! - the task performs the handshake, forwards inbound text and lifecycle
//!   signals to the event channel, and writes queued outbound frames
//! - a socket's last event is always `Close`
//! - a close handshake the server never answers ends with `Close(1006)`
//!   after the close timeout
//!
//! The connection manager never touches the stream; it only sees
//! [`SocketEvent`]s and the [`WebSocketHandle`].

use std::{fmt, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tokio::{sync::mpsc, time::Instant};
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::{CloseFrame, Message, frame::coding::CloseCode},
};

use crate::{
    connection::{Socket, SocketEvent, SocketId, SocketSignal, Transport},
    error::ClientError,
};

/// Close code reported when the stream ends without a close frame
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Close code reported when a close frame carries no status
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// How long a socket waits for the server's close reply
pub const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// Channel on which socket tasks report their events
pub type EventSender = mpsc::UnboundedSender<SocketEvent>;

enum Outbound {
    Text(String),
    Close,
}

/// Opens WebSocket connections that report to one event channel
pub struct WebSocketTransport {
    events: EventSender,
    next_id: u64,
    close_timeout: Duration,
}

impl WebSocketTransport {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            next_id: 0,
            close_timeout: CLOSE_HANDSHAKE_TIMEOUT,
        }
    }

    /// Replace the time allowed for the server to answer a close request
    pub fn with_close_timeout(mut self, close_timeout: Duration) -> Self {
        self.close_timeout = close_timeout;
        self
    }
}

impl Transport for WebSocketTransport {
    type Socket = WebSocketHandle;

    fn open(&mut self, endpoint: &str) -> WebSocketHandle {
        self.next_id += 1;
        let id = SocketId(self.next_id);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_socket(
            id,
            endpoint.to_string(),
            outbound_rx,
            self.events.clone(),
            self.close_timeout,
        ));

        WebSocketHandle {
            id,
            outbound: outbound_tx,
        }
    }
}

/// Handle to a socket task; dropping it requests a close
pub struct WebSocketHandle {
    id: SocketId,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Socket for WebSocketHandle {
    fn id(&self) -> SocketId {
        self.id
    }

    fn send(&mut self, text: &str) {
        // A closed channel means the task is finishing; its Close event is on the way.
        if self.outbound.send(Outbound::Text(text.to_string())).is_err() {
            tracing::debug!("Socket {} already finished, frame dropped", self.id);
        }
    }

    fn close(&mut self) {
        if self.outbound.send(Outbound::Close).is_err() {
            tracing::debug!("Socket {} already finished", self.id);
        }
    }
}

/// Error signal carrying a transport failure
fn transport_error(detail: impl fmt::Display) -> SocketSignal {
    SocketSignal::Error(ClientError::Transport(detail.to_string()).to_string())
}

/// Drive one socket from handshake to close
async fn run_socket(
    id: SocketId,
    url: String,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: EventSender,
    close_timeout: Duration,
) {
    let emit = |signal: SocketSignal| {
        // The receiver only goes away when the client is shutting down.
        let _ = events.send(SocketEvent::new(id, signal));
    };

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            tracing::warn!("Failed to connect socket {} to {}: {}", id, url, e);
            emit(transport_error(e));
            emit(SocketSignal::Close(ABNORMAL_CLOSURE));
            return;
        }
    };

    tracing::debug!("Socket {} connected to {}", id, url);
    emit(SocketSignal::Open);

    let (mut write, mut read) = ws_stream.split();
    let mut closing = false;
    let mut close_deadline = Instant::now();

    let code = loop {
        tokio::select! {
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    emit(SocketSignal::Message(text.as_str().to_string()));
                }
                Some(Ok(Message::Binary(data))) => {
                    emit(SocketSignal::Message(format!("<{} bytes of binary data>", data.len())));
                }
                Some(Ok(Message::Close(frame))) => {
                    break frame.map_or(NO_STATUS_RECEIVED, |f| u16::from(f.code));
                }
                // ping/pong are answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("Socket {} read error: {}", id, e);
                    emit(transport_error(e));
                    break ABNORMAL_CLOSURE;
                }
                None => break ABNORMAL_CLOSURE,
            },
            _ = tokio::time::sleep_until(close_deadline), if closing => {
                tracing::warn!("Socket {} got no close reply within {:?}", id, close_timeout);
                emit(transport_error("close handshake timed out"));
                break ABNORMAL_CLOSURE;
            }
            request = outbound.recv(), if !closing => match request {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        tracing::warn!("Socket {} write error: {}", id, e);
                        emit(transport_error(e));
                        break ABNORMAL_CLOSURE;
                    }
                }
                Some(Outbound::Close) | None => {
                    closing = true;
                    close_deadline = Instant::now() + close_timeout;
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "".into(),
                    };
                    if let Err(e) = write.send(Message::Close(Some(frame))).await {
                        tracing::warn!("Socket {} close error: {}", id, e);
                        emit(transport_error(e));
                        break ABNORMAL_CLOSURE;
                    }
                }
            },
        }
    };

    // Flushes the close reply when the server initiated the handshake.
    if let Err(e) = write.close().await {
        tracing::debug!("Socket {} shutdown: {}", id, e);
    }

    tracing::debug!("Socket {} closed with code {}", id, code);
    emit(SocketSignal::Close(code));
}
