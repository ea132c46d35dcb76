//! Transport abstraction the connection manager drives.
//!
//! Opening, sending and closing are fire-and-forget. The outcome of each
//! arrives later as a [`SocketEvent`] carrying the id of the socket it
//! belongs to.

use std::fmt;

/// Identifier of one socket opened by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId(pub u64);

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle signal reported by a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketSignal {
    /// Handshake completed
    Open,
    /// Socket closed; always the last signal of a socket
    Close(u16),
    /// Failure detail; a `Close` follows
    Error(String),
    /// Text frame received
    Message(String),
}

/// A signal tagged with the socket that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEvent {
    pub socket: SocketId,
    pub signal: SocketSignal,
}

impl SocketEvent {
    pub fn new(socket: SocketId, signal: SocketSignal) -> Self {
        Self { socket, signal }
    }
}

/// Factory for sockets
pub trait Transport {
    type Socket: Socket;

    /// Start opening a socket to `endpoint`.
    ///
    /// Failures are not returned here; they arrive as `Error` then `Close`.
    fn open(&mut self, endpoint: &str) -> Self::Socket;
}

/// Handle to one open (or opening) socket
pub trait Socket {
    fn id(&self) -> SocketId;

    /// Queue a text frame for transmission
    fn send(&mut self, text: &str);

    /// Request a close handshake
    fn close(&mut self);
}
