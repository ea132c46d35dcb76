//! Connection state as observed by callers of the connection manager.

use std::fmt;

/// The current phase of the room connection.
///
/// ```text
///  Disconnected ──► Connecting ──► Connected
///       ▲                │              │
///       └──── close ─────┴──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No socket. Initial state, and the state every close signal returns to.
    #[default]
    Disconnected,

    /// Socket requested, waiting for the open signal.
    Connecting,

    /// Socket open; send-capable operations are enabled.
    Connected,
}

impl ConnectionState {
    /// Returns `true` when commands may be sent.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` when a new connection may be started.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}
