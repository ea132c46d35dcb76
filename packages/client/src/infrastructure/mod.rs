//! Transport implementations.
//!
//! - `websocket`: tokio-tungstenite backed sockets

pub mod websocket;

pub use websocket::{WebSocketHandle, WebSocketTransport};
