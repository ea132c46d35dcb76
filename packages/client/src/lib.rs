//! Diagnostic client for the room protocol.
//!
//! This library provides the connection state machine, the `tag,roomId,json`
//! frame codec and a WebSocket transport, plus the REPL runner used by the
//! `roomtap` binary.

// layers
pub mod domain;
pub mod infrastructure;

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use runner::run_client;
