//! Domain model of the room protocol client.
//!
//! - `command`: commands the operator can send and their payloads
//! - `state`: the connection state seen by callers
//! - `transcript`: the ordered log shown to the operator

pub mod command;
pub mod state;
pub mod transcript;

pub use command::{
    ChatPayload, Command, CommandBody, HelloPayload, Identity, JoinPayload, ProtocolVersion,
    RoomId, UserPayload,
};
pub use state::ConnectionState;
pub use transcript::{Direction, Transcript, TranscriptEntry};
