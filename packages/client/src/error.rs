//! Error types for the room protocol client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket-level failure (handshake, read or write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload could not be serialized into a frame
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Room id is empty or contains the frame delimiter
    #[error("Invalid room id '{0}'")]
    InvalidRoomId(String),

    /// Local I/O failure (terminal, input thread)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame text does not follow the `tag,roomId,json` grammar
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Frame parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer than two top-level separators
    #[error("missing ',' separator in frame")]
    MissingSeparator,

    /// Tag is not one of the known wire tags
    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    /// Room id segment is empty
    #[error("invalid room id '{0}'")]
    InvalidRoomId(String),

    /// JSON payload does not match the schema for its tag
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// `version` field carries a value the tag does not allow
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u64),
}
