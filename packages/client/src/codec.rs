//! Wire codec for room frames.
//!
//! ```not_rust
//! frame = tag "," room-id "," json-payload
//! tag   = "roomHello" / "roomGoodbye" / "roomJoin" / "roomPart" / "room"
//! ```
//!
//! The payload is JSON and may itself contain commas, so a frame is only ever
//! split on its first two commas.

use std::{fmt, str::FromStr};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    domain::{Command, CommandBody, JoinPayload, ProtocolVersion, RoomId},
    error::{ClientError, FrameError},
};

/// Fixed literal names that identify a frame on the wire.
///
/// The chat tag is the bare `room`, unlike the `room<Verb>` tags of the other
/// commands. Servers match on these names exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    RoomHello,
    RoomGoodbye,
    RoomJoin,
    RoomPart,
    Room,
    /// Server to client: events addressed to a player (`*` for everyone)
    Player,
    /// Server to client: the player moved through an exit
    PlayerLocation,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoomHello => "roomHello",
            Self::RoomGoodbye => "roomGoodbye",
            Self::RoomJoin => "roomJoin",
            Self::RoomPart => "roomPart",
            Self::Room => "room",
            Self::Player => "player",
            Self::PlayerLocation => "playerLocation",
        }
    }

    fn of(body: &CommandBody) -> Self {
        match body {
            CommandBody::Hello(_) => Self::RoomHello,
            CommandBody::Goodbye(_) => Self::RoomGoodbye,
            CommandBody::Join(_) => Self::RoomJoin,
            CommandBody::Part(_) => Self::RoomPart,
            CommandBody::Chat(_) => Self::Room,
        }
    }
}

impl FromStr for Tag {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roomHello" => Ok(Self::RoomHello),
            "roomGoodbye" => Ok(Self::RoomGoodbye),
            "roomJoin" => Ok(Self::RoomJoin),
            "roomPart" => Ok(Self::RoomPart),
            "room" => Ok(Self::Room),
            "player" => Ok(Self::Player),
            "playerLocation" => Ok(Self::PlayerLocation),
            other => Err(FrameError::UnknownTag(other.to_string())),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One complete encoded frame, ready to transmit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(String);

impl Frame {
    #[cfg(test)]
    pub(crate) fn from_raw(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inbound frame as shown to the operator.
///
/// Inbound text is not interpreted; use [`DisplayEvent::frame`] to look at
/// its structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEvent {
    pub text: String,
}

impl DisplayEvent {
    pub fn frame(&self) -> Result<RawFrame<'_>, FrameError> {
        parse_frame(&self.text)
    }
}

/// A frame split into its three top-level segments, borrowed from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    pub tag: &'a str,
    /// Room id for client frames, target player (or `*`) for server frames
    pub target: &'a str,
    pub payload: &'a str,
}

impl RawFrame<'_> {
    /// The tag, if it is one of the known wire tags
    pub fn known_tag(&self) -> Option<Tag> {
        self.tag.parse().ok()
    }

    pub fn json(&self) -> Result<Value, FrameError> {
        serde_json::from_str(self.payload).map_err(|e| FrameError::InvalidPayload(e.to_string()))
    }
}

/// Encode a command as `<tag>,<roomId>,<json>`
pub fn encode(command: &Command) -> Result<Frame, ClientError> {
    let payload = serde_json::to_string(&command.body)?;

    Ok(Frame(format!(
        "{},{},{}",
        Tag::of(&command.body),
        command.room_id,
        payload
    )))
}

/// Turn inbound text into a display event (identity)
pub fn decode(text: &str) -> DisplayEvent {
    DisplayEvent {
        text: text.to_string(),
    }
}

/// Split a frame on its first two commas
pub fn parse_frame(text: &str) -> Result<RawFrame<'_>, FrameError> {
    let mut segments = text.splitn(3, ',');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(tag), Some(target), Some(payload)) => Ok(RawFrame {
            tag,
            target,
            payload,
        }),
        _ => Err(FrameError::MissingSeparator),
    }
}

/// Parse a client frame back into a typed command
pub fn parse_command(text: &str) -> Result<Command, FrameError> {
    let raw = parse_frame(text)?;
    let tag: Tag = raw.tag.parse()?;
    let room_id =
        RoomId::new(raw.target).map_err(|_| FrameError::InvalidRoomId(raw.target.to_string()))?;

    let body = match tag {
        Tag::RoomHello => CommandBody::Hello(versioned_payload(raw.payload)?),
        Tag::RoomGoodbye => CommandBody::Goodbye(payload(raw.payload)?),
        Tag::RoomJoin => {
            let join: JoinPayload = versioned_payload(raw.payload)?;
            if join.version != ProtocolVersion::V2 {
                return Err(FrameError::UnsupportedVersion(join.version.into()));
            }
            CommandBody::Join(join)
        }
        Tag::RoomPart => CommandBody::Part(payload(raw.payload)?),
        Tag::Room => CommandBody::Chat(payload(raw.payload)?),
        Tag::Player | Tag::PlayerLocation => {
            return Err(FrameError::UnknownTag(raw.tag.to_string()));
        }
    };

    Ok(Command { room_id, body })
}

fn payload<T: DeserializeOwned>(text: &str) -> Result<T, FrameError> {
    serde_json::from_str(text).map_err(|e| FrameError::InvalidPayload(e.to_string()))
}

/// Like [`payload`], but reports an out-of-range `version` as such
fn versioned_payload<T: DeserializeOwned>(text: &str) -> Result<T, FrameError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| FrameError::InvalidPayload(e.to_string()))?;
    if let Some(version) = value.get("version").and_then(Value::as_u64) {
        ProtocolVersion::try_from(version)?;
    }
    serde_json::from_value(value).map_err(|e| FrameError::InvalidPayload(e.to_string()))
}
