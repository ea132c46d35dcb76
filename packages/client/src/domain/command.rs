//! Commands sent to a room and their JSON payloads.
//!
//! Field order in the payload structs is the order the fields appear on the
//! wire, e.g. `{"username":"webtest","userId":"dummyId","version":2}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, FrameError};

/// Identifier of a server-side room.
///
/// The frame grammar separates the room id from the tag and the payload with
/// commas, so a room id must be non-empty and must not contain `,`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Create a validated room id
    pub fn new(value: impl Into<String>) -> Result<Self, ClientError> {
        let value = value.into();
        if value.is_empty() || value.contains(',') {
            return Err(ClientError::InvalidRoomId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who the client claims to be in every payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub user_id: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            user_id: user_id.into(),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new("webtest", "dummyId")
    }
}

/// Protocol version negotiated in `roomHello` / `roomJoin`.
///
/// Serialized as a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl TryFrom<u64> for ProtocolVersion {
    type Error = FrameError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(FrameError::UnsupportedVersion(other)),
        }
    }
}

impl From<ProtocolVersion> for u64 {
    fn from(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::V1 => 1,
            ProtocolVersion::V2 => 2,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u64::from(*self))
    }
}

/// Payload of `roomHello`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloPayload {
    pub username: String,
    pub user_id: String,
    pub version: ProtocolVersion,
}

/// Payload of `roomJoin`; the version is always 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub username: String,
    pub user_id: String,
    pub version: ProtocolVersion,
}

/// Payload of `roomGoodbye` and `roomPart`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub username: String,
    pub user_id: String,
}

/// Payload of a chat message (`room` tag)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub username: String,
    pub user_id: String,
    pub content: String,
}

/// The five command kinds with their payloads.
///
/// Serializes as the bare payload object; the kind travels in the frame tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandBody {
    Hello(HelloPayload),
    Goodbye(UserPayload),
    Join(JoinPayload),
    Part(UserPayload),
    Chat(ChatPayload),
}

/// A command addressed to one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub room_id: RoomId,
    pub body: CommandBody,
}

impl Command {
    pub fn hello(room_id: RoomId, identity: &Identity, version: ProtocolVersion) -> Self {
        Self {
            room_id,
            body: CommandBody::Hello(HelloPayload {
                username: identity.username.clone(),
                user_id: identity.user_id.clone(),
                version,
            }),
        }
    }

    pub fn goodbye(room_id: RoomId, identity: &Identity) -> Self {
        Self {
            room_id,
            body: CommandBody::Goodbye(UserPayload::from(identity)),
        }
    }

    pub fn join(room_id: RoomId, identity: &Identity) -> Self {
        Self {
            room_id,
            body: CommandBody::Join(JoinPayload {
                username: identity.username.clone(),
                user_id: identity.user_id.clone(),
                version: ProtocolVersion::V2,
            }),
        }
    }

    pub fn part(room_id: RoomId, identity: &Identity) -> Self {
        Self {
            room_id,
            body: CommandBody::Part(UserPayload::from(identity)),
        }
    }

    pub fn chat(room_id: RoomId, identity: &Identity, content: impl Into<String>) -> Self {
        Self {
            room_id,
            body: CommandBody::Chat(ChatPayload {
                username: identity.username.clone(),
                user_id: identity.user_id.clone(),
                content: content.into(),
            }),
        }
    }
}

impl From<&Identity> for UserPayload {
    fn from(identity: &Identity) -> Self {
        Self {
            username: identity.username.clone(),
            user_id: identity.user_id.clone(),
        }
    }
}
