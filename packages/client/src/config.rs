//! Client configuration.

use crate::{
    domain::{Identity, ProtocolVersion, RoomId},
    error::ClientError,
};

/// Default host the room server listens on
pub const DEFAULT_HOST: &str = "127.0.0.1:9080";

/// Default room name in the endpoint path, also used as the default room id
pub const DEFAULT_ROOM_NAME: &str = "RecRoom";

/// Build the socket endpoint `ws://<host>/rooms/ws/<room>`
pub fn endpoint_url(host: &str, room_name: &str) -> String {
    format!("ws://{}/rooms/ws/{}", host, room_name)
}

/// Build the health check URL `http://<host>/rooms/health`
pub fn health_url(host: &str) -> String {
    format!("http://{}/rooms/health", host)
}

/// Everything the runner needs to start a session
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub health_url: String,
    pub room_id: RoomId,
    pub identity: Identity,
    pub hello_version: ProtocolVersion,
    /// Open the socket before reading the first input line
    pub auto_connect: bool,
}

impl ClientConfig {
    /// Configuration for `host` with default identity and room
    pub fn for_host(host: &str) -> Result<Self, ClientError> {
        Ok(Self {
            endpoint: endpoint_url(host, DEFAULT_ROOM_NAME),
            health_url: health_url(host),
            room_id: RoomId::new(DEFAULT_ROOM_NAME)?,
            identity: Identity::default(),
            hello_version: ProtocolVersion::V2,
            auto_connect: false,
        })
    }
}
