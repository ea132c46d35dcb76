//! Operator-facing session.
//!
//! Turns operator actions into commands for the current room and identity,
//! and intercepts the local `clear` command before anything is encoded.

use crate::{
    codec::{self, Frame},
    config::ClientConfig,
    connection::{ConnectionManager, SocketEvent, TracingObserver, Transport},
    domain::{Command, ConnectionState, Identity, ProtocolVersion, RoomId, Transcript},
    error::ClientError,
};

/// Chat input that clears the local transcript instead of being sent
pub const CLEAR_COMMAND: &str = "clear";

/// What happened to a line of chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Encoded and handed to the socket
    Sent,
    /// Local `clear` command; nothing was sent
    Cleared,
    /// Not connected, closing, or the frame could not be encoded
    Dropped,
}

pub struct Session<T: Transport> {
    manager: ConnectionManager<T>,
    identity: Identity,
    room_id: RoomId,
    hello_version: ProtocolVersion,
}

impl<T: Transport> Session<T> {
    pub fn new(
        manager: ConnectionManager<T>,
        identity: Identity,
        room_id: RoomId,
        hello_version: ProtocolVersion,
    ) -> Self {
        Self {
            manager,
            identity,
            room_id,
            hello_version,
        }
    }

    /// Session for `config`, with lifecycle events logged through tracing
    pub fn from_config(config: &ClientConfig, transport: T) -> Self {
        let mut manager = ConnectionManager::new(config.endpoint.clone(), transport);
        manager.add_observer(Box::new(TracingObserver::new(config.endpoint.clone())));
        Self::new(
            manager,
            config.identity.clone(),
            config.room_id.clone(),
            config.hello_version,
        )
    }

    pub fn manager(&self) -> &ConnectionManager<T> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ConnectionManager<T> {
        &mut self.manager
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn transcript(&self) -> &Transcript {
        self.manager.transcript()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn hello_version(&self) -> ProtocolVersion {
        self.hello_version
    }

    /// Start a new connection with an empty transcript
    pub fn connect(&mut self) -> bool {
        if !self.manager.state().is_disconnected() {
            return false;
        }
        self.manager.clear_transcript();
        self.manager.connect()
    }

    pub fn disconnect(&mut self) -> bool {
        self.manager.disconnect()
    }

    /// Send `roomHello`, with the configured version unless one is given
    pub fn hello(&mut self, version: Option<ProtocolVersion>) -> bool {
        let version = version.unwrap_or(self.hello_version);
        let command = Command::hello(self.room_id.clone(), &self.identity, version);
        self.dispatch(command)
    }

    pub fn goodbye(&mut self) -> bool {
        let command = Command::goodbye(self.room_id.clone(), &self.identity);
        self.dispatch(command)
    }

    pub fn join(&mut self) -> bool {
        let command = Command::join(self.room_id.clone(), &self.identity);
        self.dispatch(command)
    }

    pub fn part(&mut self) -> bool {
        let command = Command::part(self.room_id.clone(), &self.identity);
        self.dispatch(command)
    }

    /// Send chat content, or clear the transcript for the `clear` command
    pub fn chat(&mut self, text: &str) -> ChatOutcome {
        if text.trim() == CLEAR_COMMAND {
            self.manager.clear_transcript();
            return ChatOutcome::Cleared;
        }

        let command = Command::chat(self.room_id.clone(), &self.identity, text);
        if self.dispatch(command) {
            ChatOutcome::Sent
        } else {
            ChatOutcome::Dropped
        }
    }

    /// Address subsequent commands to another room
    pub fn set_room(&mut self, room_id: &str) -> Result<(), ClientError> {
        self.room_id = RoomId::new(room_id)?;
        tracing::info!("Room id set to '{}'", self.room_id);
        Ok(())
    }

    pub fn handle_event(&mut self, event: SocketEvent) {
        self.manager.handle_event(event);
    }

    fn dispatch(&mut self, command: Command) -> bool {
        if !self.manager.state().is_connected() {
            tracing::debug!(
                "Dropping {:?} for room '{}' while {}",
                command.body,
                command.room_id,
                self.manager.state()
            );
            return false;
        }

        self.transmit(codec::encode(&command))
    }

    /// Hand an encoded frame to the socket, or record why encoding failed.
    ///
    /// An encoding failure rejects only this command; the connection state
    /// is left as it is.
    fn transmit(&mut self, encoded: Result<Frame, ClientError>) -> bool {
        match encoded {
            Ok(frame) => self.manager.send(&frame),
            Err(e) => {
                tracing::error!("Failed to encode command: {}", e);
                self.manager.report(format!("Error: {e}"));
                false
            }
        }
    }
}
