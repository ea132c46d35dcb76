//! Lifecycle callbacks for connection consumers.

/// Receives the lifecycle signals of the current socket.
///
/// Observers are called after the connection manager has updated its state
/// and appended the transcript entry for the signal.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionObserver {
    /// The socket finished its handshake
    fn on_open(&mut self);

    /// The socket closed with the given close code
    fn on_close(&mut self, code: u16);

    /// The socket reported a failure; a close signal follows
    fn on_error(&mut self, detail: &str);

    /// A text frame arrived while connected
    fn on_message(&mut self, text: &str);
}

/// Observer that writes lifecycle events to the tracing log
#[derive(Debug, Default)]
pub struct TracingObserver {
    endpoint: String,
}

impl TracingObserver {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl ConnectionObserver for TracingObserver {
    fn on_open(&mut self) {
        tracing::info!("Connected to {}", self.endpoint);
    }

    fn on_close(&mut self, code: u16) {
        tracing::info!("Connection to {} closed with code {}", self.endpoint, code);
    }

    fn on_error(&mut self, detail: &str) {
        tracing::warn!("Socket error on {}: {}", self.endpoint, detail);
    }

    fn on_message(&mut self, text: &str) {
        tracing::debug!("Received {} bytes from {}", text.len(), self.endpoint);
    }
}
