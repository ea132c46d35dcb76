//! Diagnostic client for the room protocol.
//!
//! Opens a WebSocket to a room endpoint and sends `roomHello`, `roomGoodbye`,
//! `roomJoin`, `roomPart` and chat (`room`) frames typed at the prompt. Every
//! frame sent or received is printed as a transcript line.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomtap -- --host 127.0.0.1:9080 --connect
//! cargo run --bin roomtap -- -u ws://localhost:9080/rooms/ws/RecRoom -r RecRoom
//! ```

use clap::Parser;

use roomtap_client::{
    config::{ClientConfig, DEFAULT_HOST, DEFAULT_ROOM_NAME, endpoint_url, health_url},
    domain::{Identity, ProtocolVersion, RoomId},
    error::ClientError,
};
use roomtap_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "roomtap")]
#[command(about = "Diagnostic WebSocket client for the room protocol", long_about = None)]
struct Args {
    /// Host (and port) of the room server
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Room name in the endpoint path
    #[arg(long, default_value = DEFAULT_ROOM_NAME)]
    room_name: String,

    /// Full WebSocket URL, overriding --host and --room-name
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// Room id placed in every frame
    #[arg(short = 'r', long, default_value = DEFAULT_ROOM_NAME)]
    room_id: String,

    /// Username placed in every payload
    #[arg(long, default_value = "webtest")]
    username: String,

    /// User id placed in every payload
    #[arg(long, default_value = "dummyId")]
    user_id: String,

    /// Protocol version sent with roomHello
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..=2))]
    hello_version: u64,

    /// Connect immediately instead of waiting for /connect
    #[arg(short = 'c', long)]
    connect: bool,
}

impl Args {
    fn into_config(self) -> Result<ClientConfig, ClientError> {
        let endpoint = self
            .url
            .unwrap_or_else(|| endpoint_url(&self.host, &self.room_name));

        Ok(ClientConfig {
            endpoint,
            health_url: health_url(&self.host),
            room_id: RoomId::new(self.room_id)?,
            identity: Identity::new(self.username, self.user_id),
            hello_version: ProtocolVersion::try_from(self.hello_version)?,
            auto_connect: self.connect,
        })
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid arguments: {}", e);
            std::process::exit(2);
        }
    };

    // Run the client
    if let Err(e) = roomtap_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
