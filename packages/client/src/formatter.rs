//! Message formatting utilities for terminal display.

use roomtap_shared::time::timestamp_to_clock_time;

use crate::{
    config::ClientConfig,
    domain::{ConnectionState, Direction, RoomId, TranscriptEntry},
};

/// ANSI sequence that clears the screen and homes the cursor
pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one transcript entry
    ///
    /// Outbound frames are prefixed with `→`, inbound frames with `←`;
    /// system entries are printed as they are.
    pub fn format_entry(entry: &TranscriptEntry) -> String {
        let time = timestamp_to_clock_time(entry.at);
        match entry.direction {
            Direction::Outbound => format!("[{}] → {}\n", time, entry.text),
            Direction::Inbound => format!("[{}] ← {}\n", time, entry.text),
            Direction::System => format!("[{}] {}\n", time, entry.text),
        }
    }

    /// Format the startup banner
    pub fn format_banner(config: &ClientConfig) -> String {
        format!(
            "\n============================================================\n\
             Socket URL: {}\n\
             Health URL: {}\n\
             Room: {}  User: {} ({})\n\
             ============================================================\n\
             Type /help for commands. Any other line is sent as chat content.\n\n",
            config.endpoint,
            config.health_url,
            config.room_id,
            config.identity.username,
            config.identity.user_id
        )
    }

    /// Format the `/status` report
    pub fn format_status(state: ConnectionState, endpoint: &str, room_id: &RoomId) -> String {
        format!("state: {}\nendpoint: {}\nroom: {}\n", state, endpoint, room_id)
    }

    /// Format the hint for an unrecognised `/command`
    pub fn format_unknown_command(input: &str) -> String {
        format!("Unknown command '{}'. Type /help for commands.\n", input)
    }

    /// Format a local error that never reached the transcript
    pub fn format_error(message: &str) -> String {
        format!("Error: {}\n", message)
    }

    pub fn format_help() -> &'static str {
        "Commands:\n  \
         /connect           open the socket\n  \
         /disconnect        close the socket\n  \
         /hello [1|2]       send roomHello\n  \
         /goodbye           send roomGoodbye\n  \
         /join              send roomJoin\n  \
         /part              send roomPart\n  \
         /room <id>         address commands to another room\n  \
         /status            show connection state\n  \
         /quit              exit\n  \
         clear              clear the transcript\n  \
         <text>             send a chat message\n"
    }
}
