//! UI utilities for the client: input parsing, prompt and transcript printing.

use std::io::Write;

use crate::{
    domain::{ConnectionState, ProtocolVersion, RoomId, Transcript},
    formatter::{CLEAR_SCREEN, MessageFormatter},
};

/// An operator input line, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Connect,
    Disconnect,
    Hello(Option<ProtocolVersion>),
    Goodbye,
    Join,
    Part,
    Room(String),
    Status,
    Help,
    Quit,
    /// Anything that is not a `/command`, including the local `clear`
    Chat(String),
    Unknown(String),
}

/// Parse one input line.
///
/// `/commands` are recognised after trimming; chat text is kept as typed.
pub fn parse_input(line: &str) -> InputAction {
    let Some(command) = line.trim().strip_prefix('/') else {
        return InputAction::Chat(line.to_string());
    };
    let line = line.trim();

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();
    let extra = words.next();

    match (name, arg, extra) {
        ("connect", None, None) => InputAction::Connect,
        ("disconnect", None, None) => InputAction::Disconnect,
        ("hello", None, None) => InputAction::Hello(None),
        ("hello", Some(version), None) => match parse_version(version) {
            Some(version) => InputAction::Hello(Some(version)),
            None => InputAction::Unknown(line.to_string()),
        },
        ("goodbye", None, None) => InputAction::Goodbye,
        ("join", None, None) => InputAction::Join,
        ("part", None, None) => InputAction::Part,
        ("room", Some(room_id), None) => InputAction::Room(room_id.to_string()),
        ("status", None, None) => InputAction::Status,
        ("help", None, None) => InputAction::Help,
        ("quit" | "exit", None, None) => InputAction::Quit,
        _ => InputAction::Unknown(line.to_string()),
    }
}

fn parse_version(text: &str) -> Option<ProtocolVersion> {
    let number: u64 = text.parse().ok()?;
    ProtocolVersion::try_from(number).ok()
}

/// Prompt showing the connection state and target room
pub fn prompt(state: ConnectionState, room_id: &RoomId) -> String {
    format!("[{}] {}> ", state, room_id)
}

/// Redisplay the prompt after printing asynchronous output
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}

/// Tracks how much of the transcript has been printed
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    generation: u64,
    printed: usize,
}

impl TranscriptPrinter {
    /// Text for entries not yet printed; starts with a clear-screen sequence
    /// when the transcript was cleared since the last call
    pub fn render(&mut self, transcript: &Transcript) -> String {
        let mut output = String::new();
        if transcript.generation() != self.generation {
            self.generation = transcript.generation();
            self.printed = 0;
            output.push_str(CLEAR_SCREEN);
        }

        for entry in transcript.since(self.printed) {
            output.push_str(&MessageFormatter::format_entry(entry));
        }
        self.printed = transcript.len();
        output
    }
}
