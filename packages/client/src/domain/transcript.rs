//! The transcript: an ordered log of everything the operator should see.

/// Where a transcript entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// A frame this client transmitted
    Outbound,
    /// A frame received from the server
    Inbound,
    /// A lifecycle notice (open, close, error)
    System,
}

/// One line of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub direction: Direction,
    pub text: String,
    /// Unix timestamp when the entry was appended (milliseconds)
    pub at: i64,
}

/// Append-only sequence of entries, in the order events were observed.
///
/// The only way to remove entries is [`Transcript::clear`], which drops all of them.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    /// Bumped on every clear so readers can tell a cleared log from a short one
    generation: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, direction: Direction, text: impl Into<String>, at: i64) {
        self.entries.push(TranscriptEntry {
            direction,
            text: text.into(),
            at,
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Entries appended at or after `index`; empty when `index` is past the end
    pub fn since(&self, index: usize) -> &[TranscriptEntry] {
        self.entries.get(index..).unwrap_or(&[])
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }
}
