// Transcript: the ordered, append-only log shown in the chat window

use regex::Regex;
use std::sync::OnceLock;

/// Category of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
    ToolCall,
    ToolResult,
}

impl EntryKind {
    /// Display tag used by the UI to pick a style
    pub fn tag(&self) -> &'static str {
        match self {
            EntryKind::User => "user",
            EntryKind::Assistant => "ai",
            EntryKind::ToolCall => "tool_call",
            EntryKind::ToolResult => "result",
        }
    }
}

/// A single immutable line of the conversation
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    kind: EntryKind,
    text: String,
    timestamp: chrono::DateTime<chrono::Local>,
}

impl TranscriptEntry {
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::Local> {
        self.timestamp
    }

    /// YouTube watch links contained in this entry, in order of appearance
    pub fn trailer_links(&self) -> Vec<&str> {
        extract_trailer_links(&self.text)
    }
}

/// Ordered log of entries. Entries can be appended but never edited or removed.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    scroll_pending: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and request a scroll to the end
    pub fn append(&mut self, kind: EntryKind, text: impl Into<String>) {
        let text = text.into();
        tracing::trace!("transcript <{}> {}", kind.tag(), text);

        self.entries.push(TranscriptEntry {
            kind,
            text,
            timestamp: chrono::Local::now(),
        });
        self.scroll_pending = true;
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
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

    /// Entries of one kind, in order
    pub fn entries_of(&self, kind: EntryKind) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Consume the pending scroll request raised by the last append(s)
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }
}

fn trailer_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https://www\.youtube\.com/watch\?v=[A-Za-z0-9_-]+")
            .expect("trailer link pattern is valid")
    })
}

/// Find YouTube watch URLs in free text
pub fn extract_trailer_links(text: &str) -> Vec<&str> {
    trailer_link_pattern()
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

/// Piece of entry text, either plain or a trailer link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSpan<'a> {
    Plain(&'a str),
    Link(&'a str),
}

/// Split text into plain runs and trailer links, preserving order
pub fn split_trailer_links(text: &str) -> Vec<TextSpan<'_>> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for link in trailer_link_pattern().find_iter(text) {
        if link.start() > cursor {
            spans.push(TextSpan::Plain(&text[cursor..link.start()]));
        }
        spans.push(TextSpan::Link(link.as_str()));
        cursor = link.end();
    }
    if cursor < text.len() {
        spans.push(TextSpan::Plain(&text[cursor..]));
    }

    spans
}
