//! Message records and their color tones

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::protocol::{InboundEvent, SystemAction};

/// Number of distinct sender colors
pub const NICK_PALETTE_SIZE: u8 = 6;

/// Semantic color slot. The theme maps tones to terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Normal,
    System,
    Timestamp,
    Message,
    /// The local user's own name
    OwnNick,
    Join,
    Error,
    Highlight,
    /// Sender color, index into the nick palette
    Nick(u8),
}

/// Color assignment for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStyle {
    Single(Tone),
    /// "[ts] <sender> body" painted in three parts
    Segmented {
        timestamp: Tone,
        sender: Tone,
        body: Tone,
    },
}

impl RecordStyle {
    /// Style for the wrapped lines after the first one.
    pub fn continuation(self) -> RecordStyle {
        match self {
            RecordStyle::Single(tone) => RecordStyle::Single(tone),
            RecordStyle::Segmented { body, .. } => RecordStyle::Single(body),
        }
    }
}

/// One rendered entry in the scrollback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// "[HH:MM:SS]", or empty for banner lines
    pub timestamp: String,
    pub body: String,
    pub style: RecordStyle,
}

impl MessageRecord {
    /// A chat line from `sender`.
    pub fn chat(timestamp: String, sender: &str, body: &str, sender_tone: Tone) -> Self {
        Self {
            timestamp,
            body: format!("<{}> {}", sender, body),
            style: RecordStyle::Segmented {
                timestamp: Tone::Timestamp,
                sender: sender_tone,
                body: Tone::Message,
            },
        }
    }

    /// A one-tone line stamped with `timestamp`.
    pub fn notice(timestamp: String, text: impl Into<String>, tone: Tone) -> Self {
        Self {
            timestamp,
            body: text.into(),
            style: RecordStyle::Single(tone),
        }
    }

    /// An unstamped line, used for the session banner.
    pub fn banner(text: impl Into<String>, tone: Tone) -> Self {
        Self::notice(String::new(), text, tone)
    }

    pub fn connection_lost(timestamp: String) -> Self {
        Self::notice(timestamp, "*** Connection to server lost ***", Tone::Error)
    }

    pub fn failure(timestamp: String, reason: &str) -> Self {
        Self::notice(timestamp, format!("Error: {}", reason), Tone::System)
    }

    /// Map a decoded server push to a record.
    pub fn from_event(event: &InboundEvent, timestamp: String) -> Self {
        match event {
            InboundEvent::Chat { sender, body } => {
                Self::chat(timestamp, sender, body, nick_tone(sender))
            }
            InboundEvent::Roster(names) => Self::notice(
                timestamp,
                format!("Online users: {}", names.join(", ")),
                Tone::System,
            ),
            InboundEvent::System { sender, action, raw } => match action {
                SystemAction::Connected => Self::notice(
                    timestamp,
                    format!("*** {} joined the chat ***", sender),
                    Tone::Join,
                ),
                SystemAction::Disconnected => Self::notice(
                    timestamp,
                    format!("*** {} left the chat ***", sender),
                    Tone::Error,
                ),
                SystemAction::Other(_) => {
                    Self::notice(timestamp, format!("SYSTEM: {}", raw), Tone::System)
                }
            },
        }
    }

    /// Full display text, timestamp first.
    pub fn text(&self) -> String {
        if self.timestamp.is_empty() {
            self.body.clone()
        } else {
            format!("{} {}", self.timestamp, self.body)
        }
    }
}

/// Receipt-time clock string.
pub fn clock_timestamp() -> String {
    chrono::Local::now().format("[%H:%M:%S]").to_string()
}

/// Sender color: hash of the display name modulo the palette size.
pub fn nick_tone(name: &str) -> Tone {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    Tone::Nick((hasher.finish() % u64::from(NICK_PALETTE_SIZE)) as u8)
}
