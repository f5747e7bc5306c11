//! Chat session model
//!
//! Message records, the bounded scrollback that holds them, and the
//! background loop that turns inbound frames into records.

mod receiver;
mod record;
mod scrollback;

pub use receiver::receive_loop;
pub use record::{clock_timestamp, nick_tone, MessageRecord, RecordStyle, Tone, NICK_PALETTE_SIZE};
pub use scrollback::Scrollback;

pub use crate::tui::ChatState;

/// Identity the server assigned to this connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub display_name: String,
}

impl SessionIdentity {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

/// Why a session stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user asked to leave
    Quit,
    /// The channel closed or a frame could not be decoded
    Closed(String),
}
