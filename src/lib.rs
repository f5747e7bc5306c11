//! Termchat - real-time chat in the terminal
//!
//! A client for a WebSocket chat service that:
//! - Authenticates with stored credentials or walks the user through registration
//! - Streams incoming messages into a bounded, word-wrapped scrollback pane
//! - Accepts line-buffered input concurrently with network receipt

pub mod auth;
pub mod config;
pub mod credentials;
pub mod logging;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod tui;

pub use auth::{AuthOutcome, Authenticator};
pub use config::ChatConfig;
pub use credentials::{CredentialStore, Credentials, FileCredentialStore};
pub use session::{ChatState, MessageRecord, SessionIdentity};

/// Result type for Termchat operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors that can occur in Termchat
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Transport error: {0}")]
    Transport(#[from] transport::TransportError),

    #[error("Credential store error: {0}")]
    Credentials(#[from] credentials::CredentialError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
