//! In-session slash commands
//!
//! A command is the whole submitted line, trimmed and matched without
//! regard to case. Anything else is sent as a chat message.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    /// Leave the session
    Quit,
    /// Ask the server for the online roster
    Online,
}

impl ChatCommand {
    pub fn all() -> &'static [ChatCommand] {
        &[ChatCommand::Quit, ChatCommand::Online]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatCommand::Quit => "quit",
            ChatCommand::Online => "online",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChatCommand::Quit => "leave the chat",
            ChatCommand::Online => "list online users",
        }
    }

    pub fn parse(name: &str) -> Option<ChatCommand> {
        let name = name.to_lowercase();
        Self::all().iter().find(|cmd| cmd.name() == name).copied()
    }
}

impl fmt::Display for ChatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// Parse a submitted line. `None` means it is an ordinary message.
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let rest = input.trim().strip_prefix('/')?;
    ChatCommand::parse(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tokens_match() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /QUIT "), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/Online"), Some(ChatCommand::Online));
    }

    #[test]
    fn test_non_commands_are_messages() {
        assert_eq!(parse_command("/quit now"), None);
        assert_eq!(parse_command("quit"), None);
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command("/"), None);
        assert_eq!(parse_command("hello /quit"), None);
    }
}
