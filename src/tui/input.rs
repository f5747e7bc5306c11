//! Input handling for the chat prompt

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::ScrollCommand;

/// Result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Nothing changed
    None,
    /// The buffer changed
    Edited,
    /// Submit a non-blank line
    Submit(String),
    /// Move the message view
    Scroll(ScrollCommand),
    /// Quit the application
    Quit,
}

/// Line edit buffer. Editing happens at the end only.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub buffer: String,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key event and return the action
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        if key.kind == KeyEventKind::Release {
            return InputAction::None;
        }

        let chord = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                InputAction::Quit
            }

            KeyCode::Enter => {
                let line = std::mem::take(&mut self.buffer);
                if line.trim().is_empty() {
                    // Blank lines are dropped, but the buffer still clears.
                    if line.is_empty() {
                        InputAction::None
                    } else {
                        InputAction::Edited
                    }
                } else {
                    InputAction::Submit(line)
                }
            }

            KeyCode::Backspace | KeyCode::Delete => {
                if self.buffer.pop().is_some() {
                    InputAction::Edited
                } else {
                    InputAction::None
                }
            }

            KeyCode::Up => InputAction::Scroll(ScrollCommand::LineUp),
            KeyCode::Down => InputAction::Scroll(ScrollCommand::LineDown),
            KeyCode::PageUp => InputAction::Scroll(ScrollCommand::PageUp),
            KeyCode::PageDown => InputAction::Scroll(ScrollCommand::PageDown),
            KeyCode::Home => InputAction::Scroll(ScrollCommand::Oldest),
            KeyCode::End => InputAction::Scroll(ScrollCommand::Newest),

            KeyCode::Char(c) if !chord && !c.is_control() => {
                self.buffer.push(c);
                InputAction::Edited
            }

            _ => InputAction::None,
        }
    }

    /// The tail of the buffer that fits in `width` columns.
    pub fn visible_tail(&self, width: usize) -> &str {
        let mut used = 0;
        let mut start = self.buffer.len();
        for (idx, c) in self.buffer.char_indices().rev() {
            let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if used + w > width {
                break;
            }
            used += w;
            start = idx;
        }
        &self.buffer[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(state: &mut InputState, text: &str) {
        for c in text.chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut state = InputState::new();
        type_str(&mut state, "hi \u{4f60}");
        assert_eq!(state.buffer, "hi \u{4f60}");
        assert_eq!(
            state.handle_key(key(KeyCode::Enter)),
            InputAction::Submit("hi \u{4f60}".to_string())
        );
        assert!(state.buffer.is_empty());
    }

    #[test]
    fn test_whitespace_submit_is_ignored_and_cleared() {
        let mut state = InputState::new();
        type_str(&mut state, "   ");
        assert_eq!(state.handle_key(key(KeyCode::Enter)), InputAction::Edited);
        assert!(state.buffer.is_empty());
        assert_eq!(state.handle_key(key(KeyCode::Enter)), InputAction::None);
    }

    #[test]
    fn test_backspace_and_delete_pop_last_char() {
        let mut state = InputState::new();
        type_str(&mut state, "a\u{597d}b");
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.buffer, "a\u{597d}");
        state.handle_key(key(KeyCode::Delete));
        assert_eq!(state.buffer, "a");
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.handle_key(key(KeyCode::Backspace)), InputAction::None);
    }

    #[test]
    fn test_quit_chords() {
        let mut state = InputState::new();
        assert_eq!(state.handle_key(ctrl('c')), InputAction::Quit);
        assert_eq!(state.handle_key(ctrl('d')), InputAction::Quit);
    }

    #[test]
    fn test_other_chords_are_ignored() {
        let mut state = InputState::new();
        assert_eq!(state.handle_key(ctrl('u')), InputAction::None);
        let alt = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(state.handle_key(alt), InputAction::None);
        assert!(state.buffer.is_empty());

        let shifted = KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT);
        assert_eq!(state.handle_key(shifted), InputAction::Edited);
        assert_eq!(state.buffer, "X");
    }

    #[test]
    fn test_navigation_keys_scroll() {
        let mut state = InputState::new();
        assert_eq!(
            state.handle_key(key(KeyCode::PageUp)),
            InputAction::Scroll(ScrollCommand::PageUp)
        );
        assert_eq!(
            state.handle_key(key(KeyCode::Home)),
            InputAction::Scroll(ScrollCommand::Oldest)
        );
        assert_eq!(
            state.handle_key(key(KeyCode::End)),
            InputAction::Scroll(ScrollCommand::Newest)
        );
    }

    #[test]
    fn test_visible_tail() {
        let mut state = InputState::new();
        type_str(&mut state, "hello world");
        assert_eq!(state.visible_tail(5), "world");
        assert_eq!(state.visible_tail(50), "hello world");
        assert_eq!(state.visible_tail(0), "");

        state.buffer = "a\u{4f60}\u{597d}".to_string();
        assert_eq!(state.visible_tail(3), "\u{597d}");
    }
}
