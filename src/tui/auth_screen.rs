//! Account creation form shown before the chat session
//!
//! Collects username, display name, secret and confirmation. Secrets are
//! echoed as `*`.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::auth::{RegistrationForm, RegistrationPrompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Username,
    Nickname,
    Password,
    Confirm,
}

impl FormField {
    const ALL: [FormField; 4] = [
        FormField::Username,
        FormField::Nickname,
        FormField::Password,
        FormField::Confirm,
    ];

    fn label(self) -> &'static str {
        match self {
            FormField::Username => "Username: ",
            FormField::Nickname => "Nickname: ",
            FormField::Password => "Password: ",
            FormField::Confirm => "Confirm : ",
        }
    }

    fn hidden(self) -> bool {
        matches!(self, FormField::Password | FormField::Confirm)
    }

    fn index(self) -> usize {
        match self {
            FormField::Username => 0,
            FormField::Nickname => 1,
            FormField::Password => 2,
            FormField::Confirm => 3,
        }
    }
}

/// Outcome of one key press on the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Pending,
    Submitted(RegistrationForm),
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationFormState {
    values: [String; 4],
    focus: usize,
}

impl RegistrationFormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    /// What the form shows for `field`
    pub fn display_value(&self, field: FormField) -> String {
        let value = self.value(field);
        if field.hidden() {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormStatus {
        if key.kind == KeyEventKind::Release {
            return FormStatus::Pending;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => FormStatus::Cancelled,
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => FormStatus::Cancelled,

            KeyCode::Enter => {
                if self.focus + 1 < FormField::ALL.len() {
                    self.focus += 1;
                    FormStatus::Pending
                } else {
                    FormStatus::Submitted(self.take_form())
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % FormField::ALL.len();
                FormStatus::Pending
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + FormField::ALL.len() - 1) % FormField::ALL.len();
                FormStatus::Pending
            }
            KeyCode::Backspace => {
                self.values[self.focus].pop();
                FormStatus::Pending
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                if !c.is_control() {
                    self.values[self.focus].push(c);
                }
                FormStatus::Pending
            }
            _ => FormStatus::Pending,
        }
    }

    fn take_form(&mut self) -> RegistrationForm {
        let [username, nickname, secret, confirmation] = std::mem::take(&mut self.values);
        self.focus = 0;
        RegistrationForm {
            username,
            nickname,
            secret,
            confirmation,
        }
    }
}

/// Draws the form and the latest notice.
pub fn draw_form(f: &mut Frame, form: &RegistrationFormState, notice: Option<&str>) {
    let area = centered(f.area(), 60, 12);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border_focused())
        .title(Span::styled(" Create account ", Theme::title()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::styled("No stored login found, please create an account.", Theme::muted()),
        Line::raw(""),
    ];
    for field in FormField::ALL {
        let focused = field == form.focus();
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused { Theme::key() } else { Theme::key_desc() };
        lines.push(Line::from(vec![
            Span::styled(marker, Theme::key()),
            Span::styled(field.label(), label_style),
            Span::styled(form.display_value(field), Theme::text()),
        ]));
    }
    lines.push(Line::raw(""));
    if let Some(notice) = notice {
        lines.push(Line::styled(notice.to_string(), Theme::error()));
    }
    lines.push(Line::styled(
        "Enter next/submit · Tab move · Esc cancel",
        Theme::key_desc(),
    ));
    f.render_widget(Paragraph::new(lines), inner);

    if notice.is_none() {
        let field = form.focus();
        let x = inner.x
            + (2 + field.label().width() + form.display_value(field).width()) as u16;
        let y = inner.y + 2 + field.index() as u16;
        if x < inner.right() && y < inner.bottom() {
            f.set_cursor_position((x, y));
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(height.min(area.height))])
        .flex(ratatui::layout::Flex::Center)
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width.min(area.width))])
        .flex(ratatui::layout::Flex::Center)
        .split(vertical[0]);
    horizontal[0]
}

/// Registration prompt drawn on the session terminal
pub struct AuthScreen<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    form: RegistrationFormState,
}

impl<'a, B: Backend> AuthScreen<'a, B> {
    pub fn new(terminal: &'a mut Terminal<B>) -> Self {
        Self {
            terminal,
            form: RegistrationFormState::new(),
        }
    }

    fn next_key() -> io::Result<KeyEvent> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(key);
                }
            }
        }
    }
}

impl<B: Backend> RegistrationPrompt for AuthScreen<'_, B> {
    fn collect(&mut self) -> io::Result<Option<RegistrationForm>> {
        self.form = RegistrationFormState::new();
        loop {
            let form = &self.form;
            self.terminal.draw(|f| draw_form(f, form, None))?;
            match self.form.handle_key(Self::next_key()?) {
                FormStatus::Pending => {}
                FormStatus::Submitted(form) => return Ok(Some(form)),
                FormStatus::Cancelled => return Ok(None),
            }
        }
    }

    fn notify(&mut self, message: &str) -> io::Result<()> {
        let form = &self.form;
        let notice = format!("{} (press any key)", message);
        self.terminal
            .draw(|f| draw_form(f, form, Some(notice.as_str())))?;
        Self::next_key()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;

    fn press(form: &mut RegistrationFormState, code: KeyCode) -> FormStatus {
        form.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(form: &mut RegistrationFormState, text: &str) {
        for c in text.chars() {
            press(form, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_fill_and_submit() {
        let mut form = RegistrationFormState::new();
        type_str(&mut form, "alice");
        press(&mut form, KeyCode::Enter);
        type_str(&mut form, "Alice");
        press(&mut form, KeyCode::Enter);
        type_str(&mut form, "pw1");
        press(&mut form, KeyCode::Enter);
        type_str(&mut form, "pw2");
        assert_eq!(form.display_value(FormField::Confirm), "***");

        let status = press(&mut form, KeyCode::Enter);
        assert_eq!(
            status,
            FormStatus::Submitted(RegistrationForm {
                username: "alice".into(),
                nickname: "Alice".into(),
                secret: "pw1".into(),
                confirmation: "pw2".into(),
            })
        );
        assert_eq!(form.focus(), FormField::Username);
        assert_eq!(form.value(FormField::Username), "");
    }

    #[test]
    fn test_navigation_and_backspace() {
        let mut form = RegistrationFormState::new();
        press(&mut form, KeyCode::Up);
        assert_eq!(form.focus(), FormField::Confirm);
        press(&mut form, KeyCode::Tab);
        assert_eq!(form.focus(), FormField::Username);
        type_str(&mut form, "bobb");
        press(&mut form, KeyCode::Backspace);
        assert_eq!(form.value(FormField::Username), "bob");
    }

    #[test]
    fn test_cancel() {
        let mut form = RegistrationFormState::new();
        assert_eq!(press(&mut form, KeyCode::Esc), FormStatus::Cancelled);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(form.handle_key(ctrl_c), FormStatus::Cancelled);
    }

    #[test]
    fn test_secret_is_masked_when_drawn() {
        let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
        let mut form = RegistrationFormState::new();
        press(&mut form, KeyCode::Enter);
        press(&mut form, KeyCode::Enter);
        type_str(&mut form, "hunter2");
        terminal
            .draw(|f| draw_form(f, &form, Some("Passwords don't match.")))
            .unwrap();

        let buf = terminal.backend().buffer();
        let screen: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(!screen.contains("hunter2"));
        assert!(screen.contains("*******"));
        assert!(screen.contains("Passwords don't match."));
    }
}
