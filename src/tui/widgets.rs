//! Custom widgets for the chat layout

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use unicode_width::UnicodeWidthStr;

use super::slash_commands::ChatCommand;
use super::theme::Theme;

/// Header bar with title and connection state
pub struct HeaderBar<'a> {
    pub title: &'a str,
    pub nickname: &'a str,
    pub connected: bool,
}

impl Widget for HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 3 {
            return;
        }

        let title_line = Line::from(vec![
            Span::styled("◆ ", Theme::border_focused()),
            Span::styled(self.title, Theme::title()),
        ]);
        buf.set_line(area.x + 1, area.y, &title_line, area.width.saturating_sub(2));

        // Connection state on the right
        let (dot, style) = if self.connected {
            ("● ", Theme::success())
        } else {
            ("○ ", Theme::error())
        };
        let status = format!("{}{} ", dot, self.nickname);
        let status_len = status.width() as u16;
        let status_x = area.x + area.width.saturating_sub(status_len + 1);
        buf.set_span(status_x, area.y, &Span::styled(status, style), status_len + 1);
    }
}

/// Input box: "<nick>: <buffer tail>"
pub struct InputBox<'a> {
    pub label: &'a str,
    pub content: &'a str,
    pub focused: bool,
}

impl InputBox<'_> {
    /// Columns taken by the "<nick>: " prompt
    pub fn prompt_width(label: &str) -> usize {
        label.width() + 2
    }
}

impl Widget for InputBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(" Message ", Theme::muted()));

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let line = Line::from(vec![
            Span::styled(format!("{}: ", self.label), Theme::key()),
            Span::styled(self.content, Theme::text()),
        ]);
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}

/// Help bar showing key bindings, or the disconnected hint
pub struct HelpBar {
    pub ended: bool,
}

impl Widget for HelpBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        if self.ended {
            let line = Line::from(vec![
                Span::styled(" Disconnected. ", Theme::error()),
                Span::styled("Press any key to exit", Theme::key_desc()),
            ]);
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let quit = ChatCommand::Quit.to_string();
        let online = ChatCommand::Online.to_string();
        let bindings = [
            ("Enter", "send"),
            ("↑↓", "scroll"),
            ("PgUp/PgDn", "page"),
            ("Home/End", "oldest/newest"),
            (online.as_str(), "users"),
            (quit.as_str(), "quit"),
        ];

        let mut spans = vec![Span::raw(" ")];
        for (i, (key, desc)) in bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Theme::muted()));
            }
            spans.push(Span::styled(*key, Theme::key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::key_desc()));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
