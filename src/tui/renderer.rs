//! Draws the chat layout from the shared state
//!
//! The renderer owns the ratatui terminal and is generic over its backend,
//! so the same code draws to crossterm in the binary and to `TestBackend`
//! in tests.

use std::io;
use std::time::{Duration, Instant};

use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthStr;

use super::input::InputState;
use super::state::{ChatState, WrappedLine};
use super::theme::Theme;
use super::widgets::{HeaderBar, HelpBar, InputBox};
use crate::session::RecordStyle;

const TITLE: &str = "termchat";

/// Per-draw values that live outside the chat state
pub struct ChatFrame<'a> {
    pub nickname: &'a str,
    pub input: &'a InputState,
}

pub struct Renderer<B: Backend> {
    terminal: Terminal<B>,
    refresh_interval: Duration,
    last_draw: Option<Instant>,
}

impl<B: Backend> Renderer<B> {
    pub fn new(terminal: Terminal<B>, refresh_interval: Duration) -> Self {
        Self {
            terminal,
            refresh_interval,
            last_draw: None,
        }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }

    /// Message viewport (columns, rows) for the current terminal size.
    pub fn viewport(&self) -> io::Result<(usize, usize)> {
        let size = self.terminal.size()?;
        Ok(viewport_for(Rect::new(0, 0, size.width, size.height)))
    }

    /// Draw when the state is dirty, when forced, or when the refresh
    /// interval has passed. Returns whether a frame was drawn.
    pub fn render(
        &mut self,
        state: &mut ChatState,
        frame: &ChatFrame<'_>,
        force: bool,
    ) -> io::Result<bool> {
        let due = self
            .last_draw
            .map_or(true, |at| at.elapsed() >= self.refresh_interval);
        if !force && !state.is_dirty() && !due {
            return Ok(false);
        }

        state.clamp_scroll();
        let state_ref: &ChatState = state;
        self.terminal.draw(|f| draw_chat(f, state_ref, frame))?;

        state.clear_dirty();
        self.last_draw = Some(Instant::now());
        Ok(true)
    }
}

/// Split the full area into header, messages, input and help rows.
fn layout(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Messages
            Constraint::Length(3), // Input
            Constraint::Length(1), // Help
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

fn messages_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title_top(Line::styled(" Chat ", Theme::muted()))
}

/// Inner size of the message pane for a terminal of `area`.
pub fn viewport_for(area: Rect) -> (usize, usize) {
    let inner = messages_block().inner(layout(area)[1]);
    (inner.width as usize, inner.height as usize)
}

fn draw_chat(f: &mut Frame, state: &ChatState, chat: &ChatFrame<'_>) {
    let [header_area, messages_area, input_area, help_area] = layout(f.area());
    let ended = state.is_ended();

    f.render_widget(
        HeaderBar {
            title: TITLE,
            nickname: chat.nickname,
            connected: !ended,
        },
        header_area,
    );

    render_messages(f, messages_area, state);

    // Input box, with the buffer tail-truncated so the cursor stays visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let prompt = InputBox::prompt_width(chat.nickname);
    let room = inner_width.saturating_sub(prompt + 1);
    let tail = chat.input.visible_tail(room);
    f.render_widget(
        InputBox {
            label: chat.nickname,
            content: tail,
            focused: !ended,
        },
        input_area,
    );
    if !ended && input_area.height >= 3 && input_area.width > 2 {
        let right = input_area.x + input_area.width - 2;
        let cursor_x = input_area.x + 1 + (prompt + tail.width()) as u16;
        f.set_cursor_position((cursor_x.min(right), input_area.y + 1));
    }

    f.render_widget(HelpBar { ended }, help_area);
}

fn render_messages(f: &mut Frame, area: Rect, state: &ChatState) {
    let block = messages_block();
    let inner = block.inner(area);
    f.render_widget(block, area);

    let buf = f.buffer_mut();
    for (row, line) in state.visible_lines().enumerate() {
        let y = inner.y + row as u16;
        if row >= inner.height as usize {
            continue;
        }
        buf.set_line(inner.x, y, &styled_line(line), inner.width);
    }

    // Scrollbar over the right border
    let total = state.total_lines();
    let height = state.view().height;
    if total > height {
        let max_scroll = state.max_scroll();
        let offset = state.view().scroll_offset.min(max_scroll);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        let mut scrollbar_state =
            ScrollbarState::new(max_scroll).position(max_scroll.saturating_sub(offset));
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

/// Turn a wrapped line into spans according to its style.
fn styled_line(line: &WrappedLine) -> Line<'_> {
    match line.style {
        RecordStyle::Single(tone) => Line::from(Span::styled(line.text.as_str(), Theme::tone(tone))),
        RecordStyle::Segmented {
            timestamp,
            sender,
            body,
        } => match split_segments(&line.text) {
            Some([ts, nick, rest]) => Line::from(vec![
                Span::styled(ts, Theme::tone(timestamp)),
                Span::raw(" "),
                Span::styled(nick, Theme::tone(sender)),
                Span::raw(" "),
                Span::styled(rest, Theme::tone(body)),
            ]),
            None => Line::from(Span::styled(line.text.as_str(), Theme::fallback(line.style))),
        },
    }
}

/// Split "[ts] <sender> body" on its first two spaces.
pub fn split_segments(text: &str) -> Option<[&str; 3]> {
    let mut parts = text.splitn(3, ' ');
    let ts = parts.next()?;
    let sender = parts.next()?;
    let body = parts.next()?;
    Some([ts, sender, body])
}
