//! Shared chat state: scrollback, wrapped line cache and view state
//!
//! Both the receive loop and the input loop mutate this behind one lock;
//! the renderer reads it under the same lock.

use std::collections::VecDeque;

use super::wrap::wrap;
use crate::session::{MessageRecord, RecordStyle, Scrollback};

/// One display line derived from a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    pub text: String,
    pub style: RecordStyle,
}

/// Scroll requests from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    /// Jump to the oldest retained line
    Oldest,
    /// Jump back to the live bottom
    Newest,
}

/// Viewport and scroll position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Wrapped lines between the bottom of the view and the newest line
    pub scroll_offset: usize,
    pub width: usize,
    pub height: usize,
    /// The visible output is stale
    pub dirty: bool,
}

#[derive(Debug)]
pub struct ChatState {
    scrollback: Scrollback,
    lines: VecDeque<WrappedLine>,
    /// Wrapped line count per record, parallel to `scrollback`
    line_counts: VecDeque<usize>,
    view: ViewState,
    end_reason: Option<String>,
}

impl ChatState {
    pub fn new(capacity: usize, width: usize, height: usize) -> Self {
        Self {
            scrollback: Scrollback::new(capacity),
            lines: VecDeque::new(),
            line_counts: VecDeque::new(),
            view: ViewState {
                scroll_offset: 0,
                width,
                height,
                dirty: true,
            },
            end_reason: None,
        }
    }

    /// Append a record, wrapping it at the current width.
    pub fn push(&mut self, record: MessageRecord) {
        let wrapped = wrap_record(&record, self.view.width);
        if self.scrollback.push(record).is_some() {
            let evicted = self.line_counts.pop_front().unwrap_or(0);
            self.lines.drain(..evicted.min(self.lines.len()));
        }
        self.line_counts.push_back(wrapped.len());
        self.lines.extend(wrapped);
        self.view.dirty = true;
    }

    /// Record why the session ended. Only the first call appends its record.
    pub fn end_session(&mut self, record: MessageRecord, reason: &str) -> bool {
        if self.end_reason.is_some() {
            return false;
        }
        self.end_reason = Some(reason.to_string());
        self.push(record);
        true
    }

    pub fn is_ended(&self) -> bool {
        self.end_reason.is_some()
    }

    pub fn end_reason(&self) -> Option<&str> {
        self.end_reason.as_deref()
    }

    /// Largest valid scroll offset for the current cache and viewport.
    pub fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.view.height)
    }

    pub fn scroll(&mut self, command: ScrollCommand) {
        let max = self.max_scroll();
        let page = self.view.height.max(1);
        let offset = self.view.scroll_offset.min(max);
        self.view.scroll_offset = match command {
            ScrollCommand::LineUp => (offset + 1).min(max),
            ScrollCommand::LineDown => offset.saturating_sub(1),
            ScrollCommand::PageUp => (offset + page).min(max),
            ScrollCommand::PageDown => offset.saturating_sub(page),
            ScrollCommand::Oldest => max,
            ScrollCommand::Newest => 0,
        };
        self.view.dirty = true;
    }

    /// Rebuild the wrapped cache for a new viewport. Returns false when the
    /// size did not change.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if width == self.view.width && height == self.view.height {
            return false;
        }
        self.view.width = width;
        self.view.height = height;
        self.rewrap();
        self.clamp_scroll();
        self.view.dirty = true;
        true
    }

    fn rewrap(&mut self) {
        self.lines.clear();
        self.line_counts.clear();
        for record in self.scrollback.snapshot() {
            let wrapped = wrap_record(record, self.view.width);
            self.line_counts.push_back(wrapped.len());
            self.lines.extend(wrapped);
        }
    }

    pub fn clamp_scroll(&mut self) {
        self.view.scroll_offset = self.view.scroll_offset.min(self.max_scroll());
    }

    /// Lines in the viewport, oldest first. Assumes a clamped offset.
    pub fn visible_lines(&self) -> impl Iterator<Item = &WrappedLine> {
        let total = self.lines.len();
        let offset = self.view.scroll_offset.min(self.max_scroll());
        let start = total.saturating_sub(self.view.height).saturating_sub(offset);
        self.lines.iter().skip(start).take(self.view.height)
    }

    pub fn mark_dirty(&mut self) {
        self.view.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.view.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.view.dirty = false;
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn records(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn wrapped_lines(&self) -> &VecDeque<WrappedLine> {
        &self.lines
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }
}

/// Wrap one record. The first line keeps the record's style; later lines
/// use its continuation style. A blank record still occupies one line.
fn wrap_record(record: &MessageRecord, width: usize) -> Vec<WrappedLine> {
    let mut lines: Vec<WrappedLine> = wrap(&record.text(), width)
        .into_iter()
        .enumerate()
        .map(|(i, text)| WrappedLine {
            text,
            style: if i == 0 {
                record.style
            } else {
                record.style.continuation()
            },
        })
        .collect();

    if lines.is_empty() {
        lines.push(WrappedLine {
            text: String::new(),
            style: record.style.continuation(),
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Tone;
    use pretty_assertions::assert_eq;

    fn line(i: usize) -> MessageRecord {
        MessageRecord::banner(format!("message number {}", i), Tone::Normal)
    }

    fn assert_scroll_invariant(state: &ChatState) {
        let bound = state.total_lines().saturating_sub(state.view().height);
        assert!(
            state.view().scroll_offset <= bound,
            "offset {} exceeds bound {}",
            state.view().scroll_offset,
            bound
        );
    }

    #[test]
    fn test_push_wraps_incrementally() {
        let mut state = ChatState::new(10, 10, 5);
        state.push(line(1));
        assert_eq!(state.total_lines(), 2);
        assert_eq!(state.wrapped_lines()[0].text, "message");
        assert_eq!(state.wrapped_lines()[1].text, "number 1");
        assert!(state.is_dirty());
    }

    #[test]
    fn test_eviction_trims_wrapped_cache() {
        let mut state = ChatState::new(2, 80, 5);
        state.push(line(1));
        state.push(line(2));
        state.push(line(3));
        let texts: Vec<_> = state.wrapped_lines().iter().map(|l| l.text.clone()).collect();
        assert_eq!(texts, vec!["message number 2", "message number 3"]);
    }

    #[test]
    fn test_blank_record_occupies_a_line() {
        let mut state = ChatState::new(10, 80, 5);
        state.push(MessageRecord::banner(" ", Tone::Normal));
        assert_eq!(state.total_lines(), 1);
        assert_eq!(state.wrapped_lines()[0].text, "");
    }

    #[test]
    fn test_scroll_commands_respect_bounds() {
        let mut state = ChatState::new(100, 80, 3);
        for i in 0..10 {
            state.push(line(i));
        }
        assert_eq!(state.max_scroll(), 7);

        state.scroll(ScrollCommand::LineDown);
        assert_eq!(state.view().scroll_offset, 0);
        state.scroll(ScrollCommand::LineUp);
        assert_eq!(state.view().scroll_offset, 1);
        state.scroll(ScrollCommand::PageUp);
        assert_eq!(state.view().scroll_offset, 4);
        state.scroll(ScrollCommand::PageUp);
        assert_eq!(state.view().scroll_offset, 7);
        state.scroll(ScrollCommand::PageDown);
        assert_eq!(state.view().scroll_offset, 4);
        state.scroll(ScrollCommand::Newest);
        assert_eq!(state.view().scroll_offset, 0);
        state.scroll(ScrollCommand::Oldest);
        assert_eq!(state.view().scroll_offset, 7);
    }

    #[test]
    fn test_visible_window_follows_offset() {
        let mut state = ChatState::new(100, 80, 2);
        for i in 0..5 {
            state.push(line(i));
        }
        let bottom: Vec<_> = state.visible_lines().map(|l| l.text.clone()).collect();
        assert_eq!(bottom, vec!["message number 3", "message number 4"]);

        state.scroll(ScrollCommand::Oldest);
        let top: Vec<_> = state.visible_lines().map(|l| l.text.clone()).collect();
        assert_eq!(top, vec!["message number 0", "message number 1"]);
    }

    #[test]
    fn test_resize_rewraps_and_clamps() {
        let mut state = ChatState::new(100, 80, 2);
        for i in 0..6 {
            state.push(line(i));
        }
        state.scroll(ScrollCommand::Oldest);
        assert_eq!(state.view().scroll_offset, 4);

        assert!(state.resize(80, 10));
        assert_eq!(state.view().scroll_offset, 0);

        assert!(state.resize(8, 10));
        assert_eq!(state.total_lines(), 12);
        assert!(!state.resize(8, 10));
    }

    #[test]
    fn test_scroll_invariant_over_mixed_operations() {
        let mut state = ChatState::new(7, 30, 4);
        let sizes = [(30, 4), (5, 2), (80, 20), (12, 1), (0, 0), (40, 6)];
        let scrolls = [
            ScrollCommand::Oldest,
            ScrollCommand::PageUp,
            ScrollCommand::LineUp,
            ScrollCommand::PageDown,
            ScrollCommand::LineDown,
            ScrollCommand::Newest,
        ];
        for step in 0..60 {
            match step % 3 {
                0 => state.push(line(step)),
                1 => state.scroll(scrolls[step % scrolls.len()]),
                _ => {
                    let (w, h) = sizes[step % sizes.len()];
                    state.resize(w, h);
                }
            }
            state.clamp_scroll();
            assert_scroll_invariant(&state);
            assert!(state.visible_lines().count() <= state.view().height);
        }
    }

    #[test]
    fn test_end_session_appends_once() {
        let mut state = ChatState::new(10, 80, 5);
        assert!(state.end_session(MessageRecord::connection_lost("[00:00:00]".into()), "lost"));
        assert!(!state.end_session(MessageRecord::failure("[00:00:01]".into(), "x"), "x"));
        assert_eq!(state.records().len(), 1);
        assert_eq!(state.end_reason(), Some("lost"));
    }
}
