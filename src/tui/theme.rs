//! Color theme for the TUI - using ANSI colors for better terminal compatibility

use ratatui::style::{Color, Modifier, Style};

use crate::session::{RecordStyle, Tone};

/// Theme using ANSI colors that work well across terminal themes
pub struct Theme;

impl Theme {
    pub const CYAN: Color = Color::Cyan;
    pub const GREEN: Color = Color::Green;
    pub const YELLOW: Color = Color::Yellow;
    pub const RED: Color = Color::Red;
    pub const BLUE: Color = Color::Blue;
    pub const MAGENTA: Color = Color::Magenta;
    pub const DARK_GRAY: Color = Color::DarkGray;

    /// Sender colors, indexed by `Tone::Nick`
    pub const NICK_PALETTE: [Color; 6] = [
        Self::GREEN,
        Self::MAGENTA,
        Self::RED,
        Self::BLUE,
        Self::YELLOW,
        Self::CYAN,
    ];

    pub fn title() -> Style {
        Style::default()
            .fg(Self::CYAN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default()
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::DARK_GRAY)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::RED)
    }

    pub fn success() -> Style {
        Style::default().fg(Self::GREEN)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::DARK_GRAY)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::CYAN)
    }

    pub fn key() -> Style {
        Style::default()
            .fg(Self::CYAN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_desc() -> Style {
        Style::default().fg(Self::DARK_GRAY)
    }

    /// Terminal style for a semantic tone
    pub fn tone(tone: Tone) -> Style {
        match tone {
            Tone::Normal | Tone::Message => Self::text(),
            Tone::System => Style::default().fg(Self::YELLOW),
            Tone::Timestamp => Style::default().fg(Self::CYAN),
            Tone::OwnNick => Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            Tone::Join => Self::success(),
            Tone::Error => Self::error(),
            Tone::Highlight => Style::default()
                .fg(Self::MAGENTA)
                .add_modifier(Modifier::BOLD),
            Tone::Nick(i) => {
                let color = Self::NICK_PALETTE[usize::from(i) % Self::NICK_PALETTE.len()];
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Style used when a segmented line cannot be split
    pub fn fallback(style: RecordStyle) -> Style {
        match style {
            RecordStyle::Single(tone) => Self::tone(tone),
            RecordStyle::Segmented { .. } => Self::text(),
        }
    }
}
