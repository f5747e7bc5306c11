//! Terminal User Interface module
//!
//! Chat state and wrapping, the renderer, the input loop and the account
//! form, all drawn with ratatui on a crossterm terminal.

mod app;
mod auth_screen;
mod input;
mod renderer;
mod slash_commands;
mod state;
pub mod terminal;
mod theme;
mod widgets;
mod wrap;

pub use app::{App, ChatSession, Flow};
pub use auth_screen::{AuthScreen, FormField, FormStatus, RegistrationFormState};
pub use input::{InputAction, InputState};
pub use renderer::{split_segments, viewport_for, ChatFrame, Renderer};
pub use slash_commands::{parse_command, ChatCommand};
pub use state::{ChatState, ScrollCommand, ViewState, WrappedLine};
pub use theme::Theme;
pub use wrap::wrap;
