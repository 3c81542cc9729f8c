//! Terminal User Interface module.
//!
//! Renders the conversation next to the live document using ratatui.

mod app;
mod document;
mod input;
mod state;
mod theme;
mod ui;

pub use app::run_tui;
pub use document::{document_lines, DocLine};
pub use input::{handle_events, handle_mouse};
pub use state::ViewState;
pub use theme::Theme;
pub use ui::draw;
