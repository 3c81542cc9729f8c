//! View-local state of the terminal interface.
//!
//! Cursor position, document scroll and overlays live here, outside the
//! session core.

use super::Theme;

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub theme: Theme,

    /// Option under the cursor on selection surfaces
    pub cursor: usize,

    /// First visible line of the document pane
    pub doc_scroll: u16,

    /// Height of the document pane at the last draw
    pub doc_height: u16,

    /// Anchor to bring into view on the next draw
    pub scroll_to: Option<String>,

    /// One-line message for the status bar
    pub status: Option<String>,

    pub show_help: bool,
}

impl ViewState {
    pub fn new(theme: Theme) -> Self {
        Self { theme, ..Self::default() }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn scroll_doc(&mut self, delta: i32) {
        let next = i32::from(self.doc_scroll) + delta;
        self.doc_scroll = u16::try_from(next.max(0)).unwrap_or(u16::MAX);
    }

    /// Move the cursor within `len` options, wrapping around.
    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let len = len as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
    }
}
