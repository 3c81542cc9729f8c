//! Color themes for the terminal interface.

use ratatui::style::Color;

/// Colors used by the conversation and document panes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    /// Borders of the focused pane, titles
    pub primary: Color,
    /// Options under the cursor, toggled items
    pub accent: Color,
    pub text: Color,
    /// Section bodies the user cannot currently edit
    pub text_dim: Color,
    /// Hints and disabled options
    pub text_muted: Color,
    pub border: Color,
    /// User answers in the history
    pub user: Color,
    pub notice: Color,
    pub error: Color,
    /// Background of emphasized document elements
    pub highlight_bg: Color,
    /// Ready badges
    pub ready: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: "default",
            primary: Color::Rgb(99, 102, 241),    // Indigo
            accent: Color::Rgb(251, 146, 60),     // Orange
            text: Color::White,
            text_dim: Color::Rgb(156, 163, 175),  // Gray-400
            text_muted: Color::Rgb(107, 114, 128), // Gray-500
            border: Color::Rgb(75, 85, 99),       // Gray-600
            user: Color::Rgb(16, 185, 129),       // Emerald
            notice: Color::Rgb(56, 189, 248),     // Sky
            error: Color::Rgb(239, 68, 68),       // Red
            highlight_bg: Color::Rgb(113, 63, 18), // Amber-900
            ready: Color::Rgb(34, 197, 94),       // Green
        }
    }

    /// Dracula: dark purple and pink.
    pub fn dracula() -> Self {
        Self {
            name: "dracula",
            primary: Color::Rgb(189, 147, 249),
            accent: Color::Rgb(255, 121, 198),
            text: Color::Rgb(248, 248, 242),
            text_dim: Color::Rgb(189, 147, 249),
            text_muted: Color::Rgb(98, 114, 164),
            border: Color::Rgb(68, 71, 90),
            user: Color::Rgb(80, 250, 123),
            notice: Color::Rgb(139, 233, 253),
            error: Color::Rgb(255, 85, 85),
            highlight_bg: Color::Rgb(68, 71, 90),
            ready: Color::Rgb(80, 250, 123),
        }
    }

    /// Nord: arctic blues.
    pub fn nord() -> Self {
        Self {
            name: "nord",
            primary: Color::Rgb(136, 192, 208),
            accent: Color::Rgb(235, 203, 139),
            text: Color::Rgb(236, 239, 244),
            text_dim: Color::Rgb(216, 222, 233),
            text_muted: Color::Rgb(76, 86, 106),
            border: Color::Rgb(67, 76, 94),
            user: Color::Rgb(163, 190, 140),
            notice: Color::Rgb(129, 161, 193),
            error: Color::Rgb(191, 97, 106),
            highlight_bg: Color::Rgb(76, 86, 106),
            ready: Color::Rgb(163, 190, 140),
        }
    }

    /// Look up a built-in theme, case-insensitively.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default_theme()),
            "dracula" => Some(Self::dracula()),
            "nord" => Some(Self::nord()),
            _ => None,
        }
    }

    pub fn available() -> [&'static str; 3] {
        ["default", "dracula", "nord"]
    }
}
