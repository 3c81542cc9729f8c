//! UI rendering for the terminal interface.
//!
//! Conversation on the left, the document on the right.

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::document::document_lines;
use super::{Theme, ViewState};
use crate::app::App;
use crate::conversation::{phase_name, stage_name, InputSurface, MessageKind, Role, Thread, ThreadKind};
use crate::core::Clock;
use crate::document::Phase;

/// Draw the whole interface.
pub fn draw<C: Clock>(frame: &mut Frame, app: &App<C>, view: &mut ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Phase header
            Constraint::Min(8),    // Conversation + document
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    draw_header(frame, app, &view.theme, chunks[0]);
    draw_conversation(frame, app, view, panes[0]);
    draw_document(frame, app, view, panes[1]);
    draw_status_bar(frame, view, chunks[2]);

    if view.show_help {
        draw_help(frame, &view.theme);
    }
}

fn draw_header<C: Clock>(frame: &mut Frame, app: &App<C>, theme: &Theme, area: Rect) {
    let t = app.conversation().translator();
    let project = app.project();
    let readiness = app.readiness();

    let mut spans = vec![Span::styled(
        format!(" {} ", project.title()),
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
    )];
    for phase in Phase::ALL {
        let current = phase == project.phase;
        let mark = if readiness.get(phase) { "✓" } else { "○" };
        let style = if current {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else if readiness.get(phase) {
            Style::default().fg(theme.ready)
        } else {
            Style::default().fg(theme.text_muted)
        };
        spans.push(Span::styled(format!(" {mark} {}", t.translate(&phase_name(phase))), style));
    }
    if let Some(stage) = app.extract_stage() {
        spans.push(Span::styled(
            format!("  ({})", t.translate(&stage_name(stage))),
            Style::default().fg(theme.text_dim),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn thread_label(thread: &Thread) -> String {
    match thread.kind() {
        ThreadKind::Main => "main".to_string(),
        ThreadKind::Side => format!("side {}", thread.id()),
    }
}

fn draw_conversation<C: Clock>(frame: &mut Frame, app: &App<C>, view: &ViewState, area: Rect) {
    let theme = &view.theme;
    let conversation = app.conversation();
    let active = conversation.active();

    let tabs: Vec<Span> = conversation
        .threads()
        .iter()
        .map(|thread| {
            let style = if thread.id() == active.id() {
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(theme.text_dim)
            };
            Span::styled(format!(" {} ", thread_label(thread)), style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary))
        .title(Line::from(tabs));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input_rows = input_height(active.surface()).min(inner.height / 2);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(input_rows)])
        .split(inner);

    draw_messages(frame, active, theme, parts[0]);
    draw_input(frame, active, view, parts[1]);
}

fn draw_messages(frame: &mut Frame, thread: &Thread, theme: &Theme, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for message in thread.messages() {
        let style = match (message.role, message.kind) {
            (Role::User, _) => Style::default().fg(theme.user),
            (_, MessageKind::Error) => Style::default().fg(theme.error),
            (_, MessageKind::Notice) => Style::default().fg(theme.notice),
            _ => Style::default().fg(theme.text),
        };
        let prefix = match message.role {
            Role::User => "› ",
            Role::Assistant => "  ",
        };
        for (i, text) in message.visible().split('\n').enumerate() {
            let lead = if i == 0 { prefix } else { "  " };
            lines.push(Line::from(Span::styled(format!("{lead}{text}"), style)));
        }
        lines.push(Line::default());
    }
    if thread.is_thinking() {
        lines.push(Line::from(Span::styled("  …", Style::default().fg(theme.text_muted))));
    }

    // Keep the latest message in view
    let width = usize::from(area.width.max(1));
    let rows: usize = lines.iter().map(|l| l.width().max(1).div_ceil(width)).sum();
    let offset = rows.saturating_sub(usize::from(area.height));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

fn input_height(surface: &InputSurface) -> u16 {
    let rows = match surface {
        InputSurface::None => 1,
        InputSurface::SingleSelect(s) => s.options.len() + s.resumable.len(),
        InputSurface::OptionButtons { options } => options.len(),
        InputSurface::MultiSelect(m) if m.is_other_active() => {
            m.other_list().map_or(1, |l| l.entries().len())
        }
        InputSurface::MultiSelect(m) => m.options.len(),
        InputSurface::List(list) => list.entries().len(),
        InputSurface::FreeText(text) => text.content().lines().count().max(1),
    };
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(2)
}

fn draw_input(frame: &mut Frame, thread: &Thread, view: &ViewState, area: Rect) {
    let theme = &view.theme;
    let locked = thread.is_locked();
    let surface = thread.surface();

    let cursor_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let plain = Style::default().fg(theme.text);
    let muted = Style::default().fg(theme.text_muted);
    let pointer = |i: usize| if i == view.cursor && !locked { "▸ " } else { "  " };

    let mut lines: Vec<Line> = Vec::new();
    match surface {
        InputSurface::None => {}
        InputSurface::SingleSelect(select) => {
            for (i, option) in select.options.iter().enumerate() {
                let style = if i == view.cursor { cursor_style } else { plain };
                lines.push(Line::from(Span::styled(format!("{}{}", pointer(i), option.label), style)));
            }
            let offset = select.options.len();
            for (i, project) in select.resumable.iter().enumerate() {
                let style = if offset + i == view.cursor { cursor_style } else { muted };
                lines.push(Line::from(Span::styled(
                    format!("{}↺ {} ({})", pointer(offset + i), project.title, project.phase),
                    style,
                )));
            }
        }
        InputSurface::OptionButtons { options } => {
            for (i, option) in options.iter().enumerate() {
                let style = match (option.enabled, i == view.cursor) {
                    (false, _) => muted,
                    (true, true) => cursor_style,
                    (true, false) => plain,
                };
                lines.push(Line::from(Span::styled(format!("{}[ {} ]", pointer(i), option.label), style)));
            }
        }
        InputSurface::MultiSelect(select) if !select.is_other_active() => {
            for (i, option) in select.options.iter().enumerate() {
                let mark = if select.is_toggled(&option.value) { "[x]" } else { "[ ]" };
                let style = match (option.enabled, i == view.cursor) {
                    (false, _) => muted,
                    (true, true) => cursor_style,
                    (true, false) => plain,
                };
                lines.push(Line::from(Span::styled(format!("{}{mark} {}", pointer(i), option.label), style)));
            }
        }
        InputSurface::MultiSelect(_) | InputSurface::List(_) => {
            let list = match surface {
                InputSurface::MultiSelect(m) => m.other_list(),
                InputSurface::List(list) => Some(list),
                _ => None,
            };
            if let Some(list) = list {
                for (i, entry) in list.entries().iter().enumerate() {
                    let focused = i == list.focus();
                    let style = if focused { cursor_style } else { plain };
                    let caret = if focused && !locked { "▏" } else { "" };
                    lines.push(Line::from(Span::styled(format!("{:>2}. {entry}{caret}", i + 1), style)));
                }
            }
        }
        InputSurface::FreeText(text) => {
            for line in text.content().split('\n') {
                lines.push(Line::from(Span::styled(line.to_string(), plain)));
            }
            if let Some(last) = lines.last_mut() {
                if !locked {
                    last.push_span(Span::styled("▏", cursor_style));
                }
            }
        }
    }

    let title = if locked {
        " waiting ".to_string()
    } else {
        format!(" {} ", thread.input_kind())
    };
    let border = if locked { theme.border } else { theme.accent };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn draw_document<C: Clock>(frame: &mut Frame, app: &App<C>, view: &mut ViewState, area: Rect) {
    let theme = view.theme.clone();
    let lines = document_lines(app, &theme);
    let emphasized: HashSet<&str> =
        app.highlighter().highlights().map(|h| h.anchor.id.as_str()).collect();

    view.doc_height = area.height.saturating_sub(2);
    if let Some(anchor) = view.scroll_to.take() {
        if let Some(index) = lines.iter().position(|l| l.anchors.contains(&anchor)) {
            view.doc_scroll = u16::try_from(index.saturating_sub(2)).unwrap_or(u16::MAX);
        }
    }
    let max_scroll = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_sub(1);
    view.doc_scroll = view.doc_scroll.min(max_scroll);

    let rendered: Vec<Line> = lines
        .into_iter()
        .map(|doc| {
            if doc.anchors.iter().any(|a| emphasized.contains(a.as_str())) {
                doc.line.patch_style(Style::default().bg(theme.highlight_bg))
            } else {
                doc.line
            }
        })
        .collect();

    let mut title = vec![Span::styled(" document ", Style::default().fg(theme.primary))];
    if app.highlighter().is_scroll_locked(app.now()) {
        title.push(Span::styled("(scroll held) ", Style::default().fg(theme.text_muted)));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Line::from(title));

    let paragraph = Paragraph::new(rendered).block(block).scroll((view.doc_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, view: &ViewState, area: Rect) {
    let theme = &view.theme;
    let line = match &view.status {
        Some(status) => Line::from(Span::styled(format!(" {status}"), Style::default().fg(theme.accent))),
        None => Line::from(Span::styled(
            " Enter submit · F1 help · Ctrl+O continue · Ctrl+T side thread · Alt+←/→ threads · Ctrl+Q quit",
            Style::default().fg(theme.text_muted),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help(frame: &mut Frame, theme: &Theme) {
    let keys = [
        ("Enter", "submit the current answer"),
        ("Alt+Enter", "line break in free text"),
        ("↑/↓", "move between options or entries"),
        ("Space", "toggle an option"),
        ("Tab / Ctrl+N", "add a list entry"),
        ("Ctrl+D", "remove the focused entry"),
        ("Esc", "back from other entries to options"),
        ("Ctrl+O", "continue to the next phase"),
        ("Ctrl+P", "preview optimize"),
        ("Ctrl+T", "open a side thread"),
        ("Alt+←/→", "switch threads"),
        ("PgUp/PgDn", "scroll the document"),
        ("Ctrl+S", "save"),
        ("Ctrl+Q", "quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!(" {key:<14}"), Style::default().fg(theme.accent)),
                Span::styled(*what, Style::default().fg(theme.text)),
            ])
        })
        .collect();

    let area = centered(frame.area(), 56, u16::try_from(keys.len()).unwrap_or(0) + 2);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary))
        .title(" keys ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, ManualClock};
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_draw_renders_prompt_and_sections() {
        let app = App::new(Config::default(), None, ManualClock::new(0));
        let mut view = ViewState::default();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| draw(frame, &app, &mut view)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("DEFINE"));
        assert!(text.contains("main"));
    }

    #[test]
    fn test_centered_fits_small_areas() {
        let area = centered(Rect::new(0, 0, 20, 5), 56, 16);
        assert_eq!(area.width, 20);
        assert_eq!(area.height, 5);
    }
}
