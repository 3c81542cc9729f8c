//! TUI application runner.
//!
//! Handles the main event loop and terminal setup/teardown.

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use super::{draw, handle_events, handle_mouse, Theme, ViewState};
use crate::app::App;
use crate::core::Clock;

/// Run the interactive session until the user quits.
///
/// The session is torn down and saved on the way out.
pub fn run_tui<C: Clock>(mut app: App<C>) -> Result<()> {
    let theme = Theme::by_name(&app.config.ui.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %app.config.ui.theme, "Unknown theme, using default");
        Theme::default()
    });
    let mut view = ViewState::new(theme);

    setup_terminal()?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_main_loop(&mut terminal, &mut app, &mut view);

    restore_terminal()?;

    app.teardown();
    match app.save() {
        Ok(Some(path)) => println!("Saved to {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("Failed to save: {e}"),
    }

    result
}

/// Setup the terminal for TUI mode.
fn setup_terminal() -> Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    Ok(())
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(())
}

/// Main event loop.
///
/// Polls for input no longer than the next timer deadline so reveals and
/// highlight expiries fire on time.
fn run_main_loop<C: Clock>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<C>,
    view: &mut ViewState,
) -> Result<()> {
    let tick_rate = app.config.ui.tick_rate_ms.max(1);

    loop {
        app.tick();

        if let Some(intent) = app.take_scroll_intent() {
            if intent.allowed {
                view.scroll_to = Some(intent.anchor.id);
            }
        }
        if app.conversation_mut().active_mut().take_focus_request() {
            view.cursor = 0;
        }

        terminal.draw(|frame| draw(frame, app, view))?;

        let now = app.now();
        let wait = app
            .next_deadline()
            .map_or(tick_rate, |at| at.saturating_sub(now).clamp(1, tick_rate));

        if event::poll(Duration::from_millis(wait))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_events(key, app, view),
                Event::Mouse(mouse) => handle_mouse(mouse, app, view),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
