//! Input handling for the terminal interface.
//!
//! Keys edit the active thread's input surface; Enter submits it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use super::ViewState;
use crate::app::App;
use crate::conversation::{Answer, InputSurface, SubmitError, OTHER};
use crate::core::Clock;

const PAGE: i32 = 10;

/// Handle a key press.
pub fn handle_events<C: Clock>(key: KeyEvent, app: &mut App<C>, view: &mut ViewState) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if view.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
            view.show_help = false;
        }
        return;
    }

    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => {
            app.quit();
            return;
        }
        KeyCode::F(1) => {
            view.show_help = true;
            return;
        }
        KeyCode::Char('t') if ctrl => {
            let id = app.new_thread();
            view.cursor = 0;
            view.set_status(format!("Opened side thread {id}"));
            return;
        }
        KeyCode::Left | KeyCode::Right if alt => {
            cycle_thread(app, view, if key.code == KeyCode::Left { -1 } else { 1 });
            return;
        }
        KeyCode::Char('o') if ctrl => {
            match app.continue_phase() {
                Ok(advance) => view.set_status(format!("{advance:?}")),
                Err(e) => view.set_status(e.to_string()),
            }
            return;
        }
        KeyCode::Char('p') if ctrl => {
            if let Err(e) = app.preview_optimize() {
                view.set_status(e.to_string());
            }
            return;
        }
        KeyCode::Char('s') if ctrl => {
            match app.save() {
                Ok(Some(path)) => view.set_status(format!("Saved to {}", path.display())),
                Ok(None) => view.set_status("Nothing to save to: no data directory"),
                Err(e) => view.set_status(format!("Save failed: {e}")),
            }
            return;
        }
        KeyCode::PageUp => {
            manual_scroll(app, view, -PAGE);
            return;
        }
        KeyCode::PageDown => {
            manual_scroll(app, view, PAGE);
            return;
        }
        _ => {}
    }

    if app.conversation().active().is_locked() {
        return;
    }
    handle_surface(key, app, view);
}

/// Handle mouse wheel scrolling over the document.
pub fn handle_mouse<C: Clock>(mouse: MouseEvent, app: &mut App<C>, view: &mut ViewState) {
    match mouse.kind {
        MouseEventKind::ScrollUp => manual_scroll(app, view, -1),
        MouseEventKind::ScrollDown => manual_scroll(app, view, 1),
        MouseEventKind::Drag(_) => app.note_manual_scroll(),
        _ => {}
    }
}

fn manual_scroll<C: Clock>(app: &mut App<C>, view: &mut ViewState, delta: i32) {
    app.note_manual_scroll();
    view.scroll_to = None;
    view.scroll_doc(delta);
}

fn cycle_thread<C: Clock>(app: &mut App<C>, view: &mut ViewState, delta: isize) {
    let ids: Vec<_> = app.conversation().threads().iter().map(|t| t.id()).collect();
    let current = app.conversation().active_id();
    let Some(pos) = ids.iter().position(|id| *id == current) else { return };
    let next = ids[(pos as isize + delta).rem_euclid(ids.len() as isize) as usize];
    if let Err(e) = app.switch_thread(next) {
        view.set_status(e.to_string());
    }
    view.cursor = 0;
}

fn report(view: &mut ViewState, result: Result<(), SubmitError>) {
    match result {
        Ok(()) => view.status = None,
        Err(e) => view.set_status(e.to_string()),
    }
}

fn handle_surface<C: Clock>(key: KeyEvent, app: &mut App<C>, view: &mut ViewState) {
    let thread = app.conversation().active_id();
    let surface = app.conversation_mut().active_mut().surface_mut();

    match surface {
        InputSurface::None => {}

        InputSurface::SingleSelect(select) => {
            let len = select.options.len() + select.resumable.len();
            match key.code {
                KeyCode::Up | KeyCode::Left => view.move_cursor(-1, len),
                KeyCode::Down | KeyCode::Right | KeyCode::Tab => view.move_cursor(1, len),
                KeyCode::Enter => {
                    let answer = match select.options.get(view.cursor) {
                        Some(option) => Answer::Choice(option.value.clone()),
                        None => match select.resumable.get(view.cursor - select.options.len()) {
                            Some(project) => Answer::Resume(project.id.clone()),
                            None => return,
                        },
                    };
                    report(view, app.submit(thread, answer));
                }
                _ => {}
            }
        }

        InputSurface::OptionButtons { options } => {
            let len = options.len();
            match key.code {
                KeyCode::Up | KeyCode::Left => view.move_cursor(-1, len),
                KeyCode::Down | KeyCode::Right | KeyCode::Tab => view.move_cursor(1, len),
                KeyCode::Enter => {
                    if let Some(option) = options.get(view.cursor) {
                        let answer = Answer::Choice(option.value.clone());
                        report(view, app.submit(thread, answer));
                    }
                }
                _ => {}
            }
        }

        InputSurface::MultiSelect(select) if !select.is_other_active() => {
            let len = select.options.len();
            match key.code {
                KeyCode::Up => view.move_cursor(-1, len),
                KeyCode::Down | KeyCode::Tab => view.move_cursor(1, len),
                KeyCode::Char(' ') => {
                    let Some(value) = select.options.get(view.cursor).map(|o| o.value.clone())
                    else {
                        return;
                    };
                    if let Err(e) = select.toggle(&value) {
                        view.set_status(e.to_string());
                    } else if value == OTHER {
                        view.set_status("Type other entries; Esc returns to the options");
                    }
                }
                KeyCode::Enter => report(view, app.submit_current()),
                _ => {}
            }
        }

        InputSurface::MultiSelect(_) | InputSurface::List(_) => {
            if key.code == KeyCode::Esc {
                if let InputSurface::MultiSelect(select) = surface {
                    select.leave_other();
                }
                return;
            }
            if key.code == KeyCode::Enter {
                report(view, app.submit_current());
                return;
            }
            let Some(list) = surface.list_mut() else { return };
            let focus = list.focus();
            match key.code {
                KeyCode::Up => list.set_focus(focus.saturating_sub(1)),
                KeyCode::Down => list.set_focus(focus + 1),
                KeyCode::Tab => {
                    list.add();
                }
                KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    list.add();
                }
                KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    if let Err(e) = list.remove(focus) {
                        view.set_status(e.to_string());
                    }
                }
                KeyCode::Backspace => {
                    let mut text = list.entries()[focus].clone();
                    if text.pop().is_none() {
                        if list.remove(focus).is_ok() {
                            list.set_focus(focus.saturating_sub(1));
                        }
                    } else {
                        let _ = list.set(focus, &text);
                    }
                }
                KeyCode::Char(c) => {
                    let mut text = list.entries()[focus].clone();
                    text.push(c);
                    let _ = list.set(focus, &text);
                }
                _ => {}
            }
        }

        InputSurface::FreeText(text) => match key.code {
            KeyCode::Enter
                if key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
            {
                text.line_break();
            }
            KeyCode::Enter => report(view, app.submit_current()),
            KeyCode::Backspace => text.backspace(),
            KeyCode::Char(c) => text.insert(c.encode_utf8(&mut [0; 4])),
            _ => {}
        },
    }
}
