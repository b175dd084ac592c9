use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::tui::AppEvent;

/// Lines moved per PageUp/PageDown or wheel notch
const SCROLL_STEP: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.panel().is_open() {
        handle_open_panel(app, key);
    } else {
        handle_closed_panel(app, key);
    }
}

fn handle_closed_panel(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c') => app.panel().open(),
        _ => {}
    }
}

fn handle_open_panel(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.panel().close(),
        KeyCode::Enter if !key.modifiers.contains(KeyModifiers::SHIFT) => app.submit(),
        KeyCode::Backspace => app.panel().backspace(),
        KeyCode::Delete => app.panel().delete(),
        KeyCode::Left => app.panel().cursor_left(),
        KeyCode::Right => app.panel().cursor_right(),
        KeyCode::Home => app.panel().cursor_home(),
        KeyCode::End => app.panel().cursor_end(),
        KeyCode::PageUp => app.panel().scroll_up(SCROLL_STEP),
        KeyCode::PageDown => app.panel().scroll_down(SCROLL_STEP),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.panel().insert_char(c)
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;
    let hit = |area: Option<Rect>| area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if hit(app.toggle_area) {
                app.panel().toggle();
                return;
            }

            if !app.panel().is_open() {
                return;
            }

            if hit(app.close_area) {
                app.panel().close();
            } else if hit(app.send_area) {
                // A disabled button swallows the click
                if app.panel().is_send_enabled() {
                    app.submit();
                }
            } else if !hit(app.panel_area) {
                app.panel().close();
            }
        }
        MouseEventKind::ScrollUp if hit(app.transcript_area) => app.panel().scroll_up(SCROLL_STEP),
        MouseEventKind::ScrollDown if hit(app.transcript_area) => {
            app.panel().scroll_down(SCROLL_STEP)
        }
        _ => {}
    }
}
