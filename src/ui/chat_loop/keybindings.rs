//! Key handling for the chat screen.
//!
//! Handlers only mutate [`ChatApp`]; anything with side effects outside the
//! app (dispatching a request, writing the clipboard, exiting) is returned
//! as a [`KeyResult`] for the event loop to carry out.

use std::time::Instant;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{CursorMove, Input as TAInput};

use crate::core::session::PendingRequest;
use crate::ui::state::{max_scroll, ChatApp};
use crate::utils::input::sanitize_text_input;

/// Terminal geometry needed for scrolling decisions.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext {
    pub transcript_width: u16,
    pub viewport_height: u16,
}

#[derive(Debug)]
pub enum KeyResult {
    Handled,
    Ignored,
    Submit(PendingRequest),
    Copy,
    Exit,
}

pub fn handle_key(app: &mut ChatApp, key: KeyEvent, ctx: KeyContext) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => KeyResult::Exit,
        KeyCode::Char('n') if ctrl => {
            app.new_chat();
            KeyResult::Handled
        }
        KeyCode::Char('y') if ctrl => KeyResult::Copy,
        KeyCode::Char('u') if ctrl => {
            app.clear_input();
            KeyResult::Handled
        }
        KeyCode::Enter if alt || key.modifiers.contains(KeyModifiers::SHIFT) => {
            app.apply_textarea_edit(|ta| {
                ta.insert_newline();
            });
            KeyResult::Handled
        }
        KeyCode::Enter => match app.submit(Instant::now()) {
            Some(pending) => KeyResult::Submit(pending),
            None => KeyResult::Handled,
        },
        KeyCode::Tab | KeyCode::BackTab => {
            app.cycle_selection(key.code == KeyCode::Tab);
            let layout = app.layout(ctx.transcript_width, Instant::now());
            app.reveal_selected(&layout, ctx.viewport_height);
            KeyResult::Handled
        }
        KeyCode::Esc => {
            if app.selected.is_some() {
                app.clear_selection();
                KeyResult::Handled
            } else {
                KeyResult::Ignored
            }
        }
        KeyCode::Up | KeyCode::Down if !ctrl && app.textarea().lines().len() > 1 => {
            let movement = if key.code == KeyCode::Up {
                CursorMove::Up
            } else {
                CursorMove::Down
            };
            app.apply_textarea_edit(|ta| {
                ta.move_cursor(movement);
            });
            KeyResult::Handled
        }
        KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown => {
            handle_scroll_keys(app, key.code, ctx);
            KeyResult::Handled
        }
        KeyCode::Home if ctrl => {
            app.scroll_to_top();
            KeyResult::Handled
        }
        KeyCode::End if ctrl => {
            app.scroll_to_bottom();
            KeyResult::Handled
        }
        KeyCode::Char(_)
        | KeyCode::Backspace
        | KeyCode::Delete
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End => {
            // Cursor movement, deletion and typing belong to the compose box.
            app.apply_textarea_edit(|ta| {
                ta.input(TAInput::from(key));
            });
            KeyResult::Handled
        }
        _ => KeyResult::Ignored,
    }
}

fn handle_scroll_keys(app: &mut ChatApp, code: KeyCode, ctx: KeyContext) {
    let total = app.layout(ctx.transcript_width, Instant::now()).lines.len();
    let max_offset = max_scroll(total, ctx.viewport_height);
    let page = ctx.viewport_height.max(1);
    match code {
        KeyCode::Up => app.scroll_up(1, max_offset),
        KeyCode::Down => app.scroll_down(1, max_offset),
        KeyCode::PageUp => app.scroll_up(page, max_offset),
        KeyCode::PageDown => app.scroll_down(page, max_offset),
        _ => {}
    }
}

/// Bracketed paste is inserted at the cursor, sanitized.
pub fn handle_paste(app: &mut ChatApp, text: &str) {
    let text = sanitize_text_input(text);
    app.apply_textarea_edit(|ta| {
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                ta.insert_newline();
            }
            ta.insert_str(line);
        }
    });
}
