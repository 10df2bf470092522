// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into `UserCommand`s for the event loop,
// or into local `ViewState` changes (focus, grid cursor).
//
// Form view: Tab/Shift+Tab move focus between the three pickers and the
// options row. A focused picker takes printable characters as its query;
// with an empty query Left/Right walk the chips and Delete removes the one
// under the cursor. Letter shortcuts only apply on the options row. Ctrl+S
// compares from anywhere. Results view: arrows move and expand, `n` starts
// over.

use coverscout_app::protocol::{PickerAction, PickerKind, UserCommand, View};
use coverscout_core::model::CoverageFormat;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{Focus, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// event loop, `None` when it was handled locally or ignored.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c') => Some(UserCommand::Quit),
            KeyCode::Char('s') if view_state.snapshot.view == View::Form => {
                Some(UserCommand::Submit)
            }
            _ => None,
        };
    }

    match view_state.snapshot.view {
        View::Results => handle_results(key_event, view_state),
        View::Form => match key_event.code {
            KeyCode::Tab => move_focus(view_state, Focus::next),
            KeyCode::BackTab => move_focus(view_state, Focus::prev),
            _ => match view_state.focus {
                Focus::Picker(kind) => handle_picker(key_event, kind, view_state),
                Focus::Controls => handle_controls(key_event),
            },
        },
    }
}

/// Move focus, closing the picker being left if it is open.
fn move_focus(view_state: &mut ViewState, step: fn(Focus) -> Focus) -> Option<UserCommand> {
    let leaving = view_state.focus;
    view_state.focus = step(leaving);
    view_state.chip_cursor = None;
    match leaving {
        Focus::Picker(kind) if view_state.snapshot.picker(kind).is_open() => {
            Some(UserCommand::Picker {
                kind,
                action: PickerAction::Close,
            })
        }
        _ => None,
    }
}

fn handle_picker(
    key_event: KeyEvent,
    kind: PickerKind,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    let picker = view_state.snapshot.picker(kind);
    let open = picker.is_open();
    let chips = if picker.query.is_empty() {
        picker.chosen.len()
    } else {
        0
    };
    let under_cursor = view_state
        .chip_cursor
        .and_then(|i| picker.chosen.get(i))
        .map(|chip| chip.id.clone());

    if let (KeyCode::Delete | KeyCode::Backspace, Some(id)) = (key_event.code, under_cursor) {
        return Some(UserCommand::Picker {
            kind,
            action: PickerAction::Remove(id),
        });
    }

    let action = match key_event.code {
        KeyCode::Left if chips > 0 => {
            view_state.chip_cursor = Some(match view_state.chip_cursor {
                Some(i) => i.saturating_sub(1),
                None => chips - 1,
            });
            return None;
        }
        KeyCode::Right if view_state.chip_cursor.is_some() => {
            view_state.chip_cursor = view_state
                .chip_cursor
                .map(|i| i + 1)
                .filter(|&i| i < chips);
            return None;
        }
        KeyCode::Char(c) => {
            view_state.chip_cursor = None;
            PickerAction::Type(c)
        }
        KeyCode::Backspace => PickerAction::Backspace,
        KeyCode::Down if open => PickerAction::HighlightNext,
        KeyCode::Up if open => PickerAction::HighlightPrev,
        KeyCode::Enter if open => PickerAction::SelectHighlighted,
        KeyCode::Down | KeyCode::Enter => PickerAction::Open,
        KeyCode::Esc if open => PickerAction::Close,
        _ => return None,
    };
    Some(UserCommand::Picker { kind, action })
}

fn handle_controls(key_event: KeyEvent) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('a') => Some(UserCommand::ToggleAllGames),
        KeyCode::Char('l') => Some(UserCommand::ToggleFormat(CoverageFormat::Live)),
        KeyCode::Char('h') => Some(UserCommand::ToggleFormat(CoverageFormat::Highlights)),
        KeyCode::Char('m') => Some(UserCommand::ToggleBilling),
        KeyCode::Char('s') | KeyCode::Enter => Some(UserCommand::Submit),
        KeyCode::Char('q') => Some(UserCommand::Quit),
        _ => None,
    }
}

fn handle_results(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let rows = view_state
        .snapshot
        .grid
        .as_ref()
        .map_or(&[][..], |g| g.rows.as_slice());
    let current = rows.get(view_state.grid_cursor);

    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.grid_cursor = view_state.grid_cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_state.grid_cursor + 1 < rows.len() {
                view_state.grid_cursor += 1;
            }
            None
        }
        KeyCode::Enter | KeyCode::Char(' ') => current
            .filter(|r| r.expandable)
            .map(|r| UserCommand::ToggleRow(r.path.clone())),
        KeyCode::Right | KeyCode::Char('l') => current
            .filter(|r| r.expandable && !r.expanded)
            .map(|r| UserCommand::SetRowExpanded {
                path: r.path.clone(),
                expanded: true,
            }),
        KeyCode::Left | KeyCode::Char('h') => current
            .filter(|r| r.expanded)
            .map(|r| UserCommand::SetRowExpanded {
                path: r.path.clone(),
                expanded: false,
            }),
        KeyCode::Char('m') => Some(UserCommand::ToggleBilling),
        KeyCode::Char('n') => {
            view_state.focus = Focus::Picker(PickerKind::Games);
            Some(UserCommand::NewComparison)
        }
        KeyCode::Char('q') => Some(UserCommand::Quit),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
