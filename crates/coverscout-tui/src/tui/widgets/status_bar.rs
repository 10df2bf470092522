// Status bar, message line and help bar.

use coverscout_app::protocol::{AppSnapshot, View};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{Focus, ViewState};

/// Render the status bar: app name, current view, selection counts.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let snapshot = &state.snapshot;
    let mut spans = vec![
        Span::styled(
            " coverscout ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", view_label(snapshot.view)),
            Style::default().fg(Color::White),
        ),
        Span::styled("| ", Style::default().fg(Color::Gray)),
        Span::raw(selection_summary(snapshot)),
    ];
    if snapshot.submitting {
        spans.push(Span::styled(
            "  ● searching",
            Style::default().fg(Color::Yellow),
        ));
    }
    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Render the error line, or progress text while a request is in flight.
pub fn render_message(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match (&state.snapshot.error, state.snapshot.submitting) {
        (Some(error), _) => Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(Color::Red),
        )),
        (None, true) => Line::from(Span::styled(
            " Asking the coverage service...",
            Style::default().fg(Color::Yellow),
        )),
        (None, false) => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_help(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn view_label(view: View) -> &'static str {
    match view {
        View::Form => "New comparison",
        View::Results => "Results",
    }
}

/// "Games 2 · Teams 1 · Tournaments 0", or "All games" when the pickers are
/// bypassed.
pub fn selection_summary(snapshot: &AppSnapshot) -> String {
    if snapshot.all_games {
        return "All games".to_string();
    }
    format!(
        "Games {} · Teams {} · Tournaments {}",
        snapshot.games.chosen.len(),
        snapshot.teams.chosen.len(),
        snapshot.tournaments.chosen.len()
    )
}

/// Key hints for the current view and focus.
pub fn help_text(state: &ViewState) -> &'static str {
    match (state.snapshot.view, state.focus) {
        (View::Results, _) => {
            " ↑↓:Move | Enter:Expand/Collapse | ←→:Collapse/Expand | m:Billing | n:New comparison | q:Quit"
        }
        (View::Form, Focus::Picker(_)) => {
            " Tab:Next | Type:Search | ↑↓:Highlight | Enter:Select | ←→:Chips | Del:Remove | Esc:Close | Ctrl+S:Compare"
        }
        (View::Form, Focus::Controls) => {
            " Tab:Next | a:All games | l:Live | h:Highlights | m:Billing | s:Compare | q:Quit"
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use coverscout_app::protocol::Chip;

    #[test]
    fn selection_summary_counts_chips() {
        let mut snapshot = AppSnapshot::default();
        snapshot.teams.chosen = vec![Chip {
            id: "Arsenal".into(),
            label: "Arsenal".into(),
        }];
        assert_eq!(
            selection_summary(&snapshot),
            "Games 0 · Teams 1 · Tournaments 0"
        );
        snapshot.all_games = true;
        assert_eq!(selection_summary(&snapshot), "All games");
    }

    #[test]
    fn help_text_follows_focus_and_view() {
        let mut state = ViewState::default();
        assert!(help_text(&state).contains("Type:Search"));
        state.focus = Focus::Controls;
        assert!(help_text(&state).contains("a:All games"));
        state.snapshot.view = View::Results;
        assert!(help_text(&state).contains("n:New comparison"));
    }

    #[test]
    fn view_labels() {
        assert_eq!(view_label(View::Form), "New comparison");
        assert_eq!(view_label(View::Results), "Results");
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.snapshot.error = Some("Could not reach the coverage service: refused".into());
        terminal
            .draw(|frame| {
                let area = frame.area();
                let rows = [
                    Rect { height: 1, ..area },
                    Rect { y: 1, height: 1, ..area },
                    Rect { y: 2, height: 1, ..area },
                ];
                render(frame, rows[0], &state);
                render_message(frame, rows[1], &state);
                render_help(frame, rows[2], &state);
            })
            .unwrap();
    }
}
