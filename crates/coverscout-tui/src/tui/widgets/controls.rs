// Form controls: all-games switch, format checkboxes, billing interval and
// the submit button.

use coverscout_app::protocol::AppSnapshot;
use coverscout_core::model::BillingInterval;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::{Focus, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let border_style = if state.focus == Focus::Controls {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Options ");
    frame.render_widget(Paragraph::new(controls_line(&state.snapshot)).block(block), area);
}

pub fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn billing_label(billing: BillingInterval) -> &'static str {
    match billing {
        BillingInterval::Yearly => "yearly subscription",
        BillingInterval::Monthly => "monthly only",
    }
}

pub fn controls_line(snapshot: &AppSnapshot) -> Line<'static> {
    let key = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::raw(format!(" {} All games ", checkbox(snapshot.all_games))),
        Span::styled("(a)", key),
        Span::raw(format!("   {} Live ", checkbox(snapshot.formats.live))),
        Span::styled("(l)", key),
        Span::raw(format!(
            "  {} Highlights ",
            checkbox(snapshot.formats.highlights)
        )),
        Span::styled("(h)", key),
        Span::raw(format!("   Billing: {} ", billing_label(snapshot.billing))),
        Span::styled("(m)", key),
        Span::raw("   "),
    ];
    let submit = if snapshot.submitting {
        Span::styled(" Searching… ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Compare (s) ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    };
    spans.push(submit);
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use coverscout_core::model::FormatSet;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn checkbox_values() {
        assert_eq!(checkbox(true), "[x]");
        assert_eq!(checkbox(false), "[ ]");
    }

    #[test]
    fn controls_reflect_snapshot() {
        let snapshot = AppSnapshot {
            all_games: true,
            billing: BillingInterval::Monthly,
            formats: FormatSet {
                live: false,
                highlights: true,
            },
            ..AppSnapshot::default()
        };
        let line = text(&controls_line(&snapshot));
        assert!(line.contains("[x] All games"));
        assert!(line.contains("[ ] Live"));
        assert!(line.contains("[x] Highlights"));
        assert!(line.contains("Billing: monthly only"));
        assert!(line.contains("Compare (s)"));
    }

    #[test]
    fn submit_button_shows_progress() {
        let snapshot = AppSnapshot {
            submitting: true,
            ..AppSnapshot::default()
        };
        assert!(text(&controls_line(&snapshot)).contains("Searching"));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(100, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
