// Picker widget: chips for chosen options, the query line, and the
// virtualized candidate list.
//
// Only the rows in the snapshot's window are drawn. Each is positioned at
// its prefix offset minus the scroll offset, hard-wrapped to the list width,
// and its real line count is reported back so the event loop can correct
// the estimated height.

use coverscout_app::protocol::{ListRow, PickerKind, PickerSnapshot};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

/// What one picker learned while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerFeedback {
    pub kind: PickerKind,
    pub generation: u64,
    /// Height available to the list, when the list is showing.
    pub viewport: Option<u32>,
    /// `(position, lines)` for rows whose rendered height is new or differs
    /// from the snapshot's.
    pub heights: Vec<(usize, u32)>,
}

/// Render one picker into `area`. `chip_cursor` marks the chip the user is
/// about to remove.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    picker: &PickerSnapshot,
    focused: bool,
    chip_cursor: Option<usize>,
) -> PickerFeedback {
    let mut feedback = PickerFeedback {
        kind: picker.kind,
        generation: picker.generation,
        viewport: None,
        heights: Vec::new(),
    };

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else if picker.disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ({}) ", picker.kind.title(), picker.chosen.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return feedback;
    }

    let chips = chip_line(picker, chip_cursor);
    let chips_height = wrap_to_width(&line_text(&chips), inner.width).len().clamp(1, 3) as u16;
    let [chips_area, query_area, list_area] = Layout::vertical([
        Constraint::Length(chips_height),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    frame.render_widget(Paragraph::new(chips).wrap(Wrap { trim: false }), chips_area);
    frame.render_widget(Paragraph::new(query_line(picker, focused)), query_area);

    if !picker.is_open() || list_area.height == 0 {
        return feedback;
    }

    let available = u32::from(list_area.height);
    let viewport = if picker.listbox_height > 0 {
        available.min(u32::try_from(picker.listbox_height).unwrap_or(u32::MAX))
    } else {
        available
    };
    feedback.viewport = Some(viewport);
    let list_area = Rect {
        height: viewport as u16,
        ..list_area
    };

    if picker.candidate_count == 0 {
        let empty = Paragraph::new(Span::styled(
            "No matches",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(empty, list_area);
        return feedback;
    }

    let bottom_edge = i64::from(list_area.height);
    let mut top = picker.rows_offset as i64 - picker.scroll_offset as i64;
    for row in &picker.rows {
        let lines = wrap_to_width(&row_text(row), list_area.width);
        let height = lines.len() as u32;
        if !row.is_measured() || height != row.height() {
            feedback.heights.push((row.position(), height));
        }

        let bottom = top + i64::from(height);
        if bottom > 0 && top < bottom_edge {
            let visible_top = top.max(0);
            let rect = Rect {
                x: list_area.x,
                y: list_area.y + visible_top as u16,
                width: list_area.width,
                height: (bottom.min(bottom_edge) - visible_top) as u16,
            };
            let skip = (visible_top - top) as u16;
            let body: Vec<Line> = lines.into_iter().map(Line::from).collect();
            frame.render_widget(
                Paragraph::new(body).style(row_style(row)).scroll((skip, 0)),
                rect,
            );
        }
        top = bottom;
    }

    feedback
}

fn chip_line(picker: &PickerSnapshot, cursor: Option<usize>) -> Line<'static> {
    if picker.chosen.is_empty() {
        let text = if picker.disabled {
            "all games"
        } else {
            "none selected"
        };
        return Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)));
    }
    let mut spans = Vec::new();
    for (i, chip) in picker.chosen.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        let style = if cursor == Some(i) {
            Style::default().fg(Color::White).bg(Color::Red)
        } else {
            Style::default().fg(Color::Black).bg(Color::Gray)
        };
        spans.push(Span::styled(format!("[{} ×]", chip.label), style));
    }
    Line::from(spans)
}

fn query_line(picker: &PickerSnapshot, focused: bool) -> Line<'static> {
    if picker.disabled {
        return Line::from(Span::styled(
            "(disabled)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Cyan)),
        Span::raw(format!("{}{}", picker.query, cursor)),
    ])
}

/// Plain text of a list row.
pub fn row_text(row: &ListRow) -> String {
    match row {
        ListRow::Header { group, .. } => format!("── {group}"),
        ListRow::Item { label, detail, .. } => match detail {
            Some(detail) => format!("{label}  {detail}"),
            None => label.clone(),
        },
    }
}

fn row_style(row: &ListRow) -> Style {
    match row {
        ListRow::Header { .. } => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        ListRow::Item {
            highlighted: true, ..
        } => Style::default().add_modifier(Modifier::REVERSED),
        ListRow::Item { .. } => Style::default(),
    }
}

fn line_text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

/// Hard-wrap `text` into lines of at most `width` terminal columns. A glyph
/// wider than `width` gets a line of its own. Always returns at least one
/// line.
pub fn wrap_to_width(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0usize;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
