// Comparison grid widget: one row per competition (expandable into its
// games), two leaf columns per package, and the price summary beneath.

use coverscout_app::protocol::{ColumnView, GridRowView, GridSnapshot};
use coverscout_core::grid::{Band, CoverageClass};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::tui::ViewState;

const LIVE_HEADER: &str = "Live Coverage";
const HIGHLIGHTS_HEADER: &str = "Highlights";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title(" Comparison ");
    let Some(grid) = state.snapshot.grid.as_ref() else {
        frame.render_widget(Paragraph::new("No result yet.").block(block), area);
        return;
    };

    let mut header_cells = vec![Cell::from(Span::styled(
        grid.key_header.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    let mut widths = vec![Constraint::Min(24)];
    for column in &grid.columns {
        let [live, highlights] = column_header(column);
        header_cells.push(live);
        header_cells.push(highlights);
        widths.push(Constraint::Length(leaf_width(column)));
        widths.push(Constraint::Length(HIGHLIGHTS_HEADER.len() as u16));
    }
    let header = Row::new(header_cells).height(4);

    let rows: Vec<Row> = grid
        .rows
        .iter()
        .map(|row| grid_row(row, &grid.columns))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut table_state = TableState::default().with_selected(Some(state.grid_cursor));
    frame.render_stateful_widget(table, area, &mut table_state);
}

/// Price summary and not-covered note under the grid.
pub fn render_summary(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title(" Price ");
    let line = match state.snapshot.grid.as_ref() {
        Some(grid) => summary_line(grid),
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

pub fn summary_line(grid: &GridSnapshot) -> Line<'static> {
    let mut spans = vec![
        Span::raw("Total: "),
        Span::styled(
            grid.summary.display(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if !grid.summary.unpriced.is_empty() {
        spans.push(Span::styled(
            format!(
                "  (not offered monthly: {})",
                grid.summary.unpriced.join(", ")
            ),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(n) = grid.games_not_covered.filter(|n| *n > 0) {
        spans.push(Span::styled(
            format!("  {n} games not covered"),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

/// Symbol and color for a coverage cell.
pub fn cell_symbol(class: CoverageClass) -> (&'static str, Color) {
    match class {
        CoverageClass::Full => ("●", Color::Green),
        CoverageClass::Partial => ("◐", Color::Yellow),
        CoverageClass::None => ("·", Color::DarkGray),
    }
}

fn band_style(band: Band) -> Style {
    match band {
        Band::Even => Style::default(),
        Band::Odd => Style::default().bg(Color::Indexed(236)),
    }
}

fn leaf_width(column: &ColumnView) -> u16 {
    let name = column.name.width() + 2;
    let monthly = column.monthly_price.as_ref().map_or(0, |m| m.width());
    name.max(column.yearly_price.width())
        .max(monthly)
        .max(LIVE_HEADER.len()) as u16
}

/// The two stacked header cells of a package column: name, prices, leaf label.
fn column_header(column: &ColumnView) -> [Cell<'static>; 2] {
    let name_style = if column.is_highlighted {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let name = if column.is_highlighted {
        format!("{} ★", column.name)
    } else {
        column.name.clone()
    };
    let band = band_style(column.band);
    let live = Text::from(vec![
        Line::from(Span::styled(name, name_style)),
        Line::from(column.yearly_price.clone()),
        Line::from(column.monthly_price.clone().unwrap_or_default()),
        Line::from(Span::styled(LIVE_HEADER, Style::default().fg(Color::Gray))),
    ]);
    let highlights = Text::from(vec![
        Line::from(""),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(HIGHLIGHTS_HEADER, Style::default().fg(Color::Gray))),
    ]);
    [Cell::from(live).style(band), Cell::from(highlights).style(band)]
}

fn grid_row(row: &GridRowView, columns: &[ColumnView]) -> Row<'static> {
    let marker = match (row.expandable, row.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "  ",
    };
    let key = format!("{}{}{}", "  ".repeat(row.depth), marker, row.key);
    let mut cells = vec![Cell::from(key)];
    for (pair, column) in row.cells.iter().zip(columns) {
        for class in pair {
            let (symbol, color) = cell_symbol(*class);
            cells.push(Cell::from(symbol).style(band_style(column.band).fg(color)));
        }
    }
    Row::new(cells)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use coverscout_app::protocol::{AppSnapshot, View};
    use coverscout_core::grid::price::PriceSummary;
    use coverscout_core::grid::rows::RowPath;
    use coverscout_core::model::BillingInterval;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn sample_grid() -> GridSnapshot {
        GridSnapshot {
            key_header: "Competition".into(),
            columns: vec![
                ColumnView {
                    name: "A".into(),
                    yearly_price: "$10.00/mo yearly".into(),
                    monthly_price: None,
                    is_highlighted: false,
                    band: Band::Even,
                },
                ColumnView {
                    name: "B".into(),
                    yearly_price: "$9.00/mo yearly".into(),
                    monthly_price: Some("$5.00/mo monthly".into()),
                    is_highlighted: true,
                    band: Band::Odd,
                },
            ],
            rows: vec![GridRowView {
                key: "EPL".into(),
                path: RowPath::root(0),
                depth: 0,
                expandable: true,
                expanded: false,
                cells: vec![
                    [CoverageClass::Full, CoverageClass::None],
                    [CoverageClass::Partial, CoverageClass::None],
                ],
            }],
            summary: PriceSummary {
                billing: BillingInterval::Yearly,
                total_cents: 900,
                priced: 1,
                unpriced: Vec::new(),
            },
            games_not_covered: Some(0),
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn cell_symbols_are_distinct() {
        let symbols: Vec<&str> = [
            CoverageClass::Full,
            CoverageClass::Partial,
            CoverageClass::None,
        ]
        .into_iter()
        .map(|c| cell_symbol(c).0)
        .collect();
        assert_eq!(symbols, vec!["●", "◐", "·"]);
    }

    #[test]
    fn leaf_width_fits_the_widest_header_line() {
        let grid = sample_grid();
        assert_eq!(leaf_width(&grid.columns[0]), 16);
        assert_eq!(leaf_width(&grid.columns[1]), 16);
    }

    #[test]
    fn summary_line_shows_total() {
        let grid = sample_grid();
        assert_eq!(
            line_text(&summary_line(&grid)),
            "Total: $9.00/mo (yearly subscription)"
        );
    }

    #[test]
    fn summary_line_notes_unpriced_and_uncovered() {
        let mut grid = sample_grid();
        grid.summary.billing = BillingInterval::Monthly;
        grid.summary.unpriced = vec!["A".into()];
        grid.games_not_covered = Some(2);
        let text = line_text(&summary_line(&grid));
        assert!(text.contains("not offered monthly: A"));
        assert!(text.contains("2 games not covered"));
    }

    #[test]
    fn render_does_not_panic_without_grid() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_grid() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut state = ViewState::default();
        state.apply_snapshot(AppSnapshot {
            view: View::Results,
            grid: Some(sample_grid()),
            ..AppSnapshot::default()
        });
        terminal
            .draw(|frame| {
                render(frame, frame.area(), &state);
            })
            .unwrap();
        terminal
            .draw(|frame| render_summary(frame, frame.area(), &state))
            .unwrap();
    }
}
