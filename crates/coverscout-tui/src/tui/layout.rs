// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones shared by both views:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +----------------+----------------+----------------+
// | Games          | Teams          | Tournaments    |
// |   (form view: three picker columns;             |
// |    results view: the comparison grid)           |
// +----------------+----------------+----------------+
// | Controls (3 rows: toggles / price summary)       |
// +--------------------------------------------------+
// | Message (1 row)                                   |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: view name, selection counts, request indicator.
    pub status_bar: Rect,
    /// The whole middle section; the results grid renders here.
    pub main: Rect,
    /// `main` split into one column per picker (games, teams, tournaments).
    pub pickers: [Rect; 3],
    /// Toggles in the form view, price summary in the results view.
    pub controls: Rect,
    /// Error or progress text.
    pub message: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | main(fill) | controls(3) | message(1) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(6),    // pickers or grid
            Constraint::Length(3), // controls
            Constraint::Length(1), // message
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let main = vertical[1];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(main);

    AppLayout {
        status_bar: vertical[0],
        main,
        pickers: [columns[0], columns[1], columns[2]],
        controls: vertical[2],
        message: vertical[3],
        help_bar: vertical[4],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        let rects = [
            ("status_bar", layout.status_bar),
            ("main", layout.main),
            ("games", layout.pickers[0]),
            ("teams", layout.pickers[1]),
            ("tournaments", layout.pickers[2]),
            ("controls", layout.controls),
            ("message", layout.message),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in &rects {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{} has zero area: {:?}",
                name,
                rect
            );
        }
    }

    #[test]
    fn layout_fixed_rows() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.controls.height, 3);
        assert_eq!(layout.message.height, 1);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn layout_pickers_tile_main() {
        let layout = build_layout(test_area());
        let [games, teams, tournaments] = layout.pickers;
        assert_eq!(games.x, layout.main.x);
        assert_eq!(games.x + games.width, teams.x);
        assert_eq!(teams.x + teams.width, tournaments.x);
        assert_eq!(
            tournaments.x + tournaments.width,
            layout.main.x + layout.main.width
        );
        for picker in layout.pickers {
            assert_eq!(picker.height, layout.main.height);
        }
    }

    #[test]
    fn layout_small_terminal_still_valid() {
        let layout = build_layout(Rect::new(0, 0, 30, 12));
        assert!(layout.main.height >= 6);
        assert!(layout.pickers.iter().all(|r| r.width > 0));
    }
}
