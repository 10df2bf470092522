// Channel protocol between the event loop and the UI.
//
// The UI sends `UserCommand`s; the event loop owns all form, picker and grid
// state and answers with `UiUpdate::Snapshot`, a render-ready copy of what
// the UI needs. Nothing here borrows from the loop's state.

use coverscout_core::grid::price::PriceSummary;
use coverscout_core::grid::rows::RowPath;
use coverscout_core::grid::{Band, CoverageClass};
use coverscout_core::model::{BillingInterval, CoverageFormat, FormatSet, OptionId};
use coverscout_core::picker::PickerState;

// ---------------------------------------------------------------------------
// Commands (UI -> app)
// ---------------------------------------------------------------------------

/// Which of the three pickers a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickerKind {
    Games,
    Teams,
    Tournaments,
}

impl PickerKind {
    pub const ALL: [PickerKind; 3] = [PickerKind::Games, PickerKind::Teams, PickerKind::Tournaments];

    pub fn title(self) -> &'static str {
        match self {
            PickerKind::Games => "Games",
            PickerKind::Teams => "Teams",
            PickerKind::Tournaments => "Tournaments",
        }
    }
}

/// Input directed at one picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    Open,
    Close,
    Type(char),
    Backspace,
    HighlightNext,
    HighlightPrev,
    SelectHighlighted,
    Select(OptionId),
    Remove(OptionId),
    /// Inner height of the list area, in the same units as row heights.
    SetViewport(u32),
    /// Rendered heights of rows at the given sequence positions, measured
    /// under window generation `generation`.
    Measured {
        generation: u64,
        heights: Vec<(usize, u32)>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Picker {
        kind: PickerKind,
        action: PickerAction,
    },
    ToggleAllGames,
    ToggleBilling,
    ToggleFormat(CoverageFormat),
    Submit,
    NewComparison,
    ToggleRow(RowPath),
    SetRowExpanded { path: RowPath, expanded: bool },
    Quit,
}

// ---------------------------------------------------------------------------
// Updates (app -> UI)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Snapshot(Box<AppSnapshot>),
}

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Form,
    Results,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppSnapshot {
    pub view: View,
    pub games: PickerSnapshot,
    pub teams: PickerSnapshot,
    pub tournaments: PickerSnapshot,
    pub all_games: bool,
    pub billing: BillingInterval,
    pub formats: FormatSet,
    /// User-visible error text, if any.
    pub error: Option<String>,
    /// A solver request is in flight.
    pub submitting: bool,
    pub grid: Option<GridSnapshot>,
}

impl AppSnapshot {
    pub fn picker(&self, kind: PickerKind) -> &PickerSnapshot {
        match kind {
            PickerKind::Games => &self.games,
            PickerKind::Teams => &self.teams,
            PickerKind::Tournaments => &self.tournaments,
        }
    }
}

/// A chosen option, as shown in the chip line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub id: OptionId,
    pub label: String,
}

/// One row of a picker's rendered window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRow {
    Header {
        position: usize,
        group: String,
        height: u32,
        measured: bool,
    },
    Item {
        position: usize,
        id: OptionId,
        label: String,
        /// Secondary text (kickoff time for games).
        detail: Option<String>,
        highlighted: bool,
        height: u32,
        measured: bool,
    },
}

impl ListRow {
    pub fn position(&self) -> usize {
        match self {
            ListRow::Header { position, .. } | ListRow::Item { position, .. } => *position,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            ListRow::Header { height, .. } | ListRow::Item { height, .. } => *height,
        }
    }

    pub fn is_measured(&self) -> bool {
        match self {
            ListRow::Header { measured, .. } | ListRow::Item { measured, .. } => *measured,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerSnapshot {
    pub kind: PickerKind,
    pub state: PickerState,
    pub disabled: bool,
    pub query: String,
    pub chosen: Vec<Chip>,
    pub candidate_count: usize,
    pub rows: Vec<ListRow>,
    pub generation: u64,
    pub scroll_offset: u64,
    /// Offset of the first row in `rows`.
    pub rows_offset: u64,
    pub total_height: u64,
    pub listbox_height: u64,
}

impl Default for PickerSnapshot {
    fn default() -> Self {
        PickerSnapshot {
            kind: PickerKind::Games,
            state: PickerState::Closed,
            disabled: false,
            query: String::new(),
            chosen: Vec::new(),
            candidate_count: 0,
            rows: Vec::new(),
            generation: 0,
            scroll_offset: 0,
            rows_offset: 0,
            total_height: 0,
            listbox_height: 0,
        }
    }
}

impl PickerSnapshot {
    pub fn is_open(&self) -> bool {
        self.state != PickerState::Closed
    }
}

/// Display data for one package column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub name: String,
    pub yearly_price: String,
    pub monthly_price: Option<String>,
    pub is_highlighted: bool,
    pub band: Band,
}

/// One visible grid row with its classified cells, one `[live, highlights]`
/// pair per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRowView {
    pub key: String,
    pub path: RowPath,
    pub depth: usize,
    pub expandable: bool,
    pub expanded: bool,
    pub cells: Vec<[CoverageClass; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSnapshot {
    pub key_header: String,
    pub columns: Vec<ColumnView>,
    pub rows: Vec<GridRowView>,
    pub summary: PriceSummary,
    /// Number of games no package covers, when the solver reported them.
    pub games_not_covered: Option<usize>,
}
