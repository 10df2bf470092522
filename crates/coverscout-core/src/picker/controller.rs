// Per-picker state machine: open/closed state, query, highlighted
// candidate, committed selection, and the windowed candidate list.
//
//   CLOSED --open/type--> OPEN_EMPTY_QUERY <--clear query / type--> OPEN_FILTERED
//      ^                          |                                      |
//      +----------- close --------+--------------- close ---------------+
//
// Selecting or removing keeps the current open state. A disabled picker
// rejects every transition except `set_disabled(false)` and exposes no
// candidates. Every accepted transition returns a `SelectionNotice` carrying
// the chosen ids for the owning form.

use tracing::debug;

use crate::error::SelectionError;
use crate::model::{OptionId, PickerOption};

use super::filter::{ChosenSet, FilterEngine, MatchPolicy, Stringify};
use super::grouped::{Entry, GroupedSequence, RowHeights};
use super::window::WindowModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Closed,
    OpenEmptyQuery,
    OpenFiltered,
}

/// Construction-time settings for one picker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerConfig {
    pub heights: RowHeights,
    pub overscan: usize,
    pub policy: MatchPolicy,
    pub max_visible_rows: usize,
    pub list_padding: u32,
    pub disabled: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        PickerConfig {
            heights: RowHeights::default(),
            overscan: 5,
            policy: MatchPolicy::default(),
            max_visible_rows: 8,
            list_padding: 8,
            disabled: false,
        }
    }
}

/// Upward notification: the current chosen ids, in chosen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionNotice {
    pub chosen: Vec<OptionId>,
}

/// A row of the candidate list that falls inside the rendered window.
#[derive(Debug, Clone, PartialEq)]
pub enum VisibleRow<'a, T> {
    Header {
        position: usize,
        group: &'a str,
    },
    Item {
        position: usize,
        option: &'a PickerOption<T>,
        highlighted: bool,
    },
}

impl<T> VisibleRow<'_, T> {
    pub fn position(&self) -> usize {
        match self {
            VisibleRow::Header { position, .. } | VisibleRow::Item { position, .. } => *position,
        }
    }
}

pub struct MultiSelectController<T> {
    options: Vec<PickerOption<T>>,
    engine: FilterEngine<T>,
    chosen: ChosenSet,
    query: String,
    state: PickerState,
    disabled: bool,
    /// Indices into `options`, in display order before grouping.
    candidates: Vec<usize>,
    sequence: GroupedSequence,
    window: WindowModel,
    /// Index into `options` of the highlighted candidate.
    highlighted: Option<usize>,
    config: PickerConfig,
}

impl<T> MultiSelectController<T> {
    pub fn new(options: Vec<PickerOption<T>>, config: PickerConfig, stringify: Stringify<T>) -> Self {
        let mut engine = FilterEngine::new(config.policy, stringify);
        engine.index(&options);
        let mut controller = MultiSelectController {
            options,
            engine,
            chosen: ChosenSet::new(),
            query: String::new(),
            state: PickerState::Closed,
            disabled: config.disabled,
            candidates: Vec::new(),
            sequence: GroupedSequence::default(),
            window: WindowModel::new(config.overscan),
            highlighted: None,
            config,
        };
        controller.refresh();
        controller
    }

    // -- accessors ----------------------------------------------------------

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != PickerState::Closed
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn options(&self) -> &[PickerOption<T>] {
        &self.options
    }

    pub fn chosen_ids(&self) -> &[OptionId] {
        self.chosen.ids()
    }

    /// Chosen options in chosen order.
    pub fn chosen(&self) -> Vec<&PickerOption<T>> {
        self.chosen
            .ids()
            .iter()
            .filter_map(|id| self.options.iter().find(|o| &o.id == id))
            .collect()
    }

    /// Options still available to pick. Empty while disabled.
    pub fn candidates(&self) -> Vec<&PickerOption<T>> {
        if self.disabled {
            return Vec::new();
        }
        self.candidates.iter().map(|&i| &self.options[i]).collect()
    }

    pub fn sequence(&self) -> &GroupedSequence {
        &self.sequence
    }

    pub fn window(&self) -> &WindowModel {
        &self.window
    }

    pub fn highlighted(&self) -> Option<&PickerOption<T>> {
        self.highlighted.map(|i| &self.options[i])
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    // -- transitions --------------------------------------------------------

    /// Focus the picker.
    pub fn open(&mut self) -> Option<SelectionNotice> {
        if self.disabled || self.is_open() {
            return None;
        }
        self.state = self.open_state();
        self.refresh();
        Some(self.notice())
    }

    /// Blur/escape. Keeps `chosen`, clears the query and abandons pending
    /// measurements for the list.
    pub fn close(&mut self) -> Option<SelectionNotice> {
        if !self.is_open() {
            return None;
        }
        self.state = PickerState::Closed;
        self.query.clear();
        self.window.abandon_pending();
        self.refresh();
        Some(self.notice())
    }

    /// Replace the query. Typing into a closed picker opens it.
    pub fn set_query(&mut self, query: &str) -> Option<SelectionNotice> {
        if self.disabled {
            return None;
        }
        self.query = query.to_string();
        self.state = self.open_state();
        self.refresh();
        Some(self.notice())
    }

    pub fn push_char(&mut self, c: char) -> Option<SelectionNotice> {
        let mut query = self.query.clone();
        query.push(c);
        self.set_query(&query)
    }

    /// Delete the last query character; on an empty query remove the most
    /// recently chosen option instead.
    pub fn backspace(&mut self) -> Option<SelectionNotice> {
        if self.disabled {
            return None;
        }
        if self.query.is_empty() {
            let last = self.chosen.ids().last().cloned()?;
            return self.remove(&last);
        }
        let mut query = self.query.clone();
        query.pop();
        self.set_query(&query)
    }

    /// Choose candidate `id`. Rejections are logged and otherwise ignored.
    pub fn select(&mut self, id: &OptionId) -> Option<SelectionNotice> {
        match self.try_select(id) {
            Ok(notice) => Some(notice),
            Err(e) => {
                debug!(error = %e, "selection rejected");
                None
            }
        }
    }

    /// Choose candidate `id`, reporting why a selection was refused. The query
    /// and open state are left as they are.
    pub fn try_select(&mut self, id: &OptionId) -> Result<SelectionNotice, SelectionError> {
        if self.disabled {
            return Err(SelectionError::Disabled);
        }
        let is_candidate = self
            .candidates
            .iter()
            .any(|&i| &self.options[i].id == id);
        if !is_candidate {
            return Err(SelectionError::InvalidSelection { id: id.clone() });
        }
        self.chosen.insert(id.clone());
        self.refresh();
        Ok(self.notice())
    }

    /// Choose whatever candidate is highlighted.
    pub fn select_highlighted(&mut self) -> Option<SelectionNotice> {
        let id = self.highlighted().map(|o| o.id.clone())?;
        self.select(&id)
    }

    /// Un-choose `id`; it becomes a candidate again if it matches the query.
    pub fn remove(&mut self, id: &OptionId) -> Option<SelectionNotice> {
        if self.disabled || !self.chosen.remove(id) {
            return None;
        }
        self.refresh();
        Some(self.notice())
    }

    /// Drop every chosen option and the query, and close.
    pub fn clear(&mut self) -> Option<SelectionNotice> {
        let changed = !self.chosen.is_empty() || !self.query.is_empty() || self.is_open();
        if !changed {
            return None;
        }
        self.chosen.clear();
        self.query.clear();
        if self.is_open() {
            self.state = PickerState::Closed;
            self.window.abandon_pending();
        }
        self.refresh();
        Some(self.notice())
    }

    /// Enable or disable the picker. Disabling closes it; `chosen` is kept.
    pub fn set_disabled(&mut self, disabled: bool) -> Option<SelectionNotice> {
        if self.disabled == disabled {
            return None;
        }
        if disabled && self.is_open() {
            self.state = PickerState::Closed;
            self.query.clear();
            self.window.abandon_pending();
        }
        self.disabled = disabled;
        self.refresh();
        Some(self.notice())
    }

    /// Swap in a new option set. Chosen ids that no longer exist are dropped.
    pub fn replace_options(&mut self, options: Vec<PickerOption<T>>) -> Option<SelectionNotice> {
        self.engine.index(&options);
        self.options = options;
        let options = &self.options;
        self.chosen
            .retain(|id| options.iter().any(|o| &o.id == id));
        self.highlighted = None;
        self.rebuild(true);
        Some(self.notice())
    }

    // -- keyboard navigation -------------------------------------------------

    pub fn highlight_next(&mut self) {
        self.step_highlight(true);
    }

    pub fn highlight_prev(&mut self) {
        self.step_highlight(false);
    }

    fn step_highlight(&mut self, forward: bool) {
        if self.disabled || !self.is_open() {
            return;
        }
        let from = self
            .highlighted
            .and_then(|option| self.sequence.position_of(option));
        let next = self
            .sequence
            .step_item(from, forward)
            .or(from);
        if let Some(position) = next {
            if let Some(Entry::Item { option }) = self.sequence.row_at(position) {
                self.highlighted = Some(*option);
            }
            self.window.ensure_visible(position);
        }
    }

    // -- windowing -----------------------------------------------------------

    pub fn set_viewport_height(&mut self, height: u32) {
        self.window.set_viewport_height(height);
        if let Some(position) = self
            .highlighted
            .and_then(|option| self.sequence.position_of(option))
        {
            self.window.ensure_visible(position);
        }
    }

    /// Feed back a rendered row's height. See [`WindowModel::measure`].
    pub fn measure(&mut self, generation: u64, position: usize, height: u32) -> bool {
        self.window.measure(generation, position, height)
    }

    /// Listbox height for the current candidates.
    pub fn listbox_height(&self) -> u64 {
        self.window.listbox_height(
            self.config.max_visible_rows,
            self.config.heights.item,
            self.config.list_padding,
        )
    }

    /// Rows to render right now. Empty when closed or disabled.
    pub fn visible_rows(&self) -> Vec<VisibleRow<'_, T>> {
        if self.disabled || !self.is_open() {
            return Vec::new();
        }
        self.window
            .visible_range()
            .filter_map(|position| match self.sequence.row_at(position)? {
                Entry::Header { group } => Some(VisibleRow::Header {
                    position,
                    group: group.as_str(),
                }),
                Entry::Item { option } => Some(VisibleRow::Item {
                    position,
                    option: &self.options[*option],
                    highlighted: self.highlighted == Some(*option),
                }),
            })
            .collect()
    }

    // -- internals -----------------------------------------------------------

    fn open_state(&self) -> PickerState {
        if self.query.is_empty() {
            PickerState::OpenEmptyQuery
        } else {
            PickerState::OpenFiltered
        }
    }

    fn notice(&self) -> SelectionNotice {
        SelectionNotice {
            chosen: self.chosen.ids().to_vec(),
        }
    }

    fn refresh(&mut self) {
        self.rebuild(false);
    }

    /// Recompute candidates; rebuild the grouped sequence and reset window
    /// heights when the candidate set changed (or `force` is set).
    fn rebuild(&mut self, force: bool) {
        let next = if self.disabled {
            Vec::new()
        } else {
            self.engine.candidates(&self.options, &self.chosen, &self.query)
        };
        if force || next != self.candidates {
            let options = &self.options;
            self.sequence = GroupedSequence::build_indexed(
                next.iter().map(|&i| (i, options[i].group.as_deref())),
            );
            self.window
                .reset_heights(self.sequence.estimated_heights(self.config.heights));
            self.candidates = next;
        }

        let still_candidate = self
            .highlighted
            .is_some_and(|h| self.candidates.contains(&h));
        if !still_candidate {
            self.highlighted = self
                .sequence
                .step_item(None, true)
                .and_then(|p| match self.sequence.row_at(p) {
                    Some(Entry::Item { option }) => Some(*option),
                    _ => None,
                });
        }
    }
}
