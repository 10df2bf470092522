// The comparison form: three pickers, the all-games / billing / format
// toggles, and the committed selection they produce.
//
// Pickers report their chosen ids upward through `SelectionNotice`s; the form
// keeps its own copy of the committed selection and never reaches into a
// controller to build the query.

use coverscout_core::error::QueryError;
use coverscout_core::model::{
    BillingInterval, CoverageFormat, FormatSet, Game, OptionId, PickerOption,
};
use coverscout_core::picker::{
    MultiSelectController, PickerConfig, SelectionNotice, VisibleRow,
};
use coverscout_core::query::CoverageQuery;
use tracing::{debug, warn};

use crate::config::Config;
use crate::protocol::{Chip, ListRow, PickerAction, PickerKind, PickerSnapshot};

fn game_text(option: &PickerOption<Game>) -> String {
    option.payload.search_text()
}

fn name_text(option: &PickerOption<()>) -> String {
    option.label.clone()
}

fn game_detail(option: &PickerOption<Game>) -> Option<String> {
    Some(option.payload.kickoff_display()).filter(|s| !s.is_empty())
}

fn no_detail(_: &PickerOption<()>) -> Option<String> {
    None
}

// ---------------------------------------------------------------------------
// Committed selection
// ---------------------------------------------------------------------------

/// Chosen ids as last reported by each picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub games: Vec<OptionId>,
    pub teams: Vec<OptionId>,
    pub tournaments: Vec<OptionId>,
}

impl Selection {
    fn record(&mut self, kind: PickerKind, notice: SelectionNotice) {
        let slot = match kind {
            PickerKind::Games => &mut self.games,
            PickerKind::Teams => &mut self.teams,
            PickerKind::Tournaments => &mut self.tournaments,
        };
        *slot = notice.chosen;
    }

    fn game_ids(&self) -> Vec<u64> {
        self.games
            .iter()
            .filter_map(|id| match id.as_str().parse::<u64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!(id = %id, "non-numeric game id dropped from query");
                    None
                }
            })
            .collect()
    }

    fn names(ids: &[OptionId]) -> Vec<String> {
        ids.iter().map(|id| id.as_str().to_string()).collect()
    }
}

// ---------------------------------------------------------------------------
// ComparisonForm
// ---------------------------------------------------------------------------

pub struct ComparisonForm {
    games: MultiSelectController<Game>,
    teams: MultiSelectController<()>,
    tournaments: MultiSelectController<()>,
    selection: Selection,
    all_games: bool,
    billing: BillingInterval,
    formats: FormatSet,
    default_formats: FormatSet,
    group_games_by_tournament: bool,
}

impl ComparisonForm {
    pub fn new(config: &Config) -> Self {
        let picker = config.picker.controller_config();
        Self::with_settings(
            picker,
            config.form.format_set(),
            BillingInterval::from_monthly_flag(config.form.only_monthly_billing),
            config.picker.group_games_by_tournament,
        )
    }

    pub fn with_settings(
        picker: PickerConfig,
        default_formats: FormatSet,
        billing: BillingInterval,
        group_games_by_tournament: bool,
    ) -> Self {
        ComparisonForm {
            games: MultiSelectController::new(Vec::new(), picker, game_text),
            teams: MultiSelectController::new(Vec::new(), picker, name_text),
            tournaments: MultiSelectController::new(Vec::new(), picker, name_text),
            selection: Selection::default(),
            all_games: false,
            billing,
            formats: default_formats,
            default_formats,
            group_games_by_tournament,
        }
    }

    // -- option loading ------------------------------------------------------

    pub fn load_games(&mut self, games: Vec<Game>) {
        let group = self.group_games_by_tournament;
        let options = games.into_iter().map(|g| g.into_option(group)).collect();
        if let Some(notice) = self.games.replace_options(options) {
            self.selection.record(PickerKind::Games, notice);
        }
    }

    pub fn load_names(&mut self, kind: PickerKind, names: Vec<String>) {
        let options = names.into_iter().map(PickerOption::named).collect();
        let notice = match kind {
            PickerKind::Teams => self.teams.replace_options(options),
            PickerKind::Tournaments => self.tournaments.replace_options(options),
            PickerKind::Games => {
                warn!("game options must be loaded with load_games");
                None
            }
        };
        if let Some(notice) = notice {
            self.selection.record(kind, notice);
        }
    }

    // -- picker input --------------------------------------------------------

    /// Route one picker action. Returns whether anything visible changed.
    pub fn apply(&mut self, kind: PickerKind, action: PickerAction) -> bool {
        let (notice, changed) = match kind {
            PickerKind::Games => apply_action(&mut self.games, action),
            PickerKind::Teams => apply_action(&mut self.teams, action),
            PickerKind::Tournaments => apply_action(&mut self.tournaments, action),
        };
        if let Some(notice) = notice {
            debug!(?kind, chosen = notice.chosen.len(), "selection notice");
            self.selection.record(kind, notice);
        }
        changed
    }

    /// Close every picker except `keep`.
    pub fn close_others(&mut self, keep: PickerKind) {
        for kind in PickerKind::ALL {
            if kind != keep {
                self.apply(kind, PickerAction::Close);
            }
        }
    }

    // -- toggles -------------------------------------------------------------

    /// Flip "select all games". While on, all three pickers are disabled;
    /// their chosen items persist.
    pub fn toggle_all_games(&mut self) {
        self.all_games = !self.all_games;
        let disabled = self.all_games;
        for kind in PickerKind::ALL {
            let notice = match kind {
                PickerKind::Games => self.games.set_disabled(disabled),
                PickerKind::Teams => self.teams.set_disabled(disabled),
                PickerKind::Tournaments => self.tournaments.set_disabled(disabled),
            };
            if let Some(notice) = notice {
                self.selection.record(kind, notice);
            }
        }
    }

    pub fn toggle_billing(&mut self) {
        self.billing = self.billing.toggled();
    }

    pub fn toggle_format(&mut self, format: CoverageFormat) {
        self.formats.toggle(format);
    }

    pub fn all_games(&self) -> bool {
        self.all_games
    }

    pub fn billing(&self) -> BillingInterval {
        self.billing
    }

    pub fn formats(&self) -> FormatSet {
        self.formats
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    // -- submission ----------------------------------------------------------

    /// The query for the current committed selection.
    pub fn build_query(&self) -> Result<CoverageQuery, QueryError> {
        let query = CoverageQuery {
            games: self.selection.game_ids(),
            teams: Selection::names(&self.selection.teams),
            tournaments: Selection::names(&self.selection.tournaments),
            all_games: self.all_games,
            billing: self.billing,
            formats: self.formats,
        };
        query.validate()?;
        Ok(query)
    }

    /// Back to a blank form: no selections, queries, or all-games; default
    /// formats. The billing interval is kept.
    pub fn reset(&mut self) {
        if self.all_games {
            self.toggle_all_games();
        }
        for kind in PickerKind::ALL {
            let notice = match kind {
                PickerKind::Games => self.games.clear(),
                PickerKind::Teams => self.teams.clear(),
                PickerKind::Tournaments => self.tournaments.clear(),
            };
            if let Some(notice) = notice {
                self.selection.record(kind, notice);
            }
        }
        self.formats = self.default_formats;
    }

    // -- snapshots -----------------------------------------------------------

    pub fn snapshot(&self, kind: PickerKind) -> PickerSnapshot {
        match kind {
            PickerKind::Games => picker_snapshot(kind, &self.games, game_detail),
            PickerKind::Teams => picker_snapshot(kind, &self.teams, no_detail),
            PickerKind::Tournaments => picker_snapshot(kind, &self.tournaments, no_detail),
        }
    }
}

/// Apply `action` to one controller. Returns the upward notice (if the
/// transition was accepted) and whether the rendered picker changed.
fn apply_action<T>(
    picker: &mut MultiSelectController<T>,
    action: PickerAction,
) -> (Option<SelectionNotice>, bool) {
    match action {
        PickerAction::Open => {
            let notice = picker.open();
            let changed = notice.is_some();
            (notice, changed)
        }
        PickerAction::Close => {
            let notice = picker.close();
            let changed = notice.is_some();
            (notice, changed)
        }
        PickerAction::Type(c) => {
            let notice = picker.push_char(c);
            let changed = notice.is_some();
            (notice, changed)
        }
        PickerAction::Backspace => {
            let notice = picker.backspace();
            let changed = notice.is_some();
            (notice, changed)
        }
        PickerAction::HighlightNext => {
            picker.highlight_next();
            (None, true)
        }
        PickerAction::HighlightPrev => {
            picker.highlight_prev();
            (None, true)
        }
        PickerAction::SelectHighlighted => {
            let notice = picker.select_highlighted();
            let changed = notice.is_some();
            (notice, changed)
        }
        PickerAction::Select(id) => {
            let notice = picker.select(&id);
            let changed = notice.is_some();
            (notice, changed)
        }
        PickerAction::Remove(id) => {
            let notice = picker.remove(&id);
            let changed = notice.is_some();
            (notice, changed)
        }
        PickerAction::SetViewport(height) => {
            let changed = picker.window().viewport_height() != height;
            picker.set_viewport_height(height);
            (None, changed)
        }
        PickerAction::Measured {
            generation,
            heights,
        } => {
            // A first measurement that matches the estimate still changes
            // what the snapshot reports, so the UI stops re-measuring.
            let mut changed = false;
            for (position, height) in heights {
                let was_measured = picker.window().is_measured(position);
                let resized = picker.measure(generation, position, height);
                changed |= resized || (!was_measured && picker.window().is_measured(position));
            }
            (None, changed)
        }
    }
}

fn picker_snapshot<T>(
    kind: PickerKind,
    picker: &MultiSelectController<T>,
    detail: fn(&PickerOption<T>) -> Option<String>,
) -> PickerSnapshot {
    let window = picker.window();
    let rows: Vec<ListRow> = picker
        .visible_rows()
        .into_iter()
        .map(|row| {
            let position = row.position();
            let height = window.height_of(position).unwrap_or(0);
            let measured = window.is_measured(position);
            match row {
                VisibleRow::Header { group, .. } => ListRow::Header {
                    position,
                    group: group.to_string(),
                    height,
                    measured,
                },
                VisibleRow::Item {
                    option,
                    highlighted,
                    ..
                } => ListRow::Item {
                    position,
                    id: option.id.clone(),
                    label: option.label.clone(),
                    detail: detail(option),
                    highlighted,
                    height,
                    measured,
                },
            }
        })
        .collect();
    let rows_offset = rows
        .first()
        .map(|r| window.offset_of(r.position()))
        .unwrap_or(0);

    PickerSnapshot {
        kind,
        state: picker.state(),
        disabled: picker.is_disabled(),
        query: picker.query().to_string(),
        chosen: picker
            .chosen()
            .into_iter()
            .map(|o| Chip {
                id: o.id.clone(),
                label: o.label.clone(),
            })
            .collect(),
        candidate_count: picker.candidates().len(),
        rows,
        generation: window.generation(),
        scroll_offset: window.scroll_offset(),
        rows_offset,
        total_height: window.total_height(),
        listbox_height: picker.listbox_height(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverscout_core::picker::PickerState;

    fn game(id: u64, home: &str, away: &str, tournament: &str) -> Game {
        Game {
            id,
            team_home: home.into(),
            team_away: away.into(),
            starts_at: "2024-08-24 18:30:00".into(),
            tournament_name: tournament.into(),
        }
    }

    fn form() -> ComparisonForm {
        let mut form = ComparisonForm::with_settings(
            PickerConfig::default(),
            FormatSet::default(),
            BillingInterval::Yearly,
            true,
        );
        form.load_games(vec![
            game(1, "Arsenal", "Chelsea", "Premier League"),
            game(2, "Bayern", "Dortmund", "Bundesliga"),
        ]);
        form.load_names(PickerKind::Teams, vec!["Arsenal".into(), "Bayern".into()]);
        form.load_names(PickerKind::Tournaments, vec!["Bundesliga".into()]);
        form
    }

    #[test]
    fn selections_flow_into_query() {
        let mut form = form();
        form.apply(PickerKind::Games, PickerAction::Open);
        form.apply(PickerKind::Games, PickerAction::Select("2".into()));
        form.apply(PickerKind::Teams, PickerAction::Select("Arsenal".into()));

        let query = form.build_query().unwrap();
        assert_eq!(query.games, vec![2]);
        assert_eq!(query.teams, vec!["Arsenal".to_string()]);
        assert!(query.tournaments.is_empty());
        assert!(!query.all_games);
        assert_eq!(query.billing, BillingInterval::Yearly);
    }

    #[test]
    fn no_format_selected_is_rejected() {
        let mut form = form();
        form.toggle_format(CoverageFormat::Live);
        assert_eq!(form.build_query(), Err(QueryError::NoFormatSelected));
        form.toggle_format(CoverageFormat::Highlights);
        assert!(form.build_query().is_ok());
    }

    #[test]
    fn all_games_disables_pickers_and_keeps_chosen() {
        let mut form = form();
        form.apply(PickerKind::Teams, PickerAction::Select("Bayern".into()));
        form.toggle_all_games();

        let teams = form.snapshot(PickerKind::Teams);
        assert!(teams.disabled);
        assert_eq!(teams.candidate_count, 0);
        assert_eq!(teams.chosen.len(), 1);
        assert!(!form.apply(PickerKind::Teams, PickerAction::Open));

        let query = form.build_query().unwrap();
        assert!(query.all_games);
        assert_eq!(query.teams, vec!["Bayern".to_string()]);

        form.toggle_all_games();
        assert!(!form.snapshot(PickerKind::Teams).disabled);
    }

    #[test]
    fn reset_clears_everything_but_billing() {
        let mut form = form();
        form.apply(PickerKind::Games, PickerAction::Select("1".into()));
        form.apply(PickerKind::Tournaments, PickerAction::Type('b'));
        form.toggle_format(CoverageFormat::Highlights);
        form.toggle_billing();
        form.toggle_all_games();

        form.reset();
        assert!(!form.all_games());
        assert_eq!(form.formats(), FormatSet::default());
        assert_eq!(form.billing(), BillingInterval::Monthly);
        assert_eq!(form.selection(), &Selection::default());
        let tournaments = form.snapshot(PickerKind::Tournaments);
        assert_eq!(tournaments.query, "");
        assert_eq!(tournaments.state, PickerState::Closed);
        assert!(!tournaments.disabled);
    }

    #[test]
    fn game_snapshot_groups_by_tournament() {
        let mut form = form();
        form.apply(PickerKind::Games, PickerAction::SetViewport(20));
        form.apply(PickerKind::Games, PickerAction::Open);
        let snap = form.snapshot(PickerKind::Games);
        assert_eq!(snap.rows.len(), 4);
        assert!(matches!(&snap.rows[0], ListRow::Header { group, .. } if group == "Premier League"));
        match &snap.rows[1] {
            ListRow::Item {
                label,
                detail,
                highlighted,
                ..
            } => {
                assert_eq!(label, "Arsenal - Chelsea");
                assert_eq!(detail.as_deref(), Some("Sat 24 Aug 18:30"));
                assert!(*highlighted);
            }
            other => panic!("expected item, got {other:?}"),
        }
    }

    #[test]
    fn game_filter_matches_tournament_text() {
        let mut form = form();
        for c in "bundes".chars() {
            form.apply(PickerKind::Games, PickerAction::Type(c));
        }
        let snap = form.snapshot(PickerKind::Games);
        assert_eq!(snap.state, PickerState::OpenFiltered);
        assert_eq!(snap.candidate_count, 1);
    }

    #[test]
    fn stale_measurements_are_ignored() {
        let mut form = form();
        form.apply(PickerKind::Teams, PickerAction::SetViewport(100));
        form.apply(PickerKind::Teams, PickerAction::Open);
        let old = form.snapshot(PickerKind::Teams).generation;

        form.apply(PickerKind::Teams, PickerAction::Type('l'));
        let changed = form.apply(
            PickerKind::Teams,
            PickerAction::Measured {
                generation: old,
                heights: vec![(0, 3)],
            },
        );
        assert!(!changed);

        let current = form.snapshot(PickerKind::Teams).generation;
        assert!(form.apply(
            PickerKind::Teams,
            PickerAction::Measured {
                generation: current,
                heights: vec![(0, 3)],
            },
        ));
        assert_eq!(form.snapshot(PickerKind::Teams).rows[0].height(), 3);
    }

    #[test]
    fn close_others_leaves_target_open() {
        let mut form = form();
        form.apply(PickerKind::Games, PickerAction::Open);
        form.apply(PickerKind::Teams, PickerAction::Open);
        form.close_others(PickerKind::Teams);
        assert!(!form.snapshot(PickerKind::Games).is_open());
        assert!(form.snapshot(PickerKind::Teams).is_open());
    }
}
