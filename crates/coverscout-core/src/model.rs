// Domain model: selectable options, streaming packages, and coverage rows.
//
// The wire types mirror the JSON served by the coverage backend. Everything
// here is a plain snapshot: created when a response arrives, replaced (never
// mutated in place) when the next one does.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Stable identifier of a selectable option, unique within one picker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    pub fn new(id: impl Into<String>) -> Self {
        OptionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(s: &str) -> Self {
        OptionId(s.to_string())
    }
}

impl From<String> for OptionId {
    fn from(s: String) -> Self {
        OptionId(s)
    }
}

impl From<u64> for OptionId {
    fn from(n: u64) -> Self {
        OptionId(n.to_string())
    }
}

/// One selectable entry of a picker.
///
/// `label` is the display key; `group`, when present, places the option under
/// a group header in the candidate list. `payload` carries whatever the owning
/// picker needs to build its query (a game, or nothing for name-only pickers).
#[derive(Debug, Clone, PartialEq)]
pub struct PickerOption<T> {
    pub id: OptionId,
    pub label: String,
    pub group: Option<String>,
    pub payload: T,
}

impl<T> PickerOption<T> {
    pub fn new(id: impl Into<OptionId>, label: impl Into<String>, payload: T) -> Self {
        PickerOption {
            id: id.into(),
            label: label.into(),
            group: None,
            payload,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

impl PickerOption<()> {
    /// Option whose name is both its identifier and its display key
    /// (teams, tournaments).
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        PickerOption::new(name.clone(), name, ())
    }
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// A single fixture as served by the `/games` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub team_home: String,
    pub team_away: String,
    pub starts_at: String,
    pub tournament_name: String,
}

/// Timestamp layouts seen in `starts_at`, tried in order.
const KICKOFF_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

impl Game {
    /// Display key: "home - away".
    pub fn label(&self) -> String {
        format!("{} - {}", self.team_home, self.team_away)
    }

    /// Text matched against the picker query.
    pub fn search_text(&self) -> String {
        format!("{}{}{}", self.team_home, self.team_away, self.tournament_name)
    }

    /// Parsed kickoff time, if `starts_at` is in a recognizable layout.
    pub fn kickoff(&self) -> Option<NaiveDateTime> {
        let raw = self.starts_at.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        KICKOFF_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    /// Short kickoff text for list rows; falls back to the raw value.
    pub fn kickoff_display(&self) -> String {
        match self.kickoff() {
            Some(dt) => dt.format("%a %d %b %H:%M").to_string(),
            None => self.starts_at.clone(),
        }
    }

    /// Convert into a picker option, optionally grouped by tournament.
    pub fn into_option(self, group_by_tournament: bool) -> PickerOption<Game> {
        let group = group_by_tournament.then(|| self.tournament_name.clone());
        PickerOption {
            id: OptionId::from(self.id),
            label: self.label(),
            group,
            payload: self,
        }
    }
}

// ---------------------------------------------------------------------------
// Packages and billing
// ---------------------------------------------------------------------------

/// A streaming subscription package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: u64,
    pub name: String,
    /// Monthly price in cents when billed monthly; `None` when the package
    /// offers no monthly billing.
    #[serde(default)]
    pub monthly_price_cents: Option<u32>,
    /// Monthly price in cents on a yearly subscription.
    #[serde(default)]
    pub monthly_price_yearly_subscription_in_cents: u32,
}

impl Package {
    /// Monthly price under the given billing interval, if offered.
    pub fn price_for(&self, billing: BillingInterval) -> Option<u32> {
        match billing {
            BillingInterval::Yearly => Some(self.monthly_price_yearly_subscription_in_cents),
            BillingInterval::Monthly => self.monthly_price_cents,
        }
    }
}

/// How the user intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BillingInterval {
    #[default]
    Yearly,
    Monthly,
}

impl BillingInterval {
    pub fn from_monthly_flag(only_monthly: bool) -> Self {
        if only_monthly {
            BillingInterval::Monthly
        } else {
            BillingInterval::Yearly
        }
    }

    pub fn is_monthly(self) -> bool {
        self == BillingInterval::Monthly
    }

    pub fn toggled(self) -> Self {
        match self {
            BillingInterval::Yearly => BillingInterval::Monthly,
            BillingInterval::Monthly => BillingInterval::Yearly,
        }
    }
}

// ---------------------------------------------------------------------------
// Coverage formats
// ---------------------------------------------------------------------------

/// A way a package can cover a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageFormat {
    Live,
    Highlights,
}

impl CoverageFormat {
    pub fn from_str_format(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Some(CoverageFormat::Live),
            "highlights" => Some(CoverageFormat::Highlights),
            _ => None,
        }
    }

    pub fn display_str(self) -> &'static str {
        match self {
            CoverageFormat::Live => "Live",
            CoverageFormat::Highlights => "Highlights",
        }
    }
}

/// The set of desired coverage formats. Defaults to live only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatSet {
    pub live: bool,
    pub highlights: bool,
}

impl Default for FormatSet {
    fn default() -> Self {
        FormatSet {
            live: true,
            highlights: false,
        }
    }
}

impl FormatSet {
    pub fn from_formats(formats: &[CoverageFormat]) -> Self {
        FormatSet {
            live: formats.contains(&CoverageFormat::Live),
            highlights: formats.contains(&CoverageFormat::Highlights),
        }
    }

    pub fn contains(&self, format: CoverageFormat) -> bool {
        match format {
            CoverageFormat::Live => self.live,
            CoverageFormat::Highlights => self.highlights,
        }
    }

    pub fn toggle(&mut self, format: CoverageFormat) {
        match format {
            CoverageFormat::Live => self.live = !self.live,
            CoverageFormat::Highlights => self.highlights = !self.highlights,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.live && !self.highlights
    }
}

// ---------------------------------------------------------------------------
// Coverage rows
// ---------------------------------------------------------------------------

/// How completely a package covers a row's content.
///
/// Decoding is total: any string other than `FULL`/`PARTIAL` becomes `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CoverageLevel {
    Full,
    Partial,
    #[default]
    None,
}

impl From<String> for CoverageLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "FULL" => CoverageLevel::Full,
            "PARTIAL" => CoverageLevel::Partial,
            _ => CoverageLevel::None,
        }
    }
}

impl From<CoverageLevel> for String {
    fn from(level: CoverageLevel) -> Self {
        match level {
            CoverageLevel::Full => "FULL",
            CoverageLevel::Partial => "PARTIAL",
            CoverageLevel::None => "NONE",
        }
        .to_string()
    }
}

/// One row of the comparison grid: a team, tournament, or game, with
/// per-package coverage and optional child rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    pub key: String,
    #[serde(default)]
    pub provider_coverage: HashMap<String, CoverageLevel>,
    #[serde(default)]
    pub provider_coverage_highlights: HashMap<String, CoverageLevel>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sub_rows: Vec<Row>,
}

impl Row {
    pub fn new(key: impl Into<String>) -> Self {
        Row {
            key: key.into(),
            ..Row::default()
        }
    }

    pub fn with_coverage(mut self, package: &str, level: CoverageLevel) -> Self {
        self.provider_coverage.insert(package.to_string(), level);
        self
    }

    pub fn with_highlights(mut self, package: &str, level: CoverageLevel) -> Self {
        self.provider_coverage_highlights
            .insert(package.to_string(), level);
        self
    }

    pub fn with_sub_row(mut self, row: Row) -> Self {
        self.sub_rows.push(row);
        self
    }

    /// Coverage for `package` in the given format; missing keys are `None`.
    pub fn coverage(&self, package: &str, format: CoverageFormat) -> Option<CoverageLevel> {
        let map = match format {
            CoverageFormat::Live => &self.provider_coverage,
            CoverageFormat::Highlights => &self.provider_coverage_highlights,
        };
        map.get(package).copied()
    }
}

/// Solver success body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverResponse {
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub rows: Vec<Row>,
    /// The packages that together cover the selection.
    #[serde(default)]
    pub result: Vec<Package>,
    /// Games no package could cover. Optional; carried through untouched.
    #[serde(default)]
    pub games_not_covered: Option<Vec<Game>>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_game() -> Game {
        Game {
            id: 42,
            team_home: "Bayern München".into(),
            team_away: "Borussia Dortmund".into(),
            starts_at: "2024-08-24 18:30:00".into(),
            tournament_name: "Bundesliga 24/25".into(),
        }
    }

    #[test]
    fn game_label_and_search_text() {
        let game = sample_game();
        assert_eq!(game.label(), "Bayern München - Borussia Dortmund");
        assert_eq!(
            game.search_text(),
            "Bayern MünchenBorussia DortmundBundesliga 24/25"
        );
    }

    #[test]
    fn game_into_option_groups_by_tournament() {
        let grouped = sample_game().into_option(true);
        assert_eq!(grouped.id, OptionId::from(42u64));
        assert_eq!(grouped.group.as_deref(), Some("Bundesliga 24/25"));

        let flat = sample_game().into_option(false);
        assert!(flat.group.is_none());
    }

    #[test]
    fn kickoff_parses_known_layouts() {
        let game = sample_game();
        assert_eq!(game.kickoff_display(), "Sat 24 Aug 18:30");

        let mut iso = sample_game();
        iso.starts_at = "2024-08-24T18:30:00+00:00".into();
        assert!(iso.kickoff().is_some());
    }

    #[test]
    fn kickoff_falls_back_to_raw_text() {
        let mut game = sample_game();
        game.starts_at = "tbd".into();
        assert!(game.kickoff().is_none());
        assert_eq!(game.kickoff_display(), "tbd");
    }

    #[test]
    fn coverage_level_decoding_is_total() {
        let levels: Vec<CoverageLevel> =
            serde_json::from_str(r#"["FULL", "PARTIAL", "NONE", "bogus", ""]"#).unwrap();
        assert_eq!(
            levels,
            vec![
                CoverageLevel::Full,
                CoverageLevel::Partial,
                CoverageLevel::None,
                CoverageLevel::None,
                CoverageLevel::None,
            ]
        );
    }

    #[test]
    fn row_decodes_null_sub_rows_as_empty() {
        let json = r#"{
            "key": "Arsenal",
            "provider_coverage": {"Sky": "FULL"},
            "provider_coverage_highlights": {"Sky": "PARTIAL"},
            "sub_rows": null
        }"#;
        let row: Row = serde_json::from_str(json).unwrap();
        assert_eq!(row.key, "Arsenal");
        assert!(row.sub_rows.is_empty());
        assert_eq!(
            row.coverage("Sky", CoverageFormat::Live),
            Some(CoverageLevel::Full)
        );
        assert_eq!(
            row.coverage("Sky", CoverageFormat::Highlights),
            Some(CoverageLevel::Partial)
        );
        assert_eq!(row.coverage("DAZN", CoverageFormat::Live), None);
    }

    #[test]
    fn row_tolerates_missing_maps() {
        let row: Row = serde_json::from_str(r#"{"key": "EPL"}"#).unwrap();
        assert!(row.provider_coverage.is_empty());
        assert!(row.provider_coverage_highlights.is_empty());
    }

    #[test]
    fn solver_response_decodes_full_body() {
        let json = r#"{
            "packages": [
                {"id": 1, "name": "A", "monthly_price_cents": null, "monthly_price_yearly_subscription_in_cents": 1000},
                {"id": 2, "name": "B", "monthly_price_cents": 500, "monthly_price_yearly_subscription_in_cents": 900}
            ],
            "rows": [
                {"key": "EPL", "provider_coverage": {"A": "FULL"}, "provider_coverage_highlights": {},
                 "sub_rows": [{"key": "Match1", "provider_coverage": {"A": "PARTIAL"}, "provider_coverage_highlights": {}, "sub_rows": null}]}
            ],
            "result": [
                {"id": 2, "name": "B", "monthly_price_cents": 500, "monthly_price_yearly_subscription_in_cents": 900}
            ]
        }"#;
        let resp: SolverResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.packages.len(), 2);
        assert_eq!(resp.packages[0].monthly_price_cents, None);
        assert_eq!(resp.rows[0].sub_rows.len(), 1);
        assert_eq!(resp.result[0].name, "B");
        assert!(resp.games_not_covered.is_none());
    }

    #[test]
    fn package_price_for_billing() {
        let pkg = Package {
            id: 2,
            name: "B".into(),
            monthly_price_cents: Some(500),
            monthly_price_yearly_subscription_in_cents: 900,
        };
        assert_eq!(pkg.price_for(BillingInterval::Yearly), Some(900));
        assert_eq!(pkg.price_for(BillingInterval::Monthly), Some(500));

        let yearly_only = Package {
            monthly_price_cents: None,
            ..pkg
        };
        assert_eq!(yearly_only.price_for(BillingInterval::Monthly), None);
    }

    #[test]
    fn format_set_defaults_to_live() {
        let formats = FormatSet::default();
        assert!(formats.contains(CoverageFormat::Live));
        assert!(!formats.contains(CoverageFormat::Highlights));
    }

    #[test]
    fn format_set_toggle_can_empty_the_set() {
        let mut formats = FormatSet::default();
        formats.toggle(CoverageFormat::Live);
        assert!(formats.is_empty());
        formats.toggle(CoverageFormat::Highlights);
        assert_eq!(
            formats,
            FormatSet::from_formats(&[CoverageFormat::Highlights])
        );
    }

    #[test]
    fn coverage_format_from_str() {
        assert_eq!(CoverageFormat::from_str_format("LIVE"), Some(CoverageFormat::Live));
        assert_eq!(
            CoverageFormat::from_str_format(" highlights "),
            Some(CoverageFormat::Highlights)
        );
        assert_eq!(CoverageFormat::from_str_format("replay"), None);
    }
}
