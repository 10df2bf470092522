// Coverage query: the committed selection sent to the solver.

use crate::error::QueryError;
use crate::model::{BillingInterval, CoverageFormat, FormatSet};

/// Everything the solver needs to compute a package comparison.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoverageQuery {
    pub games: Vec<u64>,
    pub teams: Vec<String>,
    pub tournaments: Vec<String>,
    pub all_games: bool,
    pub billing: BillingInterval,
    pub formats: FormatSet,
}

impl CoverageQuery {
    /// Reject queries the solver would refuse.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.formats.is_empty() {
            return Err(QueryError::NoFormatSelected);
        }
        Ok(())
    }

    /// Query-string pairs in the solver's wire format: id/name lists as JSON
    /// arrays, flags as "1"/"0".
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("games", json_array(&self.games)),
            ("teams", json_array(&self.teams)),
            ("tournaments", json_array(&self.tournaments)),
            ("all_games", flag(self.all_games)),
            ("only_monthly_billing", flag(self.billing.is_monthly())),
            ("live", flag(self.formats.contains(CoverageFormat::Live))),
            (
                "highlights",
                flag(self.formats.contains(CoverageFormat::Highlights)),
            ),
        ]
    }
}

fn json_array<T: serde::Serialize>(items: &[T]) -> String {
    // Serializing a slice of numbers or strings cannot fail.
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn flag(on: bool) -> String {
    if on { "1" } else { "0" }.to_string()
}
