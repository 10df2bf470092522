// Error types and the user-facing failure taxonomy.

use thiserror::Error;

use crate::model::OptionId;

/// Message shown when the solver finds no covering package.
pub const NO_SOLUTION_MESSAGE: &str =
    "We could not find a solution for the selected games, because no packages are covering any game";

/// A rejected picker transition. Never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("option `{id}` is not a current candidate")]
    InvalidSelection { id: OptionId },

    #[error("picker is disabled")]
    Disabled,
}

/// A coverage query that must not be sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("select at least one of live or highlights")]
    NoFormatSelected,
}

/// Outcome classes for anything that can go wrong in a session. None of them
/// is fatal; the worst case is a component that keeps its previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Network or decode failure talking to a collaborator.
    FetchFailure { detail: String },
    /// The solver answered but nothing covers the selection.
    EmptyResult,
    /// A selection of something that is not a candidate.
    InvalidSelection,
}

impl Failure {
    /// Text to surface to the user, or `None` when the failure is only logged.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Failure::FetchFailure { detail } => {
                Some(format!("Could not reach the coverage service: {detail}"))
            }
            Failure::EmptyResult => Some(NO_SOLUTION_MESSAGE.to_string()),
            Failure::InvalidSelection => None,
        }
    }
}

impl From<SelectionError> for Failure {
    fn from(_: SelectionError) -> Self {
        Failure::InvalidSelection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_uses_no_solution_message() {
        assert_eq!(
            Failure::EmptyResult.user_message().as_deref(),
            Some(NO_SOLUTION_MESSAGE)
        );
    }

    #[test]
    fn invalid_selection_is_silent() {
        let failure: Failure = SelectionError::InvalidSelection { id: "7".into() }.into();
        assert_eq!(failure, Failure::InvalidSelection);
        assert!(failure.user_message().is_none());
    }

    #[test]
    fn fetch_failure_carries_detail() {
        let failure = Failure::FetchFailure {
            detail: "connection refused".into(),
        };
        let msg = failure.user_message().unwrap();
        assert!(msg.contains("connection refused"));
    }
}
