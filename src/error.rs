//! Error type of the rostering pipeline.
//!
//! Only invalid input is an error. Infeasibility (no eligible agent, an
//! empty roster, impossible rest windows) is expressed through fitness and
//! unfilled meetings, and the search itself cannot fail.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced to callers before a search starts.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Meetings, roster or configuration failed validation.
    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),
    /// Configuration or report JSON could not be read or written.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for SchedulingError {
    fn from(errors: Vec<ValidationError>) -> Self {
        SchedulingError::InvalidInput(errors)
    }
}

impl From<ValidationError> for SchedulingError {
    fn from(error: ValidationError) -> Self {
        SchedulingError::InvalidInput(vec![error])
    }
}
