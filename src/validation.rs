//! Input validation for rostering problems.
//!
//! Checks structural integrity of meetings, the roster and the search
//! configuration before any search starts. Detects:
//! - Meetings whose end is not after their start
//! - Duplicate agent IDs
//! - Non-positive population size
//! - Probabilities outside `[0, 1]`
//! - Inverted or negative working-time bounds
//! - Negative or non-finite weights
//!
//! All problems are collected and reported together. Infeasibility (a skill
//! no agent holds, an empty roster) is not a validation error.

use std::collections::HashSet;

use thiserror::Error;

use crate::config::SearchConfig;
use crate::fitness::FitnessCategory;
use crate::models::{Meeting, Roster};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A meeting ends at or before its start.
    InvalidMeetingInterval,
    /// Two agents share the same ID.
    DuplicateId,
    /// Population size is zero.
    InvalidPopulationSize,
    /// A probability lies outside `[0, 1]`.
    InvalidProbability,
    /// Working-time bounds are negative or inverted.
    InvalidHourBounds,
    /// A penalty or reward weight is negative or not finite.
    InvalidWeight,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates meetings and roster.
///
/// Checks:
/// 1. Every meeting ends after it starts
/// 2. No duplicate agent IDs
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(meetings: &[Meeting], roster: &Roster) -> ValidationResult {
    let mut errors = Vec::new();

    for (idx, meeting) in meetings.iter().enumerate() {
        if !meeting.is_well_formed() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidMeetingInterval,
                format!(
                    "Meeting {idx} ends at {} which is not after its start {}",
                    meeting.end, meeting.start
                ),
            ));
        }
    }

    let mut agent_ids = HashSet::new();
    for agent in roster.agents() {
        if !agent_ids.insert(agent.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate agent ID: {}", agent.id),
            ));
        }
    }

    into_result(errors)
}

/// Validates search parameters.
///
/// Checks:
/// 1. Population size is positive
/// 2. Mutation, fill and unassign probabilities lie in `[0, 1]`
/// 3. Daily bounds satisfy `0 <= min <= max`; weekly maximum and rest are
///    non-negative; break and travel minutes are non-negative
/// 4. Every weight is finite and non-negative
pub fn validate_config(config: &SearchConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.population_size == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidPopulationSize,
            "Population size must be positive",
        ));
    }

    for (name, value) in [
        ("mutation_rate", config.mutation_rate),
        ("fill_probability", config.fill_probability),
        ("unassign_probability", config.unassign_probability),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidProbability,
                format!("{name} must lie in [0, 1], got {value}"),
            ));
        }
    }

    if !(config.min_daily_hours >= 0.0 && config.min_daily_hours <= config.max_daily_hours) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidHourBounds,
            format!(
                "Daily hour bounds must satisfy 0 <= min <= max, got [{}, {}]",
                config.min_daily_hours, config.max_daily_hours
            ),
        ));
    }
    if !(config.max_weekly_hours >= 0.0) || !(config.min_rest_hours >= 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidHourBounds,
            "Weekly hours and minimum rest must be non-negative",
        ));
    }
    if config.min_break_minutes < 0 || config.travel_buffer_minutes < 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidHourBounds,
            "Break and travel buffer must be non-negative",
        ));
    }

    for &category in FitnessCategory::ALL {
        let weight = config.weights.weight(category);
        if !weight.is_finite() || weight < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeight,
                format!("Weight for {category} must be finite and non-negative, got {weight}"),
            ));
        }
    }

    into_result(errors)
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
