//! Meeting model.
//!
//! A meeting is a time-boxed work item that needs one agent holding its
//! required skill. Meetings are immutable once built and are referenced
//! everywhere else by their index in the input slice.
//!
//! # Time Model
//! Timestamps are naive local date-times. A meeting belongs to the calendar
//! date on which it starts, even when it runs past midnight; its duration
//! is always measured on full timestamps so the rollover is accounted for.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrorKind};

/// Skill tag that every agent satisfies.
pub const WILDCARD_SKILL: &str = "Monitoring";

/// A time-boxed work item to be covered by one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Start timestamp (inclusive).
    pub start: NaiveDateTime,
    /// End timestamp (exclusive). Always after `start`.
    pub end: NaiveDateTime,
    /// Skill an agent needs to cover this meeting.
    pub required_skill: String,
    /// Whether the meeting falls in the overnight window.
    pub is_night: bool,
}

impl Meeting {
    /// Creates a meeting.
    ///
    /// Fails with [`ValidationErrorKind::InvalidMeetingInterval`] when
    /// `end <= start`.
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        required_skill: impl Into<String>,
        is_night: bool,
    ) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidMeetingInterval,
                format!("Meeting ends at {end} which is not after its start {start}"),
            ));
        }
        Ok(Self {
            start,
            end,
            required_skill: required_skill.into(),
            is_night,
        })
    }

    /// Creates a day meeting.
    pub fn day(
        start: NaiveDateTime,
        end: NaiveDateTime,
        required_skill: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(start, end, required_skill, false)
    }

    /// Creates a night meeting.
    pub fn night(
        start: NaiveDateTime,
        end: NaiveDateTime,
        required_skill: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(start, end, required_skill, true)
    }

    /// Calendar date the meeting is booked on (its start date).
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Duration in hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    /// Whether any agent may cover this meeting.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.required_skill == WILDCARD_SKILL
    }

    /// Whether two meetings overlap in time.
    ///
    /// Intervals are half-open, so back-to-back meetings do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the interval is well-formed (`end > start`).
    ///
    /// Always true for meetings built through [`Meeting::new`]; deserialized
    /// meetings are checked by [`crate::validation::validate_input`].
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }
}
