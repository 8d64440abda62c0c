//! Result of a full rostering run.

use serde::{Deserialize, Serialize};

use super::stats::ScheduleStats;
use crate::error::SchedulingError;
use crate::fitness::{Evaluation, FitnessBreakdown};
use crate::ga::ScoredSchedule;
use crate::models::Schedule;

/// Everything a rostering run produces.
///
/// All schedules are keyed by indices into the meeting list passed to
/// [`RosterScheduler::schedule`](super::RosterScheduler::schedule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// Night assignments merged with the best day schedule.
    pub schedule: Schedule,
    /// Assignments made by the night-shift pass.
    pub night_schedule: Schedule,
    /// Best day-search score of each generation.
    pub fitness_history: Vec<f64>,
    /// Best day schedules of the final population, best first.
    ///
    /// Schedules are keyed by input indices and hold day assignments only;
    /// each score is the day-search score over the day meetings, not over
    /// all meetings.
    pub top_schedules: Vec<ScoredSchedule>,
    /// Fitness breakdown of the best day schedule, scored over day meetings.
    pub day_breakdown: FitnessBreakdown,
    /// Fitness of the merged schedule over all meetings.
    pub evaluation: Evaluation,
    /// Workload statistics of the merged schedule.
    pub stats: ScheduleStats,
    /// Generations the day search bred.
    pub generations: usize,
}

impl ScheduleReport {
    /// Score of the merged schedule.
    pub fn score(&self) -> f64 {
        self.evaluation.score
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SchedulingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a report back from JSON.
    pub fn from_json(json: &str) -> Result<Self, SchedulingError> {
        Ok(serde_json::from_str(json)?)
    }
}
