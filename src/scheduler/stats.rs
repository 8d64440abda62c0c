//! Schedule statistics.
//!
//! Summarizes how a finished schedule spreads work across the roster.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Meetings per agent | Assigned meetings, night and day |
//! | Night shifts per agent | Assigned night meetings |
//! | Hours per agent | Sum of assigned meeting durations |
//! | Avg daily hours | Hours / distinct working dates |
//! | Fill rate | Filled meetings / all meetings |
//!
//! Every roster agent appears in the per-agent maps, idle ones with zero.
//! Assignments to unknown agents or out-of-range meetings are ignored.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{AgentId, Meeting, Roster, Schedule};

/// Workload indicators of a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// Assigned meetings per agent.
    pub meetings_per_agent: BTreeMap<AgentId, usize>,
    /// Assigned night meetings per agent.
    pub night_shifts_per_agent: BTreeMap<AgentId, usize>,
    /// Total assigned hours per agent.
    pub hours_per_agent: BTreeMap<AgentId, f64>,
    /// Mean hours per working date, per agent (0.0 when idle).
    pub avg_daily_hours_per_agent: BTreeMap<AgentId, f64>,
    /// Mean total hours across the roster.
    pub avg_hours: f64,
    /// Filled meetings.
    pub filled: usize,
    /// Unfilled meetings.
    pub unfilled: usize,
    /// Fraction of meetings filled (1.0 when there are none).
    pub fill_rate: f64,
}

impl ScheduleStats {
    /// Computes statistics for a schedule over its meetings.
    pub fn calculate(schedule: &Schedule, roster: &Roster, meetings: &[Meeting]) -> Self {
        let mut stats = Self::default();
        let mut dates: BTreeMap<&str, BTreeSet<_>> = BTreeMap::new();

        for agent in roster.agents() {
            stats.meetings_per_agent.insert(agent.id.clone(), 0);
            stats.night_shifts_per_agent.insert(agent.id.clone(), 0);
            stats.hours_per_agent.insert(agent.id.clone(), 0.0);
        }

        for (idx, agent) in schedule.iter() {
            let Some(meeting) = meetings.get(idx) else {
                continue;
            };
            let Some(count) = stats.meetings_per_agent.get_mut(agent) else {
                continue;
            };
            *count += 1;
            stats.filled += 1;
            if meeting.is_night {
                *stats.night_shifts_per_agent.entry(agent.to_string()).or_default() += 1;
            }
            *stats.hours_per_agent.entry(agent.to_string()).or_default() += meeting.duration_hours();
            dates.entry(agent).or_default().insert(meeting.date());
        }

        for (agent, &hours) in &stats.hours_per_agent {
            let days = dates.get(agent.as_str()).map_or(0, BTreeSet::len);
            let avg = if days == 0 { 0.0 } else { hours / days as f64 };
            stats.avg_daily_hours_per_agent.insert(agent.clone(), avg);
        }

        stats.avg_hours = if roster.is_empty() {
            0.0
        } else {
            stats.hours_per_agent.values().sum::<f64>() / roster.len() as f64
        };
        stats.unfilled = meetings.len() - stats.filled.min(meetings.len());
        stats.fill_rate = if meetings.is_empty() {
            1.0
        } else {
            stats.filled as f64 / meetings.len() as f64
        };
        stats
    }

    /// Whether every meeting is filled.
    pub fn is_fully_filled(&self) -> bool {
        self.unfilled == 0
    }
}
