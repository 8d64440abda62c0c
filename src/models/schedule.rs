//! Schedule (solution) model.
//!
//! A schedule is a partial mapping from meeting index to agent id. A
//! missing key means the meeting is unfilled; partial schedules are valid
//! and are penalized by the fitness function rather than rejected.
//!
//! Keys are kept in a `BTreeMap`, so every meeting index appears at most
//! once and iteration order is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::AgentId;

/// Meeting index → agent id assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    assignments: BTreeMap<usize, AgentId>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a meeting, returning the agent it was previously assigned to.
    pub fn assign(&mut self, meeting: usize, agent: impl Into<AgentId>) -> Option<AgentId> {
        self.assignments.insert(meeting, agent.into())
    }

    /// Leaves a meeting unfilled, returning the agent it was assigned to.
    pub fn unassign(&mut self, meeting: usize) -> Option<AgentId> {
        self.assignments.remove(&meeting)
    }

    /// Agent assigned to a meeting.
    pub fn agent_for(&self, meeting: usize) -> Option<&str> {
        self.assignments.get(&meeting).map(String::as_str)
    }

    /// Whether a meeting is filled.
    pub fn is_assigned(&self, meeting: usize) -> bool {
        self.assignments.contains_key(&meeting)
    }

    /// Iterates `(meeting, agent)` pairs in meeting order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.assignments.iter().map(|(&m, a)| (m, a.as_str()))
    }

    /// Assignments whose meeting index lies in `range`.
    pub fn range<R>(&self, range: R) -> impl Iterator<Item = (usize, &str)>
    where
        R: std::ops::RangeBounds<usize>,
    {
        self.assignments.range(range).map(|(&m, a)| (m, a.as_str()))
    }

    /// Filled meeting indices in ascending order.
    pub fn meetings(&self) -> impl Iterator<Item = usize> + '_ {
        self.assignments.keys().copied()
    }

    /// Meeting indices assigned to one agent, ascending.
    pub fn meetings_for_agent<'a>(&'a self, agent: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.assignments
            .iter()
            .filter(move |(_, a)| a.as_str() == agent)
            .map(|(&m, _)| m)
    }

    /// Number of filled meetings.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no meeting is filled.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Rewrites meeting indices through `index_map` (`local → global`).
    ///
    /// Entries whose index falls outside the map are dropped.
    pub fn remap(&self, index_map: &[usize]) -> Self {
        self.assignments
            .iter()
            .filter_map(|(&m, a)| index_map.get(m).map(|&g| (g, a.clone())))
            .collect()
    }

    /// Merges another schedule into this one. On key collision `other` wins.
    pub fn merge(mut self, other: Schedule) -> Self {
        self.assignments.extend(other.assignments);
        self
    }
}

impl FromIterator<(usize, AgentId)> for Schedule {
    fn from_iter<I: IntoIterator<Item = (usize, AgentId)>>(iter: I) -> Self {
        Self {
            assignments: iter.into_iter().collect(),
        }
    }
}
