//! Agent and roster models.
//!
//! Agents are the personnel that cover meetings. Each agent has a unique
//! identifier and an ordered list of skill tags. A [`Roster`] is the
//! ordered collection of agents available to a search.
//!
//! Agents carry no mutable bookkeeping: per-date assignments are rebuilt
//! in an [`AgentLedger`] whenever they are needed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Meeting;

/// Agent identifier.
pub type AgentId = String;

/// A staff member that can be assigned to meetings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier.
    pub id: AgentId,
    /// Skill tags, in declaration order.
    pub skills: Vec<String>,
}

impl Agent {
    /// Creates an agent with no skills.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            skills: Vec::new(),
        }
    }

    /// Adds a skill. Duplicates are ignored.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        let skill = skill.into();
        if !self.has_skill(&skill) {
            self.skills.push(skill);
        }
        self
    }

    /// Adds several skills.
    pub fn with_skills<I, S>(self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        skills.into_iter().fold(self, |agent, s| agent.with_skill(s))
    }

    /// Whether this agent holds a given skill.
    pub fn has_skill(&self, name: &str) -> bool {
        self.skills.iter().any(|s| s == name)
    }

    /// Whether this agent may cover a meeting (skill match or wildcard).
    pub fn can_cover(&self, meeting: &Meeting) -> bool {
        meeting.is_wildcard() || self.has_skill(&meeting.required_skill)
    }
}

/// Ordered collection of agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    agents: Vec<Agent>,
}

impl Roster {
    /// Creates a roster from agents.
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// Builds a roster from `(id, skills)` pairs.
    pub fn from_skills<I, S, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<K>)>,
        S: Into<String>,
        K: Into<String>,
    {
        Self::new(
            entries
                .into_iter()
                .map(|(id, skills)| Agent::new(id).with_skills(skills))
                .collect(),
        )
    }

    /// Appends an agent.
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    /// Agents in roster order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the roster has no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agent at a roster position.
    pub fn get(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    /// Roster position of an agent id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.id == id)
    }

    /// Looks up an agent by id.
    pub fn find(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Roster positions of agents eligible for a meeting.
    pub fn eligible_for(&self, meeting: &Meeting) -> Vec<usize> {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.can_cover(meeting))
            .map(|(i, _)| i)
            .collect()
    }

    /// Roster positions of agents holding a skill.
    pub fn with_skill(&self, skill: &str) -> Vec<usize> {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.has_skill(skill))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Scratch bookkeeping for one agent.
///
/// Groups the meetings assigned to an agent by calendar date. Built fresh
/// for every evaluation and discarded afterwards; never stored on the
/// [`Agent`].
#[derive(Debug, Clone, Default)]
pub struct AgentLedger {
    /// Meeting indices per date, in insertion order.
    pub by_date: BTreeMap<NaiveDate, Vec<usize>>,
}

impl AgentLedger {
    /// Records a meeting.
    pub fn add(&mut self, index: usize, meeting: &Meeting) {
        self.by_date.entry(meeting.date()).or_default().push(index);
    }

    /// Whether the agent already has anything booked on a date.
    pub fn is_busy_on(&self, date: NaiveDate) -> bool {
        self.by_date.get(&date).is_some_and(|v| !v.is_empty())
    }

    /// Total number of meetings recorded.
    pub fn meeting_count(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    /// Number of distinct dates with at least one meeting.
    pub fn active_days(&self) -> usize {
        self.by_date.values().filter(|v| !v.is_empty()).count()
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.meeting_count() == 0
    }
}
