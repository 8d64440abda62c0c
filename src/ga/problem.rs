//! Rostering GA problem definition.
//!
//! Bridges the domain models (`Roster`, `Meeting`) to the genetic search.
//! Precomputes the eligible agents of every meeting once, so operators can
//! draw candidates without rescanning the roster.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::config::SearchConfig;
use crate::fitness::{Evaluation, FitnessEvaluator};
use crate::models::{Meeting, Roster, Schedule};

/// GA problem for assigning agents to meetings.
///
/// Schedules produced and scored through a problem use indices into its
/// meeting slice.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_roster::config::SearchConfig;
/// use u_roster::ga::RosterProblem;
/// use u_roster::models::{Agent, Meeting, Roster};
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// let meetings = vec![Meeting::day(
///     day.and_hms_opt(9, 0, 0).unwrap(),
///     day.and_hms_opt(11, 0, 0).unwrap(),
///     "Fire",
/// ).unwrap()];
/// let roster = Roster::new(vec![Agent::new("A1").with_skill("Fire")]);
/// let config = SearchConfig::default();
///
/// let problem = RosterProblem::new(&roster, &meetings, &config);
/// let mut rng = SmallRng::seed_from_u64(42);
/// let schedule = problem.create_individual(1.0, &mut rng);
/// assert_eq!(schedule.agent_for(0), Some("A1"));
/// ```
#[derive(Debug, Clone)]
pub struct RosterProblem<'a> {
    roster: &'a Roster,
    meetings: &'a [Meeting],
    config: &'a SearchConfig,
    /// Eligible roster positions per meeting.
    candidates: Vec<Vec<usize>>,
    evaluator: FitnessEvaluator<'a>,
}

impl<'a> RosterProblem<'a> {
    /// Creates a problem over a roster and meeting list.
    pub fn new(roster: &'a Roster, meetings: &'a [Meeting], config: &'a SearchConfig) -> Self {
        let candidates = meetings.iter().map(|m| roster.eligible_for(m)).collect();
        Self {
            roster,
            meetings,
            config,
            candidates,
            evaluator: FitnessEvaluator::new(roster, meetings, config),
        }
    }

    /// Number of meetings (the gene count of a schedule).
    pub fn meeting_count(&self) -> usize {
        self.meetings.len()
    }

    /// Meetings being scheduled.
    pub fn meetings(&self) -> &'a [Meeting] {
        self.meetings
    }

    /// Search configuration.
    pub fn config(&self) -> &'a SearchConfig {
        self.config
    }

    /// Roster positions eligible for a meeting.
    pub fn candidates(&self, meeting: usize) -> &[usize] {
        self.candidates.get(meeting).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether no meeting has an eligible agent.
    pub fn is_degenerate(&self) -> bool {
        self.candidates.iter().all(Vec::is_empty)
    }

    /// Uniformly random eligible agent id for a meeting.
    pub fn random_agent<R: Rng>(&self, meeting: usize, rng: &mut R) -> Option<&'a str> {
        let roster = self.roster;
        self.candidates(meeting)
            .choose(rng)
            .and_then(|&pos| roster.get(pos))
            .map(|a| a.id.as_str())
    }

    /// Creates a random schedule.
    ///
    /// Each meeting is filled with probability `fill_probability` by a
    /// uniformly chosen eligible agent. Meetings without eligible agents
    /// stay unfilled whatever the draw.
    pub fn create_individual<R: Rng>(&self, fill_probability: f64, rng: &mut R) -> Schedule {
        let mut schedule = Schedule::new();
        for idx in 0..self.meeting_count() {
            if !rng.random_bool(fill_probability) {
                continue;
            }
            if let Some(agent) = self.random_agent(idx, rng) {
                schedule.assign(idx, agent);
            }
        }
        schedule
    }

    /// Scores a schedule.
    pub fn evaluate(&self, schedule: &Schedule) -> Evaluation {
        self.evaluator.evaluate(schedule)
    }

    /// Scalar fitness of a schedule.
    pub fn score(&self, schedule: &Schedule) -> f64 {
        self.evaluator.score(schedule)
    }
}

/// Builds an initial population of `pop_size` random schedules.
pub fn initialize<R: Rng>(
    pop_size: usize,
    problem: &RosterProblem<'_>,
    fill_probability: f64,
    rng: &mut R,
) -> Vec<Schedule> {
    (0..pop_size)
        .map(|_| problem.create_individual(fill_probability, rng))
        .collect()
}
