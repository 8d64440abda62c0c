//! Rostering pipeline, night-shift pass and schedule statistics.
//!
//! # Pipeline
//!
//! [`RosterScheduler`] runs a full rostering pass:
//!
//! 1. Validate the configuration, meetings and roster.
//! 2. Cover night meetings with [`NightShiftPreassigner`].
//! 3. Run the GA ([`GaSearch`]) over the day meetings only.
//! 4. Merge both schedules and score the result over all meetings.
//!
//! The day search sees a compacted meeting list; its schedules are mapped
//! back to input indices before they are reported.
//!
//! # Statistics
//!
//! [`ScheduleStats`] summarizes per-agent load, night shifts, hours and
//! fill rate.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of applications, methods and models"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod night;
mod report;
mod stats;

pub use night::NightShiftPreassigner;
pub use report::ScheduleReport;
pub use stats::ScheduleStats;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SearchConfig;
use crate::error::SchedulingError;
use crate::fitness::FitnessEvaluator;
use crate::ga::{GaSearch, RosterProblem, ScoredSchedule};
use crate::models::{Meeting, Roster};
use crate::validation::{validate_config, validate_input};

/// Night pass plus GA day search.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_roster::config::SearchConfig;
/// use u_roster::models::{Agent, Meeting, Roster};
/// use u_roster::scheduler::RosterScheduler;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// let meetings = vec![
///     Meeting::day(
///         day.and_hms_opt(9, 0, 0).unwrap(),
///         day.and_hms_opt(11, 0, 0).unwrap(),
///         "Fire",
///     ).unwrap(),
///     Meeting::night(
///         day.and_hms_opt(22, 0, 0).unwrap(),
///         day.succ_opt().unwrap().and_hms_opt(6, 0, 0).unwrap(),
///         "Security",
///     ).unwrap(),
/// ];
/// let roster = Roster::new(vec![
///     Agent::new("A1").with_skill("Fire"),
///     Agent::new("A2").with_skill("Security"),
/// ]);
/// let config = SearchConfig::default()
///     .with_population_size(10)
///     .with_generations(10)
///     .with_seed(42);
///
/// let report = RosterScheduler::new(config).schedule(&roster, &meetings).unwrap();
/// assert_eq!(report.schedule.agent_for(1), Some("A2"));
/// assert_eq!(report.fitness_history.len(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RosterScheduler {
    config: SearchConfig,
}

impl RosterScheduler {
    /// Creates a scheduler.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Rosters agents onto meetings.
    ///
    /// Seeds from `SearchConfig::seed`, or from the OS when unset.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidInput`] with every validation problem found.
    /// An infeasible roster is not an error; it shows up as unfilled
    /// meetings and penalties in the report.
    pub fn schedule(
        &self,
        roster: &Roster,
        meetings: &[Meeting],
    ) -> Result<ScheduleReport, SchedulingError> {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.schedule_with_rng(roster, meetings, &mut rng)
    }

    /// Rosters agents onto meetings with a caller-provided generator.
    pub fn schedule_with_rng<R: Rng>(
        &self,
        roster: &Roster,
        meetings: &[Meeting],
        rng: &mut R,
    ) -> Result<ScheduleReport, SchedulingError> {
        let mut errors = Vec::new();
        if let Err(e) = validate_config(&self.config) {
            errors.extend(e);
        }
        if let Err(e) = validate_input(meetings, roster) {
            errors.extend(e);
        }
        if !errors.is_empty() {
            return Err(SchedulingError::InvalidInput(errors));
        }

        let night_schedule = NightShiftPreassigner::new(&self.config).assign(roster, meetings, rng);

        // Day search runs on a compacted list; index_map[local] = input index
        let (index_map, day_meetings): (Vec<usize>, Vec<Meeting>) = meetings
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_night)
            .map(|(i, m)| (i, m.clone()))
            .unzip();

        tracing::debug!(
            night = meetings.len() - day_meetings.len(),
            night_filled = night_schedule.assignment_count(),
            day = day_meetings.len(),
            "night pass finished"
        );

        let problem = RosterProblem::new(roster, &day_meetings, &self.config);
        let result = GaSearch::new(problem).run_with_rng(rng)?;

        let schedule = night_schedule.clone().merge(result.best.remap(&index_map));
        let evaluation = FitnessEvaluator::new(roster, meetings, &self.config).evaluate(&schedule);
        let stats = ScheduleStats::calculate(&schedule, roster, meetings);

        tracing::info!(
            score = evaluation.score,
            filled = stats.filled,
            unfilled = stats.unfilled,
            generations = result.generations,
            "roster scheduled"
        );

        Ok(ScheduleReport {
            schedule,
            night_schedule,
            fitness_history: result.fitness_history,
            top_schedules: result
                .top_schedules
                .into_iter()
                .map(|s| ScoredSchedule {
                    schedule: s.schedule.remap(&index_map),
                    score: s.score,
                })
                .collect(),
            day_breakdown: result.evaluation.breakdown,
            evaluation,
            stats,
            generations: result.generations,
        })
    }
}
