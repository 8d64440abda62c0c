//! Search configuration.
//!
//! [`SearchConfig`] gathers every tunable constant of a rostering run:
//! GA parameters, working-time bounds and the penalty-weight table. It is
//! built once before a search and treated as immutable afterwards.
//!
//! Configurations can be built in code (`SearchConfig::default().with_..`)
//! or loaded from JSON; missing JSON fields fall back to the defaults.
//!
//! ```
//! use u_roster::config::SearchConfig;
//!
//! let config = SearchConfig::from_json(r#"{ "population_size": 30, "seed": 7 }"#).unwrap();
//! assert_eq!(config.population_size, 30);
//! assert_eq!(config.generations, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;
use crate::fitness::FitnessCategory;
use crate::validation::{validate_config, ValidationResult};

/// Quantity used to measure workload balance across agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadBasis {
    /// Number of meetings assigned to each agent.
    #[default]
    MeetingCount,
    /// Number of distinct dates each agent works.
    ActiveDays,
}

/// How the night-shift pass picks among available agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightAssignPolicy {
    /// Uniformly random among available agents.
    #[default]
    Random,
    /// Agent with the fewest night shifts so far; ties broken at random.
    LeastLoaded,
}

/// Penalty and reward weights, one per [`FitnessCategory`].
///
/// All weights are non-negative magnitudes; whether a category adds or
/// subtracts is fixed by [`FitnessCategory::is_reward`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Per assignment to an agent lacking the required skill.
    pub skill_mismatch: f64,
    /// Per pair of overlapping meetings on one agent's date.
    pub overlap: f64,
    /// Per pair of consecutive meetings with too short a gap.
    pub break_violation: f64,
    /// Per hour above the daily maximum.
    pub overwork: f64,
    /// Per hour below the daily minimum.
    pub underwork: f64,
    /// Flat reward per working day within the daily bounds.
    pub balanced_day: f64,
    /// Per extra night meeting on the same date.
    pub multiple_night_shifts: f64,
    /// Per date mixing night and day meetings.
    pub night_day_mix: f64,
    /// Per transition between working days with insufficient rest.
    pub rest_violation: f64,
    /// Per hour above the weekly maximum.
    pub weekly_overwork: f64,
    /// Per working day beyond the consecutive-day limit.
    pub consecutive_days: f64,
    /// Per unit of absolute deviation from the mean workload.
    pub uneven_distribution: f64,
    /// Per unit of absolute deviation from the mean night-shift count.
    pub uneven_night_shifts: f64,
    /// Reward per filled meeting.
    pub scheduled_meeting: f64,
    /// Penalty per unfilled meeting.
    pub unfilled_meeting: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            skill_mismatch: 1000.0,
            overlap: 1000.0,
            break_violation: 500.0,
            overwork: 100.0,
            underwork: 50.0,
            balanced_day: 10.0,
            multiple_night_shifts: 2000.0,
            night_day_mix: 2000.0,
            rest_violation: 300.0,
            weekly_overwork: 100.0,
            consecutive_days: 200.0,
            uneven_distribution: 20.0,
            uneven_night_shifts: 200.0,
            scheduled_meeting: 0.0,
            unfilled_meeting: 500.0,
        }
    }
}

impl PenaltyWeights {
    /// Weight for a category.
    pub fn weight(&self, category: FitnessCategory) -> f64 {
        match category {
            FitnessCategory::SkillMismatch => self.skill_mismatch,
            FitnessCategory::Overlap => self.overlap,
            FitnessCategory::BreakViolation => self.break_violation,
            FitnessCategory::Overwork => self.overwork,
            FitnessCategory::Underwork => self.underwork,
            FitnessCategory::BalancedDay => self.balanced_day,
            FitnessCategory::MultipleNightShifts => self.multiple_night_shifts,
            FitnessCategory::NightDayMix => self.night_day_mix,
            FitnessCategory::RestViolation => self.rest_violation,
            FitnessCategory::WeeklyOverwork => self.weekly_overwork,
            FitnessCategory::ConsecutiveDays => self.consecutive_days,
            FitnessCategory::UnevenDistribution => self.uneven_distribution,
            FitnessCategory::UnevenNightShifts => self.uneven_night_shifts,
            FitnessCategory::ScheduledMeeting => self.scheduled_meeting,
            FitnessCategory::UnfilledMeeting => self.unfilled_meeting,
        }
    }

    /// Sets the weight for a category.
    pub fn with_weight(mut self, category: FitnessCategory, weight: f64) -> Self {
        let slot = match category {
            FitnessCategory::SkillMismatch => &mut self.skill_mismatch,
            FitnessCategory::Overlap => &mut self.overlap,
            FitnessCategory::BreakViolation => &mut self.break_violation,
            FitnessCategory::Overwork => &mut self.overwork,
            FitnessCategory::Underwork => &mut self.underwork,
            FitnessCategory::BalancedDay => &mut self.balanced_day,
            FitnessCategory::MultipleNightShifts => &mut self.multiple_night_shifts,
            FitnessCategory::NightDayMix => &mut self.night_day_mix,
            FitnessCategory::RestViolation => &mut self.rest_violation,
            FitnessCategory::WeeklyOverwork => &mut self.weekly_overwork,
            FitnessCategory::ConsecutiveDays => &mut self.consecutive_days,
            FitnessCategory::UnevenDistribution => &mut self.uneven_distribution,
            FitnessCategory::UnevenNightShifts => &mut self.uneven_night_shifts,
            FitnessCategory::ScheduledMeeting => &mut self.scheduled_meeting,
            FitnessCategory::UnfilledMeeting => &mut self.unfilled_meeting,
        };
        *slot = weight;
        self
    }

    /// Weights with every category set to zero.
    pub fn zero() -> Self {
        FitnessCategory::ALL
            .iter()
            .fold(Self::default(), |w, &c| w.with_weight(c, 0.0))
    }
}

/// Configuration of a rostering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Schedules per generation. Must be positive.
    pub population_size: usize,
    /// Number of generations to run.
    pub generations: usize,
    /// Per-meeting resampling probability during mutation.
    pub mutation_rate: f64,
    /// Probability that initialization fills a meeting.
    pub fill_probability: f64,
    /// Probability that a resampled filled meeting is unassigned instead of
    /// reassigned.
    pub unassign_probability: f64,
    /// Minimum hours per working day.
    pub min_daily_hours: f64,
    /// Maximum hours per working day.
    pub max_daily_hours: f64,
    /// Maximum hours per ISO week.
    pub max_weekly_hours: f64,
    /// Minimum gap between consecutive meetings on one date (minutes).
    pub min_break_minutes: i64,
    /// Travel time added to the minimum break (minutes).
    pub travel_buffer_minutes: i64,
    /// Minimum rest between the end of one working date and the next (hours).
    pub min_rest_hours: f64,
    /// Maximum calendar-consecutive working days.
    pub max_consecutive_days: usize,
    /// Skill that qualifies an agent for night shifts.
    pub night_skill: String,
    /// Workload measure for the uneven-distribution term.
    pub workload_basis: WorkloadBasis,
    /// Selection policy of the night-shift pass.
    pub night_policy: NightAssignPolicy,
    /// Penalty/reward weight table.
    pub weights: PenaltyWeights,
    /// Random seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Evaluate and reproduce in parallel.
    pub parallel: bool,
    /// Stop after this many generations without improvement. `None` runs
    /// the full generation budget.
    pub stall_generations: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.1,
            fill_probability: 0.9,
            unassign_probability: 0.1,
            min_daily_hours: 6.0,
            max_daily_hours: 10.0,
            max_weekly_hours: 48.0,
            min_break_minutes: 30,
            travel_buffer_minutes: 0,
            min_rest_hours: 11.0,
            max_consecutive_days: 6,
            night_skill: "Security".to_string(),
            workload_basis: WorkloadBasis::default(),
            night_policy: NightAssignPolicy::default(),
            weights: PenaltyWeights::default(),
            seed: None,
            parallel: true,
            stall_generations: None,
        }
    }
}

impl SearchConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, SchedulingError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().map_err(SchedulingError::InvalidInput)?;
        Ok(config)
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> ValidationResult {
        validate_config(self)
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation count.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the initial fill probability.
    pub fn with_fill_probability(mut self, probability: f64) -> Self {
        self.fill_probability = probability;
        self
    }

    /// Sets the unassign sub-probability of mutation.
    pub fn with_unassign_probability(mut self, probability: f64) -> Self {
        self.unassign_probability = probability;
        self
    }

    /// Sets the daily hour bounds.
    pub fn with_daily_hours(mut self, min: f64, max: f64) -> Self {
        self.min_daily_hours = min;
        self.max_daily_hours = max;
        self
    }

    /// Sets the weekly hour limit.
    pub fn with_max_weekly_hours(mut self, hours: f64) -> Self {
        self.max_weekly_hours = hours;
        self
    }

    /// Sets the minimum break and travel buffer (minutes).
    pub fn with_break(mut self, min_break_minutes: i64, travel_buffer_minutes: i64) -> Self {
        self.min_break_minutes = min_break_minutes;
        self.travel_buffer_minutes = travel_buffer_minutes;
        self
    }

    /// Sets the minimum rest between working days (hours).
    pub fn with_min_rest_hours(mut self, hours: f64) -> Self {
        self.min_rest_hours = hours;
        self
    }

    /// Sets the consecutive working-day limit.
    pub fn with_max_consecutive_days(mut self, days: usize) -> Self {
        self.max_consecutive_days = days;
        self
    }

    /// Sets the night-shift skill.
    pub fn with_night_skill(mut self, skill: impl Into<String>) -> Self {
        self.night_skill = skill.into();
        self
    }

    /// Sets the workload basis.
    pub fn with_workload_basis(mut self, basis: WorkloadBasis) -> Self {
        self.workload_basis = basis;
        self
    }

    /// Sets the night-shift selection policy.
    pub fn with_night_policy(mut self, policy: NightAssignPolicy) -> Self {
        self.night_policy = policy;
        self
    }

    /// Replaces the weight table.
    pub fn with_weights(mut self, weights: PenaltyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets one weight.
    pub fn with_weight(mut self, category: FitnessCategory, weight: f64) -> Self {
        self.weights = self.weights.with_weight(category, weight);
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables plateau early stopping.
    pub fn with_stall_generations(mut self, generations: usize) -> Self {
        self.stall_generations = Some(generations);
        self
    }

    /// Minimum gap between consecutive meetings (break + travel), in minutes.
    pub fn required_gap_minutes(&self) -> i64 {
        self.min_break_minutes + self.travel_buffer_minutes
    }
}
