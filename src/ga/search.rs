//! Generational search loop.
//!
//! Drives a [`RosterProblem`] through elitist generational replacement:
//!
//! ```text
//! Initializing → Evaluating → Selecting → Reproducing ─┐
//!                    ▲                                  │
//!                    └──────────────────────────────────┘
//!                    │ (budget exhausted / stalled)
//!                    ▼
//!                Terminated
//! ```
//!
//! Each generation is scored and sorted (best first), its best score is
//! appended to the fitness history, and the top schedules are snapshotted.
//! The two best schedules survive unchanged; the rest of the next
//! generation is bred from parent pairs drawn from the top half through
//! crossover, mutation and repair.
//!
//! # Parallelism
//! Scoring and breeding run on rayon's pool when `SearchConfig::parallel`
//! is set. Every parent pair gets its own `SmallRng` seeded from the
//! master generator on the calling thread, so a seeded search produces the
//! same result with or without parallelism.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::operators::{crossover, mutate, repair};
use super::problem::{initialize, RosterProblem};
use crate::error::SchedulingError;
use crate::fitness::Evaluation;
use crate::models::Schedule;
use crate::validation::validate_config;

/// Schedules carried over unchanged into each next generation.
pub const ELITE_COUNT: usize = 2;

/// Size of the best-schedule snapshot kept for reporting.
pub const TOP_K: usize = 3;

/// Phase of the generational loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Building the initial population.
    Initializing,
    /// Scoring and sorting the current population.
    Evaluating,
    /// Picking elites and parent pairs.
    Selecting,
    /// Breeding children into the next population.
    Reproducing,
    /// Budget exhausted; results are final.
    Terminated,
}

/// A schedule with its fitness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSchedule {
    /// The schedule.
    pub schedule: Schedule,
    /// Its fitness score.
    pub score: f64,
}

/// Outcome of a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Best schedule of the final population.
    pub best: Schedule,
    /// Score and breakdown of `best`.
    pub evaluation: Evaluation,
    /// Best score of each evaluated generation, in order.
    pub fitness_history: Vec<f64>,
    /// Up to [`TOP_K`] best schedules of the final population, best first.
    pub top_schedules: Vec<ScoredSchedule>,
    /// Generations actually bred.
    pub generations: usize,
}

impl SearchResult {
    /// Score of the best schedule.
    pub fn best_score(&self) -> f64 {
        self.evaluation.score
    }
}

/// Elitist generational GA over a rostering problem.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_roster::config::SearchConfig;
/// use u_roster::ga::{GaSearch, RosterProblem};
/// use u_roster::models::{Agent, Meeting, Roster};
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// let meetings: Vec<Meeting> = [8, 10, 12, 14]
///     .into_iter()
///     .map(|h| Meeting::day(
///         day.and_hms_opt(h, 0, 0).unwrap(),
///         day.and_hms_opt(h + 1, 0, 0).unwrap(),
///         "Fire",
///     ).unwrap())
///     .collect();
/// let roster = Roster::new(vec![Agent::new("A1").with_skill("Fire")]);
/// let config = SearchConfig::default()
///     .with_population_size(10)
///     .with_generations(5)
///     .with_seed(42);
///
/// let problem = RosterProblem::new(&roster, &meetings, &config);
/// let result = GaSearch::new(problem).run().unwrap();
/// assert_eq!(result.fitness_history.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct GaSearch<'a> {
    problem: RosterProblem<'a>,
}

impl<'a> GaSearch<'a> {
    /// Creates a search over a problem.
    pub fn new(problem: RosterProblem<'a>) -> Self {
        Self { problem }
    }

    /// The problem being searched.
    pub fn problem(&self) -> &RosterProblem<'a> {
        &self.problem
    }

    /// Runs the search, seeding from `SearchConfig::seed` (or the OS).
    ///
    /// # Errors
    /// [`SchedulingError::InvalidInput`] when the configuration fails
    /// [`validate_config`]; nothing is searched in that case.
    pub fn run(&self) -> Result<SearchResult, SchedulingError> {
        let mut rng = match self.problem.config().seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.run_with_rng(&mut rng)
    }

    /// Runs the search with a caller-provided generator.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> Result<SearchResult, SchedulingError> {
        let config = self.problem.config();
        validate_config(config)?;
        let pop_size = config.population_size;

        if self.problem.is_degenerate() && self.problem.meeting_count() > 0 {
            tracing::warn!(
                meetings = self.problem.meeting_count(),
                "no meeting has an eligible agent; search will yield an empty schedule"
            );
        }

        let mut state = SearchState::Initializing;
        let mut population: Vec<Schedule> = Vec::new();
        let mut scored: Vec<ScoredSchedule> = Vec::new();
        let mut pairs: Vec<(usize, usize, u64)> = Vec::new();
        let mut history: Vec<f64> = Vec::with_capacity(config.generations);
        let mut top: Vec<ScoredSchedule> = Vec::new();
        let mut generation = 0usize;
        let mut stall = 0usize;

        loop {
            state = match state {
                SearchState::Initializing => {
                    population = initialize(pop_size, &self.problem, config.fill_probability, rng);
                    SearchState::Evaluating
                }
                SearchState::Evaluating => {
                    scored = self.evaluate_population(std::mem::take(&mut population));
                    top = scored.iter().take(TOP_K).cloned().collect();

                    if generation >= config.generations {
                        SearchState::Terminated
                    } else {
                        let best = scored[0].score;
                        match history.last() {
                            Some(&prev) if best <= prev => stall += 1,
                            _ => stall = 0,
                        }
                        history.push(best);
                        tracing::debug!(generation, best, "generation evaluated");

                        if config.stall_generations.is_some_and(|limit| stall >= limit) {
                            tracing::debug!(generation, stall, "search stalled");
                            SearchState::Terminated
                        } else {
                            SearchState::Selecting
                        }
                    }
                }
                SearchState::Selecting => {
                    population = scored
                        .iter()
                        .take(ELITE_COUNT.min(pop_size))
                        .map(|s| s.schedule.clone())
                        .collect();
                    pairs = select_parents(scored.len(), pop_size - population.len(), rng);
                    SearchState::Reproducing
                }
                SearchState::Reproducing => {
                    let needed = pop_size - population.len();
                    let children = self.breed(&scored, &pairs);
                    population.extend(children.into_iter().take(needed));
                    generation += 1;
                    SearchState::Evaluating
                }
                SearchState::Terminated => break,
            };
        }

        let best = scored
            .first()
            .map(|s| s.schedule.clone())
            .unwrap_or_default();
        let evaluation = self.problem.evaluate(&best);

        tracing::info!(
            generations = generation,
            best_score = evaluation.score,
            filled = best.assignment_count(),
            meetings = self.problem.meeting_count(),
            "search finished"
        );

        Ok(SearchResult {
            best,
            evaluation,
            fitness_history: history,
            top_schedules: top,
            generations: generation,
        })
    }

    /// Scores a population and sorts it best first.
    ///
    /// The sort is stable, so equally scored schedules keep their order.
    fn evaluate_population(&self, population: Vec<Schedule>) -> Vec<ScoredSchedule> {
        let problem = &self.problem;
        let score = |schedule: Schedule| {
            let score = problem.score(&schedule);
            ScoredSchedule { schedule, score }
        };

        let mut scored: Vec<ScoredSchedule> = if problem.config().parallel {
            population.into_par_iter().map(score).collect()
        } else {
            population.into_iter().map(score).collect()
        };
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    /// Crossover, mutation and repair for each `(parent, parent, seed)`.
    fn breed(&self, scored: &[ScoredSchedule], pairs: &[(usize, usize, u64)]) -> Vec<Schedule> {
        let problem = &self.problem;
        let config = problem.config();
        let offspring = |&(a, b, seed): &(usize, usize, u64)| {
            let mut rng = SmallRng::seed_from_u64(seed);
            let (mut c1, mut c2) = crossover(
                &scored[a].schedule,
                &scored[b].schedule,
                problem.meeting_count(),
                &mut rng,
            );
            mutate(&mut c1, problem, config.mutation_rate, config.unassign_probability, &mut rng);
            mutate(&mut c2, problem, config.mutation_rate, config.unassign_probability, &mut rng);
            [repair(&c1, problem.meetings()), repair(&c2, problem.meetings())]
        };

        let children: Vec<[Schedule; 2]> = if config.parallel {
            pairs.par_iter().map(offspring).collect()
        } else {
            pairs.iter().map(offspring).collect()
        };
        children.into_iter().flatten().collect()
    }
}

/// Draws parent pairs for `needed` children from the top half.
///
/// Parents of one pair are distinct; pairs are independent. Each pair also
/// carries a seed for its private generator. No pairs are drawn when fewer
/// than two schedules are available.
fn select_parents<R: Rng>(
    population_len: usize,
    needed: usize,
    rng: &mut R,
) -> Vec<(usize, usize, u64)> {
    let pool = (population_len / 2).max(2).min(population_len);
    if pool < 2 {
        return Vec::new();
    }
    (0..needed.div_ceil(2))
        .map(|_| {
            let picked = rand::seq::index::sample(rng, pool, 2);
            (picked.index(0), picked.index(1), rng.random())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::fitness::FitnessCategory;
    use crate::models::{Agent, Meeting, Roster, WILDCARD_SKILL};
    use crate::validation::ValidationErrorKind;
    use chrono::NaiveDate;

    fn meeting(day: u32, from: u32, to: u32, skill: &str) -> Meeting {
        let d = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        Meeting::day(
            d.and_hms_opt(from, 0, 0).unwrap(),
            d.and_hms_opt(to, 0, 0).unwrap(),
            skill,
        )
        .unwrap()
    }

    fn week_of_meetings() -> Vec<Meeting> {
        let skills = ["Fire", "Maintenance", WILDCARD_SKILL];
        let mut meetings = Vec::new();
        for day in 4..9 {
            for (i, hour) in [8, 9, 11, 13, 14, 16].into_iter().enumerate() {
                meetings.push(meeting(day, hour, hour + 2, skills[(i + day as usize) % 3]));
            }
        }
        meetings
    }

    fn sample_roster() -> Roster {
        Roster::from_skills(vec![
            ("Agent1", vec!["Fire", "Security"]),
            ("Agent2", vec!["Maintenance", "Security"]),
            ("Agent3", vec!["Fire"]),
            ("Agent4", vec!["Security"]),
            ("Agent5", vec![]),
        ])
    }

    #[test]
    fn test_history_is_non_decreasing() {
        let meetings = week_of_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default()
            .with_population_size(20)
            .with_generations(50)
            .with_seed(42);
        let problem = RosterProblem::new(&roster, &meetings, &config);

        let result = GaSearch::new(problem).run().unwrap();
        assert_eq!(result.fitness_history.len(), 50);
        assert_eq!(result.generations, 50);
        for pair in result.fitness_history.windows(2) {
            assert!(pair[1] >= pair[0], "history decreased: {pair:?}");
        }
        // Final best is at least as good as the last recorded generation
        assert!(result.best_score() >= *result.fitness_history.last().unwrap());
    }

    #[test]
    fn test_search_is_deterministic() {
        let meetings = week_of_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default()
            .with_population_size(12)
            .with_generations(15)
            .with_seed(7);
        let problem = RosterProblem::new(&roster, &meetings, &config);
        let search = GaSearch::new(problem);

        let a = search.run().unwrap();
        let b = search.run().unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.fitness_history, b.fitness_history);
        assert_eq!(a.top_schedules, b.top_schedules);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let meetings = week_of_meetings();
        let roster = sample_roster();
        let parallel = SearchConfig::default()
            .with_population_size(12)
            .with_generations(10)
            .with_seed(11)
            .with_parallel(true);
        let sequential = parallel.clone().with_parallel(false);

        let a = GaSearch::new(RosterProblem::new(&roster, &meetings, &parallel)).run().unwrap();
        let b = GaSearch::new(RosterProblem::new(&roster, &meetings, &sequential)).run().unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.fitness_history, b.fitness_history);
    }

    #[test]
    fn test_top_schedules_sorted() {
        let meetings = week_of_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default()
            .with_population_size(10)
            .with_generations(5)
            .with_seed(1);
        let result = GaSearch::new(RosterProblem::new(&roster, &meetings, &config)).run().unwrap();

        assert_eq!(result.top_schedules.len(), TOP_K);
        assert!(result
            .top_schedules
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert_eq!(result.top_schedules[0].schedule, result.best);
        assert!((result.top_schedules[0].score - result.best_score()).abs() < 1e-10);
    }

    #[test]
    fn test_zero_generations_capacity() {
        // Two agents, five well-spaced meetings that both can cover
        let meetings: Vec<Meeting> = [8, 10, 12, 14, 16]
            .into_iter()
            .map(|h| meeting(4, h, h + 1, WILDCARD_SKILL))
            .collect();
        let roster = Roster::new(vec![Agent::new("A1"), Agent::new("A2")]);

        let mut found = false;
        for seed in 0..10 {
            let config = SearchConfig::default()
                .with_population_size(5)
                .with_generations(0)
                .with_fill_probability(1.0)
                .with_seed(seed);
            let result = GaSearch::new(RosterProblem::new(&roster, &meetings, &config)).run().unwrap();

            assert!(result.fitness_history.is_empty());
            assert_eq!(result.generations, 0);
            let breakdown = &result.evaluation.breakdown;
            if result.best.assignment_count() == meetings.len()
                && !breakdown.contains(FitnessCategory::Overlap)
                && !breakdown.contains(FitnessCategory::BreakViolation)
            {
                found = true;
            }
        }
        assert!(found);
    }

    #[test]
    fn test_single_individual_population() {
        let meetings = week_of_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default()
            .with_population_size(1)
            .with_generations(5)
            .with_seed(3);
        let result = GaSearch::new(RosterProblem::new(&roster, &meetings, &config)).run().unwrap();

        // Only the elite survives; its score cannot change
        assert_eq!(result.fitness_history.len(), 5);
        assert!(result.fitness_history.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_empty_roster_terminates() {
        let meetings = week_of_meetings();
        let roster = Roster::default();
        let config = SearchConfig::default()
            .with_population_size(6)
            .with_generations(4)
            .with_seed(5);
        let result = GaSearch::new(RosterProblem::new(&roster, &meetings, &config)).run().unwrap();

        assert!(result.best.is_empty());
        assert_eq!(result.fitness_history.len(), 4);
        assert!(result.best_score() < 0.0);
    }

    #[test]
    fn test_no_meetings() {
        let roster = sample_roster();
        let config = SearchConfig::default()
            .with_population_size(4)
            .with_generations(3)
            .with_seed(5);
        let result = GaSearch::new(RosterProblem::new(&roster, &[], &config)).run().unwrap();
        assert!(result.best.is_empty());
        assert_eq!(result.fitness_history.len(), 3);
    }

    #[test]
    fn test_stall_stops_early() {
        let meetings = vec![meeting(4, 8, 9, "Fire")];
        let roster = Roster::new(vec![Agent::new("A1").with_skill("Fire")]);
        let config = SearchConfig::default()
            .with_population_size(4)
            .with_generations(100)
            .with_fill_probability(1.0)
            .with_stall_generations(3)
            .with_seed(9);
        let result = GaSearch::new(RosterProblem::new(&roster, &meetings, &config)).run().unwrap();

        // The optimum is found at once; three flat generations end the run
        assert_eq!(result.fitness_history.len(), 4);
        assert!(result.generations < 100);
    }

    #[test]
    fn test_zero_population_rejected() {
        let meetings = week_of_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default()
            .with_population_size(0)
            .with_generations(3)
            .with_seed(42);

        let err = GaSearch::new(RosterProblem::new(&roster, &meetings, &config))
            .run()
            .unwrap_err();
        let SchedulingError::InvalidInput(errors) = err else {
            panic!("expected invalid input");
        };
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidPopulationSize));
    }

    #[test]
    fn test_out_of_range_mutation_rate_rejected() {
        let meetings = week_of_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default()
            .with_population_size(10)
            .with_generations(3)
            .with_mutation_rate(1.5);

        let mut rng = SmallRng::seed_from_u64(42);
        let err = GaSearch::new(RosterProblem::new(&roster, &meetings, &config))
            .run_with_rng(&mut rng)
            .unwrap_err();
        let SchedulingError::InvalidInput(errors) = err else {
            panic!("expected invalid input");
        };
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidProbability));
    }

    #[test]
    fn test_select_parents() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pairs = select_parents(20, 18, &mut rng);
        assert_eq!(pairs.len(), 9);
        for &(a, b, _) in &pairs {
            assert_ne!(a, b);
            assert!(a < 10 && b < 10);
        }

        // Odd child count still needs a whole pair
        assert_eq!(select_parents(20, 3, &mut rng).len(), 2);
        // Too small to breed
        assert!(select_parents(1, 0, &mut rng).is_empty());
        // Small populations draw from at least two parents
        let pairs = select_parents(3, 1, &mut rng);
        assert!(pairs.iter().all(|&(a, b, _)| a < 2 && b < 2));
    }
}
