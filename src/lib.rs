//! Personnel rostering for the U-Engine ecosystem.
//!
//! Assigns skilled agents to timed meetings. Night meetings are covered by
//! a greedy preassignment pass; day meetings are optimized by a genetic
//! search against a weighted penalty/reward fitness.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Agent`, `Roster`, `Meeting`, `Schedule`
//! - **`config`**: `SearchConfig` and the `PenaltyWeights` table
//! - **`fitness`**: Schedule scoring with a per-category breakdown
//! - **`ga`**: Genetic operators and the generational search loop
//! - **`scheduler`**: Night pass, full pipeline, report and statistics
//! - **`validation`**: Input integrity checks (intervals, duplicate IDs, parameter ranges)
//! - **`error`**: Top-level error type
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_roster::{Agent, Meeting, Roster, RosterScheduler, SearchConfig};
//!
//! let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let meetings = vec![
//!     Meeting::day(day.and_hms_opt(8, 0, 0).unwrap(), day.and_hms_opt(12, 0, 0).unwrap(), "Fire").unwrap(),
//!     Meeting::day(day.and_hms_opt(13, 0, 0).unwrap(), day.and_hms_opt(15, 0, 0).unwrap(), "Monitoring").unwrap(),
//! ];
//! let roster = Roster::new(vec![Agent::new("Agent1").with_skill("Fire"), Agent::new("Agent2")]);
//!
//! let config = SearchConfig::default().with_population_size(20).with_generations(30).with_seed(42);
//! let report = RosterScheduler::new(config).schedule(&roster, &meetings).unwrap();
//! assert!(report.stats.filled <= meetings.len());
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of applications, methods and models"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

pub mod config;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use config::{NightAssignPolicy, PenaltyWeights, SearchConfig, WorkloadBasis};
pub use error::SchedulingError;
pub use fitness::{Evaluation, FitnessBreakdown, FitnessCategory, FitnessEvaluator};
pub use ga::{GaSearch, SearchResult};
pub use models::{Agent, AgentId, Meeting, Roster, Schedule};
pub use scheduler::{NightShiftPreassigner, RosterScheduler, ScheduleReport, ScheduleStats};
