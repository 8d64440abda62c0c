//! GA-based roster optimization.
//!
//! A schedule is a sparse map from meeting index to agent id; a missing
//! entry is an unfilled meeting. The search evolves populations of such
//! schedules under an elitist generational scheme.
//!
//! # Submodules
//!
//! - [`operators`]: crossover, mutation and overlap repair
//! - [`search`]: the generational loop and its result
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

pub mod operators;
mod problem;
pub mod search;

pub use operators::{crossover, mutate, repair};
pub use problem::{initialize, RosterProblem};
pub use search::{GaSearch, ScoredSchedule, SearchResult, SearchState, ELITE_COUNT, TOP_K};
