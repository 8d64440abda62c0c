//! Schedule fitness evaluation.
//!
//! Scores a [`Schedule`] against the rostering rules and returns a scalar
//! (higher = better) together with a per-category [`FitnessBreakdown`].
//!
//! # Terms
//!
//! | Category | Scope | Magnitude |
//! |----------|-------|-----------|
//! | `skill_mismatch` | assignment | weight per occurrence |
//! | `overwork` / `underwork` | agent × date | weight × hours outside daily bounds |
//! | `balanced_day` (reward) | agent × date | weight per day within bounds |
//! | `overlap` | agent × date | weight per overlapping consecutive pair |
//! | `break_violation` | agent × date | weight per too-short gap |
//! | `multiple_night_shifts` | agent × date | weight × (night meetings − 1) |
//! | `night_day_mix` | agent × date | weight per mixed date |
//! | `rest_violation` | agent | weight per short rest between working dates |
//! | `weekly_overwork` | agent × ISO week | weight × hours above weekly max |
//! | `consecutive_days` | agent | weight per day beyond the run limit |
//! | `uneven_distribution` | roster | weight × Σ\|load − mean\| |
//! | `uneven_night_shifts` | roster | weight × Σ\|nights − mean\| |
//! | `scheduled_meeting` (reward) / `unfilled_meeting` | meetings | weight per meeting |
//!
//! Evaluation is a pure function of its inputs. Per-agent bookkeeping is
//! rebuilt in local [`AgentLedger`]s on every call, so evaluations of
//! different schedules can run concurrently.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::{SearchConfig, WorkloadBasis};
use crate::models::{AgentLedger, Meeting, Roster, Schedule};

/// Named penalty/reward contribution to the fitness score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FitnessCategory {
    SkillMismatch,
    Overlap,
    BreakViolation,
    Overwork,
    Underwork,
    BalancedDay,
    MultipleNightShifts,
    NightDayMix,
    RestViolation,
    WeeklyOverwork,
    ConsecutiveDays,
    UnevenDistribution,
    UnevenNightShifts,
    ScheduledMeeting,
    UnfilledMeeting,
}

impl FitnessCategory {
    /// Every category, in declaration order.
    pub const ALL: &'static [FitnessCategory] = &[
        FitnessCategory::SkillMismatch,
        FitnessCategory::Overlap,
        FitnessCategory::BreakViolation,
        FitnessCategory::Overwork,
        FitnessCategory::Underwork,
        FitnessCategory::BalancedDay,
        FitnessCategory::MultipleNightShifts,
        FitnessCategory::NightDayMix,
        FitnessCategory::RestViolation,
        FitnessCategory::WeeklyOverwork,
        FitnessCategory::ConsecutiveDays,
        FitnessCategory::UnevenDistribution,
        FitnessCategory::UnevenNightShifts,
        FitnessCategory::ScheduledMeeting,
        FitnessCategory::UnfilledMeeting,
    ];

    /// Snake-case name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            FitnessCategory::SkillMismatch => "skill_mismatch",
            FitnessCategory::Overlap => "overlap",
            FitnessCategory::BreakViolation => "break_violation",
            FitnessCategory::Overwork => "overwork",
            FitnessCategory::Underwork => "underwork",
            FitnessCategory::BalancedDay => "balanced_day",
            FitnessCategory::MultipleNightShifts => "multiple_night_shifts",
            FitnessCategory::NightDayMix => "night_day_mix",
            FitnessCategory::RestViolation => "rest_violation",
            FitnessCategory::WeeklyOverwork => "weekly_overwork",
            FitnessCategory::ConsecutiveDays => "consecutive_days",
            FitnessCategory::UnevenDistribution => "uneven_distribution",
            FitnessCategory::UnevenNightShifts => "uneven_night_shifts",
            FitnessCategory::ScheduledMeeting => "scheduled_meeting",
            FitnessCategory::UnfilledMeeting => "unfilled_meeting",
        }
    }

    /// Whether the category adds to the score.
    pub fn is_reward(self) -> bool {
        matches!(
            self,
            FitnessCategory::BalancedDay | FitnessCategory::ScheduledMeeting
        )
    }
}

impl fmt::Display for FitnessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category magnitudes behind a fitness score.
///
/// Magnitudes are non-negative; the sign of each category comes from
/// [`FitnessCategory::is_reward`]. Categories that contributed nothing are
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FitnessBreakdown {
    entries: BTreeMap<FitnessCategory, f64>,
}

impl FitnessBreakdown {
    /// Creates an empty breakdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates a magnitude. Zero magnitudes are not recorded.
    pub fn add(&mut self, category: FitnessCategory, magnitude: f64) {
        if magnitude != 0.0 {
            *self.entries.entry(category).or_insert(0.0) += magnitude;
        }
    }

    /// Accumulated magnitude of a category (0.0 if absent).
    pub fn get(&self, category: FitnessCategory) -> f64 {
        self.entries.get(&category).copied().unwrap_or(0.0)
    }

    /// Whether a category contributed.
    pub fn contains(&self, category: FitnessCategory) -> bool {
        self.entries.contains_key(&category)
    }

    /// Iterates `(category, magnitude)` in category order.
    pub fn iter(&self) -> impl Iterator<Item = (FitnessCategory, f64)> + '_ {
        self.entries.iter().map(|(&c, &m)| (c, m))
    }

    /// Sum of rewards minus sum of penalties.
    pub fn signed_total(&self) -> f64 {
        self.entries
            .iter()
            .map(|(c, &m)| if c.is_reward() { m } else { -m })
            .sum()
    }

    /// Whether nothing contributed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scalar fitness with its breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Signed fitness score (higher = better).
    pub score: f64,
    /// Diagnostic decomposition of `score`.
    pub breakdown: FitnessBreakdown,
}

/// Scores schedules against one roster, meeting list and configuration.
///
/// Holds only shared, immutable references plus an agent-id index, so one
/// evaluator can be used from many threads at once.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<'a> {
    roster: &'a Roster,
    meetings: &'a [Meeting],
    config: &'a SearchConfig,
    agent_index: HashMap<&'a str, usize>,
}

impl<'a> FitnessEvaluator<'a> {
    /// Creates an evaluator.
    pub fn new(roster: &'a Roster, meetings: &'a [Meeting], config: &'a SearchConfig) -> Self {
        let agent_index = roster
            .agents()
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.as_str(), i))
            .collect();
        Self {
            roster,
            meetings,
            config,
            agent_index,
        }
    }

    /// Meetings this evaluator scores against.
    pub fn meetings(&self) -> &'a [Meeting] {
        self.meetings
    }

    /// Scalar fitness of a schedule.
    pub fn score(&self, schedule: &Schedule) -> f64 {
        self.evaluate(schedule).score
    }

    /// Scores a schedule and returns the full breakdown.
    pub fn evaluate(&self, schedule: &Schedule) -> Evaluation {
        let weights = &self.config.weights;
        let mut breakdown = FitnessBreakdown::new();
        let mut ledgers = vec![AgentLedger::default(); self.roster.len()];
        let mut night_counts = vec![0usize; self.roster.len()];
        let mut filled = 0usize;

        for (idx, agent_id) in schedule.iter() {
            let Some(meeting) = self.meetings.get(idx) else {
                continue;
            };
            filled += 1;

            let Some(&pos) = self.agent_index.get(agent_id) else {
                // Unknown agents hold no skills
                breakdown.add(FitnessCategory::SkillMismatch, weights.skill_mismatch);
                continue;
            };
            if !self.roster.agents()[pos].can_cover(meeting) {
                breakdown.add(FitnessCategory::SkillMismatch, weights.skill_mismatch);
            }
            ledgers[pos].add(idx, meeting);
            if meeting.is_night {
                night_counts[pos] += 1;
            }
        }

        for ledger in &ledgers {
            self.score_agent(ledger, &mut breakdown);
        }

        let loads: Vec<f64> = ledgers
            .iter()
            .map(|l| match self.config.workload_basis {
                WorkloadBasis::MeetingCount => l.meeting_count() as f64,
                WorkloadBasis::ActiveDays => l.active_days() as f64,
            })
            .collect();
        breakdown.add(
            FitnessCategory::UnevenDistribution,
            absolute_deviation(&loads) * weights.uneven_distribution,
        );

        let nights: Vec<f64> = night_counts.iter().map(|&n| n as f64).collect();
        breakdown.add(
            FitnessCategory::UnevenNightShifts,
            absolute_deviation(&nights) * weights.uneven_night_shifts,
        );

        let unfilled = self.meetings.len().saturating_sub(filled);
        breakdown.add(
            FitnessCategory::ScheduledMeeting,
            filled as f64 * weights.scheduled_meeting,
        );
        breakdown.add(
            FitnessCategory::UnfilledMeeting,
            unfilled as f64 * weights.unfilled_meeting,
        );

        Evaluation {
            score: breakdown.signed_total(),
            breakdown,
        }
    }

    fn score_agent(&self, ledger: &AgentLedger, breakdown: &mut FitnessBreakdown) {
        if ledger.is_empty() {
            return;
        }
        let config = self.config;
        let weights = &config.weights;
        let required_gap = chrono::Duration::minutes(config.required_gap_minutes());

        let mut days: Vec<WorkDay> = Vec::with_capacity(ledger.by_date.len());

        for (&date, indices) in &ledger.by_date {
            let mut day: Vec<&Meeting> = indices.iter().map(|&i| &self.meetings[i]).collect();
            if day.is_empty() {
                continue;
            }
            day.sort_by_key(|m| m.start);

            let hours: f64 = day.iter().map(|m| m.duration_hours()).sum();
            if hours > config.max_daily_hours {
                breakdown.add(
                    FitnessCategory::Overwork,
                    (hours - config.max_daily_hours) * weights.overwork,
                );
            } else if hours < config.min_daily_hours {
                breakdown.add(
                    FitnessCategory::Underwork,
                    (config.min_daily_hours - hours) * weights.underwork,
                );
            } else {
                breakdown.add(FitnessCategory::BalancedDay, weights.balanced_day);
            }

            for pair in day.windows(2) {
                let (prev, next) = (pair[0], pair[1]);
                if next.start < prev.end {
                    breakdown.add(FitnessCategory::Overlap, weights.overlap);
                } else if next.start - prev.end < required_gap {
                    breakdown.add(FitnessCategory::BreakViolation, weights.break_violation);
                }
            }

            let night = day.iter().filter(|m| m.is_night).count();
            if night > 1 {
                breakdown.add(
                    FitnessCategory::MultipleNightShifts,
                    (night - 1) as f64 * weights.multiple_night_shifts,
                );
            }
            if night > 0 && night < day.len() {
                breakdown.add(FitnessCategory::NightDayMix, weights.night_day_mix);
            }

            days.push(WorkDay {
                date,
                first_start: day[0].start,
                last_end: day.iter().map(|m| m.end).max().unwrap_or(day[0].end),
                hours,
            });
        }

        self.score_rest(&days, breakdown);
        self.score_weeks(&days, breakdown);
        self.score_runs(&days, breakdown);
    }

    /// Short rest between the last end of one working date and the first
    /// start of the next.
    fn score_rest(&self, days: &[WorkDay], breakdown: &mut FitnessBreakdown) {
        let min_rest_secs = self.config.min_rest_hours * 3600.0;
        for pair in days.windows(2) {
            let rest = (pair[1].first_start - pair[0].last_end).num_seconds() as f64;
            if rest < min_rest_secs {
                breakdown.add(
                    FitnessCategory::RestViolation,
                    self.config.weights.rest_violation,
                );
            }
        }
    }

    fn score_weeks(&self, days: &[WorkDay], breakdown: &mut FitnessBreakdown) {
        let mut weekly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for day in days {
            let week = day.date.iso_week();
            *weekly.entry((week.year(), week.week())).or_insert(0.0) += day.hours;
        }
        for hours in weekly.into_values() {
            if hours > self.config.max_weekly_hours {
                breakdown.add(
                    FitnessCategory::WeeklyOverwork,
                    (hours - self.config.max_weekly_hours) * self.config.weights.weekly_overwork,
                );
            }
        }
    }

    fn score_runs(&self, days: &[WorkDay], breakdown: &mut FitnessBreakdown) {
        let mut run = 0usize;
        let mut prev: Option<NaiveDate> = None;
        for day in days {
            run = match prev.and_then(|p| p.succ_opt()) {
                Some(next) if next == day.date => run + 1,
                _ => 1,
            };
            if run > self.config.max_consecutive_days {
                breakdown.add(
                    FitnessCategory::ConsecutiveDays,
                    self.config.weights.consecutive_days,
                );
            }
            prev = Some(day.date);
        }
    }
}

/// Aggregate of one agent's working date.
struct WorkDay {
    date: NaiveDate,
    first_start: NaiveDateTime,
    last_end: NaiveDateTime,
    hours: f64,
}

/// Σ|x − mean(x)|, zero for an empty slice.
fn absolute_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).abs()).sum()
}

/// Scores a schedule.
///
/// Convenience wrapper around [`FitnessEvaluator`] for one-off calls.
pub fn evaluate(
    schedule: &Schedule,
    roster: &Roster,
    meetings: &[Meeting],
    config: &SearchConfig,
) -> Evaluation {
    FitnessEvaluator::new(roster, meetings, config).evaluate(schedule)
}
