//! Night-shift preassignment.
//!
//! Night meetings are covered before the day search runs, by a single
//! greedy pass over the night meetings in input order.
//!
//! # Algorithm
//!
//! 1. Candidates for a night meeting are agents holding the night skill
//!    with nothing booked yet on the meeting's date.
//! 2. One candidate is picked by [`NightAssignPolicy`].
//! 3. The pick is committed to that agent's ledger before the next
//!    meeting is considered, so an agent takes at most one night per date.
//!
//! A meeting without candidates stays unfilled.
//!
//! # Complexity
//! O(n * a) where n=night meetings, a=agents holding the night skill.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::config::{NightAssignPolicy, SearchConfig};
use crate::models::{AgentLedger, Meeting, Roster, Schedule};

/// Greedy night-shift assigner.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_roster::config::SearchConfig;
/// use u_roster::models::{Agent, Meeting, Roster};
/// use u_roster::scheduler::NightShiftPreassigner;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// let meetings = vec![Meeting::night(
///     day.and_hms_opt(22, 0, 0).unwrap(),
///     day.succ_opt().unwrap().and_hms_opt(6, 0, 0).unwrap(),
///     "Security",
/// ).unwrap()];
/// let roster = Roster::new(vec![
///     Agent::new("A1").with_skill("Fire"),
///     Agent::new("A2").with_skill("Security"),
/// ]);
/// let config = SearchConfig::default();
///
/// let mut rng = SmallRng::seed_from_u64(42);
/// let schedule = NightShiftPreassigner::new(&config).assign(&roster, &meetings, &mut rng);
/// assert_eq!(schedule.agent_for(0), Some("A2"));
/// ```
#[derive(Debug, Clone)]
pub struct NightShiftPreassigner<'a> {
    night_skill: &'a str,
    policy: NightAssignPolicy,
}

impl<'a> NightShiftPreassigner<'a> {
    /// Creates a preassigner using the night skill and policy of `config`.
    pub fn new(config: &'a SearchConfig) -> Self {
        Self {
            night_skill: &config.night_skill,
            policy: config.night_policy,
        }
    }

    /// Overrides the pick policy.
    pub fn with_policy(mut self, policy: NightAssignPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Assigns night meetings.
    ///
    /// Day meetings are ignored. The returned schedule is keyed by indices
    /// into `meetings`.
    pub fn assign<R: Rng>(&self, roster: &Roster, meetings: &[Meeting], rng: &mut R) -> Schedule {
        let pool = roster.with_skill(self.night_skill);
        let mut ledgers = vec![AgentLedger::default(); roster.len()];
        let mut schedule = Schedule::new();

        for (idx, meeting) in meetings.iter().enumerate().filter(|(_, m)| m.is_night) {
            let date = meeting.date();
            let available: Vec<usize> = pool
                .iter()
                .copied()
                .filter(|&a| !ledgers[a].is_busy_on(date))
                .collect();

            let Some(pick) = self.pick(&available, &ledgers, rng) else {
                tracing::debug!(meeting = idx, %date, "no agent available for night shift");
                continue;
            };
            ledgers[pick].add(idx, meeting);
            if let Some(agent) = roster.get(pick) {
                schedule.assign(idx, agent.id.as_str());
            }
        }

        schedule
    }

    fn pick<R: Rng>(&self, available: &[usize], ledgers: &[AgentLedger], rng: &mut R) -> Option<usize> {
        match self.policy {
            NightAssignPolicy::Random => available.choose(rng).copied(),
            NightAssignPolicy::LeastLoaded => {
                let least = available.iter().map(|&a| ledgers[a].meeting_count()).min()?;
                let tied: Vec<usize> = available
                    .iter()
                    .copied()
                    .filter(|&a| ledgers[a].meeting_count() == least)
                    .collect();
                tied.choose(rng).copied()
            }
        }
    }
}
