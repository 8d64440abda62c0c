//! Genetic operators for rostering schedules.
//!
//! - [`crossover`]: single-point crossover over meeting indices
//! - [`mutate`]: per-meeting resampling of assignments
//! - [`repair`]: drops same-agent overlaps, keeping the earlier meeting
//!
//! Unfilled meetings are ordinary gene values: they cross over and mutate
//! like any assignment.

use std::collections::BTreeMap;

use rand::Rng;

use super::RosterProblem;
use crate::models::{Meeting, Schedule};

/// Single-point crossover.
///
/// Draws a cut uniformly from `0..=meeting_count`. The first child takes
/// `p1`'s assignments below the cut and `p2`'s from the cut on; the second
/// child is the complement. A child's filled meetings are always a subset
/// of the union of its parents' filled meetings.
pub fn crossover<R: Rng>(
    p1: &Schedule,
    p2: &Schedule,
    meeting_count: usize,
    rng: &mut R,
) -> (Schedule, Schedule) {
    let cut = rng.random_range(0..=meeting_count);
    (splice(p1, p2, cut), splice(p2, p1, cut))
}

fn splice(head: &Schedule, tail: &Schedule, cut: usize) -> Schedule {
    head.range(..cut)
        .chain(tail.range(cut..))
        .map(|(m, a)| (m, a.to_string()))
        .collect()
}

/// Resamples assignments in place.
///
/// Each meeting is picked independently with probability `rate`. A picked
/// filled meeting is unassigned with probability `unassign_probability`,
/// otherwise reassigned to a random eligible agent; a picked unfilled
/// meeting receives a random eligible agent. Meetings nobody is eligible
/// for end up unfilled.
///
/// Must only be applied to a schedule not shared with the population.
pub fn mutate<R: Rng>(
    schedule: &mut Schedule,
    problem: &RosterProblem<'_>,
    rate: f64,
    unassign_probability: f64,
    rng: &mut R,
) {
    for idx in 0..problem.meeting_count() {
        if !rng.random_bool(rate) {
            continue;
        }
        if schedule.is_assigned(idx) && rng.random_bool(unassign_probability) {
            schedule.unassign(idx);
            continue;
        }
        match problem.random_agent(idx, rng) {
            Some(agent) => {
                schedule.assign(idx, agent);
            }
            None => {
                schedule.unassign(idx);
            }
        }
    }
}

/// Removes same-agent time overlaps.
///
/// For every agent, assigned meetings are visited in start order (ties by
/// index); a meeting starting before the end of the agent's last kept
/// meeting is unassigned. Assignments to indices outside `meetings` are
/// left untouched.
///
/// Idempotent, and afterwards no agent holds two overlapping meetings.
pub fn repair(schedule: &Schedule, meetings: &[Meeting]) -> Schedule {
    let mut by_agent: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, agent) in schedule.iter() {
        if idx < meetings.len() {
            by_agent.entry(agent).or_default().push(idx);
        }
    }

    let mut repaired = schedule.clone();
    for indices in by_agent.values_mut() {
        indices.sort_by_key(|&i| (meetings[i].start, i));
        let mut kept_end = None;
        for &idx in indices.iter() {
            let meeting = &meetings[idx];
            match kept_end {
                Some(end) if meeting.start < end => {
                    repaired.unassign(idx);
                }
                Some(end) => kept_end = Some(meeting.end.max(end)),
                None => kept_end = Some(meeting.end),
            }
        }
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::ga::initialize;
    use crate::models::{Agent, Roster, WILDCARD_SKILL};
    use chrono::NaiveDate;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn meeting(day: u32, from: (u32, u32), to: (u32, u32), skill: &str) -> Meeting {
        let d = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        Meeting::day(
            d.and_hms_opt(from.0, from.1, 0).unwrap(),
            d.and_hms_opt(to.0, to.1, 0).unwrap(),
            skill,
        )
        .unwrap()
    }

    /// Dense, heavily overlapping meetings on two days.
    fn crowded_meetings() -> Vec<Meeting> {
        let mut meetings = Vec::new();
        for day in [4, 5] {
            for hour in 8..16 {
                meetings.push(meeting(day, (hour, 0), (hour + 2, 0), WILDCARD_SKILL));
                meetings.push(meeting(day, (hour, 30), (hour + 1, 15), "Fire"));
            }
        }
        meetings
    }

    fn sample_roster() -> Roster {
        Roster::new(vec![
            Agent::new("A1").with_skill("Fire"),
            Agent::new("A2").with_skill("Fire"),
            Agent::new("A3"),
        ])
    }

    fn keys(s: &Schedule) -> BTreeSet<usize> {
        s.meetings().collect()
    }

    #[test]
    fn test_crossover_key_set_subset_of_parents() {
        let meetings = crowded_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default();
        let problem = RosterProblem::new(&roster, &meetings, &config);
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..50 {
            let parents = initialize(2, &problem, 0.5, &mut rng);
            let (c1, c2) = crossover(&parents[0], &parents[1], meetings.len(), &mut rng);
            let union: BTreeSet<usize> = keys(&parents[0]).union(&keys(&parents[1])).copied().collect();

            assert!(keys(&c1).is_subset(&union));
            assert!(keys(&c2).is_subset(&union));
            // Every gene comes from exactly one parent at its position
            for (m, a) in c1.iter().chain(c2.iter()) {
                assert!(parents[0].agent_for(m) == Some(a) || parents[1].agent_for(m) == Some(a));
            }
            // Children together carry both parents' assignment counts
            assert_eq!(
                c1.assignment_count() + c2.assignment_count(),
                parents[0].assignment_count() + parents[1].assignment_count()
            );
        }
    }

    #[test]
    fn test_crossover_extreme_cuts() {
        let mut p1 = Schedule::new();
        p1.assign(0, "A1");
        p1.assign(1, "A1");
        let mut p2 = Schedule::new();
        p2.assign(1, "A2");

        // cut at 0 swaps parents, cut at len copies them
        assert_eq!(splice(&p1, &p2, 0), p2);
        assert_eq!(splice(&p1, &p2, 2), p1);

        let child = splice(&p1, &p2, 1);
        assert_eq!(child.agent_for(0), Some("A1"));
        assert_eq!(child.agent_for(1), Some("A2"));
    }

    #[test]
    fn test_crossover_is_deterministic() {
        let mut p1 = Schedule::new();
        let mut p2 = Schedule::new();
        for i in 0..10 {
            p1.assign(i, "A1");
            p2.assign(i, "A2");
        }
        let a = crossover(&p1, &p2, 10, &mut SmallRng::seed_from_u64(3));
        let b = crossover(&p1, &p2, 10, &mut SmallRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_mutation_keeps_eligibility() {
        let meetings = crowded_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default();
        let problem = RosterProblem::new(&roster, &meetings, &config);
        let mut rng = SmallRng::seed_from_u64(42);

        let mut schedule = problem.create_individual(0.5, &mut rng);
        for _ in 0..20 {
            mutate(&mut schedule, &problem, 0.5, 0.2, &mut rng);
        }
        for (m, a) in schedule.iter() {
            let agent = roster.find(a).unwrap();
            assert!(agent.can_cover(&meetings[m]));
        }
    }

    #[test]
    fn test_mutation_rate_bounds() {
        let meetings = crowded_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default();
        let problem = RosterProblem::new(&roster, &meetings, &config);
        let mut rng = SmallRng::seed_from_u64(42);

        let original = problem.create_individual(0.5, &mut rng);
        let mut untouched = original.clone();
        mutate(&mut untouched, &problem, 0.0, 0.5, &mut rng);
        assert_eq!(untouched, original);

        // Full rate, no unassignment: every meeting ends up filled
        let mut filled = original.clone();
        mutate(&mut filled, &problem, 1.0, 0.0, &mut rng);
        assert_eq!(filled.assignment_count(), meetings.len());

        // Full rate, always unassign filled ones, refill empty ones
        let mut flipped = original.clone();
        mutate(&mut flipped, &problem, 1.0, 1.0, &mut rng);
        let previously_empty: BTreeSet<usize> =
            (0..meetings.len()).filter(|m| !original.is_assigned(*m)).collect();
        assert_eq!(keys(&flipped), previously_empty);
    }

    #[test]
    fn test_mutation_is_deterministic() {
        let meetings = crowded_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default();
        let problem = RosterProblem::new(&roster, &meetings, &config);
        let base = problem.create_individual(0.5, &mut SmallRng::seed_from_u64(1));

        let mut a = base.clone();
        let mut b = base.clone();
        mutate(&mut a, &problem, 0.4, 0.3, &mut SmallRng::seed_from_u64(42));
        mutate(&mut b, &problem, 0.4, 0.3, &mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_ne!(a, base);
    }

    #[test]
    fn test_mutation_unassigns_without_candidates() {
        let meetings = vec![meeting(4, (9, 0), (10, 0), "Medic")];
        let roster = sample_roster();
        let config = SearchConfig::default();
        let problem = RosterProblem::new(&roster, &meetings, &config);
        let mut rng = SmallRng::seed_from_u64(42);

        let mut schedule = Schedule::new();
        schedule.assign(0, "A1");
        mutate(&mut schedule, &problem, 1.0, 0.0, &mut rng);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_repair_drops_later_meeting() {
        let meetings = vec![
            meeting(4, (9, 0), (11, 0), "Fire"),
            meeting(4, (10, 0), (12, 0), "Fire"),
            meeting(4, (11, 0), (12, 0), "Fire"),
            meeting(4, (10, 0), (11, 0), "Fire"),
        ];
        let mut schedule = Schedule::new();
        schedule.assign(0, "A1");
        schedule.assign(1, "A1");
        schedule.assign(2, "A1");
        schedule.assign(3, "A2");

        let repaired = repair(&schedule, &meetings);
        assert_eq!(repaired.agent_for(0), Some("A1"));
        assert!(!repaired.is_assigned(1));
        assert_eq!(repaired.agent_for(2), Some("A1")); // starts exactly at the kept end
        assert_eq!(repaired.agent_for(3), Some("A2")); // other agent untouched
    }

    #[test]
    fn test_repair_no_overlap_and_idempotent() {
        let meetings = crowded_meetings();
        let roster = sample_roster();
        let config = SearchConfig::default();
        let problem = RosterProblem::new(&roster, &meetings, &config);
        let mut rng = SmallRng::seed_from_u64(42);

        for schedule in initialize(30, &problem, 1.0, &mut rng) {
            let once = repair(&schedule, &meetings);
            let twice = repair(&once, &meetings);
            assert_eq!(once, twice);
            assert!(keys(&once).is_subset(&keys(&schedule)));

            for agent in roster.agents() {
                let mine: Vec<usize> = once.meetings_for_agent(&agent.id).collect();
                for (i, &a) in mine.iter().enumerate() {
                    for &b in &mine[i + 1..] {
                        assert!(
                            !meetings[a].overlaps(&meetings[b]),
                            "{} holds overlapping meetings {a} and {b}",
                            agent.id
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_repair_keeps_out_of_range_indices() {
        let meetings = vec![meeting(4, (9, 0), (10, 0), "Fire")];
        let mut schedule = Schedule::new();
        schedule.assign(0, "A1");
        schedule.assign(5, "A1");
        assert_eq!(repair(&schedule, &meetings), schedule);
    }
}
