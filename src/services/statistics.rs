use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::models::{Contest, Submission, TeamStanding};

pub const HEAT_MAP_BUCKET_MINUTES: i64 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProblemStatistics {
    pub problem_id: String,
    pub accepted: u32,
    pub rejected: u32,
    /// Inside the freeze window, verdict hidden
    pub pending: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemHeatMap {
    pub problem_id: String,
    pub accepted: Vec<u32>,
    pub rejected: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatMap {
    pub bucket_minutes: i64,
    /// Starting minute of each bucket
    pub time_labels: Vec<String>,
    pub problems: Vec<ProblemHeatMap>,
}

impl HeatMap {
    fn new(contest: &Contest) -> Self {
        let duration_minutes = contest.duration_seconds().max(0) / 60;
        let bucket_count = (duration_minutes / HEAT_MAP_BUCKET_MINUTES + 1) as usize;
        let time_labels = (0..bucket_count)
            .map(|bucket| (bucket as i64 * HEAT_MAP_BUCKET_MINUTES).to_string())
            .collect();
        let problems = contest
            .problem_ids
            .iter()
            .map(|problem_id| ProblemHeatMap {
                problem_id: problem_id.clone(),
                accepted: vec![0; bucket_count],
                rejected: vec![0; bucket_count],
            })
            .collect();

        Self {
            bucket_minutes: HEAT_MAP_BUCKET_MINUTES,
            time_labels,
            problems,
        }
    }

    fn bucket_count(&self) -> usize {
        self.time_labels.len()
    }

    /// Out of window submissions are dropped, not clamped.
    fn bucket_for(&self, elapsed_seconds: i64) -> Option<usize> {
        if elapsed_seconds < 0 {
            return None;
        }
        let bucket = (elapsed_seconds / 60 / self.bucket_minutes) as usize;
        (bucket < self.bucket_count()).then_some(bucket)
    }

    fn record(&mut self, problem_index: usize, elapsed_seconds: i64, accepted: bool) -> bool {
        let Some(bucket) = self.bucket_for(elapsed_seconds) else {
            return false;
        };
        let Some(problem) = self.problems.get_mut(problem_index) else {
            return false;
        };
        if accepted {
            problem.accepted[bucket] += 1;
        } else {
            problem.rejected[bucket] += 1;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContestStatistics {
    pub problem_count: usize,
    pub team_count: usize,
    pub submission_count: usize,
    /// Verdict label -> count
    pub submission_types: BTreeMap<String, usize>,
    pub problem_stats: Vec<ProblemStatistics>,
    /// Solved count -> number of teams, every value in 0..=problem_count present
    pub team_solved_count: BTreeMap<usize, usize>,
    pub heat_map: HeatMap,
}

/// Only submissions of teams present in `standings` are counted, so passing
/// a filtered board restricts every figure to that subset.
pub fn compute_statistics(
    contest: &Contest,
    standings: &[TeamStanding],
    submissions: &[Submission],
) -> ContestStatistics {
    let included: HashSet<&str> = standings.iter().map(|s| s.team_id.as_str()).collect();

    let mut problem_stats: Vec<ProblemStatistics> = contest
        .problem_ids
        .iter()
        .map(|problem_id| ProblemStatistics {
            problem_id: problem_id.clone(),
            ..ProblemStatistics::default()
        })
        .collect();
    let mut submission_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut heat_map = HeatMap::new(contest);
    let mut submission_count = 0;
    let mut dropped_from_heat_map = 0;
    let mut skipped_bad_timestamp = 0;

    for submission in submissions {
        if !included.contains(submission.team_id.as_str()) {
            continue;
        }
        let Some(problem_index) = usize::try_from(submission.problem_index)
            .ok()
            .filter(|index| *index < problem_stats.len())
        else {
            continue;
        };
        let Some(elapsed) = contest.elapsed_seconds(submission.timestamp) else {
            skipped_bad_timestamp += 1;
            continue;
        };

        submission_count += 1;
        *submission_types
            .entry(submission.verdict.as_str().to_string())
            .or_insert(0) += 1;

        let accepted = submission.verdict.is_accepted();

        let stats = &mut problem_stats[problem_index];
        stats.total += 1;
        if contest.is_frozen_at(elapsed) {
            stats.pending += 1;
        } else if accepted {
            stats.accepted += 1;
        } else {
            stats.rejected += 1;
        }

        if !heat_map.record(problem_index, elapsed, accepted) {
            dropped_from_heat_map += 1;
        }
    }

    let mut team_solved_count: BTreeMap<usize, usize> =
        (0..=contest.problem_ids.len()).map(|solved| (solved, 0)).collect();
    for standing in standings {
        *team_solved_count.entry(standing.score as usize).or_insert(0) += 1;
    }

    debug!(
        "Statistics for contest {}: {} submissions, {} outside heat map window, {} with unusable timestamps",
        contest.id, submission_count, dropped_from_heat_map, skipped_bad_timestamp
    );

    ContestStatistics {
        problem_count: contest.problem_ids.len(),
        team_count: standings.len(),
        submission_count,
        submission_types,
        problem_stats,
        team_solved_count,
        heat_map,
    }
}
