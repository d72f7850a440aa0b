use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::error::ScoreboardResult;
use crate::models::{
    Contest, JURY_TEAM_ID, Roster, Submission, SubmissionEffect, TeamStanding,
};
use crate::services::config_loader::ScoreboardConfig;
use crate::services::ranker;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub applied: usize,
    pub pending: usize,
    pub skipped_jury: usize,
    pub skipped_unknown_team: usize,
    pub skipped_problem_out_of_range: usize,
    pub skipped_bad_timestamp: usize,
    pub skipped_after_solve: usize,
    pub no_effect: usize,
}

/// Drops submissions from teams listed in `filter_team_submissions`.
pub fn apply_submission_filters(submissions: &mut Vec<Submission>, config: &ScoreboardConfig) {
    if config.filter_team_submissions.is_empty() {
        return;
    }

    let filter_set: HashSet<&str> = config
        .filter_team_submissions
        .iter()
        .map(String::as_str)
        .collect();

    let before = submissions.len();
    submissions.retain(|submission| !filter_set.contains(submission.team_id.as_str()));
    let removed = before - submissions.len();

    if removed == 0 {
        info!("No submissions matched filter_team_submissions");
        return;
    }

    info!(
        "Filtered out {} submissions for teams {:?}",
        removed, config.filter_team_submissions
    );
}

/// Appends the remapped group label from `team_group_map` to each listed team.
pub fn apply_team_group_map(roster: &mut Roster, config: &ScoreboardConfig) {
    for (team_id, group) in &config.team_group_map {
        let Some(team) = roster.get_mut(team_id) else {
            warn!("team_group_map references unknown team {}", team_id);
            continue;
        };
        if !team.in_group(group) {
            info!("Adding team {} to group {}", team_id, group);
            team.groups.push(group.clone());
        }
    }
}

fn build_initial_standings(contest: &Contest, roster: &Roster) -> BTreeMap<String, TeamStanding> {
    roster
        .iter()
        .map(|(team_id, team)| {
            let mut team = team.clone();
            // Roster key is authoritative, the record may omit its own id
            team.id = team_id.clone();
            (team_id.clone(), TeamStanding::new(team, &contest.problem_ids))
        })
        .collect()
}

/// Folds the submission log into one standing per roster team, in team id
/// order. Ranks are left unassigned; first-to-solve is already marked.
pub fn calculate_standings(
    contest: &Contest,
    roster: &Roster,
    submissions: &[Submission],
) -> ScoreboardResult<Vec<TeamStanding>> {
    let (standings, summary) = calculate_standings_with_summary(contest, roster, submissions)?;
    debug!("Outcome summary for contest {}: {:?}", contest.id, summary);
    Ok(standings)
}

pub fn calculate_standings_with_summary(
    contest: &Contest,
    roster: &Roster,
    submissions: &[Submission],
) -> ScoreboardResult<(Vec<TeamStanding>, ProcessSummary)> {
    contest.validate()?;

    let penalty_minutes = contest.penalty_minutes();
    let mut standings = build_initial_standings(contest, roster);
    let mut summary = ProcessSummary::default();

    // Log order matters within one team and problem
    for submission in submissions {
        if submission.team_id == JURY_TEAM_ID {
            summary.skipped_jury += 1;
            continue;
        }

        let Some(standing) = standings.get_mut(&submission.team_id) else {
            summary.skipped_unknown_team += 1;
            continue;
        };

        let Some(problem_id) = contest.problem_id_at(submission.problem_index) else {
            summary.skipped_problem_out_of_range += 1;
            continue;
        };

        let Some(elapsed) = contest.elapsed_seconds(submission.timestamp) else {
            summary.skipped_bad_timestamp += 1;
            continue;
        };
        let frozen = contest.is_frozen_at(elapsed);

        match standing.apply_submission(
            problem_id,
            &submission.verdict,
            elapsed,
            frozen,
            penalty_minutes,
        ) {
            SubmissionEffect::Solved | SubmissionEffect::Rejected => summary.applied += 1,
            SubmissionEffect::Pending => summary.pending += 1,
            SubmissionEffect::AlreadySolved => summary.skipped_after_solve += 1,
            SubmissionEffect::NoEffect => summary.no_effect += 1,
        }
    }

    if summary.skipped_unknown_team > 0
        || summary.skipped_problem_out_of_range > 0
        || summary.skipped_bad_timestamp > 0
    {
        info!(
            "Contest {}: skipped {} submissions from unknown teams, {} with out of range problems, {} with unusable timestamps",
            contest.id,
            summary.skipped_unknown_team,
            summary.skipped_problem_out_of_range,
            summary.skipped_bad_timestamp
        );
    }

    let mut standings: Vec<TeamStanding> = standings.into_values().collect();
    ranker::mark_first_to_solve(&mut standings);

    info!(
        "Computed {} standings from {} submissions ({} pending behind freeze)",
        standings.len(),
        submissions.len(),
        summary.pending
    );

    Ok((standings, summary))
}
