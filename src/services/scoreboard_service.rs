use serde::Serialize;
use tracing::info;

use crate::error::ScoreboardResult;
use crate::models::{Contest, Roster, Submission, TeamStanding};
use crate::services::config_loader::ScoreboardConfig;
use crate::services::contest_clock::{self, TimeInfo};
use crate::services::contest_loader::{ContestSource, ContestSummary};
use crate::services::contest_processor;
use crate::services::filter::{self, TeamFilter};
use crate::services::ranker;
use crate::services::statistics::{self, ContestStatistics};
use crate::services::submission_lister::{self, SubmissionPage};

#[derive(Debug, Clone, Serialize)]
pub struct Scoreboard {
    pub contest: Contest,
    pub results: Vec<TeamStanding>,
}

/// Everything one request needs, loaded fresh and owned by that request.
#[derive(Debug, Clone)]
pub struct ContestInputs {
    pub contest: Contest,
    pub roster: Roster,
    pub submissions: Vec<Submission>,
}

/// Calculate, rank, filter, re-rank, then hand out medals for the view.
/// Medal positions count official teams only, except in the unofficial view.
pub fn compute_scoreboard(
    contest: &Contest,
    roster: &Roster,
    submissions: &[Submission],
    team_filter: &TeamFilter,
) -> ScoreboardResult<Vec<TeamStanding>> {
    let mut standings = contest_processor::calculate_standings(contest, roster, submissions)?;
    ranker::rank_standings(&mut standings);

    if !team_filter.is_all() {
        standings = filter::filter_standings(standings, team_filter);
        ranker::rank_standings(&mut standings);
    }

    // Unofficial teams never take a medal slot unless they are the view
    let medal_unofficial = matches!(team_filter, TeamFilter::Unofficial);
    ranker::assign_medals(
        &mut standings,
        contest.medals.get(team_filter.group_key()),
        |team| medal_unofficial || TeamFilter::Official.matches(team),
    );
    Ok(standings)
}

pub struct ScoreboardService<S> {
    source: S,
    config: ScoreboardConfig,
}

impl<S: ContestSource> ScoreboardService<S> {
    pub fn new(source: S, config: ScoreboardConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ScoreboardConfig {
        &self.config
    }

    /// Most recent contest first.
    pub fn list_contests(&self) -> ScoreboardResult<Vec<ContestSummary>> {
        let mut contests = self.source.list_contests()?;
        contests.sort_by(|a, b| b.start_time.cmp(&a.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(contests)
    }

    pub fn contest(&self, contest_id: &str) -> ScoreboardResult<Contest> {
        self.source.load_contest(contest_id)
    }

    /// `(group key, label)` pairs usable as filter tokens.
    pub fn contest_groups(&self, contest_id: &str) -> ScoreboardResult<Vec<(String, String)>> {
        let contest = self.contest(contest_id)?;
        Ok(contest.groups.into_iter().collect())
    }

    pub fn load_inputs(&self, contest_id: &str) -> ScoreboardResult<ContestInputs> {
        let contest = self.source.load_contest(contest_id)?;
        let mut roster = self.source.load_roster(&contest)?;
        let mut submissions = self.source.load_submissions(&contest)?;

        contest_processor::apply_team_group_map(&mut roster, &self.config);
        contest_processor::apply_submission_filters(&mut submissions, &self.config);

        Ok(ContestInputs {
            contest,
            roster,
            submissions,
        })
    }

    pub fn scoreboard(&self, contest_id: &str, team_filter: &TeamFilter) -> ScoreboardResult<Scoreboard> {
        let inputs = self.load_inputs(contest_id)?;
        let results = compute_scoreboard(
            &inputs.contest,
            &inputs.roster,
            &inputs.submissions,
            team_filter,
        )?;
        info!(
            "Scoreboard for contest {} with filter {}: {} teams",
            contest_id,
            team_filter,
            results.len()
        );

        Ok(Scoreboard {
            contest: inputs.contest,
            results,
        })
    }

    pub fn statistics(
        &self,
        contest_id: &str,
        team_filter: &TeamFilter,
    ) -> ScoreboardResult<ContestStatistics> {
        let inputs = self.load_inputs(contest_id)?;
        let standings = compute_scoreboard(
            &inputs.contest,
            &inputs.roster,
            &inputs.submissions,
            team_filter,
        )?;
        Ok(statistics::compute_statistics(
            &inputs.contest,
            &standings,
            &inputs.submissions,
        ))
    }

    /// `page_size` falls back to the configured listing size.
    pub fn submissions(
        &self,
        contest_id: &str,
        team_filter: &TeamFilter,
        page: Option<usize>,
        page_size: Option<usize>,
    ) -> ScoreboardResult<SubmissionPage> {
        let inputs = self.load_inputs(contest_id)?;
        let page_size = page_size.or(Some(self.config.listing.page_size));
        Ok(submission_lister::list_submissions(
            &inputs.contest,
            &inputs.roster,
            &inputs.submissions,
            team_filter,
            page,
            page_size,
        ))
    }

    /// `now` in epoch seconds.
    pub fn time_info(&self, contest_id: &str, now: i64) -> ScoreboardResult<TimeInfo> {
        let contest = self.contest(contest_id)?;
        Ok(contest_clock::time_info(&contest, now))
    }
}
