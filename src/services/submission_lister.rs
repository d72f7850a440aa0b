use serde::Serialize;
use tracing::debug;

use crate::models::{Contest, JURY_TEAM_ID, Roster, Submission};
use crate::services::filter::TeamFilter;

pub const DEFAULT_PAGE_SIZE: usize = 15;
pub const UNKNOWN_TEAM_NAME: &str = "unknown team";
pub const UNKNOWN_SCHOOL_NAME: &str = "unknown school";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub problem_id: String,
    pub status: String,
    pub language: String,
    /// Raw log value
    pub timestamp: i64,
    pub elapsed_seconds: i64,
    pub team_id: String,
    pub team_name: String,
    pub school: String,
    /// Outside the active filter. Kept in the list, never counted or paged.
    pub is_filtered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPage {
    pub submissions: Vec<SubmissionRecord>,
    pub pagination: Pagination,
}

/// Every non-jury submission with a valid problem and a placeable timestamp,
/// newest first, enriched with team details and marked when the filter
/// excludes it.
pub fn build_submission_records(
    contest: &Contest,
    roster: &Roster,
    submissions: &[Submission],
    filter: &TeamFilter,
) -> Vec<SubmissionRecord> {
    let mut records: Vec<SubmissionRecord> = submissions
        .iter()
        .filter_map(|submission| {
            if submission.team_id == JURY_TEAM_ID {
                return None;
            }
            let problem_id = contest.problem_id_at(submission.problem_index)?;
            let elapsed_seconds = contest.elapsed_seconds(submission.timestamp)?;
            let team = roster.get(&submission.team_id);
            let is_filtered = match team {
                Some(team) => !filter.matches(team),
                None => !filter.is_all(),
            };

            Some(SubmissionRecord {
                id: submission.id.clone(),
                problem_id: problem_id.to_string(),
                status: submission.verdict.as_str().to_string(),
                language: submission.language.clone(),
                timestamp: submission.timestamp,
                elapsed_seconds,
                team_id: submission.team_id.clone(),
                team_name: team.map_or(UNKNOWN_TEAM_NAME, |t| t.name.as_str()).to_string(),
                school: team
                    .map_or(UNKNOWN_SCHOOL_NAME, |t| t.organization.as_str())
                    .to_string(),
                is_filtered,
            })
        })
        .collect();

    // Stable, equal timestamps keep log order
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}

/// Pages past the end come back empty. A zero page or page size falls back
/// to the defaults.
pub fn paginate(
    records: Vec<SubmissionRecord>,
    page: Option<usize>,
    page_size: Option<usize>,
) -> SubmissionPage {
    let current_page = page.filter(|page| *page > 0).unwrap_or(1);
    let page_size = page_size.filter(|size| *size > 0).unwrap_or(DEFAULT_PAGE_SIZE);

    let visible: Vec<SubmissionRecord> =
        records.into_iter().filter(|record| !record.is_filtered).collect();
    let total_items = visible.len();
    let total_pages = total_items.div_ceil(page_size);

    let submissions = visible
        .into_iter()
        .skip((current_page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    SubmissionPage {
        submissions,
        pagination: Pagination {
            current_page,
            page_size,
            total_items,
            total_pages,
        },
    }
}

pub fn list_submissions(
    contest: &Contest,
    roster: &Roster,
    submissions: &[Submission],
    filter: &TeamFilter,
    page: Option<usize>,
    page_size: Option<usize>,
) -> SubmissionPage {
    let records = build_submission_records(contest, roster, submissions, filter);
    let result = paginate(records, page, page_size);
    debug!(
        "Listed page {} of submissions for contest {}: {} of {} records",
        result.pagination.current_page,
        contest.id,
        result.submissions.len(),
        result.pagination.total_items
    );
    result
}
