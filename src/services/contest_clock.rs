use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Contest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestPhase {
    Pending,
    Running,
    Frozen,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeInfo {
    pub phase: ContestPhase,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub duration: i64,
    pub elapsed: i64,
    pub remaining: i64,
    pub duration_text: String,
    pub elapsed_text: String,
    pub remaining_text: String,
}

/// `now` in epoch seconds.
pub fn contest_phase(contest: &Contest, now: i64) -> ContestPhase {
    if now < contest.start_time {
        ContestPhase::Pending
    } else if now >= contest.end_time {
        ContestPhase::Ended
    } else if now >= contest.end_time.saturating_sub(contest.freeze_duration) {
        ContestPhase::Frozen
    } else {
        ContestPhase::Running
    }
}

pub fn time_info(contest: &Contest, now: i64) -> TimeInfo {
    let duration = contest.duration_seconds();
    let elapsed = now.saturating_sub(contest.start_time).clamp(0, duration.max(0));
    let remaining = contest.end_time.saturating_sub(now).clamp(0, duration.max(0));

    TimeInfo {
        phase: contest_phase(contest, now),
        start_at: DateTime::from_timestamp(contest.start_time, 0),
        end_at: DateTime::from_timestamp(contest.end_time, 0),
        duration,
        elapsed,
        remaining,
        duration_text: format_duration(duration),
        elapsed_text: format_duration(elapsed),
        remaining_text: format_duration(remaining),
    }
}

/// `H:MM:SS`, negative input renders as zero.
pub fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return "0:00:00".to_string();
    }
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
