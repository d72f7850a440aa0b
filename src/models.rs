use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ScoreboardError, ScoreboardResult};

/// Team id used by judges to validate problems. Never ranked.
pub const JURY_TEAM_ID: &str = "jury";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimestampUnit {
    Second,
    #[default]
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimestampUnit {
    pub fn ticks_per_second(self) -> i64 {
        match self {
            TimestampUnit::Second => 1,
            TimestampUnit::Millisecond => 1_000,
            TimestampUnit::Microsecond => 1_000_000,
            TimestampUnit::Nanosecond => 1_000_000_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ContestOptions {
    #[serde(default)]
    pub submission_timestamp_unit: TimestampUnit,
    /// Raw timestamps are epoch based instead of relative to contest start.
    #[serde(default)]
    pub submission_timestamp_absolute: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct MedalThresholds {
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub silver: u32,
    #[serde(default)]
    pub bronze: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Contest {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "contest_name")]
    pub name: String,
    /// Epoch seconds
    pub start_time: i64,
    /// Epoch seconds
    pub end_time: i64,
    /// Length of the freeze window before `end_time`, in seconds
    #[serde(rename = "frozen_time")]
    pub freeze_duration: i64,
    /// Cost of one rejected attempt, in seconds
    pub penalty: i64,
    #[serde(rename = "problem_quantity", default)]
    pub problem_count: usize,
    #[serde(rename = "problem_id", default)]
    pub problem_ids: Vec<String>,
    /// Group key -> display label
    #[serde(rename = "group", default)]
    pub groups: BTreeMap<String, String>,
    #[serde(default)]
    pub organization: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub contest_type: Option<String>,
    #[serde(default)]
    pub status_time_display: BTreeMap<String, bool>,
    /// Group key -> medal counts
    #[serde(rename = "medal", default)]
    pub medals: BTreeMap<String, MedalThresholds>,
    #[serde(default)]
    pub options: ContestOptions,
}

impl Contest {
    /// Fills the problem labels from `problem_quantity` when the document
    /// omits them, then validates.
    pub fn normalize(&mut self) -> ScoreboardResult<()> {
        if self.problem_ids.is_empty() {
            self.problem_ids = (0..self.problem_count).map(problem_label).collect();
        }
        self.problem_count = self.problem_ids.len();
        self.validate()
    }

    pub fn validate(&self) -> ScoreboardResult<()> {
        if self.start_time > self.end_time {
            return Err(ScoreboardError::Data(format!(
                "contest {} starts at {} after it ends at {}",
                self.id, self.start_time, self.end_time
            )));
        }
        if self.end_time.checked_sub(self.start_time).is_none() {
            return Err(ScoreboardError::Data(format!(
                "contest {} window {}..{} is out of range",
                self.id, self.start_time, self.end_time
            )));
        }
        if self.freeze_duration < 0 {
            return Err(ScoreboardError::Data(format!(
                "contest {} has negative frozen_time {}",
                self.id, self.freeze_duration
            )));
        }
        if self.penalty < 0 {
            return Err(ScoreboardError::Data(format!(
                "contest {} has negative penalty {}",
                self.id, self.penalty
            )));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.problem_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(ScoreboardError::Data(format!(
                "contest {} lists problem {} twice",
                self.id, duplicate
            )));
        }
        Ok(())
    }

    pub fn duration_seconds(&self) -> i64 {
        self.end_time.saturating_sub(self.start_time)
    }

    pub fn penalty_minutes(&self) -> i64 {
        self.penalty / 60
    }

    /// Seconds since contest start for a raw submission timestamp, `None`
    /// when the timestamp cannot be placed on the contest timeline.
    pub fn elapsed_seconds(&self, raw_timestamp: i64) -> Option<i64> {
        let seconds = raw_timestamp.div_euclid(self.options.submission_timestamp_unit.ticks_per_second());
        if self.options.submission_timestamp_absolute {
            seconds.checked_sub(self.start_time)
        } else {
            Some(seconds)
        }
    }

    /// True when `elapsed_seconds` falls inside the trailing freeze window.
    pub fn is_frozen_at(&self, elapsed_seconds: i64) -> bool {
        self.duration_seconds().saturating_sub(elapsed_seconds) <= self.freeze_duration
    }

    pub fn problem_id_at(&self, index: i64) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.problem_ids.get(index))
            .map(String::as_str)
    }
}

/// Spreadsheet style label: 0 -> A, 25 -> Z, 26 -> AA.
pub fn problem_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Team {
    #[serde(rename = "team_id", default, deserialize_with = "from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(rename = "group", default)]
    pub groups: Vec<String>,
    #[serde(rename = "undergraduate", default)]
    pub is_undergraduate: bool,
    #[serde(rename = "girl", default)]
    pub is_girl: bool,
    #[serde(rename = "vocational", default)]
    pub is_vocational: bool,
}

impl Team {
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Team id -> team. Ordered so every pass over the roster is reproducible.
pub type Roster = BTreeMap<String, Team>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    RuntimeError,
    CompilationError,
    Other(String),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// Verdicts that cost a penalty attempt when they land before the freeze.
    pub fn is_penalized(&self) -> bool {
        matches!(
            self,
            Verdict::WrongAnswer
                | Verdict::TimeLimitExceeded
                | Verdict::RuntimeError
                | Verdict::CompilationError
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verdict::Accepted => "ACCEPTED",
            Verdict::WrongAnswer => "WRONG_ANSWER",
            Verdict::TimeLimitExceeded => "TIME_LIMIT_EXCEEDED",
            Verdict::RuntimeError => "RUNTIME_ERROR",
            Verdict::CompilationError => "COMPILATION_ERROR",
            Verdict::Other(raw) => raw,
        }
    }
}

impl From<String> for Verdict {
    fn from(raw: String) -> Self {
        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "ACCEPTED" | "AC" | "CORRECT" => Verdict::Accepted,
            "WRONG_ANSWER" | "WA" => Verdict::WrongAnswer,
            "TIME_LIMIT_EXCEEDED" | "TLE" => Verdict::TimeLimitExceeded,
            "RUNTIME_ERROR" | "RE" | "RTE" => Verdict::RuntimeError,
            "COMPILATION_ERROR" | "CE" => Verdict::CompilationError,
            _ => Verdict::Other(raw.trim().to_string()),
        }
    }
}

impl From<Verdict> for String {
    fn from(verdict: Verdict) -> Self {
        verdict.as_str().to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Submission {
    #[serde(rename = "submission_id", deserialize_with = "from_string_or_number")]
    pub id: String,
    #[serde(rename = "status")]
    pub verdict: Verdict,
    #[serde(deserialize_with = "from_string_or_number")]
    pub team_id: String,
    /// Zero based offset into the contest problem list
    #[serde(rename = "problem_id")]
    pub problem_index: i64,
    /// Raw value, unit and base given by `ContestOptions`
    pub timestamp: i64,
    #[serde(default)]
    pub language: String,
}

fn from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemOutcome {
    pub problem_id: String,
    /// Rejected attempts before the solve, pre-freeze only
    pub attempts: u32,
    pub solved: bool,
    /// Minutes since contest start
    pub solved_time: i64,
    /// Minutes, solve time plus penalty for earlier attempts
    pub penalty_time: i64,
    pub first_to_solve: bool,
    pub is_frozen: bool,
    pub pending_attempts: u32,
}

impl ProblemOutcome {
    pub fn new(problem_id: impl Into<String>) -> Self {
        Self {
            problem_id: problem_id.into(),
            attempts: 0,
            solved: false,
            solved_time: 0,
            penalty_time: 0,
            first_to_solve: false,
            is_frozen: false,
            pending_attempts: 0,
        }
    }

    /// Solves that may take part in first-to-solve.
    pub fn is_visible_solve(&self) -> bool {
        self.solved && !self.is_frozen
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionEffect {
    Solved,
    Rejected,
    Pending,
    AlreadySolved,
    NoEffect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: String,
    pub team: Team,
    pub rank: u32,
    pub score: u32,
    /// Minutes
    pub total_time: i64,
    #[serde(rename = "school_rank", default, skip_serializing_if = "Option::is_none")]
    pub institution_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medal: Option<Medal>,
    pub problem_results: BTreeMap<String, ProblemOutcome>,
}

impl TeamStanding {
    pub fn new(team: Team, problem_ids: &[String]) -> Self {
        let problem_results = problem_ids
            .iter()
            .map(|problem_id| (problem_id.clone(), ProblemOutcome::new(problem_id.clone())))
            .collect();

        Self {
            team_id: team.id.clone(),
            team,
            rank: 0,
            score: 0,
            total_time: 0,
            institution_rank: None,
            medal: None,
            problem_results,
        }
    }

    pub fn apply_submission(
        &mut self,
        problem_id: &str,
        verdict: &Verdict,
        elapsed_seconds: i64,
        frozen: bool,
        penalty_minutes: i64,
    ) -> SubmissionEffect {
        let Some(outcome) = self.problem_results.get_mut(problem_id) else {
            return SubmissionEffect::NoEffect;
        };

        if outcome.solved {
            return SubmissionEffect::AlreadySolved;
        }

        if !verdict.is_accepted() && !verdict.is_penalized() {
            return SubmissionEffect::NoEffect;
        }

        if frozen {
            // Result stays hidden until the board is unfrozen
            outcome.is_frozen = true;
            outcome.pending_attempts += 1;
            return SubmissionEffect::Pending;
        }

        if verdict.is_penalized() {
            outcome.attempts += 1;
            return SubmissionEffect::Rejected;
        }

        outcome.solved = true;
        outcome.solved_time = elapsed_seconds.div_euclid(60);
        outcome.penalty_time = i64::from(outcome.attempts)
            .saturating_mul(penalty_minutes)
            .saturating_add(outcome.solved_time);

        self.score += 1;
        self.total_time = self.total_time.saturating_add(outcome.penalty_time);
        SubmissionEffect::Solved
    }

    pub fn institution(&self) -> &str {
        &self.team.organization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_labels_roll_over_after_z() {
        assert_eq!(problem_label(0), "A");
        assert_eq!(problem_label(25), "Z");
        assert_eq!(problem_label(26), "AA");
        assert_eq!(problem_label(27), "AB");
    }

    #[test]
    fn verdict_parses_known_and_unknown_labels() {
        assert_eq!(Verdict::from("ACCEPTED".to_string()), Verdict::Accepted);
        assert_eq!(Verdict::from("wrong-answer".to_string()), Verdict::WrongAnswer);
        assert_eq!(Verdict::from("TLE".to_string()), Verdict::TimeLimitExceeded);
        assert_eq!(
            Verdict::from("MEMORY_LIMIT_EXCEEDED".to_string()),
            Verdict::Other("MEMORY_LIMIT_EXCEEDED".to_string())
        );
        assert!(!Verdict::Other("PENDING".to_string()).is_penalized());
    }

    #[test]
    fn submission_accepts_numeric_ids() {
        let raw = r#"{"submission_id": 17, "status": "RUNTIME_ERROR", "team_id": 42,
                      "problem_id": 1, "timestamp": 60000, "language": "C++"}"#;
        let submission: Submission = serde_json::from_str(raw).unwrap();
        assert_eq!(submission.id, "17");
        assert_eq!(submission.team_id, "42");
        assert_eq!(submission.verdict, Verdict::RuntimeError);
    }

    #[test]
    fn submission_without_status_is_rejected() {
        let raw = r#"{"submission_id": "1", "team_id": "t1", "problem_id": 0, "timestamp": 0}"#;
        assert!(serde_json::from_str::<Submission>(raw).is_err());
    }

    #[test]
    fn contest_normalize_fills_problem_labels() {
        let raw = r#"{"contest_name": "Demo", "start_time": 0, "end_time": 18000,
                      "frozen_time": 3600, "penalty": 1200, "problem_quantity": 3}"#;
        let mut contest: Contest = serde_json::from_str(raw).unwrap();
        contest.normalize().unwrap();
        assert_eq!(contest.problem_ids, vec!["A", "B", "C"]);
        assert_eq!(contest.options.submission_timestamp_unit, TimestampUnit::Millisecond);
    }

    #[test]
    fn contest_normalize_rejects_inverted_window() {
        let raw = r#"{"contest_name": "Broken", "start_time": 100, "end_time": 50,
                      "frozen_time": 0, "penalty": 1200, "problem_id": ["A"]}"#;
        let mut contest: Contest = serde_json::from_str(raw).unwrap();
        assert!(matches!(contest.normalize(), Err(ScoreboardError::Data(_))));
    }

    #[test]
    fn elapsed_seconds_respects_unit_and_base() {
        let raw = r#"{"contest_name": "Abs", "start_time": 1000, "end_time": 19000,
                      "frozen_time": 3600, "penalty": 1200, "problem_id": ["A"],
                      "options": {"submission_timestamp_unit": "second",
                                  "submission_timestamp_absolute": true}}"#;
        let contest: Contest = serde_json::from_str(raw).unwrap();
        assert_eq!(contest.elapsed_seconds(1600), Some(600));

        let mut relative = contest.clone();
        relative.options = ContestOptions::default();
        assert_eq!(relative.elapsed_seconds(600_999), Some(600));
        assert_eq!(relative.elapsed_seconds(-1), Some(-1));
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        let raw = r#"{"contest_name": "Edge", "start_time": 1000, "end_time": 19000,
                      "frozen_time": 3600, "penalty": 1200, "problem_id": ["A"],
                      "options": {"submission_timestamp_unit": "second",
                                  "submission_timestamp_absolute": true}}"#;
        let contest: Contest = serde_json::from_str(raw).unwrap();
        assert_eq!(contest.elapsed_seconds(i64::MIN), None);
        assert!(!contest.is_frozen_at(i64::MIN));
        assert!(contest.is_frozen_at(i64::MAX));

        let mut wide = contest.clone();
        wide.start_time = i64::MIN;
        wide.end_time = i64::MAX;
        assert!(matches!(wide.validate(), Err(ScoreboardError::Data(_))));
    }
}
