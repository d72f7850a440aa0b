use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ScoreboardError, ScoreboardResult};
use crate::models::{Contest, Roster, Submission};

const CONFIG_FILE: &str = "config.json";
const TEAM_FILE: &str = "team.json";
const RUN_FILE: &str = "run.json";
const DIRECTORY_FILE: &str = "directory.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestSummary {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "contest_name")]
    pub name: String,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub organization: String,
    #[serde(rename = "type", default)]
    pub contest_type: String,
}

impl ContestSummary {
    pub fn from_contest(contest: &Contest) -> Self {
        Self {
            id: contest.id.clone(),
            name: contest.name.clone(),
            start_time: contest.start_time,
            end_time: contest.end_time,
            organization: contest.organization.clone(),
            contest_type: classify_contest(&contest.id).to_string(),
        }
    }
}

/// Series label derived from the contest id prefix.
pub fn classify_contest(contest_id: &str) -> &'static str {
    if contest_id.starts_with("icpc") {
        "ICPC"
    } else if contest_id.starts_with("ccpc") {
        "CCPC"
    } else if contest_id.starts_with("provincial") {
        "Provincial"
    } else {
        "Other"
    }
}

/// Where contest documents come from. The engine only sees loaded values.
pub trait ContestSource {
    fn list_contests(&self) -> ScoreboardResult<Vec<ContestSummary>>;
    fn load_contest(&self, contest_id: &str) -> ScoreboardResult<Contest>;
    fn load_roster(&self, contest: &Contest) -> ScoreboardResult<Roster>;
    fn load_submissions(&self, contest: &Contest) -> ScoreboardResult<Vec<Submission>>;
}

#[derive(Debug, Deserialize)]
struct ContestDirectory {
    contests: BTreeMap<String, ContestSummary>,
}

/// Reads the xcpcio board layout: `<data>/<contest id>/{config,team,run}.json`
/// with an optional `<data>/directory.json` index.
#[derive(Debug, Clone)]
pub struct FsContestSource {
    data_dir: PathBuf,
}

impl FsContestSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn contest_dir(&self, contest_id: &str) -> ScoreboardResult<PathBuf> {
        let relative = Path::new(contest_id);
        let is_plain = !contest_id.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(ScoreboardError::NotFound(contest_id.to_string()));
        }
        Ok(self.data_dir.join(relative))
    }

    fn read_document<T: DeserializeOwned>(&self, path: &Path) -> ScoreboardResult<T> {
        let raw = fs::read_to_string(path).map_err(|err| {
            ScoreboardError::Data(format!("failed to read {}: {}", path.display(), err))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            ScoreboardError::Data(format!("failed to parse {}: {}", path.display(), err))
        })
    }

    fn scan_contests(&self) -> ScoreboardResult<Vec<ContestSummary>> {
        let mut contest_ids = Vec::new();
        collect_contest_ids(&self.data_dir, &self.data_dir, &mut contest_ids)?;

        let mut summaries = Vec::with_capacity(contest_ids.len());
        for contest_id in contest_ids {
            match self.load_contest(&contest_id) {
                Ok(contest) => summaries.push(ContestSummary::from_contest(&contest)),
                Err(err) => warn!("Skipping contest {}: {}", contest_id, err),
            }
        }
        Ok(summaries)
    }
}

fn collect_contest_ids(root: &Path, dir: &Path, out: &mut Vec<String>) -> ScoreboardResult<()> {
    if dir.join(CONFIG_FILE).is_file() && dir != root {
        let relative = dir.strip_prefix(root).unwrap_or(dir);
        let contest_id = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.push(contest_id);
    }

    let mut children: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_dir())
        .collect();
    children.sort();
    for child in children {
        collect_contest_ids(root, &child, out)?;
    }
    Ok(())
}

impl ContestSource for FsContestSource {
    fn list_contests(&self) -> ScoreboardResult<Vec<ContestSummary>> {
        let directory_path = self.data_dir.join(DIRECTORY_FILE);
        if directory_path.is_file() {
            let directory: ContestDirectory = self.read_document(&directory_path)?;
            info!(
                "Loaded {} contests from {}",
                directory.contests.len(),
                directory_path.display()
            );
            return Ok(directory
                .contests
                .into_iter()
                .map(|(contest_id, mut summary)| {
                    summary.contest_type = classify_contest(&contest_id).to_string();
                    summary.id = contest_id;
                    summary
                })
                .collect());
        }

        info!(
            "{} not found, scanning {}",
            DIRECTORY_FILE,
            self.data_dir.display()
        );
        self.scan_contests()
    }

    fn load_contest(&self, contest_id: &str) -> ScoreboardResult<Contest> {
        let config_path = self.contest_dir(contest_id)?.join(CONFIG_FILE);
        if !config_path.is_file() {
            return Err(ScoreboardError::NotFound(contest_id.to_string()));
        }

        let mut contest: Contest = self.read_document(&config_path)?;
        contest.id = contest_id.to_string();
        contest.normalize()?;
        Ok(contest)
    }

    fn load_roster(&self, contest: &Contest) -> ScoreboardResult<Roster> {
        let team_path = self.contest_dir(&contest.id)?.join(TEAM_FILE);
        let mut roster: Roster = self.read_document(&team_path)?;
        for (team_id, team) in roster.iter_mut() {
            if team.id.is_empty() {
                team.id = team_id.clone();
            }
        }
        info!("Loaded {} teams for contest {}", roster.len(), contest.id);
        Ok(roster)
    }

    fn load_submissions(&self, contest: &Contest) -> ScoreboardResult<Vec<Submission>> {
        let run_path = self.contest_dir(&contest.id)?.join(RUN_FILE);
        let submissions: Vec<Submission> = self.read_document(&run_path)?;
        info!(
            "Loaded {} submissions for contest {}",
            submissions.len(),
            contest.id
        );
        Ok(submissions)
    }
}
