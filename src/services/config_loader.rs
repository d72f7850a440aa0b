use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{ScoreboardError, ScoreboardResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreboardConfig {
    /// Root of the per-contest data folders.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Teams whose submissions are dropped before any computation, on top of `jury`.
    /// Covers judge accounts that validate problems under a regular team id.
    #[serde(default)]
    pub filter_team_submissions: Vec<String>,
    /// Team id -> extra group label appended to that team.
    /// Fixes a wrong team group that can't be changed in the published data.
    #[serde(default)]
    pub team_group_map: HashMap<String, String>,
    #[serde(default)]
    pub listing: ListingConfig,
}

impl Default for ScoreboardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_dir: default_log_dir(),
            filter_team_submissions: Vec::new(),
            team_group_map: HashMap::new(),
            listing: ListingConfig::default(),
        }
    }
}

fn default_page_size() -> usize {
    15
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn load_scoreboard_config(config_path: &Path) -> ScoreboardResult<ScoreboardConfig> {
    if !config_path.exists() {
        info!(
            "config file not found, using defaults: {}",
            config_path.display()
        );
        return Ok(ScoreboardConfig::default());
    }

    let raw = fs::read_to_string(config_path).map_err(|err| {
        ScoreboardError::Config(format!(
            "Failed to read {}: {}",
            config_path.display(),
            err
        ))
    })?;

    toml::from_str::<ScoreboardConfig>(&raw).map_err(|err| {
        ScoreboardError::Config(format!(
            "Failed to parse {}: {}",
            config_path.display(),
            err
        ))
    })
}
