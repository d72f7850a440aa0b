use std::fmt;

use tracing::debug;

use crate::models::{Team, TeamStanding};

pub const UNOFFICIAL_GROUP: &str = "unofficial";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TeamFilter {
    #[default]
    All,
    Official,
    Unofficial,
    Girls,
    Undergraduate,
    /// Vocational college teams
    Special,
    /// Any other token is a literal group label
    Group(String),
}

impl TeamFilter {
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            "" | "all" => TeamFilter::All,
            "official" => TeamFilter::Official,
            "unofficial" => TeamFilter::Unofficial,
            "girls" => TeamFilter::Girls,
            "undergraduate" => TeamFilter::Undergraduate,
            "special" => TeamFilter::Special,
            group => TeamFilter::Group(group.to_string()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, TeamFilter::All)
    }

    pub fn matches(&self, team: &Team) -> bool {
        match self {
            TeamFilter::All => true,
            TeamFilter::Official => !team.in_group(UNOFFICIAL_GROUP),
            TeamFilter::Unofficial => team.in_group(UNOFFICIAL_GROUP),
            TeamFilter::Girls => team.is_girl,
            TeamFilter::Undergraduate => team.is_undergraduate,
            TeamFilter::Special => team.is_vocational,
            TeamFilter::Group(group) => team.in_group(group),
        }
    }

    /// Key used to look up per-group settings such as medal counts.
    pub fn group_key(&self) -> &str {
        match self {
            TeamFilter::All | TeamFilter::Official => "official",
            TeamFilter::Unofficial => "unofficial",
            TeamFilter::Girls => "girls",
            TeamFilter::Undergraduate => "undergraduate",
            TeamFilter::Special => "special",
            TeamFilter::Group(group) => group.as_str(),
        }
    }
}

impl From<&str> for TeamFilter {
    fn from(token: &str) -> Self {
        TeamFilter::parse(token)
    }
}

impl fmt::Display for TeamFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamFilter::All => f.write_str("all"),
            other => f.write_str(other.group_key()),
        }
    }
}

/// Keeps the matching standings untouched. Rank, institution rank and
/// first-to-solve are stale afterwards; run the ranker again.
pub fn filter_standings(standings: Vec<TeamStanding>, filter: &TeamFilter) -> Vec<TeamStanding> {
    if filter.is_all() {
        return standings;
    }

    let before = standings.len();
    let kept: Vec<TeamStanding> = standings
        .into_iter()
        .filter(|standing| filter.matches(&standing.team))
        .collect();
    debug!("Filter {} kept {} of {} teams", filter, kept.len(), before);
    kept
}
