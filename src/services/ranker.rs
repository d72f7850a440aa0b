use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::models::{Medal, MedalThresholds, Team, TeamStanding};

fn by_score(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.score.cmp(&a.score)
}

fn by_total_time(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    a.total_time.cmp(&b.total_time)
}

/// More solved problems first, then less penalty time.
pub fn compare_standings(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    by_score(a, b).then_with(|| by_total_time(a, b))
}

fn is_tied(a: &TeamStanding, b: &TeamStanding) -> bool {
    compare_standings(a, b) == Ordering::Equal
}

/// Orders the board and re-derives every rank dependent annotation.
/// Safe to call again on any subset of a ranked board.
pub fn rank_standings(standings: &mut [TeamStanding]) {
    // Stable sort, tied teams keep their incoming order
    standings.sort_by(compare_standings);
    assign_ranks(standings);
    assign_institution_ranks(standings);
    mark_first_to_solve(standings);
    debug!("Ranked {} teams", standings.len());
}

/// Competition ranking: tied teams share a rank and the next team skips
/// ahead to its position (1, 1, 3).
pub fn assign_ranks(standings: &mut [TeamStanding]) {
    for position in 0..standings.len() {
        let rank = if position > 0 && is_tied(&standings[position - 1], &standings[position]) {
            standings[position - 1].rank
        } else {
            position as u32 + 1
        };
        standings[position].rank = rank;
    }
}

/// Institutions are numbered in order of their best placed team.
/// Teams without an institution get no institution rank.
pub fn assign_institution_ranks(standings: &mut [TeamStanding]) {
    let mut institution_ranks: HashMap<String, u32> = HashMap::new();
    for standing in standings.iter_mut() {
        if standing.institution().is_empty() {
            standing.institution_rank = None;
            continue;
        }

        let next_rank = institution_ranks.len() as u32 + 1;
        let rank = *institution_ranks
            .entry(standing.institution().to_string())
            .or_insert(next_rank);
        standing.institution_rank = Some(rank);
    }
}

/// Every visible solve matching the earliest solve minute of its problem is
/// marked, so teams solving in the same minute all get the flag.
pub fn mark_first_to_solve(standings: &mut [TeamStanding]) {
    let mut earliest: HashMap<String, i64> = HashMap::new();
    for standing in standings.iter() {
        for (problem_id, outcome) in &standing.problem_results {
            if !outcome.is_visible_solve() {
                continue;
            }
            earliest
                .entry(problem_id.clone())
                .and_modify(|time| *time = (*time).min(outcome.solved_time))
                .or_insert(outcome.solved_time);
        }
    }

    for standing in standings.iter_mut() {
        for (problem_id, outcome) in standing.problem_results.iter_mut() {
            outcome.first_to_solve = outcome.is_visible_solve()
                && earliest.get(problem_id) == Some(&outcome.solved_time);
        }
    }
}

/// Expects the board to be sorted. Medal positions are counted among the
/// teams `is_eligible` accepts, tied teams share a position, and teams
/// without a solve never medal.
pub fn assign_medals<F>(
    standings: &mut [TeamStanding],
    thresholds: Option<&MedalThresholds>,
    is_eligible: F,
) where
    F: Fn(&Team) -> bool,
{
    let mut position: u32 = 0;
    let mut medal_rank: u32 = 0;
    let mut previous: Option<(u32, i64)> = None;

    for standing in standings.iter_mut() {
        standing.medal = None;
        if !is_eligible(&standing.team) {
            continue;
        }

        position += 1;
        let key = (standing.score, standing.total_time);
        if previous != Some(key) {
            medal_rank = position;
        }
        previous = Some(key);

        standing.medal =
            thresholds.and_then(|thresholds| medal_for(standing.score, medal_rank, thresholds));
    }
}

fn medal_for(score: u32, medal_rank: u32, thresholds: &MedalThresholds) -> Option<Medal> {
    if score == 0 {
        return None;
    }

    let gold = thresholds.gold;
    let silver = gold.saturating_add(thresholds.silver);
    let bronze = silver.saturating_add(thresholds.bronze);
    match medal_rank {
        rank if rank <= gold => Some(Medal::Gold),
        rank if rank <= silver => Some(Medal::Silver),
        rank if rank <= bronze => Some(Medal::Bronze),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: &str, organization: &str) -> Team {
        Team {
            id: id.to_string(),
            name: format!("Team {id}"),
            organization: organization.to_string(),
            coach: None,
            members: Vec::new(),
            groups: Vec::new(),
            is_undergraduate: false,
            is_girl: false,
            is_vocational: false,
        }
    }

    fn standing(id: &str, organization: &str, score: u32, total_time: i64) -> TeamStanding {
        let mut standing = TeamStanding::new(team(id, organization), &["A".to_string()]);
        standing.score = score;
        standing.total_time = total_time;
        standing
    }

    fn solve(standing: &mut TeamStanding, minute: i64) {
        let outcome = standing.problem_results.get_mut("A").unwrap();
        outcome.solved = true;
        outcome.solved_time = minute;
    }

    fn ids(standings: &[TeamStanding]) -> Vec<&str> {
        standings.iter().map(|s| s.team_id.as_str()).collect()
    }

    #[test]
    fn orders_by_score_then_time() {
        let mut board = vec![
            standing("slow", "U1", 2, 300),
            standing("few", "U2", 1, 10),
            standing("fast", "U3", 2, 120),
        ];
        rank_standings(&mut board);
        assert_eq!(ids(&board), vec!["fast", "slow", "few"]);
        assert_eq!(board.iter().map(|s| s.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn tied_teams_share_rank_and_next_team_skips() {
        let mut board = vec![
            standing("a", "U1", 3, 100),
            standing("b", "U2", 3, 100),
            standing("c", "U3", 2, 50),
            standing("d", "U4", 2, 50),
            standing("e", "U5", 0, 0),
        ];
        rank_standings(&mut board);
        assert_eq!(
            board.iter().map(|s| s.rank).collect::<Vec<_>>(),
            vec![1, 1, 3, 3, 5]
        );
        // Stable for ties
        assert_eq!(ids(&board), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn institution_ranks_follow_first_appearance() {
        let mut board = vec![
            standing("a", "North", 5, 100),
            standing("b", "", 4, 100),
            standing("c", "South", 3, 100),
            standing("d", "North", 2, 100),
            standing("e", "East", 1, 100),
        ];
        rank_standings(&mut board);
        let ranks: Vec<Option<u32>> = board.iter().map(|s| s.institution_rank).collect();
        assert_eq!(ranks, vec![Some(1), None, Some(2), Some(1), Some(3)]);
    }

    #[test]
    fn first_to_solve_marks_every_team_in_the_earliest_minute() {
        let mut a = standing("a", "U1", 1, 40);
        let mut b = standing("b", "U2", 1, 40);
        let mut c = standing("c", "U3", 1, 55);
        solve(&mut a, 40);
        solve(&mut b, 40);
        solve(&mut c, 55);
        let mut board = vec![c, a, b];
        rank_standings(&mut board);

        let flags: Vec<(&str, bool)> = board
            .iter()
            .map(|s| (s.team_id.as_str(), s.problem_results["A"].first_to_solve))
            .collect();
        assert_eq!(flags, vec![("a", true), ("b", true), ("c", false)]);
    }

    #[test]
    fn first_to_solve_is_recomputed_after_dropping_the_leader() {
        let mut a = standing("a", "U1", 1, 10);
        let mut b = standing("b", "U2", 1, 20);
        solve(&mut a, 10);
        solve(&mut b, 20);
        let mut board = vec![a, b];
        rank_standings(&mut board);
        assert!(!board[1].problem_results["A"].first_to_solve);

        let mut subset: Vec<TeamStanding> = board.into_iter().skip(1).collect();
        rank_standings(&mut subset);
        assert_eq!(subset[0].rank, 1);
        assert!(subset[0].problem_results["A"].first_to_solve);
    }

    #[test]
    fn frozen_solves_never_take_first_to_solve() {
        let mut a = standing("a", "U1", 1, 10);
        let mut b = standing("b", "U2", 1, 30);
        solve(&mut a, 10);
        a.problem_results.get_mut("A").unwrap().is_frozen = true;
        solve(&mut b, 30);
        let mut board = vec![a, b];
        rank_standings(&mut board);
        let a = board.iter().find(|s| s.team_id == "a").unwrap();
        let b = board.iter().find(|s| s.team_id == "b").unwrap();
        assert!(!a.problem_results["A"].first_to_solve);
        assert!(b.problem_results["A"].first_to_solve);
    }

    #[test]
    fn medals_follow_cumulative_thresholds() {
        let mut board = vec![
            standing("a", "U1", 4, 100),
            standing("b", "U2", 3, 100),
            standing("c", "U3", 3, 100),
            standing("d", "U4", 2, 100),
            standing("e", "U5", 0, 0),
        ];
        rank_standings(&mut board);
        let thresholds = MedalThresholds {
            gold: 1,
            silver: 1,
            bronze: 5,
        };
        assign_medals(&mut board, Some(&thresholds), |_| true);
        let medals: Vec<Option<Medal>> = board.iter().map(|s| s.medal).collect();
        assert_eq!(
            medals,
            vec![
                Some(Medal::Gold),
                Some(Medal::Silver),
                Some(Medal::Silver),
                Some(Medal::Bronze),
                None
            ]
        );

        assign_medals(&mut board, None, |_| true);
        assert!(board.iter().all(|s| s.medal.is_none()));
    }

    #[test]
    fn ineligible_teams_do_not_take_medal_positions() {
        let mut guest = standing("guest", "Guest College", 3, 60);
        guest.team.groups.push("unofficial".to_string());
        let mut board = vec![
            guest,
            standing("a", "U1", 2, 100),
            standing("b", "U2", 2, 100),
            standing("c", "U3", 1, 100),
        ];
        rank_standings(&mut board);
        let thresholds = MedalThresholds {
            gold: 1,
            silver: 0,
            bronze: 1,
        };
        assign_medals(&mut board, Some(&thresholds), |team| {
            !team.in_group("unofficial")
        });

        let medals: Vec<(&str, u32, Option<Medal>)> = board
            .iter()
            .map(|s| (s.team_id.as_str(), s.rank, s.medal))
            .collect();
        assert_eq!(
            medals,
            vec![
                ("guest", 1, None),
                ("a", 2, Some(Medal::Gold)),
                ("b", 2, Some(Medal::Gold)),
                ("c", 4, None),
            ]
        );
    }
}
