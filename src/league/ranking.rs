//! Standings derivation

use crate::league::Team;
use crate::types::Standing;
use std::cmp::Ordering;

/// Table order: points descending, then name ascending
pub fn standing_order(a: &Team, b: &Team) -> Ordering {
    b.points()
        .cmp(&a.points())
        .then_with(|| a.name().cmp(b.name()))
}

/// Rank teams 1..N in table order
///
/// Teams level on points are told apart by name, so every team gets its
/// own position and ranks have no gaps.
pub fn rank_teams(mut teams: Vec<Team>) -> Vec<Standing> {
    teams.sort_by(standing_order);
    teams
        .into_iter()
        .enumerate()
        .map(|(index, team)| Standing {
            rank: index + 1,
            name: team.name().to_string(),
            points: team.points(),
            played: team.games_played(),
            wins: team.wins(),
            draws: team.draws(),
            losses: team.losses(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::StandardPointsPolicy;
    use crate::types::Counter;

    fn team(name: &str, wins: u32, draws: u32) -> Team {
        let mut team = Team::new(name).unwrap();
        for _ in 0..wins {
            team.record(Counter::Win).unwrap();
        }
        for _ in 0..draws {
            team.record(Counter::Draw).unwrap();
        }
        team.refresh_points(&StandardPointsPolicy);
        team
    }

    #[test]
    fn test_ties_broken_by_name() {
        let standings = rank_teams(vec![team("Second Team", 0, 1), team("First Team", 0, 1)]);
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[0].name, "First Team");
        assert_eq!(standings[0].points, 1);
        assert_eq!(standings[1].rank, 2);
        assert_eq!(standings[1].name, "Second Team");
        assert_eq!(standings[1].points, 1);
    }

    #[test]
    fn test_points_first() {
        let standings = rank_teams(vec![
            team("Alpha", 0, 2),
            team("Zulu", 1, 0),
            team("Mike", 0, 0),
        ]);
        let order: Vec<(&str, usize)> = standings
            .iter()
            .map(|s| (s.name.as_str(), s.rank))
            .collect();
        assert_eq!(order, vec![("Zulu", 1), ("Alpha", 2), ("Mike", 3)]);
        assert_eq!(standings[1].played, 2);
        assert_eq!(standings[1].draws, 2);
    }

    #[test]
    fn test_ranks_are_dense() {
        let teams: Vec<Team> = (0..10).map(|i| team(&format!("Team {:02}", i), i % 3, 0)).collect();
        let standings = rank_teams(teams);
        let ranks: Vec<usize> = standings.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_league() {
        assert!(rank_teams(Vec::new()).is_empty());
    }
}
