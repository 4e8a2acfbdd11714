//! A condensed, doubly-indexed summary of every pairwise game outcome in
//! a population, the input the Minorization-Maximization solver in
//! [`super`] actually iterates over.

use crate::interaction::Interaction;

/// A condensed summary of all the interactions between two players.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct PairwiseStatistics {
    /// Index of the player this record belongs to.
    pub player_idx: usize,
    /// Index of the opponent.
    pub opponent_idx: usize,
    /// Total number of games played between the two.
    pub total_games: f64,
    /// Wins of `player_idx` against `opponent_idx`.
    pub w_ij: f64,
    /// Draws of `player_idx` against `opponent_idx`.
    pub d_ij: f64,
    /// Losses of `player_idx` against `opponent_idx`.
    pub l_ij: f64,
    /// Wins of `opponent_idx` against `player_idx`.
    pub w_ji: f64,
    /// Draws of `opponent_idx` against `player_idx`.
    pub d_ji: f64,
    /// Losses of `opponent_idx` against `player_idx`.
    pub l_ji: f64,
}

/// The pairwise statistics of an entire population: a flat list of
/// per-player opponent records plus a `(player_idx -> opponent count)`
/// map, rather than a dense `num_players x num_players` matrix, since
/// most pairs of players never meet.
#[derive(Clone, PartialEq, Debug)]
pub struct BayesEloStats {
    /// Number of players in the population.
    pub num_players: usize,
    /// Number of distinct opponents each player has faced.
    pub num_opponents_per_player: Vec<usize>,
    /// `statistics[player_idx]` is the list of that player's pairwise
    /// records, one per opponent faced.
    pub statistics: Vec<Vec<PairwiseStatistics>>,
}

impl BayesEloStats {
    fn add_opponent(
        &mut self,
        player: usize,
        opponent: usize,
        opponent_ids: &mut [Vec<usize>],
    ) {
        opponent_ids[player].push(opponent);
        self.statistics[player].push(PairwiseStatistics {
            player_idx: player,
            opponent_idx: opponent,
            ..PairwiseStatistics::default()
        });
        self.num_opponents_per_player[player] += 1;
    }

    /// Finds the pairwise record `player_idx` keeps about `opponent_idx`.
    ///
    /// # Panics
    ///
    /// Panics if the two players never played each other; callers only
    /// use this once [`from_interactions`](Self::from_interactions) has
    /// already established that they did.
    #[must_use]
    pub fn find_opponent(&self, player_idx: usize, opponent_idx: usize) -> &PairwiseStatistics {
        self.statistics[player_idx]
            .iter()
            .find(|s| s.opponent_idx == opponent_idx)
            .unwrap_or_else(|| panic!("no record of {player_idx} having played {opponent_idx}"))
    }

    fn find_opponent_mut(&mut self, player_idx: usize, opponent_idx: usize) -> &mut PairwiseStatistics {
        self.statistics[player_idx]
            .iter_mut()
            .find(|s| s.opponent_idx == opponent_idx)
            .unwrap_or_else(|| panic!("no record of {player_idx} having played {opponent_idx}"))
    }

    /// The sum of all games played by every opponent `player_idx` has
    /// faced.
    #[must_use]
    pub fn count_total_opponent_games(&self, player_idx: usize) -> f64 {
        self.statistics[player_idx].iter().map(|s| s.total_games).sum()
    }

    /// Adds `draw_prior` pseudo-draws spread proportionally over every
    /// pairwise record, keeping the Minorization-Maximization solver
    /// well-posed even for players who have few recorded games.
    pub fn add_prior(&mut self, draw_prior: f64) {
        for player in 0..self.statistics.len() {
            let total_opponent_games = self.count_total_opponent_games(player);
            if total_opponent_games == 0.0 {
                continue;
            }
            let prior = draw_prior * 0.25 / total_opponent_games;

            let opponents: Vec<usize> = self.statistics[player].iter().map(|s| s.opponent_idx).collect();
            for opponent_idx in opponents {
                let this_prior = prior * self.find_opponent(player, opponent_idx).total_games;
                self.find_opponent_mut(player, opponent_idx).d_ij += this_prior;
                self.find_opponent_mut(player, opponent_idx).d_ji += this_prior;
                self.find_opponent_mut(opponent_idx, player).d_ij += this_prior;
                self.find_opponent_mut(opponent_idx, player).d_ji += this_prior;
            }
        }
    }

    /// Turns a list of pairwise interactions into pairwise statistics.
    ///
    /// `players` is assumed to only contain players who actually appear
    /// in `interactions`; the caller routes players without interactions
    /// around this whole pipeline.
    #[must_use]
    pub fn from_interactions(
        players: &[String],
        interactions: &[Interaction],
        add_draw_prior: bool,
        draw_prior: f64,
    ) -> Self {
        let index_of = |player: &str| players.iter().position(|p| p == player).expect("known player");

        let mut stats = BayesEloStats {
            num_players: players.len(),
            num_opponents_per_player: vec![0; players.len()],
            statistics: vec![Vec::new(); players.len()],
        };

        let mut opponent_ids: Vec<Vec<usize>> = vec![Vec::new(); players.len()];

        for interaction in interactions {
            let i = index_of(&interaction.players()[0]);
            let j = index_of(&interaction.players()[1]);

            if !opponent_ids[i].contains(&j) {
                stats.add_opponent(i, j, &mut opponent_ids);
                stats.add_opponent(j, i, &mut opponent_ids);
            }

            let outcomes = interaction.outcomes();
            if outcomes[0] > outcomes[1] {
                stats.find_opponent_mut(i, j).w_ij += 1.0;
                stats.find_opponent_mut(j, i).w_ji += 1.0;
            } else if outcomes[0] < outcomes[1] {
                stats.find_opponent_mut(i, j).l_ij += 1.0;
                stats.find_opponent_mut(j, i).l_ji += 1.0;
            } else {
                stats.find_opponent_mut(i, j).d_ij += 1.0;
                stats.find_opponent_mut(j, i).d_ji += 1.0;
            }

            stats.find_opponent_mut(i, j).total_games += 1.0;
            stats.find_opponent_mut(j, i).total_games += 1.0;
        }

        if add_draw_prior {
            stats.add_prior(draw_prior);
        }

        stats
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn single_win_is_recorded_both_ways() {
        let players = vec!["a".to_string(), "b".to_string()];
        let interactions = vec![Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0])];

        let stats = BayesEloStats::from_interactions(&players, &interactions, false, 0.0);

        assert_eq!(stats.find_opponent(0, 1).w_ij, 1.0);
        assert_eq!(stats.find_opponent(1, 0).w_ji, 1.0);
        assert_eq!(stats.find_opponent(0, 1).total_games, 1.0);
    }
}
