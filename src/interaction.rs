//! Recorded interactions between players, the sole unit of evidence every
//! rating algorithm in this crate consumes.

use crate::error::RatingError;

/// A single recorded game between two or more players.
///
/// `players` and `outcomes` are always the same length: `outcomes[i]` is
/// the score obtained by `players[i]` in this interaction. For two-player
/// games a score of `1.0` is a win, `0.0` a loss and `0.5` a draw; some
/// algorithms (Nash average, multidimensional Elo) additionally accept
/// margins or other real-valued outcomes, documented on the functions that
/// use them.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interaction {
    players: Vec<String>,
    outcomes: Vec<f64>,
}

impl Interaction {
    /// Creates a new interaction.
    ///
    /// # Panics
    ///
    /// This function panics if `players` and `outcomes` have different
    /// lengths, or if either is empty.
    #[must_use]
    pub fn new(players: Vec<String>, outcomes: Vec<f64>) -> Self {
        assert!(!players.is_empty(), "an interaction needs at least one player");
        assert_eq!(
            players.len(),
            outcomes.len(),
            "players and outcomes must have the same length"
        );

        Interaction { players, outcomes }
    }

    /// The identifiers of the players that took part.
    #[must_use]
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// The score each player obtained, in the same order as [`players`](Self::players).
    #[must_use]
    pub fn outcomes(&self) -> &[f64] {
        &self.outcomes
    }

    /// The number of players in this interaction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether this interaction (impossibly) has no players.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Decomposes a multi-player interaction into every unordered pair of
    /// participants, each carried as its own two-player [`Interaction`].
    ///
    /// This is how algorithms that are only defined pairwise (Elo,
    /// BayesElo, Glicko) consume interactions recorded with more than two
    /// players: a four-player free-for-all becomes six pairwise
    /// interactions, one per combination.
    #[must_use]
    pub fn as_pairs(&self) -> Vec<Interaction> {
        let n = self.players.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);

        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push(Interaction {
                    players: vec![self.players[i].clone(), self.players[j].clone()],
                    outcomes: vec![self.outcomes[i], self.outcomes[j]],
                });
            }
        }

        pairs
    }

    /// Checks that every player named in this interaction is present in
    /// `known_players`.
    pub(crate) fn check_known_players(&self, known_players: &[String]) -> Result<(), RatingError> {
        for player in &self.players {
            if !known_players.contains(player) {
                return Err(RatingError::UnknownPlayer {
                    player: player.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Flattens a list of (possibly multi-player) interactions into their
/// pairwise decomposition, in order.
#[must_use]
pub fn to_pairwise(interactions: &[Interaction]) -> Vec<Interaction> {
    interactions.iter().flat_map(Interaction::as_pairs).collect()
}
