//! Classical Elo rating, either reduced over a batch of interactions at
//! once ([`Reduce::Aggregate`]) or applied sequentially, one interaction
//! at a time ([`Reduce::Stream`]).
//!
//! The two reductions are not equivalent: aggregate computes every
//! player's expected and true score against the *prior* ratings of their
//! opponents and applies a single update, while stream folds interactions
//! one by one so a player's second game in the batch sees their opponent's
//! rating as updated by any game that already happened to them earlier in
//! the list.

use log::warn;

use crate::constants;
use crate::error::RatingError;
use crate::interaction::{to_pairwise, Interaction};
use crate::rate::{EloLike, EloRate, Rate as _};
use crate::wdl::windrawlose;

/// How a batch of interactions is folded into rating updates.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Reduce {
    /// Compute every expected/true score against prior ratings, then
    /// apply one update per player. Default.
    #[default]
    Aggregate,
    /// Apply interactions one at a time, each against the ratings
    /// produced by the previous one.
    Stream,
}

/// Configuration for [`elo`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct EloConfig {
    /// Maximum possible adjustment per game.
    pub k_factor: f64,
    /// Automatically coerce outcomes into the win/draw/loss format rather
    /// than using them as raw scores.
    pub wdl: bool,
    /// How interactions are reduced into updates.
    pub reduce: Reduce,
    /// If `true`, a malformed outcome (not `wdl` and outside `{0, 0.5,
    /// 1}`, or not summing to `1`) is a hard [`RatingError::MalformedOutcome`]
    /// instead of a logged warning.
    pub strict: bool,
}

impl Default for EloConfig {
    fn default() -> Self {
        EloConfig {
            k_factor: constants::ELO_K,
            wdl: false,
            reduce: Reduce::default(),
            strict: false,
        }
    }
}

/// Checks that every rating in a call shares the same `base` and
/// `spread`, the precondition `EloLike::expected_outcome` relies on to
/// compare ratings meaningfully.
fn check_same_scale(ratings: &[EloRate]) -> Result<(), RatingError> {
    let Some(first) = ratings.first() else { return Ok(()) };
    if ratings
        .iter()
        .any(|r| r.base() != first.base() || r.spread() != first.spread())
    {
        return Err(RatingError::IncompatibleRate(
            "every Elo rating passed to the same call must share the same base and spread".to_string(),
        ));
    }
    Ok(())
}

fn check_outcome_shape(interaction: &Interaction, strict: bool) -> Result<(), RatingError> {
    let outcomes = interaction.outcomes();
    let well_formed = outcomes.len() == 2
        && matches!(outcomes[0], 0.0 | 0.5 | 1.0)
        && matches!(outcomes[1], 0.0 | 0.5 | 1.0)
        && (outcomes[0] + outcomes[1] - 1.0).abs() < f64::EPSILON;

    if well_formed {
        return Ok(());
    }

    let detail = "outcomes should be (1, 0), (0, 1) or (0.5, 0.5); set wdl=true to \
                  coerce automatically"
        .to_string();

    if strict {
        return Err(RatingError::MalformedOutcome {
            algorithm: "elo",
            detail,
        });
    }

    warn!("elo: malformed outcome {outcomes:?}: {detail}");
    Ok(())
}

/// Rates players by calculating their new Elo rating after a set of
/// interactions.
///
/// Every interaction must involve exactly two players (interactions with
/// more participants are decomposed into pairs via
/// [`Interaction::as_pairs`] before rating).
///
/// # Errors
///
/// Returns [`RatingError::ArityMismatch`] if `players` and `ratings`
/// differ in length, [`RatingError::UnknownPlayer`] if an interaction
/// names a player outside `players`, or [`RatingError::MalformedOutcome`]
/// if `config.strict` is set and an outcome isn't in `{0, 0.5, 1}`.
pub fn elo(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[EloRate],
    config: EloConfig,
) -> Result<Vec<EloRate>, RatingError> {
    if players.len() != ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: players.len(),
            got: ratings.len(),
            context: "players and ratings",
        });
    }
    check_same_scale(ratings)?;

    let pairwise = to_pairwise(interactions);

    for interaction in &pairwise {
        interaction.check_known_players(players)?;
        if !config.wdl {
            check_outcome_shape(interaction, config.strict)?;
        }
    }

    match config.reduce {
        Reduce::Aggregate => aggregate(players, &pairwise, ratings, config),
        Reduce::Stream => stream(players, &pairwise, ratings, config),
    }
}

fn elo_update(elo: EloRate, true_score: f64, expected_score: f64, k_factor: f64) -> EloRate {
    EloRate::new(
        elo.mu() + k_factor * (true_score - expected_score),
        elo.base(),
        elo.spread(),
    )
}

fn aggregate(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[EloRate],
    config: EloConfig,
) -> Result<Vec<EloRate>, RatingError> {
    let mut expected_scores = vec![0.0; players.len()];
    let mut true_scores = vec![0.0; players.len()];

    for interaction in interactions {
        let i = players.iter().position(|p| p == &interaction.players()[0]).expect("checked");
        let j = players.iter().position(|p| p == &interaction.players()[1]).expect("checked");

        expected_scores[i] += ratings[i].expected_outcome(&ratings[j]);
        expected_scores[j] += ratings[j].expected_outcome(&ratings[i]);

        true_scores[i] += interaction.outcomes()[0];
        true_scores[j] += interaction.outcomes()[1];
    }

    if config.wdl {
        let zeroed = vec![crate::rate::GenericRate::new(0.0, 0.0); players.len()];
        let wdl_ratings = windrawlose(players, interactions, &zeroed, 1.0, 0.5, 0.0)?;
        true_scores = wdl_ratings.iter().map(crate::rate::GenericRate::mu).collect();
    }

    Ok(ratings
        .iter()
        .enumerate()
        .map(|(idx, &rating)| elo_update(rating, true_scores[idx], expected_scores[idx], config.k_factor))
        .collect())
}

fn stream(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[EloRate],
    config: EloConfig,
) -> Result<Vec<EloRate>, RatingError> {
    let mut current = ratings.to_vec();

    for interaction in interactions {
        let i = players.iter().position(|p| p == &interaction.players()[0]).expect("checked");
        let j = players.iter().position(|p| p == &interaction.players()[1]).expect("checked");

        let expected_i = current[i].expected_outcome(&current[j]);
        let expected_j = current[j].expected_outcome(&current[i]);

        let updated_i = elo_update(current[i], interaction.outcomes()[0], expected_i, config.k_factor);
        let updated_j = elo_update(current[j], interaction.outcomes()[1], expected_j, config.k_factor);

        current[i] = updated_i;
        current[j] = updated_j;
    }

    Ok(current)
}

#[cfg(test)]
mod test {
    use super::*;

    fn players() -> Vec<String> {
        vec!["a", "b", "c", "d", "e", "f"].into_iter().map(String::from).collect()
    }

    fn ratings() -> Vec<EloRate> {
        vec![1613.0, 1609.0, 1477.0, 1388.0, 1586.0, 1720.0]
            .into_iter()
            .map(|r| EloRate::new(r, 10.0, 400.0))
            .collect()
    }

    fn interactions() -> Vec<Interaction> {
        vec![
            Interaction::new(vec!["a".into(), "b".into()], vec![0.0, 1.0]),
            Interaction::new(vec!["a".into(), "c".into()], vec![0.5, 0.5]),
            Interaction::new(vec!["a".into(), "d".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["a".into(), "e".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["a".into(), "f".into()], vec![0.0, 1.0]),
        ]
    }

    #[test]
    fn aggregate_matches_known_values() {
        let config = EloConfig {
            k_factor: 32.0,
            ..EloConfig::default()
        };
        let result = elo(&players(), &interactions(), &ratings(), config).unwrap();
        let rounded: Vec<i64> = result.iter().map(|r| r.mu().round() as i64).collect();
        assert_eq!(rounded, vec![1601, 1625, 1483, 1381, 1571, 1731]);
    }

    #[test]
    fn stream_differs_from_aggregate() {
        let config = EloConfig {
            k_factor: 32.0,
            reduce: Reduce::Stream,
            ..EloConfig::default()
        };
        let aggregate_result = elo(&players(), &interactions(), &ratings(), EloConfig {
            k_factor: 32.0,
            ..EloConfig::default()
        })
        .unwrap();
        let stream_result = elo(&players(), &interactions(), &ratings(), config).unwrap();
        assert_ne!(aggregate_result[0].mu(), stream_result[0].mu());
    }

    #[test]
    fn rejects_arity_mismatch() {
        let config = EloConfig::default();
        let result = elo(&players(), &[], &ratings()[..2], config);
        assert!(matches!(result, Err(RatingError::ArityMismatch { .. })));
    }

    #[test]
    fn rejects_incompatible_scale() {
        let config = EloConfig::default();
        let mismatched = vec![
            EloRate::new(1500.0, 10.0, 400.0),
            EloRate::new(1500.0, 2.0, 400.0),
            EloRate::new(1500.0, 10.0, 400.0),
            EloRate::new(1500.0, 10.0, 400.0),
            EloRate::new(1500.0, 10.0, 400.0),
            EloRate::new(1500.0, 10.0, 400.0),
        ];
        let result = elo(&players(), &interactions(), &mismatched, config);
        assert!(matches!(result, Err(RatingError::IncompatibleRate(_))));
    }

    #[test]
    fn strict_rejects_malformed_outcome() {
        let config = EloConfig {
            strict: true,
            ..EloConfig::default()
        };
        let bad = vec![Interaction::new(vec!["a".into(), "b".into()], vec![2.0, 0.0])];
        let result = elo(&players(), &bad, &ratings(), config);
        assert!(matches!(result, Err(RatingError::MalformedOutcome { .. })));
    }
}
