//! TrueSkill: a Gaussian belief-propagation rating system supporting
//! free-for-all and multi-team matches, not just pairwise ones.
//!
//! [`trueskill`] treats every player in an interaction as their own
//! one-person team, ranked by their recorded outcome (ties rank equal
//! and are treated as a draw between the tied teams). [`trueskill_teams`]
//! generalizes this to matches where a team has more than one member,
//! each contributing to the team's joint performance scaled by a
//! per-member [`Team`] weight.
//!
//! Interactions/matches are applied one at a time: each one builds its
//! own factor graph seeded from the current ratings, runs expectation
//! propagation to convergence, and feeds the updated ratings into the
//! next one. There is no meaningful "aggregate" reduction for TrueSkill
//! the way there is for Elo, since the factor graph itself already
//! accounts for all teams in a single match jointly.

mod factor_graph;

use log::warn;

use crate::constants;
use crate::error::RatingError;
use crate::interaction::Interaction;
use crate::math::normal_inverse_cdf;
use crate::rate::{Rate as _, TrueSkillRate};
use factor_graph::{FactorGraph, Gaussian, LikelihoodFactor, PriorFactor, SumFactor, TruncateFactor};

/// Configuration for [`trueskill`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TrueSkillConfig {
    /// Performance variance: how much an individual game's outcome can
    /// diverge from a player's underlying skill.
    pub beta: f64,
    /// Per-period additive variance modelling skill drift between
    /// rating updates.
    pub dynamic_factor: f64,
    /// Probability that a match between otherwise equal players ends in
    /// a draw, used to derive the truncation factors' draw margin.
    pub draw_probability: f64,
    /// Maximum number of zig-zag iterations for matches with more than
    /// two teams.
    pub max_iterations: usize,
    /// Convergence tolerance on the largest per-variable marginal
    /// movement between zig-zag iterations.
    pub tolerance: f64,
    /// If `true`, failing to converge within `max_iterations` is a hard
    /// [`RatingError::NonConvergent`] instead of a logged warning that
    /// returns the best ratings found so far.
    pub strict: bool,
}

impl Default for TrueSkillConfig {
    fn default() -> Self {
        TrueSkillConfig {
            beta: constants::TRUESKILL_BETA,
            dynamic_factor: constants::TRUESKILL_TAU,
            draw_probability: constants::TRUESKILL_DRAW_PROBABILITY,
            max_iterations: constants::TRUESKILL_MAX_ITERATIONS,
            tolerance: constants::TRUESKILL_TOLERANCE,
            strict: false,
        }
    }
}

fn draw_margin(draw_probability: f64, beta: f64) -> f64 {
    normal_inverse_cdf((draw_probability + 1.0) / 2.0).abs() * std::f64::consts::SQRT_2 * beta
}

/// Rates players by running TrueSkill's factor-graph update over a
/// sequence of interactions, applied one at a time.
///
/// Each interaction's participants are ranked by their recorded outcome
/// (higher is better; ties are draws) and rated jointly as a multi-team
/// free-for-all.
///
/// # Errors
///
/// Returns [`RatingError::ArityMismatch`] if `players` and `ratings`
/// differ in length, [`RatingError::UnknownPlayer`] if an interaction
/// names a player outside `players`, or (when `config.strict` is set)
/// [`RatingError::NonConvergent`] if a match's zig-zag iteration doesn't
/// settle within `config.max_iterations`.
pub fn trueskill(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[TrueSkillRate],
    config: TrueSkillConfig,
) -> Result<Vec<TrueSkillRate>, RatingError> {
    if players.len() != ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: players.len(),
            got: ratings.len(),
            context: "players and ratings",
        });
    }

    let mut current = ratings.to_vec();
    let margin = draw_margin(config.draw_probability, config.beta);

    for interaction in interactions {
        interaction.check_known_players(players)?;
        let teams: Vec<ResolvedTeam> = (0..interaction.len())
            .map(|slot| {
                let gi = players.iter().position(|p| p == &interaction.players()[slot]).expect("checked");
                ResolvedTeam {
                    members: vec![gi],
                    weights: vec![1.0],
                    rank: interaction.outcomes()[slot],
                }
            })
            .collect();
        rate_match(&teams, &mut current, &config, margin)?;
    }

    Ok(current)
}

/// A team competing in a single match of [`trueskill_teams`]: the
/// players composing it, each contributing to the team's joint
/// performance with a weight (`1.0` per member is the common,
/// unweighted case), plus the rank or score the team achieved (higher
/// is better; equal ranks are a draw between those teams).
#[derive(Clone, PartialEq, Debug)]
pub struct Team {
    members: Vec<String>,
    weights: Vec<f64>,
    rank: f64,
}

impl Team {
    /// Creates a new team with an explicit per-member weight.
    ///
    /// # Panics
    ///
    /// Panics if `members` and `weights` differ in length, or if either
    /// is empty.
    #[must_use]
    pub fn new(members: Vec<String>, weights: Vec<f64>, rank: f64) -> Self {
        assert!(!members.is_empty(), "team has no members");
        assert!(
            members.len() == weights.len(),
            "members/weights length mismatch: {} vs {}",
            members.len(),
            weights.len()
        );
        Team { members, weights, rank }
    }

    /// Creates a new team where every member contributes an equal share
    /// (weight `1.0`) to the team's performance.
    #[must_use]
    pub fn even(members: Vec<String>, rank: f64) -> Self {
        let weights = vec![1.0; members.len()];
        Team::new(members, weights, rank)
    }
}

struct ResolvedTeam {
    members: Vec<usize>,
    weights: Vec<f64>,
    rank: f64,
}

/// Rates players by running TrueSkill's factor-graph update over a
/// sequence of team matches, applied one at a time. Unlike [`trueskill`],
/// a team may have more than one member; each member's performance
/// contributes to their team's joint performance scaled by its weight
/// (see [`Team::new`]).
///
/// # Errors
///
/// Returns [`RatingError::ArityMismatch`] if `players` and `ratings`
/// differ in length, [`RatingError::UnknownPlayer`] if a match names a
/// player outside `players`, or (when `config.strict` is set)
/// [`RatingError::NonConvergent`] if a match's zig-zag iteration doesn't
/// settle within `config.max_iterations`.
pub fn trueskill_teams(
    players: &[String],
    matches: &[Vec<Team>],
    ratings: &[TrueSkillRate],
    config: TrueSkillConfig,
) -> Result<Vec<TrueSkillRate>, RatingError> {
    if players.len() != ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: players.len(),
            got: ratings.len(),
            context: "players and ratings",
        });
    }

    let mut current = ratings.to_vec();
    let margin = draw_margin(config.draw_probability, config.beta);

    for teams in matches {
        let resolved: Vec<ResolvedTeam> = teams
            .iter()
            .map(|team| {
                let members = team
                    .members
                    .iter()
                    .map(|member| {
                        players
                            .iter()
                            .position(|p| p == member)
                            .ok_or_else(|| RatingError::UnknownPlayer { player: member.clone() })
                    })
                    .collect::<Result<Vec<usize>, RatingError>>()?;
                Ok(ResolvedTeam {
                    members,
                    weights: team.weights.clone(),
                    rank: team.rank,
                })
            })
            .collect::<Result<Vec<ResolvedTeam>, RatingError>>()?;

        rate_match(&resolved, &mut current, &config, margin)?;
    }

    Ok(current)
}

fn rate_match(
    teams: &[ResolvedTeam],
    current: &mut [TrueSkillRate],
    config: &TrueSkillConfig,
    margin: f64,
) -> Result<(), RatingError> {
    let mut order: Vec<usize> = (0..teams.len()).collect();
    order.sort_by(|&a, &b| teams[b].rank.partial_cmp(&teams[a].rank).unwrap_or(std::cmp::Ordering::Equal));
    let n = order.len();

    let mut graph = FactorGraph::new();
    // Per-member rating/performance variables and factors, grouped by
    // (rank-ordered) team.
    let mut rating_vars: Vec<Vec<usize>> = Vec::with_capacity(n);
    let mut priors: Vec<Vec<PriorFactor>> = Vec::with_capacity(n);
    let mut likelihoods: Vec<Vec<LikelihoodFactor>> = Vec::with_capacity(n);
    let mut team_perf_vars = Vec::with_capacity(n);
    let mut team_perf_factors = Vec::with_capacity(n);

    for &team_idx in &order {
        let team = &teams[team_idx];
        let mut members_rating_vars = Vec::with_capacity(team.members.len());
        let mut members_priors = Vec::with_capacity(team.members.len());
        let mut members_likelihoods = Vec::with_capacity(team.members.len());
        let mut members_perf_vars = Vec::with_capacity(team.members.len());

        for &gi in &team.members {
            let rating_var = graph.new_variable();
            let perf_var = graph.new_variable();
            let rating = current[gi];
            members_priors.push(PriorFactor::new(&mut graph, rating_var, rating.mu(), rating.std(), config.dynamic_factor));
            members_likelihoods.push(LikelihoodFactor::new(&mut graph, rating_var, perf_var, config.beta * config.beta));
            members_rating_vars.push(rating_var);
            members_perf_vars.push(perf_var);
        }

        let team_perf_var = graph.new_variable();
        let team_perf_factor = SumFactor::new(&mut graph, team_perf_var, members_perf_vars, team.weights.clone());

        rating_vars.push(members_rating_vars);
        priors.push(members_priors);
        likelihoods.push(members_likelihoods);
        team_perf_vars.push(team_perf_var);
        team_perf_factors.push(team_perf_factor);
    }

    let team_diff_vars: Vec<usize> = (0..n.saturating_sub(1)).map(|_| graph.new_variable()).collect();
    let diff_factors: Vec<SumFactor> = (0..n.saturating_sub(1))
        .map(|i| {
            SumFactor::new(
                &mut graph,
                team_diff_vars[i],
                vec![team_perf_vars[i], team_perf_vars[i + 1]],
                vec![1.0, -1.0],
            )
        })
        .collect();

    let truncate_factors: Vec<TruncateFactor> = (0..n.saturating_sub(1))
        .map(|i| {
            let is_draw = (teams[order[i]].rank - teams[order[i + 1]].rank).abs() < f64::EPSILON;
            TruncateFactor::new(&mut graph, team_diff_vars[i], margin, is_draw)
        })
        .collect();

    for team_priors in &priors {
        for prior in team_priors {
            prior.pass_message_down(&mut graph);
        }
    }
    for team_likelihoods in &likelihoods {
        for likelihood in team_likelihoods {
            likelihood.pass_message_down(&mut graph);
        }
    }
    for factor in &team_perf_factors {
        factor.pass_message_down(&mut graph);
    }

    let team_diff_len = diff_factors.len();
    let mut last_delta = 0.0;
    let mut iterations = 0;

    if team_diff_len == 0 {
        // A single team: nothing to compare, ratings pass through the
        // prior and likelihood layers unchanged.
    } else if team_diff_len == 1 {
        diff_factors[0].pass_message_down(&mut graph);
        last_delta = truncate_factors[0].pass_message_up(&mut graph);
    } else {
        'zigzag: for iteration in 0..config.max_iterations {
            iterations = iteration + 1;
            last_delta = 0.0;

            for x in 0..(team_diff_len - 1) {
                diff_factors[x].pass_message_down(&mut graph);
                last_delta = f64::max(last_delta, truncate_factors[x].pass_message_up(&mut graph));
                diff_factors[x].pass_message_up(&mut graph, 1);
            }
            for x in (1..team_diff_len).rev() {
                diff_factors[x].pass_message_down(&mut graph);
                last_delta = f64::max(last_delta, truncate_factors[x].pass_message_up(&mut graph));
                diff_factors[x].pass_message_up(&mut graph, 0);
            }

            if last_delta <= config.tolerance {
                break 'zigzag;
            }
        }

        diff_factors[0].pass_message_up(&mut graph, 0);
        diff_factors[team_diff_len - 1].pass_message_up(&mut graph, 1);

        if last_delta > config.tolerance {
            if config.strict {
                return Err(RatingError::NonConvergent {
                    algorithm: "trueskill",
                    iterations,
                    last_delta,
                    tolerance: config.tolerance,
                });
            }
            warn!("trueskill: zig-zag did not converge after {iterations} iterations (delta {last_delta})");
        }
    }

    for (i, &team_idx) in order.iter().enumerate() {
        let team = &teams[team_idx];
        for (member, &rating_var) in rating_vars[i].iter().enumerate() {
            team_perf_factors[i].pass_message_up(&mut graph, member);
            likelihoods[i][member].pass_message_up(&mut graph);
            let marginal: Gaussian = graph.marginal(rating_var);
            current[team.members[member]] = TrueSkillRate::new(marginal.mu(), marginal.sigma());
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn rating() -> TrueSkillRate {
        TrueSkillRate::default()
    }

    #[test]
    fn winner_gains_loser_loses() {
        let players = vec!["a".to_string(), "b".to_string()];
        let ratings = vec![rating(), rating()];
        let interactions = vec![Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0])];

        let result = trueskill(&players, &interactions, &ratings, TrueSkillConfig::default()).unwrap();

        assert!(result[0].mu() > ratings[0].mu());
        assert!(result[1].mu() < ratings[1].mu());
        assert!(result[0].std() < ratings[0].std());
        assert!(result[1].std() < ratings[1].std());
    }

    #[test]
    fn draw_moves_ratings_closer_together_in_uncertainty() {
        let players = vec!["a".to_string(), "b".to_string()];
        let ratings = vec![rating(), rating()];
        let interactions = vec![Interaction::new(vec!["a".into(), "b".into()], vec![0.5, 0.5])];

        let result = trueskill(&players, &interactions, &ratings, TrueSkillConfig::default()).unwrap();

        assert!((result[0].mu() - result[1].mu()).abs() < 1e-9);
        assert!(result[0].std() < ratings[0].std());
    }

    #[test]
    fn free_for_all_ranks_three_players() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ratings = vec![rating(), rating(), rating()];
        let interactions = vec![Interaction::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![1.0, 0.5, 0.0],
        )];

        let result = trueskill(&players, &interactions, &ratings, TrueSkillConfig::default()).unwrap();

        assert!(result[0].mu() > result[1].mu());
        assert!(result[1].mu() > result[2].mu());
    }

    #[test]
    fn rejects_arity_mismatch() {
        let players = vec!["a".to_string(), "b".to_string()];
        let result = trueskill(&players, &[], &[rating()], TrueSkillConfig::default());
        assert!(matches!(result, Err(RatingError::ArityMismatch { .. })));
    }

    #[test]
    fn rejects_unknown_player() {
        let players = vec!["a".to_string(), "b".to_string()];
        let ratings = vec![rating(), rating()];
        let interactions = vec![Interaction::new(vec!["a".into(), "z".into()], vec![1.0, 0.0])];
        let result = trueskill(&players, &interactions, &ratings, TrueSkillConfig::default());
        assert!(matches!(result, Err(RatingError::UnknownPlayer { .. })));
    }

    #[test]
    fn two_v_one_team_match_updates_every_member() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ratings = vec![rating(), rating(), rating()];
        let matches = vec![vec![
            Team::even(vec!["a".to_string(), "b".to_string()], 1.0),
            Team::even(vec!["c".to_string()], 0.0),
        ]];

        let result = trueskill_teams(&players, &matches, &ratings, TrueSkillConfig::default()).unwrap();

        assert!(result[0].mu() > ratings[0].mu());
        assert!(result[1].mu() > ratings[1].mu());
        assert!(result[2].mu() < ratings[2].mu());
        // Both winning teammates should move by the same amount: equal
        // priors, equal weights, symmetric roles within the team.
        assert!((result[0].mu() - result[1].mu()).abs() < 1e-9);
    }

    #[test]
    fn unequal_weights_move_teammates_by_different_amounts() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ratings = vec![rating(), rating(), rating()];
        let matches = vec![vec![
            Team::new(vec!["a".to_string(), "b".to_string()], vec![2.0, 0.5], 1.0),
            Team::even(vec!["c".to_string()], 0.0),
        ]];

        let result = trueskill_teams(&players, &matches, &ratings, TrueSkillConfig::default()).unwrap();

        let moved_a = (result[0].mu() - ratings[0].mu()).abs();
        let moved_b = (result[1].mu() - ratings[1].mu()).abs();
        assert!(moved_a > moved_b);
    }

    #[test]
    fn trueskill_teams_rejects_unknown_player() {
        let players = vec!["a".to_string(), "b".to_string()];
        let ratings = vec![rating(), rating()];
        let matches = vec![vec![Team::even(vec!["a".to_string()], 1.0), Team::even(vec!["z".to_string()], 0.0)]];
        let result = trueskill_teams(&players, &matches, &ratings, TrueSkillConfig::default());
        assert!(matches!(result, Err(RatingError::UnknownPlayer { .. })));
    }

    /// Four-team free-for-all: a two-member team, a lone player, a
    /// three-member team and another two-member team, ranked by outcome
    /// `[1, 2, 2, 3]` (higher is better, the middle two tied). Reference
    /// values are the worked example from the original implementation's
    /// docstring, to 5 decimals as required for this scenario.
    #[test]
    fn four_team_match_matches_reference_values() {
        let players = vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
            "e".to_string(),
            "f".to_string(),
            "g".to_string(),
            "h".to_string(),
        ];
        let ratings = vec![
            TrueSkillRate::new(25.0, 25.0 / 3.0), // a
            TrueSkillRate::new(25.0, 25.0 / 3.0), // b
            TrueSkillRate::new(25.0, 25.0 / 3.0), // c
            TrueSkillRate::new(29.0, 25.0 / 3.0), // d
            TrueSkillRate::new(25.0, 8.0),         // e
            TrueSkillRate::new(20.0, 25.0 / 3.0), // f
            TrueSkillRate::new(25.0, 25.0 / 3.0), // g
            TrueSkillRate::new(25.0, 25.0 / 3.0), // h
        ];

        let matches = vec![vec![
            Team::even(vec!["a".to_string(), "b".to_string()], 1.0),
            Team::even(vec!["c".to_string()], 2.0),
            Team::even(vec!["d".to_string(), "e".to_string(), "f".to_string()], 2.0),
            Team::even(vec!["g".to_string(), "h".to_string()], 3.0),
        ]];

        let result = trueskill_teams(&players, &matches, &ratings, TrueSkillConfig::default()).unwrap();

        let expected = [
            (17.985_454_182_461_94, 7.249_488_170_861_282),
            (17.985_454_182_461_94, 7.249_488_170_861_282),
            (38.188_106_500_904_695, 6.503_173_524_922_751),
            (20.166_629_601_014_503, 7.337_190_088_591_77),
            (16.859_096_593_595_705, 7.123_373_334_507_644),
            (11.166_629_601_014_504, 7.337_190_088_591_77),
            (27.659_809_715_618_746, 7.596_444_422_528_314_5),
            (27.659_809_715_618_746, 7.596_444_422_528_314_5),
        ];

        for (idx, (expected_mu, expected_sigma)) in expected.iter().enumerate() {
            assert!(
                (result[idx].mu() - expected_mu).abs() < 1e-5,
                "player {idx}: expected mu {expected_mu}, got {}",
                result[idx].mu()
            );
            assert!(
                (result[idx].std() - expected_sigma).abs() < 1e-5,
                "player {idx}: expected sigma {expected_sigma}, got {}",
                result[idx].std()
            );
        }
    }
}
