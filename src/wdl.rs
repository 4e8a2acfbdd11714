//! Rates players by awarding fixed points for wins, draws and losses,
//! ignoring the magnitude of the recorded outcome entirely.

use crate::error::RatingError;
use crate::interaction::Interaction;
use crate::rate::{GenericRate, Rate as _};

/// Awards `win_value`, `draw_value` or `loss_value` to each player in
/// every interaction, depending on whether their outcome was the
/// interaction's unique maximum, tied for the maximum, or below it.
///
/// # Errors
///
/// Returns [`RatingError::ArityMismatch`] if `players` and `ratings`
/// differ in length, or [`RatingError::UnknownPlayer`] if an interaction
/// names a player outside `players`.
pub fn windrawlose(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[GenericRate],
    win_value: f64,
    draw_value: f64,
    loss_value: f64,
) -> Result<Vec<GenericRate>, RatingError> {
    if players.len() != ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: players.len(),
            got: ratings.len(),
            context: "players and ratings",
        });
    }

    let mut mus: Vec<f64> = ratings.iter().map(GenericRate::mu).collect();

    for interaction in interactions {
        interaction.check_known_players(players)?;

        let best_score = interaction
            .outcomes()
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let winners: Vec<usize> = interaction
            .outcomes()
            .iter()
            .enumerate()
            .filter(|(_, &score)| score == best_score)
            .map(|(i, _)| i)
            .collect();

        let top_value = if winners.len() > 1 { draw_value } else { win_value };

        for (i, player) in interaction.players().iter().enumerate() {
            let player_index = players.iter().position(|p| p == player).expect("checked above");
            let delta = if winners.contains(&i) { top_value } else { loss_value };
            mus[player_index] += delta;
        }
    }

    Ok(mus.into_iter().map(|mu| GenericRate::new(mu, 0.0)).collect())
}

/// Awards `win_value` to every top-scoring player (including ties) and
/// `loss_value` to everyone else. Equivalent to [`windrawlose`] with
/// `draw_value` set to `win_value`.
///
/// # Errors
///
/// Same as [`windrawlose`].
pub fn winlose(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[GenericRate],
    win_value: f64,
    loss_value: f64,
) -> Result<Vec<GenericRate>, RatingError> {
    windrawlose(players, interactions, ratings, win_value, win_value, loss_value)
}
