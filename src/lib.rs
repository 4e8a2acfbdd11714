#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![warn(rustdoc::pedantic)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_rust_codeblocks
)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Rating algorithms for populations of competing agents.
//!
//! Every algorithm in this crate follows the same contract: given the
//! identifiers of a set of players, a list of recorded [`Interaction`]s
//! between them, and their prior ratings, it produces a freshly allocated
//! list of posterior ratings in one-to-one correspondence with the players.
//! There is no persistence, no scheduling and no hidden state: calling the
//! same function twice with the same arguments always produces the same
//! result.
//!
//! [`Interaction`]: crate::interaction::Interaction

pub mod bayeselo;
pub mod constants;
pub mod elo;
pub mod error;
pub mod glicko;
pub mod interaction;
pub mod laplacian;
pub mod math;
pub mod matrix;
pub mod melo;
pub mod nash;
pub mod rate;
pub mod trueskill;
pub mod wdl;

pub use error::{RatingError, RatingResult};
pub use interaction::Interaction;
pub use rate::{EloRate, Glicko2Rate, GlickoRate, MultidimEloRate, Rate, TrueSkillRate};
