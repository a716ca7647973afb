//! Bayesian Elo estimation.
//!
//! Ratings are the maximum-a-posteriori strengths of a Bradley-Terry
//! (logistic) model, fitted with Newton's method. Uncertainty comes from the
//! inverse Hessian of the log posterior at the optimum.
//!
//! # Overview
//!
//! - [`Likelihood`] - One term of the log posterior over player strengths
//! - [`likelihood_of_games`] - Terms for a series of games between two players
//! - [`center_elos_prior`] - Prior pinning the mean rating, which the model
//!   cannot determine on its own
//! - [`compute_elos`] - Fits ratings and returns an [`EloReport`]
//!
//! # Example
//!
//! ```
//! use bayes_elo::{center_elos_prior, compute_elos, likelihood_of_games};
//!
//! let mut terms = likelihood_of_games("a", "b", 4.0, 0.75);
//! terms.push(center_elos_prior(&["a", "b"], 1000.0));
//! let report = compute_elos(&terms).unwrap();
//! assert!((report.mean_elo() - 1000.0).abs() < 1e-6);
//! ```

mod estimator;
mod likelihood;
mod linalg;
mod report;

pub use estimator::{compute_elos, BayesElo, EloError, RatingEstimator};
pub use likelihood::{
    center_elos_prior, likelihood_of_games, single_player_prior, Likelihood, LikelihoodKind,
    ELO_PER_STRENGTH,
};
pub use report::{EloReport, PlayerRating};
