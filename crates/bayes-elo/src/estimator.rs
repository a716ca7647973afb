//! Newton's-method fit of player strengths.

use crate::likelihood::{Likelihood, ELO_PER_STRENGTH};
use crate::linalg;
use crate::report::{EloReport, PlayerRating};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors that can occur when fitting ratings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EloError {
    /// No likelihood term mentions any player.
    #[error("no players to rate")]
    NoPlayers,
    /// The posterior does not pin every rating down, e.g. two groups of
    /// players that never met.
    #[error("ratings are not identifiable from the given games")]
    SingularSystem,
    /// A player won or lost every game, so their rating has no finite
    /// maximum. Virtual draws against the prior keep it bounded.
    #[error("rating of {0} is unbounded; it won or lost every game")]
    UnboundedRating(String),
    /// Newton's method used up its iteration budget.
    #[error("rating estimation did not converge after {0} iterations")]
    NotConverged(usize),
}

/// Source of rating estimates from likelihood terms.
pub trait RatingEstimator {
    /// Fits ratings to the given terms.
    fn estimate(&self, likelihoods: &[Likelihood]) -> Result<EloReport, EloError>;
}

/// Maximum-a-posteriori Bradley-Terry estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BayesElo {
    /// Newton iterations before giving up.
    pub max_iterations: usize,
    /// Largest strength step, in logistic units, treated as converged.
    pub tolerance: f64,
}

impl Default for BayesElo {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
        }
    }
}

impl RatingEstimator for BayesElo {
    fn estimate(&self, likelihoods: &[Likelihood]) -> Result<EloReport, EloError> {
        let problem = Problem::new(likelihoods)?;
        let strengths = problem.maximize(self)?;
        let (_, hessian) = problem.gradient_and_hessian(&strengths);
        let negated: Vec<Vec<f64>> = hessian
            .iter()
            .map(|row| row.iter().map(|v| -v).collect())
            .collect();
        let covariance = linalg::invert(&negated).ok_or(EloError::SingularSystem)?;

        let scale = ELO_PER_STRENGTH * ELO_PER_STRENGTH;
        let ratings = problem
            .players
            .iter()
            .enumerate()
            .map(|(i, name)| PlayerRating {
                name: name.clone(),
                elo: strengths[i] * ELO_PER_STRENGTH,
                stderr: covariance[i][i].max(0.0).sqrt() * ELO_PER_STRENGTH,
            })
            .collect();
        let covariance = covariance
            .into_iter()
            .map(|row| row.into_iter().map(|v| v * scale).collect())
            .collect();
        Ok(EloReport::new(ratings, covariance))
    }
}

/// Fits ratings with the default [`BayesElo`] settings.
pub fn compute_elos(likelihoods: &[Likelihood]) -> Result<EloReport, EloError> {
    BayesElo::default().estimate(likelihoods)
}

/// A likelihood term with player names resolved to indices.
struct Term<'a> {
    source: &'a Likelihood,
    combo: Vec<(usize, f64)>,
}

impl Term<'_> {
    fn x(&self, strengths: &[f64]) -> f64 {
        self.combo
            .iter()
            .map(|&(i, c)| c * strengths[i])
            .sum::<f64>()
            + self.source.offset
    }
}

struct Problem<'a> {
    players: Vec<String>,
    terms: Vec<Term<'a>>,
}

impl<'a> Problem<'a> {
    fn new(likelihoods: &'a [Likelihood]) -> Result<Self, EloError> {
        let players: Vec<String> = likelihoods
            .iter()
            .flat_map(|l| l.combo.iter().map(|(name, _)| name.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if players.is_empty() {
            return Err(EloError::NoPlayers);
        }
        let index: HashMap<&str, usize> = players
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let terms = likelihoods
            .iter()
            .map(|source| Term {
                source,
                combo: source
                    .combo
                    .iter()
                    .map(|(name, c)| (index[name.as_str()], *c))
                    .collect(),
            })
            .collect();
        Ok(Self { players, terms })
    }

    fn log_posterior(&self, strengths: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.source.value(t.x(strengths)))
            .sum()
    }

    fn gradient_and_hessian(&self, strengths: &[f64]) -> (Vec<f64>, Vec<Vec<f64>>) {
        let n = self.players.len();
        let mut gradient = vec![0.0; n];
        let mut hessian = vec![vec![0.0; n]; n];
        for term in &self.terms {
            let (d1, d2) = term.source.derivatives(term.x(strengths));
            for &(i, ci) in &term.combo {
                gradient[i] += d1 * ci;
                for &(j, cj) in &term.combo {
                    hessian[i][j] += d2 * ci * cj;
                }
            }
        }
        (gradient, hessian)
    }

    /// Newton ascent with step halving whenever a full step lowers the
    /// log posterior.
    fn maximize(&self, settings: &BayesElo) -> Result<Vec<f64>, EloError> {
        let mut strengths = vec![0.0; self.players.len()];
        let mut current = self.log_posterior(&strengths);

        for iteration in 0..settings.max_iterations {
            let (gradient, hessian) = self.gradient_and_hessian(&strengths);
            let negated: Vec<Vec<f64>> = hessian
                .iter()
                .map(|row| row.iter().map(|v| -v).collect())
                .collect();
            // Curvature that vanishes after the first step means a rating
            // ran off toward infinity rather than a badly posed problem.
            let step = match linalg::solve(&negated, &gradient) {
                Some(step) => step,
                None if iteration == 0 => return Err(EloError::SingularSystem),
                None => return Err(EloError::UnboundedRating(self.runaway(&strengths))),
            };

            let mut scale = 1.0;
            let mut candidate = shifted(&strengths, &step, scale);
            let mut value = self.log_posterior(&candidate);
            while value < current && scale > 1e-8 {
                scale *= 0.5;
                candidate = shifted(&strengths, &step, scale);
                value = self.log_posterior(&candidate);
            }

            let largest = step.iter().fold(0.0_f64, |m, s| m.max((s * scale).abs()));
            strengths = candidate;
            current = value;
            if largest < settings.tolerance {
                return Ok(strengths);
            }
        }
        Err(EloError::NotConverged(settings.max_iterations))
    }
}

impl Problem<'_> {
    /// The player whose strength strayed furthest from the mean.
    fn runaway(&self, strengths: &[f64]) -> String {
        let mean = strengths.iter().sum::<f64>() / strengths.len() as f64;
        strengths
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| (*a - mean).abs().total_cmp(&(*b - mean).abs()))
            .map(|(i, _)| self.players[i].clone())
            .unwrap_or_default()
    }
}

fn shifted(strengths: &[f64], step: &[f64], scale: f64) -> Vec<f64> {
    strengths
        .iter()
        .zip(step)
        .map(|(s, d)| s + scale * d)
        .collect()
}
