//! Log-likelihood terms over player strengths.
//!
//! Strengths live on the natural logistic scale, where the win probability
//! of `a` over `b` is `sigmoid(s_a - s_b)`. Multiply by [`ELO_PER_STRENGTH`]
//! to get Elo.

/// Elo points per unit of logistic strength (400 / ln 10).
pub const ELO_PER_STRENGTH: f64 = 400.0 / std::f64::consts::LN_10;

/// Weight of the Gaussian prior that pins the mean strength.
const CENTER_PRIOR_WEIGHT: f64 = 1e4;

/// Shape of a likelihood term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikelihoodKind {
    /// `weight * ln(sigmoid(x))`: `weight` observed wins of the positive side.
    Sigmoid,
    /// `-weight * x^2 / 2`: a Gaussian prior centered on `x = 0`.
    Gaussian,
}

/// One term of the log posterior.
///
/// `x = sum(coefficient * strength) + offset` is evaluated over the
/// players in `combo`, then shaped by `kind` and scaled by `weight`.
#[derive(Debug, Clone, PartialEq)]
pub struct Likelihood {
    pub combo: Vec<(String, f64)>,
    pub offset: f64,
    pub weight: f64,
    pub kind: LikelihoodKind,
}

impl Likelihood {
    /// `weight` wins of `winner` over `loser`.
    pub fn wins(winner: &str, loser: &str, weight: f64) -> Self {
        Self {
            combo: vec![(winner.to_string(), 1.0), (loser.to_string(), -1.0)],
            offset: 0.0,
            weight,
            kind: LikelihoodKind::Sigmoid,
        }
    }

    pub(crate) fn value(&self, x: f64) -> f64 {
        match self.kind {
            LikelihoodKind::Sigmoid => -self.weight * softplus(-x),
            LikelihoodKind::Gaussian => -0.5 * self.weight * x * x,
        }
    }

    /// First and second derivative of the term with respect to `x`.
    pub(crate) fn derivatives(&self, x: f64) -> (f64, f64) {
        match self.kind {
            LikelihoodKind::Sigmoid => {
                let p = sigmoid(x);
                (self.weight * (1.0 - p), -self.weight * p * (1.0 - p))
            }
            LikelihoodKind::Gaussian => (-self.weight * x, -self.weight),
        }
    }
}

/// Terms for `total_games` games between `a` and `b`, of which `a` won
/// the fraction `win_rate` (draws count as half a win).
///
/// Terms with zero weight are omitted, so a series without games yields
/// no terms at all.
pub fn likelihood_of_games(a: &str, b: &str, total_games: f64, win_rate: f64) -> Vec<Likelihood> {
    let wins = total_games * win_rate;
    let losses = total_games * (1.0 - win_rate);
    let mut terms = Vec::with_capacity(2);
    if wins > 0.0 {
        terms.push(Likelihood::wins(a, b, wins));
    }
    if losses > 0.0 {
        terms.push(Likelihood::wins(b, a, losses));
    }
    terms
}

/// Prior forcing the mean Elo of `players` toward `elo`.
///
/// Game results only constrain rating differences; this term fixes the
/// offset.
pub fn center_elos_prior<S: AsRef<str>>(players: &[S], elo: f64) -> Likelihood {
    let coefficient = 1.0 / players.len().max(1) as f64;
    Likelihood {
        combo: players
            .iter()
            .map(|p| (p.as_ref().to_string(), coefficient))
            .collect(),
        offset: -elo / ELO_PER_STRENGTH,
        weight: CENTER_PRIOR_WEIGHT,
        kind: LikelihoodKind::Gaussian,
    }
}

/// `games` virtual draws of `player` against a fixed opponent rated `elo`.
///
/// Keeps ratings finite for players who won or lost every game.
pub fn single_player_prior(player: &str, games: f64, elo: f64) -> Vec<Likelihood> {
    if games <= 0.0 {
        return Vec::new();
    }
    let offset = elo / ELO_PER_STRENGTH;
    vec![
        Likelihood {
            combo: vec![(player.to_string(), 1.0)],
            offset: -offset,
            weight: 0.5 * games,
            kind: LikelihoodKind::Sigmoid,
        },
        Likelihood {
            combo: vec![(player.to_string(), -1.0)],
            offset,
            weight: 0.5 * games,
            kind: LikelihoodKind::Sigmoid,
        },
    ]
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}
