//! Fitted ratings and their uncertainty.

use serde::Serialize;
use std::fmt;

/// Estimated rating of one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRating {
    pub name: String,
    pub elo: f64,
    /// One standard error of `elo`.
    pub stderr: f64,
}

/// Result of a rating fit.
///
/// Ratings are stored in player-name order. `Display` prints them
/// strongest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EloReport {
    ratings: Vec<PlayerRating>,
    /// Covariance of the ratings in Elo², indexed like `ratings`.
    #[serde(skip)]
    covariance: Vec<Vec<f64>>,
}

impl EloReport {
    pub(crate) fn new(ratings: Vec<PlayerRating>, covariance: Vec<Vec<f64>>) -> Self {
        Self {
            ratings,
            covariance,
        }
    }

    pub fn ratings(&self) -> &[PlayerRating] {
        &self.ratings
    }

    pub fn get(&self, name: &str) -> Option<&PlayerRating> {
        self.ratings.iter().find(|r| r.name == name)
    }

    pub fn mean_elo(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        self.ratings.iter().map(|r| r.elo).sum::<f64>() / self.ratings.len() as f64
    }

    /// Standard error of the rating difference between two players.
    ///
    /// Smaller than combining the individual errors when the two ratings
    /// move together, as they do for players who met often.
    pub fn elo_diff_stderr(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        let variance =
            self.covariance[i][i] + self.covariance[j][j] - 2.0 * self.covariance[i][j];
        Some(variance.max(0.0).sqrt())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.ratings.iter().position(|r| r.name == name)
    }
}

impl fmt::Display for EloReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .ratings
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0);
        let mut sorted: Vec<&PlayerRating> = self.ratings.iter().collect();
        sorted.sort_by(|a, b| b.elo.total_cmp(&a.elo).then_with(|| a.name.cmp(&b.name)));
        for rating in sorted {
            writeln!(
                f,
                "{:<width$} : {:8.1} +/- {:6.1}",
                rating.name,
                rating.elo,
                rating.stderr,
                width = width
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EloReport {
        EloReport::new(
            vec![
                PlayerRating {
                    name: "alpha".to_string(),
                    elo: -50.0,
                    stderr: 20.0,
                },
                PlayerRating {
                    name: "b".to_string(),
                    elo: 50.0,
                    stderr: 20.0,
                },
            ],
            vec![vec![400.0, -300.0], vec![-300.0, 400.0]],
        )
    }

    #[test]
    fn display_sorts_strongest_first() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("b     :"));
        assert!(lines[0].contains("50.0 +/-   20.0"));
        assert!(lines[1].starts_with("alpha :"));
    }

    #[test]
    fn diff_stderr_uses_covariance() {
        let report = sample();
        let diff = report.elo_diff_stderr("alpha", "b").unwrap();
        assert!((diff - 1400f64.sqrt()).abs() < 1e-9);
        assert!(report.elo_diff_stderr("alpha", "missing").is_none());
    }

    #[test]
    fn mean_and_lookup() {
        let report = sample();
        assert_eq!(report.mean_elo(), 0.0);
        assert_eq!(report.get("b").unwrap().elo, 50.0);
        assert!(report.get("c").is_none());
    }

    #[test]
    fn serializes_ratings_only() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"name\":\"alpha\""));
        assert!(!json.contains("covariance"));
    }
}
