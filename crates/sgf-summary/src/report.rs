//! Win matrix, rating estimation input and console tables.

use crate::table::PairwiseTable;
use bayes_elo::{
    center_elos_prior, likelihood_of_games, single_player_prior, EloError, EloReport, Likelihood,
    RatingEstimator,
};
use serde::Serialize;
use std::fmt::Write;

/// Extra spaces after the widest entry of a column.
const COLUMN_PADDING: usize = 2;

/// Players of the table in name order.
///
/// The position of a player in this list is its row and column in the
/// [`WinMatrix`].
pub fn player_index(table: &PairwiseTable) -> Vec<String> {
    table.players().into_iter().map(str::to_string).collect()
}

/// Square matrix of games won between every two players.
///
/// `cell(i, j)` is the number of games player `i` won against player `j`
/// in either color, with each draw counting half to both sides. So
/// `cell(i, j) + cell(j, i)` is the number of games the two played.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinMatrix {
    players: Vec<String>,
    cells: Vec<Vec<f64>>,
}

impl WinMatrix {
    pub fn from_table(table: &PairwiseTable) -> Self {
        let players = player_index(table);
        let n = players.len();
        let mut cells = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let as_first = table.get(&players[i], &players[j]);
                let as_second = table.get(&players[j], &players[i]);
                cells[i][j] = f64::from(as_first.wins)
                    + f64::from(as_second.losses)
                    + 0.5 * f64::from(as_first.draws + as_second.draws);
            }
        }
        Self { players, cells }
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.cells
    }

    pub fn cell(&self, i: usize, j: usize) -> f64 {
        self.cells[i][j]
    }

    /// Games `winner` won against `loser`, looked up by name.
    pub fn wins_of(&self, winner: &str, loser: &str) -> Option<f64> {
        let i = self.players.iter().position(|p| p == winner)?;
        let j = self.players.iter().position(|p| p == loser)?;
        Some(self.cells[i][j])
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Builds the estimator input for a win matrix.
///
/// Each pair of players contributes its game count and win rate; pairs
/// that never met are skipped. A prior centers the mean rating on
/// `prior_elo`, and `virtual_draws` adds that many draws of every player
/// against a `prior_elo` opponent.
pub fn rating_likelihoods(
    matrix: &WinMatrix,
    prior_elo: f64,
    virtual_draws: f64,
) -> Vec<Likelihood> {
    let players = matrix.players();
    let mut terms = Vec::new();
    for i in 0..players.len() {
        for j in i + 1..players.len() {
            let won = matrix.cell(i, j);
            let lost = matrix.cell(j, i);
            let total = won + lost;
            if total <= 0.0 {
                continue;
            }
            terms.extend(likelihood_of_games(&players[i], &players[j], total, won / total));
        }
    }
    if virtual_draws > 0.0 {
        for player in players {
            terms.extend(single_player_prior(player, virtual_draws, prior_elo));
        }
    }
    terms.push(center_elos_prior(players, prior_elo));
    terms
}

/// Estimates ratings for every player in the table.
///
/// # Errors
///
/// Passes on the estimator's error, e.g. [`EloError::NoPlayers`] for an
/// empty table.
pub fn estimate_ratings<E: RatingEstimator>(
    estimator: &E,
    table: &PairwiseTable,
    prior_elo: f64,
    virtual_draws: f64,
) -> Result<EloReport, EloError> {
    let matrix = WinMatrix::from_table(table);
    if matrix.is_empty() {
        return Err(EloError::NoPlayers);
    }
    estimator.estimate(&rating_likelihoods(&matrix, prior_elo, virtual_draws))
}

/// Formats the legend mapping matrix indices to player names.
pub fn format_player_table(players: &[String]) -> String {
    let index_width = column_width("Index", (0..players.len()).map(|i| i.to_string()));
    let name_width = column_width("Player", players.iter().cloned());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<iw$}{:<nw$}",
        "Index",
        "Player",
        iw = index_width,
        nw = name_width
    );
    for (i, name) in players.iter().enumerate() {
        let _ = writeln!(out, "{:<iw$}{:<nw$}", i, name, iw = index_width, nw = name_width);
    }
    trim_lines(out)
}

/// Formats the win matrix with player indices as row and column headers.
pub fn format_win_matrix(matrix: &WinMatrix) -> String {
    let n = matrix.len();
    let width = column_width(
        "",
        (0..n)
            .map(|i| i.to_string())
            .chain(matrix.rows().iter().flatten().map(|&v| format_count(v))),
    );

    let mut out = String::new();
    let _ = write!(out, "{:>w$}", "", w = width);
    for j in 0..n {
        let _ = write!(out, "{:>w$}", j, w = width);
    }
    out.push('\n');
    for (i, row) in matrix.rows().iter().enumerate() {
        let _ = write!(out, "{:>w$}", i, w = width);
        for &value in row {
            let _ = write!(out, "{:>w$}", format_count(value), w = width);
        }
        out.push('\n');
    }
    out
}

/// Whole numbers print without a fraction, half wins with one digit.
fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn column_width(label: &str, entries: impl Iterator<Item = String>) -> usize {
    entries
        .map(|e| e.chars().count())
        .fold(label.chars().count(), usize::max)
        + COLUMN_PADDING
}

fn trim_lines(text: String) -> String {
    text.lines().map(|l| format!("{}\n", l.trim_end())).collect()
}
