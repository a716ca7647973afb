//! JSON export of a summary run.

use crate::report::WinMatrix;
use crate::table::PairwiseTable;
use bayes_elo::{EloReport, PlayerRating};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

/// Record of one color orientation between two players.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct PairRecordJson<'a> {
    /// Player who moved first (Black).
    first_player: &'a str,
    /// Player who moved second (White).
    second_player: &'a str,
    wins: u32,
    losses: u32,
    draws: u32,
    games: u32,
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    /// Player names; positions match the rows of `win_matrix`.
    players: &'a [String],
    /// Per-orientation records, sorted by player names.
    records: Vec<PairRecordJson<'a>>,
    win_matrix: &'a [Vec<f64>],
    #[serde(skip_serializing_if = "Option::is_none")]
    ratings: Option<&'a [PlayerRating]>,
    /// Whether any game had a handicap or non-standard komi.
    nonstandard_games: bool,
    /// ISO 8601 timestamp when the file was created.
    created_at: String,
}

/// Writes the summary of a run to a JSON file.
///
/// # File Format
///
/// ```json
/// {
///   "players": ["Alice", "Bob"],
///   "records": [
///     { "first_player": "Alice", "second_player": "Bob",
///       "wins": 1, "losses": 0, "draws": 0, "games": 1 }
///   ],
///   "win_matrix": [[0.0, 1.0], [0.0, 0.0]],
///   "ratings": [{ "name": "Alice", "elo": 95.3, "stderr": 120.1 }],
///   "nonstandard_games": false,
///   "created_at": "2024-01-15T12:00:00Z"
/// }
/// ```
///
/// `ratings` is omitted when estimation failed or was not run.
pub fn write_json<P: AsRef<Path>>(
    path: P,
    table: &PairwiseTable,
    ratings: Option<&EloReport>,
    nonstandard_games: bool,
) -> std::io::Result<()> {
    let matrix = WinMatrix::from_table(table);
    let mut records: Vec<PairRecordJson> = table
        .iter()
        .map(|(first, second, record)| PairRecordJson {
            first_player: first,
            second_player: second,
            wins: record.wins,
            losses: record.losses,
            draws: record.draws,
            games: record.total(),
        })
        .collect();
    records.sort_by(|a, b| {
        (a.first_player, a.second_player).cmp(&(b.first_player, b.second_player))
    });

    let json = SummaryJson {
        players: matrix.players(),
        records,
        win_matrix: matrix.rows(),
        ratings: ratings.map(EloReport::ratings),
        nonstandard_games,
        created_at: Utc::now().to_rfc3339(),
    };

    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &json)?;
    Ok(())
}
