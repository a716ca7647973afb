//! Normalized game outcomes and the parsers that produce them.

use sgf_core::{Color, GameRecord, SgfError};
use std::fmt::Display;

/// Which side won a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    First,
    Second,
    /// Draws, void games and records without a result.
    Neither,
}

/// Everything the aggregator needs to know about one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub winner: Winner,
    pub first_player: String,
    pub second_player: String,
    pub handicap: bool,
    pub komi: f64,
}

/// Turns one raw game record into a [`GameOutcome`].
pub trait GameParser {
    type Error: Display;

    fn parse(&self, raw: &[u8]) -> Result<GameOutcome, Self::Error>;
}

/// Parser for SGF records, where Black is the first player.
#[derive(Debug, Clone, Copy, Default)]
pub struct SgfParser;

impl GameParser for SgfParser {
    type Error = SgfError;

    fn parse(&self, raw: &[u8]) -> Result<GameOutcome, SgfError> {
        let record = GameRecord::parse(raw)?;
        Ok(GameOutcome::from(&record))
    }
}

impl From<&GameRecord> for GameOutcome {
    fn from(record: &GameRecord) -> Self {
        let winner = match record.winner {
            Some(Color::Black) => Winner::First,
            Some(Color::White) => Winner::Second,
            None => Winner::Neither,
        };
        GameOutcome {
            winner,
            first_player: record.first_player().to_string(),
            second_player: record.second_player().to_string(),
            handicap: record.has_handicap(),
            komi: record.komi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_is_first_player() {
        let outcome = SgfParser
            .parse(b"(;PB[Alice]PW[Bob]RE[B+R]KM[7])")
            .unwrap();
        assert_eq!(
            outcome,
            GameOutcome {
                winner: Winner::First,
                first_player: "Alice".to_string(),
                second_player: "Bob".to_string(),
                handicap: false,
                komi: 7.0,
            }
        );
    }

    #[test]
    fn white_win_and_draw() {
        let white = SgfParser.parse(b"(;PB[a]PW[b]RE[W+0.5])").unwrap();
        assert_eq!(white.winner, Winner::Second);
        let draw = SgfParser.parse(b"(;PB[a]PW[b]RE[0])").unwrap();
        assert_eq!(draw.winner, Winner::Neither);
    }

    #[test]
    fn handicap_game() {
        let outcome = SgfParser.parse(b"(;PB[a]PW[b]HA[3]KM[0.5])").unwrap();
        assert!(outcome.handicap);
        assert_eq!(outcome.komi, 0.5);
    }

    #[test]
    fn parse_error_is_reported() {
        let err = SgfParser.parse(b"not an sgf").unwrap_err();
        assert_eq!(err, SgfError::MissingGameTree);
    }
}
