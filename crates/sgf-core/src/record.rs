//! SGF (Smart Game Format) game record parsing and serialization.
//!
//! Only the root node of the first game tree is read. That is where a record
//! keeps its game information (players, result, handicap, komi); move nodes
//! are never needed to score a game.

use crate::Color;
use std::collections::HashMap;
use std::fmt::Write;
use thiserror::Error;

/// Errors that can occur when parsing SGF records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SgfError {
    #[error("empty SGF record")]
    Empty,

    #[error("invalid SGF: expected '(;' at the start of the game tree")]
    MissingGameTree,

    #[error("unterminated value for property {0}")]
    UnterminatedValue(String),

    #[error("property {0} has no value")]
    MissingValue(String),

    #[error("invalid character '{0}' in property identifier")]
    InvalidPropertyIdent(char),

    #[error("missing required property {0}")]
    MissingProperty(&'static str),

    #[error("invalid komi: {0}")]
    InvalidKomi(String),

    #[error("invalid handicap: {0}")]
    InvalidHandicap(String),
}

/// Game information read from the root node of an SGF record.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    /// Name of the Black player (`PB`).
    pub black: String,
    /// Name of the White player (`PW`).
    pub white: String,
    /// Winner from `RE`, or `None` for draws, void and unknown results.
    pub winner: Option<Color>,
    /// Number of handicap stones (`HA`), if the property is present.
    pub handicap: Option<u32>,
    /// Komi (`KM`), 0.0 when absent.
    pub komi: f64,
}

impl GameRecord {
    /// Creates a record of an even game with no result.
    pub fn new(black: impl Into<String>, white: impl Into<String>) -> Self {
        Self {
            black: black.into(),
            white: white.into(),
            winner: None,
            handicap: None,
            komi: 0.0,
        }
    }

    /// Parses the root node of an SGF record.
    ///
    /// Whitespace around the record is ignored. Anything after the root node
    /// (move nodes, variations, further game trees) is not inspected.
    ///
    /// # Errors
    ///
    /// Returns [`SgfError::MissingProperty`] when `PB` or `PW` is absent, and
    /// the other [`SgfError`] variants for syntax errors or unreadable
    /// `KM`/`HA` values.
    pub fn parse(raw: &[u8]) -> Result<Self, SgfError> {
        let props = RootNodeReader::new(raw).read()?;

        let black = simple_text(&props, "PB").ok_or(SgfError::MissingProperty("PB"))?;
        let white = simple_text(&props, "PW").ok_or(SgfError::MissingProperty("PW"))?;

        let winner = simple_text(&props, "RE").and_then(|re| parse_winner(&re));

        let komi = match simple_text(&props, "KM") {
            Some(km) if !km.is_empty() => km
                .parse::<f64>()
                .ok()
                .filter(|k| k.is_finite())
                .ok_or(SgfError::InvalidKomi(km))?,
            _ => 0.0,
        };

        let handicap = match simple_text(&props, "HA") {
            Some(ha) if !ha.is_empty() => Some(
                ha.parse::<u32>()
                    .map_err(|_| SgfError::InvalidHandicap(ha.clone()))?,
            ),
            _ => None,
        };

        Ok(GameRecord {
            black,
            white,
            winner,
            handicap,
            komi,
        })
    }

    /// Black moves first in Go.
    pub fn first_player(&self) -> &str {
        &self.black
    }

    pub fn second_player(&self) -> &str {
        &self.white
    }

    /// Returns true when the game was played with handicap stones.
    ///
    /// `HA[0]` and `HA[1]` describe even games and do not count.
    pub fn has_handicap(&self) -> bool {
        self.handicap.is_some_and(|stones| stones >= 2)
    }

    /// Serializes the game information as a single-line SGF record.
    ///
    /// The output holds only a root node; decisive results are written as a
    /// resignation (`B+R`, `W+R`) and a missing winner as a draw (`0`).
    pub fn to_sgf(&self) -> String {
        let mut out = String::from("(;GM[1]FF[4]");
        let _ = write!(out, "PB[{}]PW[{}]", escape(&self.black), escape(&self.white));
        let result = match self.winner {
            Some(color) => format!("{}+R", color.letter()),
            None => "0".to_string(),
        };
        let _ = write!(out, "RE[{}]KM[{}]", result, self.komi);
        if let Some(stones) = self.handicap {
            let _ = write!(out, "HA[{}]", stones);
        }
        out.push(')');
        out
    }
}

/// Reads the winner from an `RE` value.
///
/// Only the leading color letter matters (`B+R`, `W+3.5`, `B+Time`);
/// draws (`0`, `Draw`), `Void` and `?` have no winner.
fn parse_winner(result: &str) -> Option<Color> {
    match result.chars().next()? {
        'B' | 'b' => Some(Color::Black),
        'W' | 'w' => Some(Color::White),
        _ => None,
    }
}

/// Returns the first value of a property as trimmed single-line text.
fn simple_text(props: &HashMap<String, Vec<String>>, ident: &str) -> Option<String> {
    let value = props.get(ident)?.first()?;
    let flattened: String = value
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    Some(flattened.trim().to_string())
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == ']' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Byte cursor over the root node of a game tree.
struct RootNodeReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> RootNodeReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), SgfError> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(SgfError::MissingGameTree)
        }
    }

    /// Reads every property of the root node.
    ///
    /// When an identifier repeats, the values of its first occurrence win.
    fn read(mut self) -> Result<HashMap<String, Vec<String>>, SgfError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(SgfError::Empty);
        }
        self.expect(b'(')?;
        self.expect(b';')?;

        let mut props = HashMap::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(b';') | Some(b'(') | Some(b')') => break,
                Some(b) if b.is_ascii_uppercase() => {
                    let ident = self.read_ident();
                    let values = self.read_values(&ident)?;
                    props.entry(ident).or_insert(values);
                }
                Some(b) => return Err(SgfError::InvalidPropertyIdent(char::from(b))),
            }
        }
        Ok(props)
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_uppercase()) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    fn read_values(&mut self, ident: &str) -> Result<Vec<String>, SgfError> {
        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'[') {
                break;
            }
            self.pos += 1;
            values.push(self.read_value(ident)?);
        }
        if values.is_empty() {
            return Err(SgfError::MissingValue(ident.to_string()));
        }
        Ok(values)
    }

    fn read_value(&mut self, ident: &str) -> Result<String, SgfError> {
        let mut raw = Vec::new();
        loop {
            match self.peek() {
                None => return Err(SgfError::UnterminatedValue(ident.to_string())),
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        None => return Err(SgfError::UnterminatedValue(ident.to_string())),
                        // Escaped line break is a soft break and disappears.
                        Some(b'\n') | Some(b'\r') => self.skip_soft_break(),
                        Some(b) => {
                            raw.push(b);
                            self.pos += 1;
                        }
                    }
                }
                Some(b) => {
                    raw.push(b);
                    self.pos += 1;
                }
            }
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    fn skip_soft_break(&mut self) {
        let first = self.peek();
        self.pos += 1;
        let pair = match first {
            Some(b'\n') => b'\r',
            _ => b'\n',
        };
        if self.peek() == Some(pair) {
            self.pos += 1;
        }
    }
}
