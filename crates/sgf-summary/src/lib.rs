//! SGF Summary - Aggregates Go match results and estimates Elo ratings.
//!
//! This crate reads game records in SGF format, either one game per `.sgf`
//! file or one game per line of an `.sgfs` file, counts wins, losses and
//! draws for every (Black, White) pairing and prepares the counts for a
//! Bayesian Elo fit.
//!
//! # Modules
//!
//! - [`tracker`] - Which record files have already been ingested
//! - [`parser`] - Normalized game outcomes from raw records
//! - [`table`] - Per-pairing win/loss/draw records
//! - [`aggregator`] - Reading files and folding outcomes into the table
//! - [`report`] - Win matrix, rating estimation and console tables
//! - [`json_output`] - JSON export of a run
//! - [`config`] - TOML configuration

pub mod aggregator;
pub mod config;
pub mod json_output;
pub mod parser;
pub mod report;
pub mod table;
pub mod tracker;

pub use aggregator::{IngestStats, ResultAggregator, STANDARD_KOMI};
pub use config::{ConfigError, SummaryConfig, DEFAULT_VIRTUAL_DRAWS};
pub use parser::{GameOutcome, GameParser, SgfParser, Winner};
pub use report::{
    estimate_ratings, format_player_table, format_win_matrix, player_index, WinMatrix,
};
pub use table::{OutcomeRecord, PairwiseTable};
pub use tracker::{FileKind, FileTracker, IngestError, NewFiles};
