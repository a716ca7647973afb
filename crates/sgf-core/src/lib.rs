//! Core types for SGF (Smart Game Format) game records.
//!
//! This crate provides the pieces of a Go game record needed to score it:
//! - [`Color`] for the side that moved first or second
//! - [`GameRecord`] for the players, result, handicap and komi of one game
//! - [`SgfError`] for records that cannot be read

mod color;
mod record;

pub use color::Color;
pub use record::{GameRecord, SgfError};
