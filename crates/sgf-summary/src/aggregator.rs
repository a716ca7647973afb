//! Folding of parsed game records into a [`PairwiseTable`].

use crate::parser::{GameOutcome, GameParser, SgfParser, Winner};
use crate::table::PairwiseTable;
use crate::tracker::{FileKind, FileTracker, IngestError, NewFiles};
use std::ops::{AddAssign, RangeInclusive};
use std::path::Path;
use tracing::{debug, info, warn};

/// Komi range of an even game under common rule sets.
pub const STANDARD_KOMI: RangeInclusive<f64> = 5.5..=7.5;

/// Counters for one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Files read.
    pub files: usize,
    /// Games folded into the table.
    pub games: usize,
    /// Records skipped because they failed to parse.
    pub malformed: usize,
    /// Tracked files that could not be read.
    pub unreadable: usize,
}

impl AddAssign for IngestStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.games += other.games;
        self.malformed += other.malformed;
        self.unreadable += other.unreadable;
    }
}

/// Accumulates game results from record files.
///
/// Owns the set of ingested files and the result table together, so the
/// two can only be cleared at the same time (see [`Self::reset`]).
///
/// # Example
///
/// ```ignore
/// let mut aggregator = ResultAggregator::new();
/// aggregator.add_directory(Path::new("games"), true)?;
/// let table = aggregator.table();
/// ```
#[derive(Debug)]
pub struct ResultAggregator<P = SgfParser> {
    parser: P,
    tracker: FileTracker,
    table: PairwiseTable,
    nonstandard: bool,
    komi_range: RangeInclusive<f64>,
}

impl ResultAggregator<SgfParser> {
    pub fn new() -> Self {
        Self::with_parser(SgfParser)
    }
}

impl Default for ResultAggregator<SgfParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GameParser> ResultAggregator<P> {
    pub fn with_parser(parser: P) -> Self {
        Self {
            parser,
            tracker: FileTracker::new(),
            table: PairwiseTable::new(),
            nonstandard: false,
            komi_range: STANDARD_KOMI,
        }
    }

    /// Sets the komi range outside of which a game counts as non-standard.
    pub fn with_komi_range(mut self, komi_range: RangeInclusive<f64>) -> Self {
        self.komi_range = komi_range;
        self
    }

    /// Ingests a directory or a single file, whichever `path` is.
    pub fn add_input(
        &mut self,
        path: &Path,
        recursive: bool,
    ) -> Result<IngestStats, IngestError> {
        if path.is_dir() {
            self.add_directory(path, recursive)
        } else {
            self.add_file(path)
        }
    }

    /// Scans a directory and ingests every record file not seen before.
    pub fn add_directory(
        &mut self,
        dir: &Path,
        recursive: bool,
    ) -> Result<IngestStats, IngestError> {
        let new_files = self.tracker.discover(dir, recursive)?;
        Ok(self.ingest_new_files(&new_files))
    }

    /// Ingests one record file unless it was ingested before.
    pub fn add_file(&mut self, path: &Path) -> Result<IngestStats, IngestError> {
        let mut new_files = NewFiles::default();
        match self.tracker.add_path(path)? {
            Some((FileKind::Batch, path)) => {
                new_files.batch.insert(path);
            }
            Some((FileKind::Single, path)) => {
                new_files.single.insert(path);
            }
            None => return Ok(IngestStats::default()),
        }
        Ok(self.ingest_new_files(&new_files))
    }

    /// Reads newly tracked files and folds every game they contain.
    ///
    /// Each line of a batch file is a separate record; blank lines are
    /// skipped. A single file is one record. A record that fails to parse
    /// is logged and skipped without affecting the rest of its file.
    pub fn ingest_new_files(&mut self, new_files: &NewFiles) -> IngestStats {
        let total = new_files.len();
        let mut stats = IngestStats::default();
        let files = new_files
            .batch
            .iter()
            .map(|p| (FileKind::Batch, p))
            .chain(new_files.single.iter().map(|p| (FileKind::Single, p)));

        for (idx, (kind, path)) in files.enumerate() {
            match std::fs::read(path) {
                Ok(content) => {
                    stats.files += 1;
                    stats += match kind {
                        FileKind::Batch => self.ingest_batch(path, &content),
                        FileKind::Single => self.ingest_single(path, &content),
                    };
                }
                Err(source) => {
                    let err = IngestError::Read {
                        path: path.clone(),
                        source,
                    };
                    warn!("{}", err);
                    stats.unreadable += 1;
                }
            }
            info!("Parsed {} files out of {} files.", idx + 1, total);
        }
        stats
    }

    fn ingest_batch(&mut self, path: &Path, content: &[u8]) -> IngestStats {
        let mut stats = IngestStats::default();
        for (line_no, line) in content.split(|&b| b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match self.ingest_record(line) {
                Ok(()) => stats.games += 1,
                Err(e) => {
                    warn!(
                        "Skipping malformed record at {}:{}: {}",
                        path.display(),
                        line_no + 1,
                        e
                    );
                    stats.malformed += 1;
                }
            }
        }
        stats
    }

    fn ingest_single(&mut self, path: &Path, content: &[u8]) -> IngestStats {
        let mut stats = IngestStats::default();
        match self.ingest_record(content) {
            Ok(()) => stats.games += 1,
            Err(e) => {
                warn!("Skipping malformed record {}: {}", path.display(), e);
                stats.malformed += 1;
            }
        }
        stats
    }

    /// Parses one raw record and folds it into the table.
    pub fn ingest_record(&mut self, raw: &[u8]) -> Result<(), P::Error> {
        let outcome = self.parser.parse(raw)?;
        self.fold_outcome(&outcome);
        Ok(())
    }

    /// Adds one game to the record of its (first, second) player pair.
    ///
    /// Handicap games and games with komi outside the standard range set
    /// the non-standard flag, which stays set until [`Self::reset`].
    pub fn fold_outcome(&mut self, outcome: &GameOutcome) {
        let record = self
            .table
            .record_mut(&outcome.first_player, &outcome.second_player);
        match outcome.winner {
            Winner::First => record.wins += 1,
            Winner::Second => record.losses += 1,
            Winner::Neither => record.draws += 1,
        }
        if outcome.handicap || !self.komi_range.contains(&outcome.komi) {
            self.nonstandard = true;
        }
        debug!(
            "{} vs {}: {:?}",
            outcome.first_player, outcome.second_player, outcome.winner
        );
    }

    pub fn table(&self) -> &PairwiseTable {
        &self.table
    }

    pub fn tracker(&self) -> &FileTracker {
        &self.tracker
    }

    /// True once any ingested game had a handicap or non-standard komi.
    pub fn has_nonstandard_games(&self) -> bool {
        self.nonstandard
    }

    /// Clears tracked files, results and the non-standard flag together.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.table.clear();
        self.nonstandard = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::OutcomeRecord;

    fn outcome(first: &str, second: &str, winner: Winner, komi: f64) -> GameOutcome {
        GameOutcome {
            winner,
            first_player: first.to_string(),
            second_player: second.to_string(),
            handicap: false,
            komi,
        }
    }

    #[test]
    fn fold_counts_from_first_player_side() {
        let mut aggregator = ResultAggregator::new();
        aggregator.fold_outcome(&outcome("Alice", "Bob", Winner::First, 7.0));
        aggregator.fold_outcome(&outcome("Alice", "Bob", Winner::Second, 7.0));
        aggregator.fold_outcome(&outcome("Alice", "Bob", Winner::Neither, 7.0));
        aggregator.fold_outcome(&outcome("Bob", "Alice", Winner::First, 7.0));

        let table = aggregator.table();
        assert_eq!(
            table.get("Alice", "Bob"),
            OutcomeRecord {
                wins: 1,
                losses: 1,
                draws: 1
            }
        );
        assert_eq!(
            table.get("Bob", "Alice"),
            OutcomeRecord {
                wins: 1,
                losses: 0,
                draws: 0
            }
        );
        assert!(!aggregator.has_nonstandard_games());
    }

    #[test]
    fn komi_range_bounds_are_standard() {
        let mut aggregator = ResultAggregator::new();
        aggregator.fold_outcome(&outcome("a", "b", Winner::First, 5.5));
        aggregator.fold_outcome(&outcome("a", "b", Winner::First, 7.5));
        assert!(!aggregator.has_nonstandard_games());
    }

    #[test]
    fn nonstandard_flag_is_sticky() {
        let mut aggregator = ResultAggregator::new();
        aggregator.fold_outcome(&outcome("a", "b", Winner::First, 5.0));
        assert!(aggregator.has_nonstandard_games());
        aggregator.fold_outcome(&outcome("a", "b", Winner::First, 6.5));
        assert!(aggregator.has_nonstandard_games());
    }

    #[test]
    fn handicap_sets_flag() {
        let mut aggregator = ResultAggregator::new();
        let mut game = outcome("a", "b", Winner::Second, 6.5);
        game.handicap = true;
        aggregator.fold_outcome(&game);
        assert!(aggregator.has_nonstandard_games());
    }

    #[test]
    fn custom_komi_range() {
        let mut aggregator = ResultAggregator::new().with_komi_range(0.0..=0.5);
        aggregator.fold_outcome(&outcome("a", "b", Winner::First, 0.5));
        assert!(!aggregator.has_nonstandard_games());
        aggregator.fold_outcome(&outcome("a", "b", Winner::First, 6.5));
        assert!(aggregator.has_nonstandard_games());
    }

    #[test]
    fn ingest_record_parses_sgf() {
        let mut aggregator = ResultAggregator::new();
        aggregator
            .ingest_record(b"(;PB[Alice]PW[Bob]RE[W+R]KM[6.5])")
            .unwrap();
        assert_eq!(aggregator.table().get("Alice", "Bob").losses, 1);
        assert!(aggregator.ingest_record(b"garbage").is_err());
        assert_eq!(aggregator.table().total_games(), 1);
    }

    #[test]
    fn batch_skips_blank_and_malformed_lines() {
        let mut aggregator = ResultAggregator::new();
        let content = b"(;PB[a]PW[b]RE[B+R]KM[7])\n\n  \r\n(;PB[a]PW\n(;PB[b]PW[a]RE[0]KM[7])\r\n";
        let stats = aggregator.ingest_batch(Path::new("mem.sgfs"), content);
        assert_eq!(stats.games, 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(aggregator.table().get("a", "b").wins, 1);
        assert_eq!(aggregator.table().get("b", "a").draws, 1);
    }

    #[test]
    fn file_removed_before_ingestion_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.sgf");
        let gone = dir.path().join("gone.sgfs");
        std::fs::write(&kept, "(;PB[a]PW[b]RE[B+R]KM[7])").unwrap();
        std::fs::write(&gone, "(;PB[a]PW[b]RE[W+R]KM[7])\n").unwrap();

        let mut aggregator = ResultAggregator::new();
        let mut tracker = FileTracker::new();
        let new_files = tracker.discover(dir.path(), false).unwrap();
        std::fs::remove_file(&gone).unwrap();

        let stats = aggregator.ingest_new_files(&new_files);
        assert_eq!(stats.files, 1);
        assert_eq!(stats.unreadable, 1);
        assert_eq!(stats.games, 1);
        assert_eq!(
            aggregator.table().get("a", "b"),
            OutcomeRecord {
                wins: 1,
                losses: 0,
                draws: 0
            }
        );
    }

    #[test]
    fn reset_clears_flag_and_table() {
        let mut aggregator = ResultAggregator::new();
        aggregator.fold_outcome(&outcome("a", "b", Winner::First, 0.0));
        aggregator.reset();
        assert!(aggregator.table().is_empty());
        assert!(aggregator.tracker().is_empty());
        assert!(!aggregator.has_nonstandard_games());
    }

    #[test]
    fn stats_add_up() {
        let mut total = IngestStats {
            files: 1,
            games: 3,
            malformed: 0,
            unreadable: 0,
        };
        total += IngestStats {
            files: 2,
            games: 1,
            malformed: 1,
            unreadable: 1,
        };
        assert_eq!(
            total,
            IngestStats {
                files: 3,
                games: 4,
                malformed: 1,
                unreadable: 1
            }
        );
    }
}
