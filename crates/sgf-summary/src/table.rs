//! Pairwise win/loss/draw records keyed by (first player, second player).
//!
//! Players are identified by the name written in the game record, so two
//! different players who share a name are counted as one.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::ops::AddAssign;

/// Results of the games played in one color orientation, counted from the
/// first player's side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl OutcomeRecord {
    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

impl AddAssign for OutcomeRecord {
    fn add_assign(&mut self, other: Self) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.draws += other.draws;
    }
}

/// Map from ordered (first player, second player) pairs to their record.
///
/// `(a, b)` and `(b, a)` are separate entries. A missing entry means no
/// games were played in that orientation and reads as all zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairwiseTable {
    records: HashMap<(String, String), OutcomeRecord>,
}

impl PairwiseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `first` against `second`, zero if they never
    /// played in that orientation.
    pub fn get(&self, first: &str, second: &str) -> OutcomeRecord {
        self.records
            .get(&(first.to_string(), second.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn contains(&self, first: &str, second: &str) -> bool {
        self.records
            .contains_key(&(first.to_string(), second.to_string()))
    }

    pub(crate) fn record_mut(&mut self, first: &str, second: &str) -> &mut OutcomeRecord {
        self.records
            .entry((first.to_string(), second.to_string()))
            .or_default()
    }

    /// Games between two players in either orientation.
    pub fn games_between(&self, a: &str, b: &str) -> u32 {
        if a == b {
            return self.get(a, a).total();
        }
        self.get(a, b).total() + self.get(b, a).total()
    }

    /// Total number of games in the table.
    pub fn total_games(&self) -> u32 {
        self.records.values().map(OutcomeRecord::total).sum()
    }

    /// Every player appearing on either side of an entry, in name order.
    pub fn players(&self) -> BTreeSet<&str> {
        self.records
            .keys()
            .flat_map(|(first, second)| [first.as_str(), second.as_str()])
            .collect()
    }

    /// Iterates over `(first, second, record)` in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &OutcomeRecord)> {
        self.records
            .iter()
            .map(|((first, second), record)| (first.as_str(), second.as_str(), record))
    }

    /// Number of ordered pairs with an entry.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds every record of `other` into this table.
    ///
    /// Merging is associative and commutative, so tables built from
    /// disjoint sets of files can be combined in any order.
    pub fn merge(&mut self, other: &PairwiseTable) {
        for ((first, second), record) in &other.records {
            *self.record_mut(first, second) += *record;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(wins: u32, losses: u32, draws: u32) -> OutcomeRecord {
        OutcomeRecord {
            wins,
            losses,
            draws,
        }
    }

    #[test]
    fn missing_pair_reads_as_zero() {
        let table = PairwiseTable::new();
        assert_eq!(table.get("a", "b"), OutcomeRecord::default());
        assert!(!table.contains("a", "b"));
        assert!(table.is_empty());
    }

    #[test]
    fn orientations_are_separate() {
        let mut table = PairwiseTable::new();
        table.record_mut("a", "b").wins += 1;
        table.record_mut("b", "a").draws += 1;

        assert_eq!(table.get("a", "b"), record(1, 0, 0));
        assert_eq!(table.get("b", "a"), record(0, 0, 1));
        assert_eq!(table.len(), 2);
        assert_eq!(table.games_between("a", "b"), 2);
        assert_eq!(table.total_games(), 2);
    }

    #[test]
    fn players_are_sorted_and_unique() {
        let mut table = PairwiseTable::new();
        table.record_mut("zed", "amy").wins += 1;
        table.record_mut("amy", "kim").losses += 1;
        let players: Vec<&str> = table.players().into_iter().collect();
        assert_eq!(players, vec!["amy", "kim", "zed"]);
    }

    #[test]
    fn merge_sums_fields() {
        let mut left = PairwiseTable::new();
        *left.record_mut("a", "b") += record(1, 2, 3);
        let mut right = PairwiseTable::new();
        *right.record_mut("a", "b") += record(4, 0, 1);
        *right.record_mut("c", "a") += record(0, 1, 0);

        left.merge(&right);
        assert_eq!(left.get("a", "b"), record(5, 2, 4));
        assert_eq!(left.get("c", "a"), record(0, 1, 0));
    }

    fn arb_table() -> impl Strategy<Value = PairwiseTable> {
        let names = prop::sample::select(vec!["a", "b", "c", "d"]);
        prop::collection::vec((names.clone(), names, 0u32..5, 0u32..5, 0u32..5), 0..12).prop_map(
            |entries| {
                let mut table = PairwiseTable::new();
                for (first, second, w, l, d) in entries {
                    *table.record_mut(first, second) += record(w, l, d);
                }
                table
            },
        )
    }

    proptest! {
        #[test]
        fn merge_is_commutative(x in arb_table(), y in arb_table()) {
            let mut xy = x.clone();
            xy.merge(&y);
            let mut yx = y.clone();
            yx.merge(&x);
            prop_assert_eq!(xy, yx);
        }

        #[test]
        fn merge_is_associative(x in arb_table(), y in arb_table(), z in arb_table()) {
            let mut left = x.clone();
            left.merge(&y);
            left.merge(&z);
            let mut yz = y.clone();
            yz.merge(&z);
            let mut right = x.clone();
            right.merge(&yz);
            prop_assert_eq!(left, right);
        }
    }
}
