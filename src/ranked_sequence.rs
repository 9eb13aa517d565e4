//! Self-ordering ranking of keys by occurrence count.
//!
//! Entries live in an arena and are linked by `EntryId` in rank order:
//!
//! ```text
//!   head ─► [a:3] ◄──► [b:2] ◄──► [c:1] ◄── tail
//! ```
//!
//! `record_occurrence` either appends a new key at the tail with count 1, or
//! bumps an existing key and walks it toward the head one adjacent swap at a
//! time until its predecessor's count is no longer strictly lower. Ties are
//! never overtaken, so keys with equal counts stay in arrival order.
//!
//! Entries are never removed; dropping the sequence releases the arena, the
//! key index and every key string exactly once.

use std::collections::TryReserveError;
use std::str::FromStr;
use ahash::RandomState;

use crate::error::{InvariantError, ResourceError};
use crate::key_index::KeyIndex;

/// Stable handle of an entry in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntryId(pub(crate) usize);

#[derive(Debug)]
struct Entry {
    key: String,
    count: u64,
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

/// A key and its count, as reported by [`RankedSequence::top_n`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub key: String,
    pub count: u64,
}

/// How many entries to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Top(usize),
    All,
}

impl From<usize> for Limit {
    fn from(n: usize) -> Self {
        Limit::Top(n)
    }
}

impl FromStr for Limit {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Limit::All);
        }
        s.parse::<usize>()
            .map(Limit::Top)
            .map_err(|_| "expected a non-negative integer or 'all'")
    }
}

#[derive(Debug)]
pub struct RankedSequence {
    entries: Vec<Entry>,
    index: KeyIndex,
    head: Option<EntryId>,
    tail: Option<EntryId>,
    total: u64,
}

impl RankedSequence {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: RandomState) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: KeyIndex::with_capacity_and_hasher(capacity, hasher),
            head: None,
            tail: None,
            total: 0,
        }
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of `record_occurrence` calls so far
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, key: &str) -> Option<u64> {
        self.index.lookup(key).map(|id| self.entry(id).count)
    }

    /// Counts one occurrence of `key` and restores rank order.
    ///
    /// Returns the key's new count. Memory for a new key is reserved up front,
    /// so on `Err` the sequence is exactly as it was before the call.
    pub fn record_occurrence(&mut self, key: &str) -> Result<u64, ResourceError> {
        self.total += 1;

        // Fast path: bump and promote an existing entry
        if let Some(id) = self.index.lookup(key) {
            self.entries[id.0].count += 1;
            self.promote(id);
            debug_assert!(self.check_invariants().is_ok(), "{:?}", self.check_invariants());
            return Ok(self.entry(id).count);
        }

        let (owned, indexed) = match self.reserve_for(key) {
            Ok(keys) => keys,
            Err(source) => {
                self.total -= 1;
                return Err(ResourceError { key_len: key.len(), source });
            }
        };

        let id = EntryId(self.entries.len());
        self.entries.push(Entry {
            key: owned,
            count: 1,
            prev: self.tail,
            next: None,
        });
        self.index.register(indexed, id);

        match self.tail {
            Some(tail) => self.entries[tail.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        debug_assert!(self.check_invariants().is_ok(), "{:?}", self.check_invariants());
        Ok(1)
    }

    /// Entries in rank order, head first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            sequence: self,
            current: self.head,
        }
    }

    /// The first `n` entries in rank order (fewer if the sequence is shorter).
    pub fn top_n(&self, n: usize) -> Vec<Tally> {
        self.iter()
            .take(n)
            .map(|(key, count)| Tally {
                key: key.to_owned(),
                count,
            })
            .collect()
    }

    /// Every entry in rank order
    pub fn list(&self) -> Vec<Tally> {
        self.top_n(self.len())
    }

    pub fn select(&self, limit: Limit) -> Vec<Tally> {
        match limit {
            Limit::Top(n) => self.top_n(n),
            Limit::All => self.list(),
        }
    }

    /// Walks the links and checks every structural and ordering invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match (self.head, self.tail) {
            (None, None) if self.entries.is_empty() => return Ok(()),
            (Some(_), Some(_)) if !self.entries.is_empty() => {}
            _ => {
                return Err(InvariantError::new(format!(
                    "head {:?} / tail {:?} disagree with {} entries",
                    self.head,
                    self.tail,
                    self.entries.len()
                )))
            }
        }

        if self.index.len() != self.entries.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys for {} entries",
                self.index.len(),
                self.entries.len()
            )));
        }

        let mut visited = 0;
        let mut sum = 0u64;
        let mut prev: Option<EntryId> = None;
        let mut current = self.head;
        while let Some(id) = current {
            if visited == self.entries.len() {
                return Err(InvariantError::new("forward walk does not terminate"));
            }
            let entry = self.entries.get(id.0).ok_or_else(|| {
                InvariantError::new(format!("link to missing entry {}", id.0))
            })?;
            if entry.prev != prev {
                return Err(InvariantError::new(format!(
                    "entry '{}' has prev {:?}, expected {:?}",
                    entry.key, entry.prev, prev
                )));
            }
            if let Some(p) = prev {
                if self.entry(p).count < entry.count {
                    return Err(InvariantError::new(format!(
                        "'{}' ({}) ranked below '{}' ({})",
                        self.entry(p).key,
                        self.entry(p).count,
                        entry.key,
                        entry.count
                    )));
                }
            }
            if self.index.lookup(&entry.key) != Some(id) {
                return Err(InvariantError::new(format!(
                    "index does not point '{}' at {}",
                    entry.key, id.0
                )));
            }
            visited += 1;
            sum += entry.count;
            prev = Some(id);
            current = entry.next;
        }

        if prev != self.tail {
            return Err(InvariantError::new("forward walk does not end at tail"));
        }
        if visited != self.entries.len() {
            return Err(InvariantError::new(format!(
                "forward walk visited {} of {} entries",
                visited,
                self.entries.len()
            )));
        }
        if sum != self.total {
            return Err(InvariantError::new(format!(
                "counts sum to {} after {} occurrences",
                sum, self.total
            )));
        }
        Ok(())
    }

    fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    /// Reserves arena and index room and builds both owned copies of `key`
    /// without touching the links.
    fn reserve_for(&mut self, key: &str) -> Result<(String, String), TryReserveError> {
        self.entries.try_reserve(1)?;
        self.index.try_reserve(1)?;
        Ok((try_to_owned(key)?, try_to_owned(key)?))
    }

    fn promote(&mut self, id: EntryId) {
        let count = self.entry(id).count;
        let mut moved = 0usize;
        while let Some(prev) = self.entry(id).prev {
            if self.entry(prev).count >= count {
                break;
            }
            self.swap_with_prev(prev, id);
            moved += 1;
        }
        if moved > 0 {
            log::trace!("promoted '{}' to {} by {} places", self.entry(id).key, count, moved);
        }
    }

    /// Swaps adjacent entries `left` and `right` (where `left.next == right`),
    /// rewiring outer neighbours and head/tail.
    fn swap_with_prev(&mut self, left: EntryId, right: EntryId) {
        let before = self.entry(left).prev;
        let after = self.entry(right).next;

        match (before, after) {
            // The pair is the whole sequence
            (None, None) => {
                self.head = Some(right);
                self.tail = Some(left);
            }
            // `left` was head
            (None, Some(after)) => {
                self.entries[after.0].prev = Some(left);
                self.head = Some(right);
            }
            // `right` was tail
            (Some(before), None) => {
                self.entries[before.0].next = Some(right);
                self.tail = Some(left);
            }
            (Some(before), Some(after)) => {
                self.entries[before.0].next = Some(right);
                self.entries[after.0].prev = Some(left);
            }
        }

        let r = &mut self.entries[right.0];
        r.prev = before;
        r.next = Some(left);
        let l = &mut self.entries[left.0];
        l.prev = Some(right);
        l.next = after;
    }
}

fn try_to_owned(key: &str) -> Result<String, TryReserveError> {
    let mut owned = String::new();
    owned.try_reserve_exact(key.len())?;
    owned.push_str(key);
    Ok(owned)
}

impl Default for RankedSequence {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a> {
    sequence: &'a RankedSequence,
    current: Option<EntryId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let entry = self.sequence.entry(id);
        self.current = entry.next;
        Some((entry.key.as_str(), entry.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_all(seq: &mut RankedSequence, keys: &[&str]) {
        for key in keys {
            seq.record_occurrence(key).unwrap();
        }
    }

    fn ranking(seq: &RankedSequence) -> Vec<(&str, u64)> {
        seq.iter().collect()
    }

    fn backward(seq: &RankedSequence) -> Vec<&str> {
        let mut keys = Vec::new();
        let mut current = seq.tail;
        while let Some(id) = current {
            keys.push(seq.entry(id).key.as_str());
            current = seq.entry(id).prev;
        }
        keys
    }

    #[test]
    fn test_empty() {
        let seq = RankedSequence::new();
        assert_eq!(seq.len(), 0);
        assert!(seq.is_empty());
        assert_eq!(seq.top_n(10), vec![]);
        assert_eq!(seq.list(), vec![]);
        assert!(seq.check_invariants().is_ok());
    }

    #[test]
    fn test_single_key_repeated() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["alice", "alice", "alice"]);
        assert_eq!(seq.len(), 1);
        assert_eq!(
            seq.top_n(10),
            vec![Tally { key: "alice".into(), count: 3 }]
        );
        assert_eq!(seq.head, seq.tail);
        assert!(seq.check_invariants().is_ok());
    }

    #[test]
    fn test_mixed_order() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "b", "a", "c", "a", "b"]);
        assert_eq!(ranking(&seq), vec![("a", 3), ("b", 2), ("c", 1)]);
        assert_eq!(backward(&seq), vec!["c", "b", "a"]);
        assert!(seq.check_invariants().is_ok());
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["x", "y"]);
        assert_eq!(ranking(&seq), vec![("x", 1), ("y", 1)]);

        // y catches up with x but does not overtake it
        record_all(&mut seq, &["x", "y"]);
        assert_eq!(ranking(&seq), vec![("x", 2), ("y", 2)]);
    }

    #[test]
    fn test_record_returns_count() {
        let mut seq = RankedSequence::new();
        assert_eq!(seq.record_occurrence("a").unwrap(), 1);
        assert_eq!(seq.record_occurrence("a").unwrap(), 2);
        assert_eq!(seq.record_occurrence("b").unwrap(), 1);
        assert_eq!(seq.count("a"), Some(2));
        assert_eq!(seq.count("z"), None);
        assert_eq!(seq.total(), 3);
    }

    #[test]
    fn test_swap_two_entries() {
        // (None, None): the pair is the whole sequence
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "b", "b"]);
        assert_eq!(ranking(&seq), vec![("b", 2), ("a", 1)]);
        assert_eq!(seq.head, Some(EntryId(1)));
        assert_eq!(seq.tail, Some(EntryId(0)));
        assert_eq!(backward(&seq), vec!["a", "b"]);
        assert!(seq.check_invariants().is_ok());
    }

    #[test]
    fn test_swap_at_head() {
        // (None, Some): left is head and something follows right
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "b", "c", "b"]);
        assert_eq!(ranking(&seq), vec![("b", 2), ("a", 1), ("c", 1)]);
        assert_eq!(backward(&seq), vec!["c", "a", "b"]);
        assert!(seq.check_invariants().is_ok());
    }

    #[test]
    fn test_swap_at_tail() {
        // (Some, None): right is tail and something precedes left
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "a", "a", "b", "c", "c"]);
        assert_eq!(ranking(&seq), vec![("a", 3), ("c", 2), ("b", 1)]);
        assert_eq!(backward(&seq), vec!["b", "c", "a"]);
        assert!(seq.check_invariants().is_ok());
    }

    #[test]
    fn test_swap_interior() {
        // (Some, Some): both outer neighbours relink
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "a", "a", "b", "c", "d", "c"]);
        assert_eq!(ranking(&seq), vec![("a", 3), ("c", 2), ("b", 1), ("d", 1)]);
        assert_eq!(backward(&seq), vec!["d", "b", "c", "a"]);
        assert!(seq.check_invariants().is_ok());
    }

    #[test]
    fn test_promote_to_head_across_many() {
        let mut seq = RankedSequence::new();
        let keys: Vec<String> = (1..=15).map(|i| format!("n{}", i)).collect();
        for key in &keys {
            seq.record_occurrence(key).unwrap();
        }
        for _ in 0..10 {
            seq.record_occurrence("n15").unwrap();
        }

        assert_eq!(seq.top_n(1), vec![Tally { key: "n15".into(), count: 11 }]);
        let rest: Vec<&str> = seq.iter().skip(1).map(|(k, _)| k).collect();
        let expected: Vec<&str> = keys[..14].iter().map(String::as_str).collect();
        assert_eq!(rest, expected);
        assert!(seq.check_invariants().is_ok());
    }

    #[test]
    fn test_promotion_stops_at_equal_count() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "a", "b", "c", "c"]);
        // c reaches 2 and stops behind a, which also has 2
        assert_eq!(ranking(&seq), vec![("a", 2), ("c", 2), ("b", 1)]);
    }

    #[test]
    fn test_top_n_limits() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "b", "c", "c"]);
        assert_eq!(seq.top_n(0), vec![]);
        assert_eq!(seq.top_n(2).len(), 2);
        assert_eq!(seq.top_n(10).len(), 3);
        assert_eq!(seq.list().len(), 3);
        assert_eq!(seq.select(Limit::Top(1)), seq.top_n(1));
        assert_eq!(seq.select(Limit::All), seq.list());
        // Reads do not disturb the ranking
        assert_eq!(seq.list(), seq.list());
    }

    #[test]
    fn test_limit_from_str() {
        assert_eq!("all".parse::<Limit>(), Ok(Limit::All));
        assert_eq!("ALL".parse::<Limit>(), Ok(Limit::All));
        assert_eq!("10".parse::<Limit>(), Ok(Limit::Top(10)));
        assert_eq!(Limit::from(3), Limit::Top(3));
        assert!("-1".parse::<Limit>().is_err());
        assert!("ten".parse::<Limit>().is_err());
    }

    #[test]
    fn test_invariant_check_detects_bad_order() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "b"]);
        seq.entries[1].count = 5;
        seq.total += 4;
        assert!(seq.check_invariants().is_err());
    }

    #[test]
    fn test_invariant_check_detects_broken_link() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "b", "c"]);
        seq.entries[2].prev = None;
        assert!(seq.check_invariants().is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "has prev")]
    fn test_record_asserts_invariants_in_debug() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["a", "b"]);
        seq.entries[1].prev = None;
        let _ = seq.record_occurrence("c");
    }

    #[test]
    fn test_debug_format() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["alice", "bob", "bob"]);
        let formatted = format!("{:?}", seq);
        assert!(formatted.starts_with("RankedSequence"));
        assert!(formatted.contains("alice"));
    }

    #[test]
    fn test_unicode_keys() {
        let mut seq = RankedSequence::new();
        record_all(&mut seq, &["पद्मं", "ballynamoney", "पद्मं"]);
        assert_eq!(ranking(&seq), vec![("पद्मं", 2), ("ballynamoney", 1)]);
    }
}
