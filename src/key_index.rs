use std::collections::{HashMap, TryReserveError};
use ahash::RandomState;

use crate::ranked_sequence::EntryId;

/// Maps a key to the arena slot of its entry so repeat lookups skip the list walk
#[derive(Debug)]
pub(crate) struct KeyIndex {
    slots: HashMap<String, EntryId, RandomState>,
}

impl KeyIndex {
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: RandomState) -> Self {
        Self {
            slots: HashMap::with_capacity_and_hasher(capacity, hasher),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<EntryId> {
        self.slots.get(key).copied()
    }

    /// Records `key -> id`. Registering the same key twice is a bug in the caller.
    pub(crate) fn register(&mut self, key: String, id: EntryId) {
        let previous = self.slots.insert(key, id);
        assert!(previous.is_none(), "key registered twice in KeyIndex");
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.slots.try_reserve(additional)
    }
}
