use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Outcome of matching two snapshots by key.
///
/// Positions are indices into the sequences handed to [`DataDiffer::new`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// New positions whose key does not exist in the old sequence, in new order.
    pub added: Vec<usize>,
    /// Old positions whose key does not exist in the new sequence, in old order.
    pub removed: Vec<usize>,
    /// `(old, new)` pairs sharing a key, in old order.
    pub updated: Vec<(usize, usize)>,
}

impl DiffResult {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Classifies rows of two snapshots as added, removed or updated.
///
/// Keys must be unique within each side. A repeated key is logged and every
/// occurrence after the first one is ignored.
pub struct DataDiffer<'a, T, FO, FN> {
    old: &'a [T],
    new: &'a [T],
    old_key: FO,
    new_key: FN,
}

impl<'a, T, K, FO, FN> DataDiffer<'a, T, FO, FN>
where
    K: Eq + Hash,
    FO: Fn(&T, usize) -> K,
    FN: Fn(&T, usize) -> K,
{
    pub fn new(old: &'a [T], new: &'a [T], old_key: FO, new_key: FN) -> Self {
        Self {
            old,
            new,
            old_key,
            new_key,
        }
    }

    pub fn execute(&self) -> DiffResult {
        let mut new_positions: HashMap<K, usize> = HashMap::with_capacity(self.new.len());
        let mut first_in_new = vec![false; self.new.len()];
        for (i, item) in self.new.iter().enumerate() {
            let key = (self.new_key)(item, i);
            if new_positions.contains_key(&key) {
                tracing::warn!(position = i, "duplicate key in new snapshot, ignored");
                continue;
            }
            new_positions.insert(key, i);
            first_in_new[i] = true;
        }

        let mut result = DiffResult::default();
        let mut matched = vec![false; self.new.len()];
        let mut seen_old: HashSet<K> = HashSet::with_capacity(self.old.len());

        for (i, item) in self.old.iter().enumerate() {
            let key = (self.old_key)(item, i);
            let hit = new_positions.get(&key).copied();
            if !seen_old.insert(key) {
                tracing::warn!(position = i, "duplicate key in old snapshot, ignored");
                continue;
            }
            match hit {
                Some(j) => {
                    matched[j] = true;
                    result.updated.push((i, j));
                }
                None => result.removed.push(i),
            }
        }

        result.added = (0..self.new.len())
            .filter(|&j| first_in_new[j] && !matched[j])
            .collect();
        result
    }
}
