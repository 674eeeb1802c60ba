//! Stable per-row identity used to match rows across snapshots.
//!
//! Everything here is keyed by raw position, so names and ids survive any
//! filtering or resampling of the logical view.

use std::collections::HashMap;

/// Inserted between a repeated name and its occurrence number.
pub const DUPLICATE_NAME_SEPARATOR: &str = "__dup__";

/// Prefix of ids synthesized for rows with neither id nor name.
pub const AUTO_ID_PREFIX: &str = "__row__";

/// Id synthesized on demand for a row that has nothing better.
pub fn fallback_id(raw: usize) -> String {
    format!("{AUTO_ID_PREFIX}{raw}")
}

#[derive(Clone, Debug, Default)]
pub struct IdentityTable {
    names: Vec<Option<String>>,
    ids: Vec<Option<String>>,
    name_repeat: HashMap<String, u32>,
}

impl IdentityTable {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn reserve_rows(&mut self, raw_count: usize) {
        if self.names.len() < raw_count {
            self.names.resize(raw_count, None);
            self.ids.resize(raw_count, None);
        }
    }

    /// Name given by the caller ahead of ingestion; wins over anything derived.
    pub fn set_explicit_name(&mut self, raw: usize, name: String) {
        self.reserve_rows(raw + 1);
        self.names[raw] = Some(name);
    }

    /// Resolves name and id of a freshly ingested row.
    ///
    /// Name precedence: explicit name, then the item's own name, then the
    /// name dimension. Without an explicit id, the name becomes the id, with
    /// an occurrence suffix from the second occurrence on.
    pub fn record<F>(
        &mut self,
        raw: usize,
        item_name: Option<String>,
        item_id: Option<String>,
        name_from_dimension: F,
    ) where
        F: FnOnce() -> Option<String>,
    {
        self.reserve_rows(raw + 1);

        if self.names[raw].is_none() {
            self.names[raw] = item_name.or_else(name_from_dimension);
        }

        let id = match (item_id, &self.names[raw]) {
            (Some(id), _) => Some(id),
            (None, Some(name)) => {
                let seen = self.name_repeat.entry(name.clone()).or_insert(0);
                let id = if *seen > 0 {
                    format!("{name}{DUPLICATE_NAME_SEPARATOR}{seen}")
                } else {
                    name.clone()
                };
                *seen += 1;
                Some(id)
            }
            (None, None) => None,
        };
        self.ids[raw] = id;
    }

    pub fn name(&self, raw: usize) -> Option<&str> {
        self.names.get(raw).and_then(|n| n.as_deref())
    }

    pub fn id(&self, raw: usize) -> Option<&str> {
        self.ids.get(raw).and_then(|n| n.as_deref())
    }
}
