use crate::chunk::ChunkedColumn;

/// Slot value for a category that no row carries. Never a valid raw position
/// since raw positions are stored as `u32` below this value.
pub const INDEX_NOT_FOUND: u32 = u32::MAX;

/// Category code -> raw position for one ordinal dimension.
///
/// Category values are expected to be unique per row; when they are not, the
/// last row carrying a code wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    slots: Vec<u32>,
}

impl InvertedIndex {
    pub fn build(
        column: &ChunkedColumn,
        raw_count: usize,
        chunk_size: usize,
        category_count: usize,
    ) -> Self {
        let mut slots = vec![INDEX_NOT_FOUND; category_count];
        for (raw, code) in column.iter_raw(raw_count, chunk_size).enumerate() {
            if code.is_nan() || code < 0.0 || code.fract() != 0.0 {
                continue;
            }
            let code = code as usize;
            if code >= slots.len() {
                slots.resize(code + 1, INDEX_NOT_FOUND);
            }
            slots[code] = raw as u32;
        }
        Self { slots }
    }

    pub fn lookup(&self, code: f64) -> Option<usize> {
        if code.is_nan() || code < 0.0 || code.fract() != 0.0 {
            return None;
        }
        match self.slots.get(code as usize) {
            Some(&slot) if slot != INDEX_NOT_FOUND => Some(slot as usize),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
