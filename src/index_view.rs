/// Upper bound on the number of raw rows a store accepts. Raw positions are
/// held as `u32`, and `u32::MAX` itself is reserved as the inverted-index
/// sentinel.
pub const MAX_RAW_ROWS: usize = u32::MAX as usize;

/// Translation from logical positions to raw storage positions.
///
/// `Identity` means every raw row is visible in ingestion order. `Indexed`
/// holds the visible raw positions; filters always produce it in ascending
/// order, which the reverse lookup relies on. Ingestion refuses to grow a
/// store past [`MAX_RAW_ROWS`], so every raw position fits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IndexView {
    #[default]
    Identity,
    Indexed(Vec<u32>),
}

impl IndexView {
    pub fn from_raw_indices(indices: Vec<u32>) -> Self {
        IndexView::Indexed(indices)
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, IndexView::Identity)
    }

    /// Number of visible rows, given the total number of raw rows.
    #[inline]
    pub fn count(&self, raw_count: usize) -> usize {
        match self {
            IndexView::Identity => raw_count,
            IndexView::Indexed(indices) => indices.len(),
        }
    }

    #[inline]
    pub fn raw_index(&self, logical: usize, raw_count: usize) -> Option<usize> {
        match self {
            IndexView::Identity => (logical < raw_count).then_some(logical),
            IndexView::Indexed(indices) => indices.get(logical).map(|r| *r as usize),
        }
    }

    /// Reverse lookup. Binary search when indexed.
    pub fn logical_index(&self, raw: usize, raw_count: usize) -> Option<usize> {
        match self {
            IndexView::Identity => (raw < raw_count).then_some(raw),
            IndexView::Indexed(indices) => {
                let raw = u32::try_from(raw).ok()?;
                indices.binary_search(&raw).ok()
            }
        }
    }

    /// All visible raw positions, materialised.
    pub fn to_vec(&self, raw_count: usize) -> Vec<usize> {
        match self {
            IndexView::Identity => (0..raw_count).collect(),
            IndexView::Indexed(indices) => indices.iter().map(|r| *r as usize).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_lookups() {
        let view = IndexView::Identity;
        assert_eq!(view.count(5), 5);
        assert_eq!(view.raw_index(4, 5), Some(4));
        assert_eq!(view.raw_index(5, 5), None);
        assert_eq!(view.logical_index(2, 5), Some(2));
        assert_eq!(view.logical_index(7, 5), None);
    }

    #[test]
    fn test_indexed_reverse_lookup() {
        let view = IndexView::from_raw_indices(vec![1, 4, 9, 12]);
        assert_eq!(view.count(100), 4);
        assert_eq!(view.raw_index(2, 100), Some(9));
        assert_eq!(view.raw_index(4, 100), None);
        assert_eq!(view.logical_index(12, 100), Some(3));
        assert_eq!(view.logical_index(5, 100), None);
        assert_eq!(view.to_vec(100), vec![1, 4, 9, 12]);
    }
}
