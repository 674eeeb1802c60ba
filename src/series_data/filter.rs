use super::SeriesData;
use crate::chunk::Chunk;
use crate::data_types::{Extent, MISSING};
use crate::error::StoreResult;
use crate::index_view::IndexView;

/// Range membership used by every selection path. Missing values stay in.
#[inline(always)]
fn in_range(v: f64, range: &Extent) -> bool {
    range.contains(v) || v.is_nan()
}

impl SeriesData {
    /// Narrows the view to the rows for which `predicate(values, idx)` holds.
    ///
    /// `values` follows the order of `dims`; `idx` is the logical position
    /// before filtering. Raw storage is left untouched.
    pub fn filter_self<F>(&mut self, dims: &[&str], mut predicate: F) -> StoreResult<()>
    where
        F: FnMut(&[f64], usize) -> bool,
    {
        let dims = self.resolve_dims(dims)?;
        let before = self.count();
        let chunk_size = self.chunk_size();

        let mut kept = Vec::with_capacity(before);
        let mut values = vec![MISSING; dims.len()];
        for idx in 0..before {
            let Some(raw) = self.raw_index(idx) else {
                break;
            };
            for (slot, &d) in values.iter_mut().zip(&dims) {
                *slot = self.columns[d].get(raw, chunk_size);
            }
            if predicate(&values, idx) {
                kept.push(raw as u32);
            }
        }

        self.install_view(kept, before, false);
        Ok(())
    }

    /// Keeps the rows whose values fall in every `(dimension, [min, max])`
    /// range, bounds included. Rows with a missing value on a ranged
    /// dimension are always kept.
    pub fn select_range(&mut self, ranges: &[(&str, Extent)]) -> StoreResult<()> {
        let ranges = ranges
            .iter()
            .map(|(dim, range)| Ok((self.dims.require(dim)?, *range)))
            .collect::<StoreResult<Vec<_>>>()?;
        if ranges.is_empty() {
            return Ok(());
        }

        let before = self.count();
        let (kept, fast_path) = match (self.view.is_identity(), ranges.as_slice()) {
            (true, [(d, range)]) => (self.select_one(*d, range), true),
            (true, [(d0, r0), (d1, r1)]) => (self.select_two((*d0, r0), (*d1, r1)), true),
            _ => (self.select_generic(&ranges, before), false),
        };

        self.install_view(kept, before, fast_path);
        Ok(())
    }

    fn select_one(&self, d: usize, range: &Extent) -> Vec<u32> {
        let chunk_size = self.chunk_size();
        let mut kept = Vec::with_capacity(self.raw_count);

        for (ci, chunk) in self.columns[d].chunks().iter().enumerate() {
            let base = ci * chunk_size;
            if base >= self.raw_count {
                break;
            }
            let len = (self.raw_count - base).min(chunk_size);
            match chunk.as_f64_slice() {
                Some(values) => {
                    for (offset, &v) in values[..len].iter().enumerate() {
                        if in_range(v, range) {
                            kept.push((base + offset) as u32);
                        }
                    }
                }
                None => {
                    for (offset, v) in chunk.values(len).enumerate() {
                        if in_range(v, range) {
                            kept.push((base + offset) as u32);
                        }
                    }
                }
            }
        }
        kept
    }

    fn select_two(&self, (d0, r0): (usize, &Extent), (d1, r1): (usize, &Extent)) -> Vec<u32> {
        let chunk_size = self.chunk_size();
        let mut kept = Vec::with_capacity(self.raw_count);
        let chunks0: &[Chunk] = self.columns[d0].chunks();
        let chunks1: &[Chunk] = self.columns[d1].chunks();

        for (ci, (c0, c1)) in chunks0.iter().zip(chunks1).enumerate() {
            let base = ci * chunk_size;
            if base >= self.raw_count {
                break;
            }
            let len = (self.raw_count - base).min(chunk_size);
            match (c0.as_f64_slice(), c1.as_f64_slice()) {
                (Some(v0), Some(v1)) => {
                    for (offset, (&a, &b)) in v0[..len].iter().zip(&v1[..len]).enumerate() {
                        if in_range(a, r0) && in_range(b, r1) {
                            kept.push((base + offset) as u32);
                        }
                    }
                }
                _ => {
                    for (offset, (a, b)) in c0.values(len).zip(c1.values(len)).enumerate() {
                        if in_range(a, r0) && in_range(b, r1) {
                            kept.push((base + offset) as u32);
                        }
                    }
                }
            }
        }
        kept
    }

    fn select_generic(&self, ranges: &[(usize, Extent)], count: usize) -> Vec<u32> {
        let chunk_size = self.chunk_size();
        let mut kept = Vec::with_capacity(count);
        for idx in 0..count {
            let Some(raw) = self.raw_index(idx) else {
                break;
            };
            let keep = ranges
                .iter()
                .all(|(d, range)| in_range(self.columns[*d].get(raw, chunk_size), range));
            if keep {
                kept.push(raw as u32);
            }
        }
        kept
    }

    /// Installs the retained raw positions as the new view. A filter that
    /// keeps every row leaves the current view in place.
    fn install_view(&mut self, kept: Vec<u32>, before: usize, fast_path: bool) {
        let after = kept.len();
        if after < before {
            self.view = IndexView::from_raw_indices(kept);
        }
        self.reset_view_extents();
        tracing::debug!(before, after, fast_path, "narrowed view");
    }
}
