use rayon::prelude::*;

use super::SeriesData;
use crate::data_types::{Extent, MISSING};
use crate::error::StoreResult;
use crate::index_view::IndexView;
use crate::simd::sum_f64;

/// Views larger than this are scanned in parallel.
const PARALLEL_SCAN_THRESHOLD: usize = 1 << 16;

impl SeriesData {
    /// `[min, max]` of `dim` over the visible rows, NaN skipped.
    ///
    /// Unfiltered stores answer from the raw extent. Filtered stores scan the
    /// view once and cache the result until the view changes.
    pub fn data_extent(&self, dim: &str) -> Extent {
        let Some(d) = self.dims.index_of(dim) else {
            return Extent::EMPTY;
        };
        if self.view.is_identity() {
            return self.raw_extents[d];
        }

        let mut cache = self.view_extents.lock();
        if let Some(extent) = cache[d] {
            return extent;
        }
        let extent = self.scan_view_extent(d);
        cache[d] = Some(extent);
        extent
    }

    fn scan_view_extent(&self, d: usize) -> Extent {
        let IndexView::Indexed(indices) = &self.view else {
            return self.raw_extents[d];
        };
        let column = &self.columns[d];
        let chunk_size = self.chunk_size();
        let fold = |raws: &[u32]| {
            let mut extent = Extent::EMPTY;
            for &raw in raws {
                extent.fold(column.get(raw as usize, chunk_size));
            }
            extent
        };

        if indices.len() < PARALLEL_SCAN_THRESHOLD {
            return fold(indices.as_slice());
        }
        indices
            .par_chunks(PARALLEL_SCAN_THRESHOLD)
            .map(fold)
            .reduce(
                || Extent::EMPTY,
                |mut a, b| {
                    a.merge(b);
                    a
                },
            )
    }

    /// Caller-supplied extent if one was set, the data extent otherwise.
    pub fn approximate_extent(&self, dim: &str) -> Extent {
        match self.dims.index_of(dim) {
            Some(d) => self.approximate_extents[d].unwrap_or_else(|| self.data_extent(dim)),
            None => Extent::EMPTY,
        }
    }

    pub fn set_approximate_extent(&mut self, dim: &str, extent: Extent) -> StoreResult<()> {
        let d = self.dims.require(dim)?;
        self.approximate_extents[d] = Some(extent);
        Ok(())
    }

    /// Extent over every value ever written to `dim`, whatever the view.
    pub fn raw_extent(&self, dim: &str) -> Extent {
        self.dims
            .index_of(dim)
            .map_or(Extent::EMPTY, |d| self.raw_extents[d])
    }

    /// Sum of the visible values of `dim`, NaN skipped.
    pub fn sum(&self, dim: &str) -> StoreResult<f64> {
        let d = self.dims.require(dim)?;
        Ok(sum_f64(&self.view_values(d)))
    }

    /// Median of the visible values of `dim`, NaN skipped. [`MISSING`] when
    /// nothing is left.
    pub fn median(&self, dim: &str) -> StoreResult<f64> {
        let d = self.dims.require(dim)?;
        let mut values: Vec<f64> = self
            .view_values(d)
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect();
        if values.is_empty() {
            return Ok(MISSING);
        }
        values.sort_unstable_by(f64::total_cmp);
        let mid = values.len() / 2;
        Ok(if values.len() % 2 == 1 {
            values[mid]
        } else {
            (values[mid - 1] + values[mid]) / 2.0
        })
    }

    /// Logical positions whose value on `dim` is closest to `value`.
    ///
    /// Rows farther than `max_distance` are ignored. Rows sharing the minimal
    /// distance are all returned, except that when `value` sits exactly
    /// between two values only the one below it is kept.
    pub fn indices_of_nearest(
        &self,
        dim: &str,
        value: f64,
        max_distance: Option<f64>,
    ) -> StoreResult<Vec<usize>> {
        let d = self.dims.require(dim)?;
        let max_distance = max_distance.unwrap_or(f64::INFINITY);
        let mut nearest = Vec::new();
        let mut min_dist = f64::INFINITY;
        let mut min_diff = -1.0;

        for (idx, v) in self.view_values(d).into_iter().enumerate() {
            let diff = value - v;
            let dist = diff.abs();
            if dist.is_nan() || dist > max_distance {
                continue;
            }
            if dist < min_dist || (dist == min_dist && diff >= 0.0 && min_diff < 0.0) {
                min_dist = dist;
                min_diff = diff;
                nearest.clear();
            }
            if diff == min_diff {
                nearest.push(idx);
            }
        }
        Ok(nearest)
    }
}
