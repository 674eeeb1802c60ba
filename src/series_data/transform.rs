use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;

use super::SeriesData;
use crate::data_types::{Extent, MISSING};
use crate::decimation::{lttb_indices, pick_nearest, Sampler};
use crate::differ::{DataDiffer, DiffResult};
use crate::error::{violation, StoreError, StoreResult};
use crate::index_view::IndexView;

/// What a `map` callback writes back: one value for the first mapped
/// dimension, or one value per mapped dimension.
#[derive(Clone, Debug, PartialEq)]
pub enum MapValue {
    One(f64),
    Many(Vec<f64>),
}

impl From<f64> for MapValue {
    fn from(v: f64) -> Self {
        MapValue::One(v)
    }
}

impl From<Vec<f64>> for MapValue {
    fn from(v: Vec<f64>) -> Self {
        MapValue::Many(v)
    }
}

fn frame_size(rate: f64) -> StoreResult<usize> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(violation(StoreError::InvalidRate(rate.to_string())));
    }
    Ok(((1.0 / rate).floor() as usize).max(1))
}

impl SeriesData {
    /// A new store over the same chunks, view and extents.
    ///
    /// Visual, layout and graphic-element annotations are not carried over.
    /// The clone can read the provider but not append through it.
    pub fn clone_shallow(&self) -> SeriesData {
        SeriesData {
            dims: Arc::clone(&self.dims),
            config: Arc::clone(&self.config),
            columns: self.columns.clone(),
            raw_count: self.raw_count,
            view: self.view.clone(),
            raw_extents: self.raw_extents.clone(),
            view_extents: Mutex::new(self.view_extents.lock().clone()),
            approximate_extents: self.approximate_extents.clone(),
            inverted: Arc::clone(&self.inverted),
            identity: Arc::clone(&self.identity),
            provider: self.provider.clone(),
            owns_provider: false,
            visual: HashMap::new(),
            item_visuals: HashMap::new(),
            item_layouts: HashMap::new(),
            graphic_els: HashMap::new(),
        }
    }

    /// Shallow clone whose `dims` columns own their chunks, with their raw
    /// extents emptied for the caller to refill.
    fn clone_for_map_and_sample(&self, dims: &[usize]) -> SeriesData {
        let mut target = self.clone_shallow();
        for &d in dims {
            target.columns[d].detach();
            target.raw_extents[d] = Extent::EMPTY;
        }
        target.reset_view_extents();
        target
    }

    /// Rewrites the values of `dims` row by row into a new store.
    ///
    /// `f(values, idx)` sees the current values of `dims`; returning `None`
    /// keeps them. Columns not named in `dims` stay shared with `self`.
    pub fn map<R, F>(&self, dims: &[&str], mut f: F) -> StoreResult<SeriesData>
    where
        R: Into<MapValue>,
        F: FnMut(&[f64], usize) -> Option<R>,
    {
        let dims = self.resolve_dims(dims)?;
        let mut target = self.clone_for_map_and_sample(&dims);
        let chunk_size = self.chunk_size();
        let mut values = vec![MISSING; dims.len()];

        for idx in 0..target.count() {
            let Some(raw) = target.raw_index(idx) else {
                break;
            };
            for (slot, &d) in values.iter_mut().zip(&dims) {
                *slot = target.columns[d].get(raw, chunk_size);
            }
            match f(&values, idx).map(Into::into) {
                None => {}
                Some(MapValue::One(v)) => {
                    if let Some(first) = values.first_mut() {
                        *first = v;
                    }
                }
                Some(MapValue::Many(vs)) => {
                    for (slot, v) in values.iter_mut().zip(vs) {
                        *slot = v;
                    }
                }
            }
            for (&v, &d) in values.iter().zip(&dims) {
                let column = &mut target.columns[d];
                column.set(raw, v, chunk_size);
                target.raw_extents[d].fold(column.storable(v));
            }
        }

        // Rows outside the view kept their values and still count.
        if !target.view.is_identity() {
            for &d in &dims {
                target.raw_extents[d] = target.columns[d].extent(target.raw_count, chunk_size);
            }
        }

        tracing::debug!(dims = dims.len(), rows = target.count(), "mapped store");
        Ok(target)
    }

    /// Reduces the view to one row per frame of `floor(1 / rate)` rows.
    ///
    /// `aggregator` computes the frame value, `picker(frame, value)` the row
    /// that carries it. The value is written into that row of the new store's
    /// own copy of `dim`.
    pub fn down_sample<A, P>(
        &self,
        dim: &str,
        rate: f64,
        aggregator: A,
        picker: P,
    ) -> StoreResult<SeriesData>
    where
        A: Fn(&[f64]) -> f64 + Sync + Send,
        P: Fn(&[f64], f64) -> usize + Sync + Send,
    {
        let frame_size = frame_size(rate)?;
        let d = self.dims.require(dim)?;
        let values = self.view_values(d);
        let raws = self.indices();

        let picks: Vec<(usize, f64)> = values
            .par_chunks(frame_size)
            .enumerate()
            .map(|(i, frame)| {
                let value = aggregator(frame);
                let offset = picker(frame, value).min(frame.len() - 1);
                (i * frame_size + offset, value)
            })
            .collect();

        let mut target = self.clone_for_map_and_sample(&[d]);
        let chunk_size = self.chunk_size();
        let mut kept = Vec::with_capacity(picks.len());
        for (logical, value) in picks {
            let raw = raws[logical];
            target.columns[d].set(raw, value, chunk_size);
            kept.push(raw as u32);
        }
        target.raw_extents[d] = target.columns[d].extent(target.raw_count, chunk_size);
        target.view = IndexView::from_raw_indices(kept);
        target.reset_view_extents();

        tracing::debug!(
            before = values.len(),
            after = target.count(),
            frame_size,
            "down-sampled store"
        );
        Ok(target)
    }

    /// [`down_sample`](Self::down_sample) with a built-in aggregator, the
    /// row nearest to the aggregate carrying it.
    pub fn down_sample_by(&self, dim: &str, rate: f64, sampler: Sampler) -> StoreResult<SeriesData> {
        self.down_sample(dim, rate, move |frame| sampler.aggregate(frame), pick_nearest)
    }

    /// Largest-Triangle-Three-Buckets sampling of the view on `value_dim`.
    /// Values are not rewritten.
    pub fn lttb_down_sample(&self, value_dim: &str, rate: f64) -> StoreResult<SeriesData> {
        let frame_size = frame_size(rate)?;
        let d = self.dims.require(value_dim)?;
        let raws = self.indices();
        let picks = lttb_indices(&self.view_values(d), frame_size);

        let mut target = self.clone_shallow();
        target.view = IndexView::from_raw_indices(picks.iter().map(|&i| raws[i] as u32).collect());
        target.reset_view_extents();

        tracing::debug!(
            before = raws.len(),
            after = target.count(),
            frame_size,
            "lttb down-sampled store"
        );
        Ok(target)
    }

    /// Matches the visible rows of `old` against those of `self` by id.
    pub fn diff(&self, old: &SeriesData) -> DiffResult {
        let old_raws = old.indices();
        let new_raws = self.indices();
        DataDiffer::new(
            &old_raws,
            &new_raws,
            |raw: &usize, _| old.id_of_raw(*raw),
            |raw: &usize, _| self.id_of_raw(*raw),
        )
        .execute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{DimensionInfo, DimensionKind};

    #[test]
    fn test_rate_validation() {
        assert_eq!(frame_size(0.25).unwrap(), 4);
        assert_eq!(frame_size(0.3).unwrap(), 3);
        assert_eq!(frame_size(2.0).unwrap(), 1);
        assert!(matches!(frame_size(0.0), Err(StoreError::InvalidRate(_))));
        assert!(matches!(frame_size(f64::NAN), Err(StoreError::InvalidRate(_))));
    }

    #[test]
    fn test_map_into_int_column_truncates_extent() {
        let mut data = SeriesData::new(vec![DimensionInfo::new("i", DimensionKind::Int)]).unwrap();
        data.append_values(vec![vec![1.0.into()], vec![2.0.into()]], None)
            .unwrap();
        let mapped = data.map(&["i"], |v, _| Some(v[0] + 0.5)).unwrap();
        assert_eq!(mapped.get("i", 1), 2.0);
        assert_eq!(mapped.raw_extent("i").as_array(), [1.0, 2.0]);
    }
}
