use super::SeriesData;
use crate::data_types::{RawItem, RawValue, MISSING};
use crate::error::{violation, StoreError, StoreResult};
use crate::identity::fallback_id;
use crate::index_view::IndexView;

impl SeriesData {
    /// Value of `dim` at logical position `idx`, or [`MISSING`] when either is unknown.
    #[inline]
    pub fn get(&self, dim: &str, idx: usize) -> f64 {
        match self.dims.index_of(dim) {
            Some(d) => self.get_by_dim_index(d, idx),
            None => MISSING,
        }
    }

    #[inline]
    pub fn get_by_dim_index(&self, dim: usize, idx: usize) -> f64 {
        match (self.columns.get(dim), self.raw_index(idx)) {
            (Some(column), Some(raw)) => column.get(raw, self.chunk_size()),
            _ => MISSING,
        }
    }

    /// Value of `dim` at raw position `raw`, ignoring the view.
    pub fn get_by_raw_index(&self, dim: &str, raw: usize) -> f64 {
        if raw >= self.raw_count {
            return MISSING;
        }
        match self.dims.index_of(dim) {
            Some(d) => self.columns[d].get(raw, self.chunk_size()),
            None => MISSING,
        }
    }

    /// Every dimension's value at `idx`, in dimension order.
    pub fn get_values(&self, idx: usize) -> Vec<f64> {
        (0..self.dims.len())
            .map(|d| self.get_by_dim_index(d, idx))
            .collect()
    }

    pub fn get_values_of(&self, dims: &[&str], idx: usize) -> Vec<f64> {
        dims.iter().map(|d| self.get(d, idx)).collect()
    }

    /// True when `idx` is visible and none of its values is missing.
    pub fn has_value(&self, idx: usize) -> bool {
        let Some(raw) = self.raw_index(idx) else {
            return false;
        };
        let chunk_size = self.chunk_size();
        self.columns
            .iter()
            .all(|c| !c.get(raw, chunk_size).is_nan())
    }

    #[inline]
    pub fn raw_index(&self, idx: usize) -> Option<usize> {
        self.view.raw_index(idx, self.raw_count)
    }

    /// Raw positions of the visible rows, in logical order.
    pub fn indices(&self) -> Vec<usize> {
        self.view.to_vec(self.raw_count)
    }

    pub fn index_of_raw_index(&self, raw: usize) -> Option<usize> {
        self.view.logical_index(raw, self.raw_count)
    }

    pub fn get_name(&self, idx: usize) -> Option<&str> {
        self.raw_index(idx).and_then(|raw| self.identity.name(raw))
    }

    /// Stable id of the row at `idx`. Rows with neither id nor name get a
    /// positional id derived from their raw position.
    pub fn get_id(&self, idx: usize) -> Option<String> {
        self.raw_index(idx).map(|raw| self.id_of_raw(raw))
    }

    pub(super) fn id_of_raw(&self, raw: usize) -> String {
        match self.identity.id(raw) {
            Some(id) => id.to_string(),
            None => fallback_id(raw),
        }
    }

    /// First logical position whose name is `name`.
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        (0..self.count()).find(|&idx| self.get_name(idx) == Some(name))
    }

    /// Raw position of the row carrying category code `code` on `dim`.
    ///
    /// Fails when `dim` was not declared with an inverted index.
    pub fn raw_index_of(&self, dim: &str, code: f64) -> StoreResult<Option<usize>> {
        let d = self.dims.require(dim)?;
        if !self.dims.at(d).create_inverted_index {
            return Err(violation(StoreError::NotIndexed(dim.to_string())));
        }
        Ok(self
            .inverted
            .get(d)
            .and_then(|index| index.as_ref())
            .and_then(|index| index.lookup(code)))
    }

    /// Same as [`raw_index_of`](Self::raw_index_of), by category name.
    pub fn raw_index_of_category(&self, dim: &str, category: &str) -> StoreResult<Option<usize>> {
        let code = self
            .dims
            .get(dim)
            .and_then(|info| info.ordinal_meta.as_ref())
            .and_then(|meta| meta.read().code_of(category));
        match code {
            Some(code) => self.raw_index_of(dim, code as f64),
            // Still surfaces unknown or non-indexed dimensions.
            None => self.raw_index_of(dim, MISSING),
        }
    }

    /// The row as the provider holds it.
    ///
    /// Without a provider the stored values are returned. `None` once a
    /// non-persistent provider has released the row.
    pub fn get_raw_data_item(&self, idx: usize) -> Option<RawItem> {
        let raw = self.raw_index(idx)?;
        match &self.provider {
            Some(provider) => {
                let provider = provider.read();
                let mut buffer = Vec::new();
                provider
                    .get_item(raw, &mut buffer)
                    .map(|item| item.to_raw_item())
            }
            None => {
                let chunk_size = self.chunk_size();
                Some(RawItem::Row(
                    self.columns
                        .iter()
                        .map(|c| RawValue::Number(c.get(raw, chunk_size)))
                        .collect(),
                ))
            }
        }
    }

    /// Calls `f(values, idx)` for every visible row, `values` following `dims`.
    pub fn each<F>(&self, dims: &[&str], mut f: F) -> StoreResult<()>
    where
        F: FnMut(&[f64], usize),
    {
        let dims = self.resolve_dims(dims)?;
        let chunk_size = self.chunk_size();
        let mut values = vec![MISSING; dims.len()];
        for idx in 0..self.count() {
            let Some(raw) = self.raw_index(idx) else {
                break;
            };
            for (slot, &d) in values.iter_mut().zip(&dims) {
                *slot = self.columns[d].get(raw, chunk_size);
            }
            f(&values, idx);
        }
        Ok(())
    }

    pub fn map_array<T, F>(&self, dims: &[&str], mut f: F) -> StoreResult<Vec<T>>
    where
        F: FnMut(&[f64], usize) -> T,
    {
        let mut out = Vec::with_capacity(self.count());
        self.each(dims, |values, idx| out.push(f(values, idx)))?;
        Ok(out)
    }

    /// Visible values of one dimension, in logical order.
    pub(super) fn view_values(&self, d: usize) -> Vec<f64> {
        let column = &self.columns[d];
        let chunk_size = self.chunk_size();
        match &self.view {
            IndexView::Identity => column.iter_raw(self.raw_count, chunk_size).collect(),
            IndexView::Indexed(indices) => indices
                .iter()
                .map(|&raw| column.get(raw as usize, chunk_size))
                .collect(),
        }
    }
}
