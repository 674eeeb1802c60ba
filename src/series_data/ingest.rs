use std::sync::Arc;

use super::SeriesData;
use crate::chunk::ChunkedColumn;
use crate::data_types::{
    share_provider, DataProvider, Extent, RawItem, RawValue, SharedProvider, SourceShape, MISSING,
};
use crate::error::{violation, StoreError, StoreResult};
use crate::identity::IdentityTable;
use crate::index_view::{IndexView, MAX_RAW_ROWS};
use crate::inverted_index::InvertedIndex;
use crate::sources::RowArraysSource;

fn check_row_cap(rows: usize) -> StoreResult<()> {
    if rows > MAX_RAW_ROWS {
        return Err(violation(StoreError::TooManyRows {
            rows,
            limit: MAX_RAW_ROWS,
        }));
    }
    Ok(())
}

impl SeriesData {
    /// Replaces the content of the store with every row of `provider`.
    ///
    /// `names` gives explicit row names by raw position; they win over names
    /// carried by the items or derived from the name dimension.
    pub fn init_data(
        &mut self,
        provider: impl DataProvider + 'static,
        names: Option<Vec<String>>,
    ) -> StoreResult<()> {
        self.init_data_shared(share_provider(provider), names)
    }

    /// Same as [`init_data`](Self::init_data) for a provider that is already shared.
    pub fn init_data_shared(
        &mut self,
        provider: SharedProvider,
        names: Option<Vec<String>>,
    ) -> StoreResult<()> {
        self.check_provider(&*provider.read())?;
        check_row_cap(provider.read().count())?;

        if self.raw_count > 0 {
            tracing::debug!(raw_count = self.raw_count, "re-initialising store");
        }
        self.reset_storage();

        if let Some(names) = names {
            let identity = Arc::make_mut(&mut self.identity);
            for (raw, name) in names.into_iter().enumerate() {
                identity.set_explicit_name(raw, name);
            }
        }

        let to = provider.read().count();
        self.provider = Some(provider.clone());
        self.owns_provider = true;
        self.ingest_from(&provider, 0, to);
        Ok(())
    }

    /// Pushes `items` into the attached provider and ingests what it now holds
    /// past the current raw count.
    ///
    /// Only the store that was initialised with the provider may append;
    /// clones and transform outputs are refused.
    pub fn append_data(&mut self, items: Vec<RawItem>) -> StoreResult<()> {
        let provider = self
            .provider
            .clone()
            .ok_or_else(|| violation(StoreError::NoProvider))?;
        if !self.owns_provider {
            return Err(violation(StoreError::ProviderMismatch(
                "provider belongs to the store this one was derived from".into(),
            )));
        }

        provider.write().append_data(items).map_err(violation)?;

        let from = self.raw_count;
        let to = provider.read().count();
        check_row_cap(to)?;
        self.ingest_from(&provider, from, to);
        Ok(())
    }

    /// Appends rows given in dimension order, without going through a provider.
    pub fn append_values(
        &mut self,
        rows: Vec<Vec<RawValue>>,
        names: Option<Vec<String>>,
    ) -> StoreResult<()> {
        if self.provider.is_some() {
            return Err(violation(StoreError::ProviderMismatch(
                "store is fed by a provider, use append_data".into(),
            )));
        }

        let width = self.dims.len();
        let from = self.raw_count;
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(violation(StoreError::RowWidth {
                row: from + i,
                got: row.len(),
                expected: width,
            }));
        }

        let to = from + rows.len();
        check_row_cap(to)?;
        if let Some(names) = names {
            let identity = Arc::make_mut(&mut self.identity);
            for (i, name) in names.into_iter().take(rows.len()).enumerate() {
                identity.set_explicit_name(from + i, name);
            }
        }

        let source = RowArraysSource::new(rows).starting_at(from);
        self.ingest_rows(&source, from, to);
        Ok(())
    }

    fn check_provider(&self, provider: &dyn DataProvider) -> StoreResult<()> {
        if provider.shape() == SourceShape::TypedArrays {
            match provider.declared_width() {
                Some(width) if width >= self.dims.len() => {}
                Some(width) => {
                    return Err(violation(StoreError::ProviderMismatch(format!(
                        "typed array stride {width} is narrower than {} dimensions",
                        self.dims.len()
                    ))))
                }
                None => {
                    return Err(violation(StoreError::ProviderMismatch(
                        "typed array provider must declare its stride".into(),
                    )))
                }
            }
        }
        Ok(())
    }

    fn reset_storage(&mut self) {
        let n = self.dims.len();
        self.columns = self.dims.iter().map(|d| ChunkedColumn::new(d.kind)).collect();
        self.raw_count = 0;
        self.view = IndexView::Identity;
        self.raw_extents = vec![Extent::EMPTY; n];
        self.reset_view_extents();
        self.approximate_extents = vec![None; n];
        self.inverted = Arc::new(vec![None; n]);
        self.identity = Arc::new(IdentityTable::default());
        self.provider = None;
        self.owns_provider = false;
        self.item_visuals.clear();
        self.item_layouts.clear();
        self.graphic_els.clear();
    }

    fn ingest_from(&mut self, provider: &SharedProvider, from: usize, to: usize) {
        let persistent = {
            let guard = provider.read();
            self.ingest_rows(&*guard, from, to);
            guard.persistent()
        };
        if !persistent {
            provider.write().clean();
        }
    }

    /// Core ingestion loop over raw positions `from..to`.
    fn ingest_rows(&mut self, provider: &dyn DataProvider, from: usize, to: usize) {
        if to <= from {
            return;
        }
        let chunk_size = self.chunk_size();
        let getter = provider.shape().value_getter();
        let mut missing_rows = 0usize;

        {
            let Self {
                dims,
                config,
                columns,
                raw_extents,
                identity,
                ..
            } = self;

            for column in columns.iter_mut() {
                column.ensure_capacity(to, chunk_size);
            }

            let name_dim = dims.name_dimension();
            let id_dim = dims.id_dimension();
            let identity = Arc::make_mut(identity);
            identity.reserve_rows(to);

            let width = dims.len();
            let mut buffer = Vec::new();
            let mut row_values = vec![MISSING; width];
            let mut label_cells = vec![RawValue::Null; width];

            for raw in from..to {
                let Some(item) = provider.get_item(raw, &mut buffer) else {
                    missing_rows += 1;
                    for column in columns.iter_mut() {
                        column.set(raw, MISSING, chunk_size);
                    }
                    identity.record(raw, None, None, || None);
                    continue;
                };

                for (d, info) in dims.iter().enumerate() {
                    let cell = getter(&item, &info.name, d);
                    let value = info.parse_value(&cell, &config.time_parse_formats);
                    columns[d].set(raw, value, chunk_size);
                    raw_extents[d].fold(value);
                    row_values[d] = value;
                    if Some(d) == name_dim || Some(d) == id_dim {
                        label_cells[d] = cell;
                    }
                }

                let label = |d: usize| {
                    let info = dims.at(d);
                    if info.is_ordinal() {
                        info.category_label(row_values[d])
                    } else {
                        label_cells[d].to_label()
                    }
                };
                let item_id = item.id().or_else(|| id_dim.and_then(label));
                identity.record(raw, item.name(), item_id, || name_dim.and_then(label));
            }
        }

        if missing_rows > 0 {
            tracing::warn!(missing_rows, from, to, "provider returned no item for some rows");
        }

        if let IndexView::Indexed(indices) = &mut self.view {
            indices.extend((from..to).map(|r| r as u32));
        }
        self.raw_count = to;
        self.reset_view_extents();
        self.rebuild_inverted_indices();

        tracing::debug!(rows = to - from, from, to, "ingested rows");
    }

    /// Rebuilds the category -> raw position tables of every flagged dimension.
    pub(super) fn rebuild_inverted_indices(&mut self) {
        if !self.dims.iter().any(|d| d.create_inverted_index) {
            return;
        }
        let chunk_size = self.chunk_size();
        let indices = self
            .dims
            .iter()
            .zip(&self.columns)
            .map(|(info, column)| {
                info.create_inverted_index.then(|| {
                    let categories = info.ordinal_meta.as_ref().map_or(0, |m| m.read().len());
                    InvertedIndex::build(column, self.raw_count, chunk_size, categories)
                })
            })
            .collect();
        self.inverted = Arc::new(indices);
        tracing::debug!(raw_count = self.raw_count, "rebuilt inverted indices");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{DimensionInfo, DimensionKind, DimensionRole};
    use crate::sources::TypedArraySource;

    #[test]
    fn test_typed_stride_must_cover_dimensions() {
        let mut data =
            SeriesData::new(vec![DimensionInfo::number("x"), DimensionInfo::number("y")]).unwrap();
        let err = data
            .init_data(TypedArraySource::new(vec![1.0, 2.0, 3.0], 1), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::ProviderMismatch(_)));
    }

    #[test]
    fn test_names_from_ordinal_name_dimension() {
        let mut data = SeriesData::new(vec![
            DimensionInfo::ordinal("city").with_role(DimensionRole::IsName),
            DimensionInfo::new("pop", DimensionKind::Int),
        ])
        .unwrap();
        data.append_values(
            vec![
                vec!["Paris".into(), 2.1.into()],
                vec!["Lyon".into(), 0.5.into()],
                vec!["Paris".into(), 9.9.into()],
            ],
            None,
        )
        .unwrap();

        assert_eq!(data.get_name(0), Some("Paris"));
        assert_eq!(data.get_id(2).as_deref(), Some("Paris__dup__1"));
        assert_eq!(data.get("pop", 2), 9.0);
        assert_eq!(data.get("city", 2), 0.0);
    }

    #[test]
    fn test_append_values_rejects_wrong_width() {
        let mut data =
            SeriesData::new(vec![DimensionInfo::number("x"), DimensionInfo::number("y")]).unwrap();
        let err = data.append_values(vec![vec![1.0.into()]], None).unwrap_err();
        assert_eq!(
            err,
            StoreError::RowWidth {
                row: 0,
                got: 1,
                expected: 2
            }
        );
        assert_eq!(data.raw_count(), 0);
    }
}
