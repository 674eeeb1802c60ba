#![cfg(feature = "polars")]

use polars::prelude::*;

use crate::data_types::{DataItem, DataProvider, RawValue, SourceShape};

/// Provider reading rows straight out of a polars `DataFrame`.
///
/// Columns are matched to dimensions by name, like keyed columns.
pub struct PolarsSource {
    df: DataFrame,
    names: Vec<String>,
}

impl PolarsSource {
    pub fn new(mut df: DataFrame) -> Self {
        // Single chunk per column keeps row access O(1).
        df.rechunk_mut();
        let names = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        Self { df, names }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }
}

fn to_raw(value: AnyValue<'_>) -> RawValue {
    match value {
        AnyValue::Null => RawValue::Null,
        AnyValue::Boolean(b) => RawValue::Bool(b),
        AnyValue::String(s) => RawValue::Str(s.to_string()),
        AnyValue::StringOwned(s) => RawValue::Str(s.to_string()),
        other => other
            .extract::<f64>()
            .map(RawValue::Number)
            .unwrap_or(RawValue::Null),
    }
}

impl DataProvider for PolarsSource {
    fn shape(&self) -> SourceShape {
        SourceShape::KeyedColumns
    }

    fn count(&self) -> usize {
        self.df.height()
    }

    fn get_item<'a>(&'a self, raw_index: usize, buffer: &'a mut Vec<RawValue>) -> Option<DataItem<'a>> {
        if raw_index >= self.df.height() {
            return None;
        }
        buffer.clear();
        for column in self.df.get_columns() {
            let value = column.get(raw_index).map(to_raw).unwrap_or_default();
            buffer.push(value);
        }
        Some(DataItem::Keyed {
            names: &self.names,
            values: buffer,
        })
    }

    fn declared_width(&self) -> Option<usize> {
        Some(self.names.len())
    }
}
