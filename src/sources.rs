//! In-memory providers, one per source shape.

use eyre::{Result, WrapErr};

use crate::data_types::{parse_number, DataItem, DataProvider, RawItem, RawValue, SourceShape};
use crate::error::{StoreError, StoreResult};

/// Row-oriented arrays: `[[x0, y0], [x1, y1], ...]`.
///
/// A non-persistent source drops its rows once they have been ingested; raw
/// positions keep counting from where they were.
#[derive(Clone, Debug, Default)]
pub struct RowArraysSource {
    rows: Vec<Vec<RawValue>>,
    offset: usize,
    persistent: bool,
}

impl RowArraysSource {
    pub fn new(rows: Vec<Vec<RawValue>>) -> Self {
        Self {
            rows,
            offset: 0,
            persistent: true,
        }
    }

    /// Convenience for purely numeric rows.
    pub fn from_numbers(rows: &[Vec<f64>]) -> Self {
        Self::new(
            rows.iter()
                .map(|r| r.iter().map(|v| RawValue::Number(*v)).collect())
                .collect(),
        )
    }

    pub fn streaming(mut self) -> Self {
        self.persistent = false;
        self
    }

    /// Numbers the rows from `offset` on, as if earlier rows had been cleaned.
    pub(crate) fn starting_at(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

impl DataProvider for RowArraysSource {
    fn shape(&self) -> SourceShape {
        SourceShape::RowArrays
    }

    fn count(&self) -> usize {
        self.offset + self.rows.len()
    }

    fn get_item<'a>(&'a self, raw_index: usize, _buffer: &'a mut Vec<RawValue>) -> Option<DataItem<'a>> {
        let row = self.rows.get(raw_index.checked_sub(self.offset)?)?;
        Some(DataItem::Row(row))
    }

    fn persistent(&self) -> bool {
        self.persistent
    }

    fn append_data(&mut self, items: Vec<RawItem>) -> StoreResult<()> {
        for item in items {
            let row = match item {
                RawItem::Row(values) => values,
                RawItem::Typed(values) => values.into_iter().map(RawValue::Number).collect(),
                RawItem::Object(serde_json::Value::Array(cells)) => {
                    cells.iter().map(RawValue::from_json).collect()
                }
                RawItem::Object(_) => {
                    return Err(StoreError::ProviderMismatch(
                        "row-oriented source cannot take keyed objects".into(),
                    ))
                }
            };
            self.rows.push(row);
        }
        Ok(())
    }

    fn clean(&mut self) {
        self.offset += self.rows.len();
        self.rows = Vec::new();
    }
}

/// Column-oriented data: `{ "x": [...], "y": [...] }`.
///
/// Cells are matched to dimensions by column name.
#[derive(Clone, Debug, Default)]
pub struct KeyedColumnsSource {
    names: Vec<String>,
    columns: Vec<Vec<RawValue>>,
}

impl KeyedColumnsSource {
    pub fn new<S: Into<String>>(columns: Vec<(S, Vec<RawValue>)>) -> Self {
        let (names, columns) = columns.into_iter().map(|(n, c)| (n.into(), c)).unzip();
        Self { names, columns }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).wrap_err("keyed columns must be a JSON object of arrays")?;
        let mut columns = Vec::with_capacity(map.len());
        for (name, value) in map {
            let serde_json::Value::Array(cells) = value else {
                eyre::bail!("column `{name}` is not an array");
            };
            columns.push((name, cells.iter().map(RawValue::from_json).collect()));
        }
        Ok(Self::new(columns))
    }
}

impl DataProvider for KeyedColumnsSource {
    fn shape(&self) -> SourceShape {
        SourceShape::KeyedColumns
    }

    fn count(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn get_item<'a>(&'a self, raw_index: usize, buffer: &'a mut Vec<RawValue>) -> Option<DataItem<'a>> {
        if raw_index >= self.count() {
            return None;
        }
        buffer.clear();
        buffer.extend(
            self.columns
                .iter()
                .map(|c| c.get(raw_index).cloned().unwrap_or_default()),
        );
        Some(DataItem::Keyed {
            names: &self.names,
            values: buffer,
        })
    }

    fn declared_width(&self) -> Option<usize> {
        Some(self.names.len())
    }

    fn append_data(&mut self, items: Vec<RawItem>) -> StoreResult<()> {
        let width = self.names.len();
        let base = self.count();
        for (i, item) in items.into_iter().enumerate() {
            let RawItem::Row(values) = item else {
                return Err(StoreError::ProviderMismatch(
                    "keyed columns take rows in column order".into(),
                ));
            };
            if values.len() != width {
                return Err(StoreError::RowWidth {
                    row: base + i,
                    got: values.len(),
                    expected: width,
                });
            }
            for (column, value) in self.columns.iter_mut().zip(values) {
                column.resize(base + i, RawValue::Null);
                column.push(value);
            }
        }
        Ok(())
    }
}

/// Arbitrary JSON items, e.g. `[{"value": [1, 2], "name": "a"}, 3, [4, 5]]`.
#[derive(Clone, Debug, Default)]
pub struct ObjectsSource {
    items: Vec<serde_json::Value>,
}

impl ObjectsSource {
    pub fn new(items: Vec<serde_json::Value>) -> Self {
        Self { items }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let items: Vec<serde_json::Value> =
            serde_json::from_str(json).wrap_err("data items must be a JSON array")?;
        Ok(Self::new(items))
    }
}

impl DataProvider for ObjectsSource {
    fn shape(&self) -> SourceShape {
        SourceShape::GenericObjects
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    fn get_item<'a>(&'a self, raw_index: usize, _buffer: &'a mut Vec<RawValue>) -> Option<DataItem<'a>> {
        self.items.get(raw_index).map(DataItem::Object)
    }

    fn append_data(&mut self, items: Vec<RawItem>) -> StoreResult<()> {
        for item in items {
            let value = match item {
                RawItem::Object(v) => v,
                RawItem::Row(values) => serde_json::to_value(values)
                    .map_err(|e| StoreError::ProviderMismatch(e.to_string()))?,
                RawItem::Typed(values) => serde_json::Value::from(values),
            };
            self.items.push(value);
        }
        Ok(())
    }
}

/// Flat numeric buffer holding `stride` values per row.
#[derive(Clone, Debug)]
pub struct TypedArraySource {
    values: Vec<f64>,
    stride: usize,
}

impl TypedArraySource {
    pub fn new(values: Vec<f64>, stride: usize) -> Self {
        Self {
            values,
            stride: stride.max(1),
        }
    }
}

impl DataProvider for TypedArraySource {
    fn shape(&self) -> SourceShape {
        SourceShape::TypedArrays
    }

    fn count(&self) -> usize {
        self.values.len() / self.stride
    }

    fn get_item<'a>(&'a self, raw_index: usize, _buffer: &'a mut Vec<RawValue>) -> Option<DataItem<'a>> {
        let start = raw_index.checked_mul(self.stride)?;
        self.values
            .get(start..start + self.stride)
            .map(DataItem::Typed)
    }

    fn declared_width(&self) -> Option<usize> {
        Some(self.stride)
    }

    fn append_data(&mut self, items: Vec<RawItem>) -> StoreResult<()> {
        let base = self.count();
        for (i, item) in items.into_iter().enumerate() {
            let row: Vec<f64> = match item {
                RawItem::Typed(values) => values,
                RawItem::Row(values) => values.iter().map(parse_number).collect(),
                RawItem::Object(_) => {
                    return Err(StoreError::ProviderMismatch(
                        "typed arrays only take numeric rows".into(),
                    ))
                }
            };
            if row.len() != self.stride {
                return Err(StoreError::RowWidth {
                    row: base + i,
                    got: row.len(),
                    expected: self.stride,
                });
            }
            self.values.extend(row);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_rows_keep_offsets() {
        let mut source = RowArraysSource::from_numbers(&[vec![1.0], vec![2.0]]).streaming();
        assert!(!source.persistent());
        source.clean();
        assert_eq!(source.count(), 2);
        let mut buf = Vec::new();
        assert!(source.get_item(0, &mut buf).is_none());

        source
            .append_data(vec![RawItem::Row(vec![RawValue::from(3.0)])])
            .unwrap();
        assert_eq!(source.count(), 3);
        match source.get_item(2, &mut buf) {
            Some(DataItem::Row(row)) => assert_eq!(row[0], RawValue::Number(3.0)),
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn test_keyed_columns_from_json() {
        let source = KeyedColumnsSource::from_json_str(r#"{"x": [1, 2, 3], "y": [4, 5]}"#).unwrap();
        assert_eq!(source.count(), 3);
        let mut buf = Vec::new();
        match source.get_item(2, &mut buf) {
            Some(DataItem::Keyed { names, values }) => {
                assert_eq!(names.len(), 2);
                assert!(values.iter().any(|v| v.is_null()));
            }
            other => panic!("unexpected item {other:?}"),
        }
        assert!(KeyedColumnsSource::from_json_str(r#"{"x": 1}"#).is_err());
    }

    #[test]
    fn test_typed_append_checks_width() {
        let mut source = TypedArraySource::new(vec![1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(source.count(), 2);
        let err = source
            .append_data(vec![RawItem::Typed(vec![1.0])])
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::RowWidth {
                row: 2,
                got: 1,
                expected: 2
            }
        );
    }
}
