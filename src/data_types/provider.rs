use std::sync::Arc;

use parking_lot::RwLock;

use super::value::RawValue;
use crate::error::{StoreError, StoreResult};

/// Layout of the rows a provider hands out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceShape {
    /// One array per row, one cell per dimension, in dimension order.
    RowArrays,
    /// One array per named column.
    KeyedColumns,
    /// Arbitrary JSON items: objects with a `value` field or keyed by
    /// dimension name, arrays, or plain scalars.
    GenericObjects,
    /// A flat numeric buffer with a fixed stride.
    TypedArrays,
}

/// Borrowed view of one provider row.
#[derive(Clone, Copy, Debug)]
pub enum DataItem<'a> {
    Row(&'a [RawValue]),
    Keyed {
        names: &'a [String],
        values: &'a [RawValue],
    },
    Object(&'a serde_json::Value),
    Typed(&'a [f64]),
}

/// Owned row, used for appends and for handing raw items to consumers.
#[derive(Clone, Debug, PartialEq)]
pub enum RawItem {
    Row(Vec<RawValue>),
    Object(serde_json::Value),
    Typed(Vec<f64>),
}

impl DataItem<'_> {
    fn object_field(&self, key: &str) -> Option<String> {
        match self {
            DataItem::Object(serde_json::Value::Object(map)) => {
                map.get(key).map(RawValue::from_json).and_then(|v| v.to_label())
            }
            _ => None,
        }
    }

    /// Name carried by the item itself, if its shape has room for one.
    pub fn name(&self) -> Option<String> {
        self.object_field("name")
    }

    /// Explicit id carried by the item itself.
    pub fn id(&self) -> Option<String> {
        self.object_field("id")
    }

    pub fn to_raw_item(&self) -> RawItem {
        match self {
            DataItem::Row(values) => RawItem::Row(values.to_vec()),
            DataItem::Keyed { values, .. } => RawItem::Row(values.to_vec()),
            DataItem::Object(v) => RawItem::Object((*v).clone()),
            DataItem::Typed(values) => RawItem::Typed(values.to_vec()),
        }
    }
}

/// Pulls the cell of one dimension out of a row: `(item, dim_name, dim_index)`.
pub type ValueGetter = fn(&DataItem<'_>, &str, usize) -> RawValue;

impl SourceShape {
    /// The extraction function for this shape, chosen once per ingestion.
    pub fn value_getter(self) -> ValueGetter {
        match self {
            SourceShape::RowArrays => get_from_row,
            SourceShape::KeyedColumns => get_from_keyed,
            SourceShape::GenericObjects => get_from_object,
            SourceShape::TypedArrays => get_from_typed,
        }
    }
}

fn get_from_row(item: &DataItem<'_>, _name: &str, index: usize) -> RawValue {
    match item {
        DataItem::Row(values) => values.get(index).cloned().unwrap_or_default(),
        _ => RawValue::Null,
    }
}

fn get_from_keyed(item: &DataItem<'_>, name: &str, _index: usize) -> RawValue {
    match item {
        DataItem::Keyed { names, values } => names
            .iter()
            .position(|n| n == name)
            .and_then(|pos| values.get(pos))
            .cloned()
            .unwrap_or_default(),
        _ => RawValue::Null,
    }
}

fn json_at(value: &serde_json::Value, index: usize) -> RawValue {
    match value {
        serde_json::Value::Array(cells) => {
            cells.get(index).map(RawValue::from_json).unwrap_or_default()
        }
        serde_json::Value::Object(_) => RawValue::Null,
        scalar if index == 0 => RawValue::from_json(scalar),
        _ => RawValue::Null,
    }
}

fn get_from_object(item: &DataItem<'_>, name: &str, index: usize) -> RawValue {
    let DataItem::Object(value) = item else {
        return RawValue::Null;
    };
    match value {
        serde_json::Value::Object(map) => match map.get("value") {
            Some(inner) => json_at(inner, index),
            None => map.get(name).map(RawValue::from_json).unwrap_or_default(),
        },
        other => json_at(other, index),
    }
}

fn get_from_typed(item: &DataItem<'_>, _name: &str, index: usize) -> RawValue {
    match item {
        DataItem::Typed(values) => values
            .get(index)
            .map(|v| RawValue::Number(*v))
            .unwrap_or_default(),
        _ => RawValue::Null,
    }
}

/// Source of rows for ingestion.
pub trait DataProvider: Send + Sync {
    fn shape(&self) -> SourceShape;

    /// Number of rows currently available.
    fn count(&self) -> usize;

    /// Row at `raw_index`. Providers that assemble rows on the fly write the
    /// cells into `buffer` and borrow from it.
    fn get_item<'a>(
        &'a self,
        raw_index: usize,
        buffer: &'a mut Vec<RawValue>,
    ) -> Option<DataItem<'a>>;

    /// Number of cells per row, when the shape fixes it.
    fn declared_width(&self) -> Option<usize> {
        None
    }

    /// `false` when rows are dropped by [`clean`](Self::clean) after ingestion.
    fn persistent(&self) -> bool {
        true
    }

    fn append_data(&mut self, _items: Vec<RawItem>) -> StoreResult<()> {
        Err(StoreError::AppendUnsupported)
    }

    /// Releases rows that were already ingested. Only called on
    /// non-persistent providers.
    fn clean(&mut self) {}
}

pub type SharedProvider = Arc<RwLock<dyn DataProvider>>;

pub fn share_provider(provider: impl DataProvider + 'static) -> SharedProvider {
    Arc::new(RwLock::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_getter_shapes() {
        let getter = SourceShape::GenericObjects.value_getter();

        let with_value = json!({ "value": [1, 2], "name": "a" });
        let item = DataItem::Object(&with_value);
        assert_eq!(getter(&item, "y", 1), RawValue::Number(2.0));
        assert_eq!(item.name().as_deref(), Some("a"));
        assert_eq!(item.id(), None);

        let keyed = json!({ "x": 5, "y": "7" });
        assert_eq!(getter(&DataItem::Object(&keyed), "y", 1), RawValue::from("7"));

        let plain = json!(3);
        assert_eq!(getter(&DataItem::Object(&plain), "x", 0), RawValue::Number(3.0));
        assert_eq!(getter(&DataItem::Object(&plain), "y", 1), RawValue::Null);
    }

    #[test]
    fn test_keyed_getter_uses_names() {
        let names = vec!["y".to_string(), "x".to_string()];
        let values = vec![RawValue::from(1.0), RawValue::from(2.0)];
        let item = DataItem::Keyed {
            names: &names,
            values: &values,
        };
        let getter = SourceShape::KeyedColumns.value_getter();
        assert_eq!(getter(&item, "x", 0), RawValue::Number(2.0));
        assert_eq!(getter(&item, "z", 2), RawValue::Null);
    }
}
